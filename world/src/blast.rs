//! Device countdowns, detonation and blast lifetimes.

use blast_arena_core::{
    ActorId, ArenaConfig, BlastSnapshot, BlastView, CellCoord, CellKind, DeviceId,
    DeviceSnapshot, DeviceView, Direction,
};

use crate::terrain::Terrain;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Device {
    id: DeviceId,
    owner: Option<ActorId>,
    cell: CellCoord,
    ticks_remaining: u32,
    blast_radius: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BlastCell {
    cell: CellCoord,
    ticks_remaining: u32,
}

/// Outcome of a single device detonation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Detonation {
    /// Identifier of the device that detonated.
    pub device: DeviceId,
    /// Actor that placed the device, if any.
    pub owner: Option<ActorId>,
    /// Cell the device occupied.
    pub cell: CellCoord,
    /// Cells covered by the blast, origin first, then left, right, up, down.
    pub blast_cells: Vec<CellCoord>,
    /// Destructible walls this detonation converted to open floor.
    pub destroyed_walls: Vec<CellCoord>,
}

/// Owns every live device and blast cell of a session.
#[derive(Clone, Debug)]
pub struct BlastEngine {
    devices: Vec<Device>,
    blasts: Vec<BlastCell>,
    fuse_ticks: u32,
    blast_ticks: u32,
    next_device_id: DeviceId,
}

impl BlastEngine {
    /// Creates an engine that arms devices with `fuse_ticks` and keeps blast
    /// cells alive for `blast_ticks`.
    #[must_use]
    pub fn new(fuse_ticks: u32, blast_ticks: u32) -> Self {
        Self {
            devices: Vec::new(),
            blasts: Vec::new(),
            fuse_ticks,
            blast_ticks,
            next_device_id: DeviceId::new(0),
        }
    }

    /// Creates an engine using the durations from `config`.
    #[must_use]
    pub fn from_config(config: &ArenaConfig) -> Self {
        Self::new(config.fuse_ticks, config.blast_ticks)
    }

    /// Arms a device at `cell` with a full countdown.
    ///
    /// Returns `None` without changing anything when the cell is not open or
    /// already holds a device.
    pub fn place_device(
        &mut self,
        terrain: &Terrain,
        cell: CellCoord,
        blast_radius: u32,
        owner: Option<ActorId>,
    ) -> Option<DeviceId> {
        if !terrain.is_open(cell) || self.is_device_at(cell) {
            return None;
        }

        let id = self.next_device_id;
        self.next_device_id = DeviceId::new(id.get().wrapping_add(1));
        self.devices.push(Device {
            id,
            owner,
            cell,
            ticks_remaining: self.fuse_ticks,
            blast_radius,
        });
        Some(id)
    }

    /// Advances every countdown by one tick.
    ///
    /// Devices resolve first: each one whose countdown reaches zero detonates
    /// against `terrain` and leaves the live set. Blast cells that existed
    /// before this tick then count down and fade at zero. Blast cells created
    /// by this tick's detonations start counting on the next tick.
    pub fn tick(&mut self, terrain: &mut Terrain) -> Vec<Detonation> {
        let mut detonations = Vec::new();
        let mut fresh = Vec::new();

        let devices = std::mem::take(&mut self.devices);
        let mut survivors = Vec::with_capacity(devices.len());
        for mut device in devices {
            device.ticks_remaining = device.ticks_remaining.saturating_sub(1);
            if device.ticks_remaining > 0 {
                survivors.push(device);
                continue;
            }

            let detonation = detonate(terrain, &device);
            fresh.extend(detonation.blast_cells.iter().map(|cell| BlastCell {
                cell: *cell,
                ticks_remaining: self.blast_ticks,
            }));
            detonations.push(detonation);
        }
        self.devices = survivors;

        self.blasts.retain_mut(|blast| {
            blast.ticks_remaining = blast.ticks_remaining.saturating_sub(1);
            blast.ticks_remaining > 0
        });
        self.blasts.append(&mut fresh);

        detonations
    }

    /// Reports whether any live blast cell covers `cell`.
    #[must_use]
    pub fn is_hazard_at(&self, cell: CellCoord) -> bool {
        self.blasts.iter().any(|blast| blast.cell == cell)
    }

    /// Reports whether a live device occupies `cell`.
    #[must_use]
    pub fn is_device_at(&self, cell: CellCoord) -> bool {
        self.devices.iter().any(|device| device.cell == cell)
    }

    /// Counts the live devices placed by `actor`.
    #[must_use]
    pub fn devices_owned_by(&self, actor: ActorId) -> usize {
        self.devices
            .iter()
            .filter(|device| device.owner == Some(actor))
            .count()
    }

    /// Drops every device and blast cell.
    pub fn clear(&mut self) {
        self.devices.clear();
        self.blasts.clear();
    }

    /// Captures the live devices.
    #[must_use]
    pub fn device_view(&self) -> DeviceView {
        DeviceView::from_snapshots(
            self.devices
                .iter()
                .map(|device| DeviceSnapshot {
                    id: device.id,
                    owner: device.owner,
                    cell: device.cell,
                    ticks_remaining: device.ticks_remaining,
                    blast_radius: device.blast_radius,
                })
                .collect(),
        )
    }

    /// Captures the live blast cells.
    #[must_use]
    pub fn blast_view(&self) -> BlastView {
        BlastView::from_snapshots(
            self.blasts
                .iter()
                .map(|blast| BlastSnapshot {
                    cell: blast.cell,
                    ticks_remaining: blast.ticks_remaining,
                })
                .collect(),
        )
    }
}

/// Walks the blast outward from the device in each direction independently.
///
/// Out-of-bounds cells and indestructible walls stop a direction without
/// being covered. A destructible wall is covered, converted to open floor and
/// then stops that direction.
fn detonate(terrain: &mut Terrain, device: &Device) -> Detonation {
    let mut blast_cells = vec![device.cell];
    let mut destroyed_walls = Vec::new();

    for direction in Direction::ALL {
        let mut cursor = device.cell;
        for _ in 0..device.blast_radius {
            let Some(next) = cursor.step(direction) else {
                break;
            };
            match terrain.kind(next) {
                None | Some(CellKind::IndestructibleWall) => break,
                Some(CellKind::DestructibleWall) => {
                    blast_cells.push(next);
                    if terrain.clear_to_open(next) {
                        destroyed_walls.push(next);
                    }
                    break;
                }
                Some(CellKind::Open) => {
                    blast_cells.push(next);
                    cursor = next;
                }
            }
        }
    }

    Detonation {
        device: device.id,
        owner: device.owner,
        cell: device.cell,
        blast_cells,
        destroyed_walls,
    }
}

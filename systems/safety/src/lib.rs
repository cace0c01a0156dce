#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hazard assessment over read-only arena views.
//!
//! The oracle answers whether a cell is dangerous right now and which
//! neighbouring cells offer an escape. Imminent devices are judged by an
//! axis approximation that ignores walls between the device and the cell.

use blast_arena_core::{
    BlastView, CellCoord, DeviceSnapshot, DeviceView, Direction, TerrainView,
};
use log::trace;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

/// Tunables for the oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Devices with at most this many ticks left count as imminent.
    pub imminent_ticks: u32,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self { imminent_ticks: 60 }
    }
}

/// Read-only hazard oracle over one tick's worth of views.
#[derive(Clone, Debug)]
pub struct SafetyOracle<'a> {
    terrain: TerrainView<'a>,
    devices: Vec<DeviceSnapshot>,
    blasts: &'a BlastView,
    config: SafetyConfig,
}

impl<'a> SafetyOracle<'a> {
    /// Captures the views the oracle reasons about.
    #[must_use]
    pub fn new(
        terrain: TerrainView<'a>,
        devices: &DeviceView,
        blasts: &'a BlastView,
        config: SafetyConfig,
    ) -> Self {
        Self {
            terrain,
            devices: devices.iter().copied().collect(),
            blasts,
            config,
        }
    }

    /// Returns a copy of the oracle with one extra device, everything else unchanged.
    #[must_use]
    pub fn with_hypothetical_device(&self, device: DeviceSnapshot) -> Self {
        let mut simulated = self.clone();
        simulated.devices.push(device);
        simulated
    }

    /// Terrain the oracle reasons about.
    #[must_use]
    pub fn terrain(&self) -> TerrainView<'a> {
        self.terrain
    }

    /// Reports whether a live blast covers `cell`.
    #[must_use]
    pub fn is_hazard_now(&self, cell: CellCoord) -> bool {
        self.blasts.is_hazard_at(cell)
    }

    /// Reports whether a device occupies `cell`.
    #[must_use]
    pub fn is_device_at(&self, cell: CellCoord) -> bool {
        self.devices.iter().any(|device| device.cell == cell)
    }

    /// Reports whether `cell` is covered by a blast or lies on an axis of an
    /// imminent device within its radius.
    #[must_use]
    pub fn is_danger_now(&self, cell: CellCoord) -> bool {
        self.is_hazard_now(cell)
            || self.devices.iter().any(|device| {
                device.ticks_remaining <= self.config.imminent_ticks
                    && device.cell.shares_axis_within(cell, device.blast_radius)
            })
    }

    /// Reports whether an actor may safely step onto `cell`.
    ///
    /// `own_device` names a device cell the actor is allowed to stand on.
    #[must_use]
    pub fn can_step_to(&self, cell: CellCoord, own_device: Option<CellCoord>) -> bool {
        self.is_walkable(cell, own_device) && !self.is_danger_now(cell)
    }

    /// Neighbouring directions that [`Self::can_step_to`] accepts, in scan order.
    #[must_use]
    pub fn escape_candidates(
        &self,
        from: CellCoord,
        own_device: Option<CellCoord>,
    ) -> Vec<Direction> {
        self.neighbours_where(from, |cell| self.can_step_to(cell, own_device))
    }

    /// Picks a uniformly random safe neighbour, falling back to any walkable
    /// neighbour without a live blast when none is fully safe.
    pub fn find_escape<R: Rng + ?Sized>(
        &self,
        from: CellCoord,
        own_device: Option<CellCoord>,
        rng: &mut R,
    ) -> Option<Direction> {
        let safe = self.escape_candidates(from, own_device);
        if !safe.is_empty() {
            return safe.choose(rng).copied();
        }

        let fallback = self.neighbours_where(from, |cell| {
            self.is_walkable(cell, own_device) && !self.is_hazard_now(cell)
        });
        trace!(
            "no safe neighbour around ({}, {}); {} fallback candidates",
            from.column(),
            from.row(),
            fallback.len()
        );
        fallback.choose(rng).copied()
    }

    fn is_walkable(&self, cell: CellCoord, own_device: Option<CellCoord>) -> bool {
        self.terrain.is_open(cell) && (!self.is_device_at(cell) || own_device == Some(cell))
    }

    fn neighbours_where<F>(&self, from: CellCoord, accept: F) -> Vec<Direction>
    where
        F: Fn(CellCoord) -> bool,
    {
        Direction::ALL
            .into_iter()
            .filter(|direction| {
                self.terrain
                    .neighbor(from, *direction)
                    .is_some_and(|cell| accept(cell))
            })
            .collect()
    }
}

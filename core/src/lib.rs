#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Blast Arena engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and agents submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values.
//! Systems query immutable views such as [`TerrainView`] and [`DeviceView`]
//! and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of simulation ticks that make up one second of play.
pub const TICKS_PER_SECOND: u32 = 60;

/// Largest number of actors a single arena can host.
pub const MAX_ACTORS: u32 = 4;

/// Cardinal movement directions available to actors.
///
/// The declaration order doubles as the canonical tie-break order used by
/// every neighbour scan in the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
}

impl Direction {
    /// All directions in canonical scan order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a placed device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(u32);

impl DeviceId {
    /// Creates a new device identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Returns the adjacent cell in `direction`, or `None` when the step would
    /// leave the non-negative coordinate space.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::Left => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
            Direction::Right => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::Up => self
                .row
                .checked_sub(1)
                .map(|row| Self::new(self.column, row)),
            Direction::Down => self
                .row
                .checked_add(1)
                .map(|row| Self::new(self.column, row)),
        }
    }

    /// Reports whether `other` shares a row or column with this cell and lies
    /// no further than `radius` cells away along that axis.
    ///
    /// Intervening terrain is ignored.
    #[must_use]
    pub fn shares_axis_within(self, other: CellCoord, radius: u32) -> bool {
        (self.row == other.row && self.column.abs_diff(other.column) <= radius)
            || (self.column == other.column && self.row.abs_diff(other.row) <= radius)
    }
}

/// Kind of terrain occupying a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Walkable floor.
    Open,
    /// Permanent wall that blocks movement and blasts.
    IndestructibleWall,
    /// Wall that blocks movement until a blast converts it to [`CellKind::Open`].
    DestructibleWall,
}

/// Pickups dropped by destroyed walls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    /// Increases the collecting actor's blast radius by one.
    RangeBoost,
    /// Grants the collecting actor one additional life.
    ExtraLife,
}

impl CollectibleKind {
    /// Every collectible kind, in draw order.
    pub const ALL: [CollectibleKind; 2] = [CollectibleKind::RangeBoost, CollectibleKind::ExtraLife];
}

/// Discrete per-tick intent resolved from any input source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Step one cell to the left.
    MoveLeft,
    /// Step one cell to the right.
    MoveRight,
    /// Step one cell up.
    MoveUp,
    /// Step one cell down.
    MoveDown,
    /// Place a device on the current cell.
    PlaceDevice,
}

impl Intent {
    /// Converts the intent into the command that carries it out for `actor`.
    #[must_use]
    pub const fn into_command(self, actor: ActorId) -> Command {
        match self {
            Self::MoveLeft => Command::MoveActor {
                actor,
                direction: Direction::Left,
            },
            Self::MoveRight => Command::MoveActor {
                actor,
                direction: Direction::Right,
            },
            Self::MoveUp => Command::MoveActor {
                actor,
                direction: Direction::Up,
            },
            Self::MoveDown => Command::MoveActor {
                actor,
                direction: Direction::Down,
            },
            Self::PlaceDevice => Command::PlaceDevice { actor },
        }
    }
}

impl From<Direction> for Intent {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Left => Self::MoveLeft,
            Direction::Right => Self::MoveRight,
            Direction::Up => Self::MoveUp,
            Direction::Down => Self::MoveDown,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation by a single tick.
    Tick,
    /// Requests that an actor step one cell in the specified direction.
    MoveActor {
        /// Identifier of the actor attempting to move.
        actor: ActorId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that an actor place a device on the cell it occupies.
    PlaceDevice {
        /// Identifier of the actor placing the device.
        actor: ActorId,
    },
    /// Clears devices, blasts and collectibles, regenerates terrain and
    /// returns every actor to its spawn point.
    ResetArena,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that just completed.
        tick: u64,
    },
    /// Confirms that an actor moved between two cells.
    ActorMoved {
        /// Identifier of the actor that moved.
        actor: ActorId,
        /// Cell the actor occupied before moving.
        from: CellCoord,
        /// Cell the actor occupies after moving.
        to: CellCoord,
    },
    /// Confirms that a device was placed.
    DevicePlaced {
        /// Identifier allocated to the device.
        device: DeviceId,
        /// Actor that placed the device.
        owner: ActorId,
        /// Cell holding the device.
        cell: CellCoord,
        /// Number of cells the blast travels in each direction.
        blast_radius: u32,
    },
    /// Reports that a device detonated and left the live set.
    DeviceDetonated {
        /// Identifier of the detonated device.
        device: DeviceId,
        /// Cell the device occupied.
        cell: CellCoord,
    },
    /// Reports that a blast converted a destructible wall to open floor.
    WallDestroyed {
        /// Cell that changed kind.
        cell: CellCoord,
    },
    /// Reports that a collectible dropped where a wall used to be.
    CollectibleSpawned {
        /// Cell holding the collectible.
        cell: CellCoord,
        /// Kind of collectible dropped.
        kind: CollectibleKind,
    },
    /// Reports that an actor picked up a collectible.
    CollectibleCollected {
        /// Actor that collected the item.
        actor: ActorId,
        /// Cell the collectible occupied.
        cell: CellCoord,
        /// Kind of collectible collected.
        kind: CollectibleKind,
    },
    /// Reports that an actor standing in a blast lost a life.
    ActorDamaged {
        /// Actor that took damage.
        actor: ActorId,
        /// Lives left after the hit.
        lives_remaining: u32,
    },
    /// Reports that an actor ran out of lives.
    ActorEliminated {
        /// Actor that was eliminated.
        actor: ActorId,
    },
    /// Announces that at most one actor remains standing.
    MatchConcluded {
        /// Surviving actor, or `None` when everyone was eliminated together.
        winner: Option<ActorId>,
    },
    /// Confirms that the arena was reset.
    ArenaReset,
}

/// Tunable parameters for a simulation session.
///
/// Durations are tick counts. [`ArenaConfig::default`] carries the canonical
/// constant set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Probability that a free interior cell becomes a destructible wall.
    pub wall_density: f32,
    /// Countdown assigned to freshly placed devices.
    pub fuse_ticks: u32,
    /// Lifetime of each blast cell.
    pub blast_ticks: u32,
    /// Blast radius actors start with.
    pub default_blast_radius: u32,
    /// Upper bound for blast radius boosts.
    pub max_blast_radius: u32,
    /// Minimum ticks between two placements by the same actor.
    pub placement_cooldown_ticks: u32,
    /// Lives each actor starts with.
    pub starting_lives: u32,
    /// Ticks of invulnerability following a hit.
    pub damage_grace_ticks: u32,
    /// Probability that a destroyed wall drops a collectible.
    pub collectible_probability: f32,
    /// Maximum number of simultaneously live collectibles.
    pub max_collectibles: usize,
    /// Number of actors spawned into the arena.
    pub actor_count: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            columns: 15,
            rows: 13,
            wall_density: 0.3,
            fuse_ticks: 120,
            blast_ticks: 60,
            default_blast_radius: 2,
            max_blast_radius: 6,
            placement_cooldown_ticks: 30,
            starting_lives: 3,
            damage_grace_ticks: 60,
            collectible_probability: 0.3,
            max_collectibles: 4,
            actor_count: 2,
        }
    }
}

impl ArenaConfig {
    /// Smallest grid edge that still leaves room for the corner spawn pockets.
    pub const MIN_GRID_EDGE: u32 = 5;

    /// Checks the configuration for values the simulation cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < Self::MIN_GRID_EDGE || self.rows < Self::MIN_GRID_EDGE {
            return Err(ConfigError::GridTooSmall {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if !(0.0..=1.0).contains(&self.wall_density) {
            return Err(ConfigError::ProbabilityOutOfRange {
                name: "wall_density",
                value: self.wall_density,
            });
        }
        if !(0.0..=1.0).contains(&self.collectible_probability) {
            return Err(ConfigError::ProbabilityOutOfRange {
                name: "collectible_probability",
                value: self.collectible_probability,
            });
        }
        if self.fuse_ticks == 0 {
            return Err(ConfigError::ZeroDuration { name: "fuse_ticks" });
        }
        if self.blast_ticks == 0 {
            return Err(ConfigError::ZeroDuration {
                name: "blast_ticks",
            });
        }
        if self.default_blast_radius > self.max_blast_radius {
            return Err(ConfigError::RadiusExceedsMaximum {
                radius: self.default_blast_radius,
                maximum: self.max_blast_radius,
            });
        }
        if self.actor_count > MAX_ACTORS {
            return Err(ConfigError::TooManyActors {
                requested: self.actor_count,
                maximum: MAX_ACTORS,
            });
        }
        Ok(())
    }
}

/// Reasons an [`ArenaConfig`] may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid cannot fit the corner spawn pockets.
    #[error("grid of {columns}x{rows} is smaller than the 5x5 minimum")]
    GridTooSmall {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// A probability lies outside `[0, 1]`.
    #[error("{name} must lie within [0, 1], got {value}")]
    ProbabilityOutOfRange {
        /// Name of the offending field.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// A duration that must be positive was zero.
    #[error("{name} must be greater than zero")]
    ZeroDuration {
        /// Name of the offending field.
        name: &'static str,
    },
    /// The starting blast radius exceeds the configured cap.
    #[error("default blast radius {radius} exceeds maximum {maximum}")]
    RadiusExceedsMaximum {
        /// Requested starting radius.
        radius: u32,
        /// Configured cap.
        maximum: u32,
    },
    /// More actors were requested than the arena has spawn points.
    #[error("{requested} actors requested but the arena supports at most {maximum}")]
    TooManyActors {
        /// Requested actor count.
        requested: u32,
        /// Number of available spawn points.
        maximum: u32,
    },
}

/// Read-only view into the dense terrain grid.
///
/// Every query answers `false` (or `None`) for out-of-bounds cells.
#[derive(Clone, Copy, Debug)]
pub struct TerrainView<'a> {
    cells: &'a [CellKind],
    columns: u32,
    rows: u32,
}

impl<'a> TerrainView<'a> {
    /// Captures a new terrain view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [CellKind], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Provides the dimensions of the underlying grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Returns the kind of the cell, if it lies inside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell is open floor.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.kind(cell) == Some(CellKind::Open)
    }

    /// Reports whether the cell holds a destructible wall.
    #[must_use]
    pub fn is_destructible(&self, cell: CellCoord) -> bool {
        self.kind(cell) == Some(CellKind::DestructibleWall)
    }

    /// Reports whether the cell holds an indestructible wall.
    #[must_use]
    pub fn is_indestructible(&self, cell: CellCoord) -> bool {
        self.kind(cell) == Some(CellKind::IndestructibleWall)
    }

    /// Returns the in-bounds neighbour of `cell` in `direction`.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.step(direction).filter(|next| self.in_bounds(*next))
    }

    /// Row-major slice of every cell kind, suitable for rendering.
    #[must_use]
    pub fn cells(&self) -> &'a [CellKind] {
        self.cells
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Immutable representation of a live device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Identifier allocated to the device.
    pub id: DeviceId,
    /// Actor that placed the device, if any.
    pub owner: Option<ActorId>,
    /// Cell holding the device.
    pub cell: CellCoord,
    /// Ticks left before detonation.
    pub ticks_remaining: u32,
    /// Number of cells the blast travels in each direction.
    pub blast_radius: u32,
}

/// Read-only snapshot describing every live device.
#[derive(Clone, Debug, Default)]
pub struct DeviceView {
    snapshots: Vec<DeviceSnapshot>,
}

impl DeviceView {
    /// Creates a new device view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DeviceSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured device snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceSnapshot> {
        self.snapshots.iter()
    }

    /// Returns the device occupying `cell`, if any.
    #[must_use]
    pub fn device_at(&self, cell: CellCoord) -> Option<&DeviceSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.cell == cell)
    }

    /// Number of live devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no devices are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DeviceSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single blast cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlastSnapshot {
    /// Cell covered by the blast.
    pub cell: CellCoord,
    /// Ticks left before the blast cell fades.
    pub ticks_remaining: u32,
}

/// Read-only snapshot describing every live blast cell.
///
/// Overlapping blasts are kept as separate entries.
#[derive(Clone, Debug, Default)]
pub struct BlastView {
    snapshots: Vec<BlastSnapshot>,
}

impl BlastView {
    /// Creates a new blast view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<BlastSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured blast snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &BlastSnapshot> {
        self.snapshots.iter()
    }

    /// Reports whether any blast covers `cell`.
    #[must_use]
    pub fn is_hazard_at(&self, cell: CellCoord) -> bool {
        self.snapshots.iter().any(|snapshot| snapshot.cell == cell)
    }

    /// Number of live blast cells, overlaps included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no blast cells are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BlastSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single actor's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the actor.
    pub id: ActorId,
    /// Grid cell currently occupied by the actor.
    pub cell: CellCoord,
    /// Lives left.
    pub lives: u32,
    /// Blast radius of devices the actor places.
    pub blast_radius: u32,
    /// Remaining invulnerability ticks after a hit.
    pub grace_ticks: u32,
    /// Indicates whether the actor may place a device this tick.
    pub ready_to_place: bool,
    /// Indicates whether the actor ran out of lives.
    pub eliminated: bool,
}

/// Read-only snapshot describing every actor in the arena.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured actor snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over actors that have not been eliminated.
    pub fn active(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter().filter(|snapshot| !snapshot.eliminated)
    }

    /// Looks up a single actor.
    #[must_use]
    pub fn get(&self, actor: ActorId) -> Option<&ActorSnapshot> {
        self.snapshots
            .binary_search_by_key(&actor, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ActorSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a collectible lying on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectibleSnapshot {
    /// Cell holding the collectible.
    pub cell: CellCoord,
    /// Kind of collectible.
    pub kind: CollectibleKind,
}

/// Read-only snapshot describing every live collectible.
#[derive(Clone, Debug, Default)]
pub struct CollectibleView {
    snapshots: Vec<CollectibleSnapshot>,
}

impl CollectibleView {
    /// Creates a new collectible view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<CollectibleSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured collectibles.
    pub fn iter(&self) -> impl Iterator<Item = &CollectibleSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CollectibleSnapshot> {
        self.snapshots
    }
}

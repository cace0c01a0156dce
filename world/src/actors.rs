//! Actor records owned by the session.

use blast_arena_core::{ActorId, ActorSnapshot, ArenaConfig, CellCoord, CollectibleKind};

/// Mutable state of a single actor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Actor {
    pub(crate) id: ActorId,
    pub(crate) cell: CellCoord,
    pub(crate) spawn: CellCoord,
    pub(crate) lives: u32,
    pub(crate) blast_radius: u32,
    pub(crate) grace_ticks: u32,
    pub(crate) last_placement: Option<u64>,
    pub(crate) eliminated: bool,
}

impl Actor {
    /// Creates an actor standing on its spawn with full lives.
    pub(crate) fn spawn(id: ActorId, spawn: CellCoord, config: &ArenaConfig) -> Self {
        Self {
            id,
            cell: spawn,
            spawn,
            lives: config.starting_lives,
            blast_radius: config.default_blast_radius,
            grace_ticks: 0,
            last_placement: None,
            eliminated: false,
        }
    }

    /// Restores the actor to its freshly spawned state.
    pub(crate) fn respawn(&mut self, config: &ArenaConfig) {
        *self = Self::spawn(self.id, self.spawn, config);
    }

    /// Reports whether the placement cooldown elapsed at `tick`.
    pub(crate) fn cooldown_elapsed(&self, tick: u64, cooldown_ticks: u32) -> bool {
        self.last_placement
            .map_or(true, |placed| tick.saturating_sub(placed) >= u64::from(cooldown_ticks))
    }

    /// Applies a collectible's effect.
    pub(crate) fn collect(&mut self, kind: CollectibleKind, config: &ArenaConfig) {
        match kind {
            CollectibleKind::RangeBoost => {
                self.blast_radius = self
                    .blast_radius
                    .saturating_add(1)
                    .min(config.max_blast_radius);
            }
            CollectibleKind::ExtraLife => {
                self.lives = self.lives.saturating_add(1);
            }
        }
    }

    /// Removes one life and starts the grace window; returns `true` when the
    /// hit eliminated the actor.
    pub(crate) fn take_hit(&mut self, grace_ticks: u32) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.grace_ticks = grace_ticks;
        if self.lives == 0 {
            self.eliminated = true;
        }
        self.eliminated
    }

    pub(crate) fn snapshot(&self, ready_to_place: bool) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            cell: self.cell,
            lives: self.lives,
            blast_radius: self.blast_radius,
            grace_ticks: self.grace_ticks,
            ready_to_place,
            eliminated: self.eliminated,
        }
    }
}

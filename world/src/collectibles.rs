//! Pickups dropped where destructible walls used to stand.

use blast_arena_core::{
    ArenaConfig, CellCoord, CollectibleKind, CollectibleSnapshot, CollectibleView,
};
use rand::Rng;

/// Owns the live collectibles and decides when a destroyed wall drops one.
#[derive(Clone, Debug)]
pub struct CollectibleSpawner {
    collectibles: Vec<CollectibleSnapshot>,
    probability: f32,
    capacity: usize,
}

impl CollectibleSpawner {
    /// Creates a spawner that drops with `probability` while fewer than
    /// `capacity` collectibles are live.
    #[must_use]
    pub fn new(probability: f32, capacity: usize) -> Self {
        Self {
            collectibles: Vec::new(),
            probability,
            capacity,
        }
    }

    /// Creates a spawner using the drop settings from `config`.
    #[must_use]
    pub fn from_config(config: &ArenaConfig) -> Self {
        Self::new(config.collectible_probability, config.max_collectibles)
    }

    /// Rolls for a drop at a cell whose wall was just destroyed.
    ///
    /// Nothing is drawn from `rng` when the cap is reached or the cell already
    /// holds a collectible.
    pub fn notify_wall_destroyed<R: Rng + ?Sized>(
        &mut self,
        cell: CellCoord,
        rng: &mut R,
    ) -> Option<CollectibleKind> {
        if self.collectibles.len() >= self.capacity || self.collectible_at(cell).is_some() {
            return None;
        }
        if rng.gen::<f32>() >= self.probability {
            return None;
        }

        let kind = CollectibleKind::ALL[rng.gen_range(0..CollectibleKind::ALL.len())];
        self.collectibles.push(CollectibleSnapshot { cell, kind });
        Some(kind)
    }

    /// Returns the collectible lying on `cell`, if any.
    #[must_use]
    pub fn collectible_at(&self, cell: CellCoord) -> Option<CollectibleKind> {
        self.collectibles
            .iter()
            .find(|collectible| collectible.cell == cell)
            .map(|collectible| collectible.kind)
    }

    /// Removes and returns the collectible lying on `cell`, if any.
    pub fn take_at(&mut self, cell: CellCoord) -> Option<CollectibleKind> {
        let index = self
            .collectibles
            .iter()
            .position(|collectible| collectible.cell == cell)?;
        Some(self.collectibles.remove(index).kind)
    }

    /// Number of live collectibles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collectibles.len()
    }

    /// Reports whether no collectibles are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collectibles.is_empty()
    }

    /// Drops every live collectible.
    pub fn clear(&mut self) {
        self.collectibles.clear();
    }

    /// Captures the live collectibles.
    #[must_use]
    pub fn view(&self) -> CollectibleView {
        CollectibleView::from_snapshots(self.collectibles.clone())
    }
}

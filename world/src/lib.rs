#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for Blast Arena.
//!
//! A [`World`] exclusively owns the terrain grid, the blast engine, the
//! collectible spawner and the actor records of one match. Every mutation goes
//! through [`apply`]; reads go through the [`query`] module.

mod actors;
mod blast;
mod collectibles;
mod level;
mod terrain;

use blast_arena_core::{ActorId, ArenaConfig, CellCoord, Command, ConfigError, Direction, Event};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::actors::Actor;

pub use crate::blast::{BlastEngine, Detonation};
pub use crate::collectibles::CollectibleSpawner;
pub use crate::level::{Level, LevelError};
pub use crate::terrain::{corner_spawns, Terrain};

/// Represents the authoritative state of one match.
#[derive(Debug)]
pub struct World {
    config: ArenaConfig,
    template: Option<Level>,
    terrain: Terrain,
    blasts: BlastEngine,
    collectibles: CollectibleSpawner,
    actors: Vec<Actor>,
    rng: ChaCha8Rng,
    tick_index: u64,
    concluded: bool,
}

impl World {
    /// Creates a world on a procedurally generated arena.
    ///
    /// All randomness derives from `seed`.
    pub fn new(config: ArenaConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let level = Level::generate(&config, &mut rng);
        Ok(Self::assemble(config, None, level, rng))
    }

    /// Creates a world from a persisted level, falling back to a generated
    /// arena when the text is malformed.
    pub fn from_level_text(config: ArenaConfig, text: &str, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let parsed = Level::parse(text, config.columns, config.rows)
            .and_then(|level| level.require_spawns(config.actor_count));
        let template = parsed.as_ref().ok().cloned();
        let level = parsed.unwrap_or_else(|error| Level::fallback(&error, &config, &mut rng));
        Ok(Self::assemble(config, template, level, rng))
    }

    /// Creates a world on a fixed level with one actor per spawn point.
    ///
    /// The grid dimensions and actor count are taken from the level.
    pub fn from_level(mut config: ArenaConfig, level: Level, seed: u64) -> Result<Self, ConfigError> {
        let (columns, rows) = level.terrain().dimensions();
        config.columns = columns;
        config.rows = rows;
        config.actor_count = u32::try_from(level.spawns().len()).unwrap_or(u32::MAX);
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(Self::assemble(config, Some(level.clone()), level, rng))
    }

    fn assemble(config: ArenaConfig, template: Option<Level>, level: Level, rng: ChaCha8Rng) -> Self {
        let actors = spawn_actors(&config, level.spawns());
        let terrain = level.terrain().clone();
        Self {
            blasts: BlastEngine::from_config(&config),
            collectibles: CollectibleSpawner::from_config(&config),
            actors,
            terrain,
            template,
            config,
            rng,
            tick_index: 0,
            concluded: false,
        }
    }

    fn actor_mut(&mut self, actor: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|candidate| candidate.id == actor)
    }

    fn ready_to_place(&self, actor: &Actor) -> bool {
        !actor.eliminated
            && actor.cooldown_elapsed(self.tick_index, self.config.placement_cooldown_ticks)
            && self.blasts.devices_owned_by(actor.id) == 0
    }

    fn advance(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        for detonation in self.blasts.tick(&mut self.terrain) {
            out_events.push(Event::DeviceDetonated {
                device: detonation.device,
                cell: detonation.cell,
            });
            for cell in detonation.destroyed_walls {
                out_events.push(Event::WallDestroyed { cell });
                if let Some(kind) = self.collectibles.notify_wall_destroyed(cell, &mut self.rng) {
                    out_events.push(Event::CollectibleSpawned { cell, kind });
                }
            }
        }

        self.resolve_damage(out_events);
    }

    fn resolve_damage(&mut self, out_events: &mut Vec<Event>) {
        let grace_ticks = self.config.damage_grace_ticks;
        for actor in self.actors.iter_mut().filter(|actor| !actor.eliminated) {
            actor.grace_ticks = actor.grace_ticks.saturating_sub(1);
            if actor.grace_ticks > 0 || !self.blasts.is_hazard_at(actor.cell) {
                continue;
            }

            let eliminated = actor.take_hit(grace_ticks);
            out_events.push(Event::ActorDamaged {
                actor: actor.id,
                lives_remaining: actor.lives,
            });
            if eliminated {
                info!("actor {} eliminated at {:?}", actor.id.get(), actor.cell);
                out_events.push(Event::ActorEliminated { actor: actor.id });
            }
        }

        if self.concluded || self.actors.len() < 2 {
            return;
        }
        let mut survivors = self.actors.iter().filter(|actor| !actor.eliminated);
        let winner = survivors.next().map(|actor| actor.id);
        if survivors.next().is_none() {
            self.concluded = true;
            info!("match concluded after {} ticks, winner {winner:?}", self.tick_index);
            out_events.push(Event::MatchConcluded { winner });
        }
    }

    fn move_actor(&mut self, actor_id: ActorId, direction: Direction, out_events: &mut Vec<Event>) {
        let Some(actor) = self.actors.iter().find(|actor| actor.id == actor_id) else {
            debug!("move rejected: unknown actor {}", actor_id.get());
            return;
        };
        if actor.eliminated {
            return;
        }

        let from = actor.cell;
        let Some(to) = from.step(direction) else {
            return;
        };
        if !self.terrain.is_open(to) || self.blasts.is_device_at(to) {
            debug!("move rejected: actor {} blocked at {to:?}", actor_id.get());
            return;
        }

        let collected = self.collectibles.take_at(to);
        let Some(actor) = self.actors.iter_mut().find(|actor| actor.id == actor_id) else {
            return;
        };
        actor.cell = to;
        out_events.push(Event::ActorMoved {
            actor: actor_id,
            from,
            to,
        });

        if let Some(kind) = collected {
            actor.collect(kind, &self.config);
            out_events.push(Event::CollectibleCollected {
                actor: actor_id,
                cell: to,
                kind,
            });
        }
    }

    fn place_device(&mut self, actor_id: ActorId, out_events: &mut Vec<Event>) {
        let Some(actor) = self.actors.iter().find(|actor| actor.id == actor_id) else {
            debug!("placement rejected: unknown actor {}", actor_id.get());
            return;
        };
        if !self.ready_to_place(actor) {
            debug!("placement rejected: actor {} not ready", actor_id.get());
            return;
        }

        let (cell, blast_radius) = (actor.cell, actor.blast_radius);
        let Some(device) = self
            .blasts
            .place_device(&self.terrain, cell, blast_radius, Some(actor_id))
        else {
            debug!("placement rejected: {cell:?} is blocked");
            return;
        };

        let tick = self.tick_index;
        if let Some(actor) = self.actor_mut(actor_id) {
            actor.last_placement = Some(tick);
        }
        out_events.push(Event::DevicePlaced {
            device,
            owner: actor_id,
            cell,
            blast_radius,
        });
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        let level = match &self.template {
            Some(level) => level.clone(),
            None => Level::generate(&self.config, &mut self.rng),
        };
        self.terrain = level.terrain().clone();
        self.blasts.clear();
        self.collectibles.clear();
        for actor in &mut self.actors {
            actor.respawn(&self.config);
        }
        self.concluded = false;
        info!("arena reset at tick {}", self.tick_index);
        out_events.push(Event::ArenaReset);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Illegal requests leave the world unchanged and emit no events. Once the
/// match has concluded only [`Command::ResetArena`] has any effect.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.concluded && command != Command::ResetArena {
        debug!("{command:?} ignored: match already concluded");
        return;
    }
    match command {
        Command::Tick => world.advance(out_events),
        Command::MoveActor { actor, direction } => world.move_actor(actor, direction, out_events),
        Command::PlaceDevice { actor } => world.place_device(actor, out_events),
        Command::ResetArena => world.reset(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use blast_arena_core::{
        ActorView, ArenaConfig, BlastView, CellCoord, CollectibleView, DeviceView, TerrainView,
    };

    use super::World;

    /// Provides read-only access to the terrain grid.
    #[must_use]
    pub fn terrain_view(world: &World) -> TerrainView<'_> {
        world.terrain.view()
    }

    /// Captures the live devices.
    #[must_use]
    pub fn device_view(world: &World) -> DeviceView {
        world.blasts.device_view()
    }

    /// Captures the live blast cells.
    #[must_use]
    pub fn blast_view(world: &World) -> BlastView {
        world.blasts.blast_view()
    }

    /// Captures the live collectibles.
    #[must_use]
    pub fn collectible_view(world: &World) -> CollectibleView {
        world.collectibles.view()
    }

    /// Captures every actor, eliminated ones included.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(
            world
                .actors
                .iter()
                .map(|actor| actor.snapshot(world.ready_to_place(actor)))
                .collect(),
        )
    }

    /// Reports whether a live blast covers `cell`.
    #[must_use]
    pub fn is_hazard_at(world: &World, cell: CellCoord) -> bool {
        world.blasts.is_hazard_at(cell)
    }

    /// Reports whether a live device occupies `cell`.
    #[must_use]
    pub fn is_device_at(world: &World, cell: CellCoord) -> bool {
        world.blasts.is_device_at(cell)
    }

    /// Number of ticks applied since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether the match already concluded.
    #[must_use]
    pub fn is_concluded(world: &World) -> bool {
        world.concluded
    }

    /// Configuration the world runs with.
    #[must_use]
    pub fn config(world: &World) -> &ArenaConfig {
        &world.config
    }
}

fn spawn_actors(config: &ArenaConfig, spawns: &[CellCoord]) -> Vec<Actor> {
    spawns
        .iter()
        .take(usize::try_from(config.actor_count).unwrap_or(0))
        .zip(0..)
        .map(|(spawn, index)| Actor::spawn(ActorId::new(index), *spawn, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blast_arena_core::CellKind;

    fn open_world(spawns: Vec<CellCoord>) -> World {
        let level = Level::new(Terrain::bordered(9, 9), spawns);
        World::from_level(ArenaConfig::default(), level, 1).expect("valid config")
    }

    #[test]
    fn generated_world_spawns_configured_actors() {
        let world = World::new(ArenaConfig::default(), 42).expect("valid config");
        let actors = query::actor_view(&world).into_vec();

        assert_eq!(actors.len(), 2);
        assert_eq!(actors[0].cell, CellCoord::new(1, 1));
        assert_eq!(actors[1].cell, CellCoord::new(13, 11));
        assert!(actors.iter().all(|actor| actor.lives == 3 && actor.ready_to_place));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ArenaConfig {
            columns: 3,
            ..ArenaConfig::default()
        };
        assert!(World::new(config, 0).is_err());
    }

    #[test]
    fn move_into_wall_is_ignored() {
        let mut world = open_world(vec![CellCoord::new(1, 1)]);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveActor {
                actor: ActorId::new(0),
                direction: Direction::Left,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::actor_view(&world).into_vec()[0].cell, CellCoord::new(1, 1));
    }

    #[test]
    fn placement_respects_single_device_and_cooldown() {
        let mut world = open_world(vec![CellCoord::new(3, 3)]);
        let actor = ActorId::new(0);
        let mut events = Vec::new();

        apply(&mut world, Command::PlaceDevice { actor }, &mut events);
        assert_eq!(events.len(), 1);
        assert!(query::is_device_at(&world, CellCoord::new(3, 3)));

        apply(
            &mut world,
            Command::MoveActor {
                actor,
                direction: Direction::Right,
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, Command::PlaceDevice { actor }, &mut events);
        assert!(events.is_empty(), "second live device must be refused");
        assert!(!query::actor_view(&world).into_vec()[0].ready_to_place);
    }

    #[test]
    fn actors_cannot_walk_onto_devices() {
        let mut world = open_world(vec![CellCoord::new(3, 3), CellCoord::new(4, 3)]);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceDevice {
                actor: ActorId::new(0),
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::MoveActor {
                actor: ActorId::new(1),
                direction: Direction::Left,
            },
            &mut events,
        );

        assert!(events.is_empty());
    }

    #[test]
    fn reset_restores_template_level() {
        let wall = CellCoord::new(5, 3);
        let level = Level::new(
            Terrain::bordered(9, 9).with_cell(wall, CellKind::DestructibleWall),
            vec![CellCoord::new(4, 3)],
        );
        let config = ArenaConfig {
            fuse_ticks: 1,
            ..ArenaConfig::default()
        };
        let mut world = World::from_level(config, level, 3).expect("valid config");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceDevice {
                actor: ActorId::new(0),
            },
            &mut events,
        );
        apply(&mut world, Command::Tick, &mut events);
        assert!(query::terrain_view(&world).is_open(wall));

        events.clear();
        apply(&mut world, Command::ResetArena, &mut events);

        assert_eq!(events, vec![Event::ArenaReset]);
        assert!(query::terrain_view(&world).is_destructible(wall));
        assert!(query::blast_view(&world).is_empty());
        assert_eq!(query::actor_view(&world).into_vec()[0].lives, 3);
    }
}

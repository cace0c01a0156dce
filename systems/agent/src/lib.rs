#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rule-based agent that picks one action per decision interval.
//!
//! Rules are evaluated in priority order: rescue after placing a device,
//! escape danger, place a useful device when a strict escape exists, then
//! drift relative to the nearest opponent.

use std::cmp::Reverse;

use blast_arena_core::{
    ActorId, ActorSnapshot, ActorView, CellCoord, Command, DeviceId, DeviceSnapshot, Direction,
    Event, TerrainView,
};
use blast_arena_system_safety::SafetyOracle;
use log::debug;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Tunables for the agent policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Minimum ticks between two evaluated decisions.
    pub decision_interval_ticks: u64,
    /// Probability of considering a device placement per decision.
    pub offense_probability: f32,
    /// Probability of counting a lined-up opponent as a reason to place.
    pub hunt_probability: f32,
    /// Probability of steering relative to the nearest opponent.
    pub bias_probability: f32,
    /// Opponents this close or closer are retreated from.
    pub near_distance: u32,
    /// Opponents further than this are approached.
    pub far_distance: u32,
    /// Closest opponent distance worth hunting.
    pub hunt_min_distance: u32,
    /// Furthest opponent distance worth hunting.
    pub hunt_max_distance: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            decision_interval_ticks: 15,
            offense_probability: 0.2,
            hunt_probability: 0.25,
            bias_probability: 0.5,
            near_distance: 2,
            far_distance: 5,
            hunt_min_distance: 2,
            hunt_max_distance: 4,
        }
    }
}

/// Action chosen by a single decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Do nothing this time.
    Wait,
    /// Step one cell.
    Move(Direction),
    /// Drop a device on the current cell.
    PlaceDevice,
}

impl Decision {
    /// Converts the decision into the command it stands for, if any.
    #[must_use]
    pub const fn into_command(self, actor: ActorId) -> Option<Command> {
        match self {
            Self::Wait => None,
            Self::Move(direction) => Some(Command::MoveActor { actor, direction }),
            Self::PlaceDevice => Some(Command::PlaceDevice { actor }),
        }
    }
}

/// Decision state for one computer-controlled actor.
#[derive(Debug)]
pub struct Agent {
    actor: ActorId,
    config: AgentConfig,
    fuse_ticks: u32,
    rng: ChaCha8Rng,
    now: u64,
    last_decision: Option<u64>,
    riding_device: Option<CellCoord>,
}

impl Agent {
    /// Creates an agent for `actor` whose randomness derives from `seed`.
    ///
    /// `fuse_ticks` is the countdown a freshly placed device starts with.
    #[must_use]
    pub fn new(actor: ActorId, config: AgentConfig, fuse_ticks: u32, seed: u64) -> Self {
        Self {
            actor,
            config,
            fuse_ticks,
            rng: ChaCha8Rng::seed_from_u64(seed),
            now: 0,
            last_decision: None,
            riding_device: None,
        }
    }

    /// Actor the agent controls.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Cell of the device the agent just placed and still needs to leave.
    #[must_use]
    pub const fn riding_device(&self) -> Option<CellCoord> {
        self.riding_device
    }

    /// Consumes world events and immutable views to emit at most one command.
    pub fn handle(
        &mut self,
        events: &[Event],
        oracle: &SafetyOracle<'_>,
        actors: &ActorView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::TimeAdvanced { tick } => self.now = *tick,
                Event::ArenaReset => {
                    self.last_decision = None;
                    self.riding_device = None;
                }
                _ => {}
            }
        }

        if let Some(command) = self.decide(self.now, oracle, actors).into_command(self.actor) {
            out.push(command);
        }
    }

    /// Evaluates the decision rules at tick `now`.
    ///
    /// Calls arriving before the decision interval elapsed return
    /// [`Decision::Wait`] without touching any state.
    pub fn decide(&mut self, now: u64, oracle: &SafetyOracle<'_>, actors: &ActorView) -> Decision {
        if let Some(last) = self.last_decision {
            if now.saturating_sub(last) < self.config.decision_interval_ticks {
                return Decision::Wait;
            }
        }
        let Some(me) = actors.get(self.actor).filter(|actor| !actor.eliminated).copied() else {
            return Decision::Wait;
        };
        self.last_decision = Some(now);

        let decision = self.evaluate(&me, oracle, actors);
        debug!("actor {} decided {decision:?} at tick {now}", self.actor.get());
        decision
    }

    fn evaluate(
        &mut self,
        me: &ActorSnapshot,
        oracle: &SafetyOracle<'_>,
        actors: &ActorView,
    ) -> Decision {
        if let Some(device_cell) = self.riding_device.take() {
            if me.cell == device_cell && oracle.is_device_at(device_cell) {
                let escape = oracle.find_escape(me.cell, Some(device_cell), &mut self.rng);
                if let Some(direction) = escape {
                    return Decision::Move(direction);
                }
            }
        }

        if oracle.is_danger_now(me.cell) {
            if let Some(direction) = oracle.find_escape(me.cell, None, &mut self.rng) {
                return Decision::Move(direction);
            }
        }

        if me.ready_to_place
            && self.rng.gen::<f32>() < self.config.offense_probability
            && self.can_place_device_safely(me, oracle, actors)
        {
            self.riding_device = Some(me.cell);
            return Decision::PlaceDevice;
        }

        self.position(me, oracle, actors)
    }

    /// The simulated device carries a full fuse and is never imminent, so the
    /// escape check only asks for a walkable neighbour that is safe right now.
    fn can_place_device_safely(
        &mut self,
        me: &ActorSnapshot,
        oracle: &SafetyOracle<'_>,
        actors: &ActorView,
    ) -> bool {
        if oracle.is_device_at(me.cell) || oracle.is_danger_now(me.cell) {
            return false;
        }

        let simulated = oracle.with_hypothetical_device(DeviceSnapshot {
            id: DeviceId::new(u32::MAX),
            owner: Some(self.actor),
            cell: me.cell,
            ticks_remaining: self.fuse_ticks,
            blast_radius: me.blast_radius,
        });
        if simulated.escape_candidates(me.cell, Some(me.cell)).is_empty() {
            return false;
        }

        wall_in_reach(oracle.terrain(), me.cell, me.blast_radius)
            || (self.rng.gen::<f32>() < self.config.hunt_probability
                && self.opponent_in_reach(me, actors))
    }

    fn opponent_in_reach(&self, me: &ActorSnapshot, actors: &ActorView) -> bool {
        let window = self.config.hunt_min_distance..=self.config.hunt_max_distance;
        actors
            .active()
            .filter(|actor| actor.id != me.id)
            .any(|actor| {
                window.contains(&me.cell.manhattan_distance(actor.cell))
                    && me.cell.shares_axis_within(actor.cell, me.blast_radius)
            })
    }

    fn position(
        &mut self,
        me: &ActorSnapshot,
        oracle: &SafetyOracle<'_>,
        actors: &ActorView,
    ) -> Decision {
        let moves = oracle.escape_candidates(me.cell, None);
        if moves.is_empty() {
            return Decision::Wait;
        }

        let nearest = actors
            .active()
            .filter(|actor| actor.id != me.id)
            .min_by_key(|actor| (me.cell.manhattan_distance(actor.cell), actor.id));
        if let Some(opponent) = nearest {
            if self.rng.gen::<f32>() < self.config.bias_probability {
                let terrain = oracle.terrain();
                let distance_after = |direction: Direction| {
                    terrain
                        .neighbor(me.cell, direction)
                        .map_or(u32::MAX, |cell| cell.manhattan_distance(opponent.cell))
                };
                let distance = me.cell.manhattan_distance(opponent.cell);
                // min_by_key keeps the first of equal keys, so ties follow scan order.
                let steered = if distance <= self.config.near_distance {
                    moves
                        .iter()
                        .copied()
                        .min_by_key(|direction| Reverse(distance_after(*direction)))
                } else if distance > self.config.far_distance {
                    moves
                        .iter()
                        .copied()
                        .min_by_key(|direction| distance_after(*direction))
                } else {
                    None
                };
                if let Some(direction) = steered {
                    return Decision::Move(direction);
                }
            }
        }

        moves
            .choose(&mut self.rng)
            .copied()
            .map_or(Decision::Wait, Decision::Move)
    }
}

/// Reports whether a blast from `origin` would reach a destructible wall.
fn wall_in_reach(terrain: TerrainView<'_>, origin: CellCoord, radius: u32) -> bool {
    Direction::ALL.into_iter().any(|direction| {
        let mut cursor = origin;
        for _ in 0..radius {
            let Some(next) = terrain.neighbor(cursor, direction) else {
                return false;
            };
            if terrain.is_destructible(next) {
                return true;
            }
            if !terrain.is_open(next) {
                return false;
            }
            cursor = next;
        }
        false
    })
}

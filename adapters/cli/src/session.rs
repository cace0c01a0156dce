use std::fmt;

use anyhow::Result;
use blast_arena_core::{ActorId, ActorSnapshot, Command, Event};
use blast_arena_system_agent::Agent;
use blast_arena_system_safety::{SafetyConfig, SafetyOracle};
use blast_arena_world::{self as world, query, World};
use log::info;

use crate::settings::Settings;

/// Headless match driven entirely by agents.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    agents: Vec<Agent>,
    safety: SafetyConfig,
    events: Vec<Event>,
}

impl Session {
    /// Builds the world, from `level` text when given, and one agent per actor.
    pub(crate) fn new(settings: &Settings, level: Option<&str>, seed: u64) -> Result<Self> {
        let world = match level {
            Some(text) => World::from_level_text(settings.arena.clone(), text, seed)?,
            None => World::new(settings.arena.clone(), seed)?,
        };
        let fuse_ticks = query::config(&world).fuse_ticks;
        let agents = query::actor_view(&world)
            .iter()
            .map(|actor| {
                Agent::new(
                    actor.id,
                    settings.agent.clone(),
                    fuse_ticks,
                    seed.wrapping_add(u64::from(actor.id.get()) + 1),
                )
            })
            .collect();

        Ok(Self {
            world,
            agents,
            safety: settings.safety,
            events: Vec::new(),
        })
    }

    /// Advances the match until it concludes or `max_ticks` elapse.
    pub(crate) fn run(&mut self, max_ticks: u64) -> MatchSummary {
        let mut summary = MatchSummary::default();
        while summary.ticks < max_ticks && summary.winner.is_none() {
            self.step();
            summary.record(&self.events);
        }
        summary.actors = query::actor_view(&self.world).into_vec();
        info!(
            "match finished after {} ticks with {} detonations",
            summary.ticks, summary.detonations
        );
        summary
    }

    fn step(&mut self) {
        let mut commands = Vec::new();
        {
            let devices = query::device_view(&self.world);
            let blasts = query::blast_view(&self.world);
            let actors = query::actor_view(&self.world);
            let oracle = SafetyOracle::new(
                query::terrain_view(&self.world),
                &devices,
                &blasts,
                self.safety,
            );
            for agent in &mut self.agents {
                agent.handle(&self.events, &oracle, &actors, &mut commands);
            }
        }

        self.events.clear();
        for command in commands {
            world::apply(&mut self.world, command, &mut self.events);
        }
        world::apply(&mut self.world, Command::Tick, &mut self.events);
    }
}

/// Tally of what happened during a headless match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MatchSummary {
    ticks: u64,
    winner: Option<Option<ActorId>>,
    detonations: u32,
    walls_destroyed: u32,
    collectibles_collected: u32,
    actors: Vec<ActorSnapshot>,
}

impl MatchSummary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { tick } => self.ticks = *tick,
                Event::DeviceDetonated { .. } => self.detonations += 1,
                Event::WallDestroyed { .. } => self.walls_destroyed += 1,
                Event::CollectibleCollected { .. } => self.collectibles_collected += 1,
                Event::MatchConcluded { winner } => self.winner = Some(*winner),
                _ => {}
            }
        }
    }
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks played: {}", self.ticks)?;
        match self.winner {
            Some(Some(actor)) => writeln!(f, "winner: actor {}", actor.get())?,
            Some(None) => writeln!(f, "winner: none, every actor was eliminated")?,
            None => writeln!(f, "winner: undecided")?,
        }
        writeln!(f, "detonations: {}", self.detonations)?;
        writeln!(f, "walls destroyed: {}", self.walls_destroyed)?;
        writeln!(f, "collectibles collected: {}", self.collectibles_collected)?;
        for actor in &self.actors {
            writeln!(
                f,
                "actor {} at ({}, {}): lives {}, radius {}{}",
                actor.id.get(),
                actor.cell.column(),
                actor.cell.row(),
                actor.lives,
                actor.blast_radius,
                if actor.eliminated { ", eliminated" } else { "" }
            )?;
        }
        Ok(())
    }
}

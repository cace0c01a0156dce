use blast_arena_core::{
    ActorId, ActorSnapshot, ActorView, ArenaConfig, BlastView, CellCoord, CellKind, Command,
    DeviceId, DeviceSnapshot, DeviceView, Direction, Event,
};
use blast_arena_system_agent::{Agent, AgentConfig, Decision};
use blast_arena_system_safety::{SafetyConfig, SafetyOracle};
use blast_arena_world::{self as world, query, Level, Terrain, World};

fn actor(id: u32, column: u32, row: u32) -> ActorSnapshot {
    ActorSnapshot {
        id: ActorId::new(id),
        cell: CellCoord::new(column, row),
        lives: 3,
        blast_radius: 2,
        grace_ticks: 0,
        ready_to_place: true,
        eliminated: false,
    }
}

fn passive() -> AgentConfig {
    AgentConfig {
        offense_probability: 0.0,
        bias_probability: 0.0,
        ..AgentConfig::default()
    }
}

fn steering() -> AgentConfig {
    AgentConfig {
        offense_probability: 0.0,
        bias_probability: 1.0,
        ..AgentConfig::default()
    }
}

fn decide_on(
    agent: &mut Agent,
    terrain: &Terrain,
    devices: &DeviceView,
    actors: &ActorView,
    now: u64,
) -> Decision {
    let blasts = BlastView::default();
    let oracle = SafetyOracle::new(terrain.view(), devices, &blasts, SafetyConfig::default());
    agent.decide(now, &oracle, actors)
}

fn decide_in_world(agent: &mut Agent, world: &World, now: u64) -> Decision {
    let devices = query::device_view(world);
    let blasts = query::blast_view(world);
    let oracle = SafetyOracle::new(
        query::terrain_view(world),
        &devices,
        &blasts,
        SafetyConfig::default(),
    );
    agent.decide(now, &oracle, &query::actor_view(world))
}

#[test]
fn leaves_own_device_through_its_only_exit() {
    let level = Level::new(
        Terrain::bordered(9, 9).with_cell(CellCoord::new(1, 2), CellKind::DestructibleWall),
        vec![CellCoord::new(1, 1), CellCoord::new(7, 7)],
    );
    let arena = ArenaConfig::default();
    let mut world = World::from_level(arena.clone(), level, 5).expect("valid");
    let config = AgentConfig {
        offense_probability: 1.0,
        ..AgentConfig::default()
    };
    let mut agent = Agent::new(ActorId::new(0), config, arena.fuse_ticks, 21);

    assert_eq!(decide_in_world(&mut agent, &world, 0), Decision::PlaceDevice);
    assert_eq!(agent.riding_device(), Some(CellCoord::new(1, 1)));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceDevice {
            actor: ActorId::new(0),
        },
        &mut events,
    );
    assert!(matches!(events.as_slice(), [Event::DevicePlaced { .. }]));

    assert_eq!(decide_in_world(&mut agent, &world, 5), Decision::Wait);
    assert_eq!(
        decide_in_world(&mut agent, &world, 15),
        Decision::Move(Direction::Right)
    );
    assert_eq!(agent.riding_device(), None);
}

#[test]
fn rescue_move_is_uniform_rather_than_distance_biased() {
    let config = AgentConfig {
        offense_probability: 1.0,
        bias_probability: 1.0,
        ..AgentConfig::default()
    };
    let arena = ArenaConfig::default();
    let mut chosen = Vec::new();

    for seed in 0..32 {
        let level = Level::new(
            Terrain::bordered(9, 9).with_cell(CellCoord::new(4, 5), CellKind::DestructibleWall),
            vec![CellCoord::new(4, 4), CellCoord::new(7, 7)],
        );
        let mut world = World::from_level(arena.clone(), level, seed).expect("valid");
        let mut agent = Agent::new(ActorId::new(0), config.clone(), arena.fuse_ticks, seed);

        assert_eq!(decide_in_world(&mut agent, &world, 0), Decision::PlaceDevice);
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::PlaceDevice {
                actor: ActorId::new(0),
            },
            &mut events,
        );

        match decide_in_world(&mut agent, &world, 15) {
            Decision::Move(direction) => chosen.push(direction),
            other => panic!("seed {seed} did not flee its device: {other:?}"),
        }
    }

    assert!(chosen
        .iter()
        .all(|direction| matches!(direction, Direction::Left | Direction::Right | Direction::Up)));
    // Steering toward the opponent at (7, 7) would always pick Right.
    assert!(chosen.iter().any(|direction| *direction != Direction::Right));
}

fn offensive() -> AgentConfig {
    AgentConfig {
        offense_probability: 1.0,
        hunt_probability: 1.0,
        bias_probability: 0.0,
        ..AgentConfig::default()
    }
}

fn imminent(id: u32, column: u32, row: u32) -> DeviceSnapshot {
    DeviceSnapshot {
        id: DeviceId::new(id),
        owner: Some(ActorId::new(1)),
        cell: CellCoord::new(column, row),
        ticks_remaining: 30,
        blast_radius: 2,
    }
}

#[test]
fn does_not_place_on_a_dangerous_cell() {
    let terrain = Terrain::bordered(9, 9)
        .with_cell(CellCoord::new(2, 1), CellKind::DestructibleWall)
        .with_cell(CellCoord::new(1, 2), CellKind::DestructibleWall);
    let devices = DeviceView::from_snapshots(vec![imminent(0, 1, 3)]);
    let actors = ActorView::from_snapshots(vec![actor(0, 1, 1), actor(1, 7, 7)]);

    for seed in 0..8 {
        let mut agent = Agent::new(ActorId::new(0), offensive(), 120, seed);
        assert_eq!(
            decide_on(&mut agent, &terrain, &devices, &actors, 0),
            Decision::Wait
        );
    }
}

#[test]
fn does_not_stack_a_device_on_an_occupied_cell() {
    let terrain =
        Terrain::bordered(9, 9).with_cell(CellCoord::new(4, 5), CellKind::DestructibleWall);
    let devices = DeviceView::from_snapshots(vec![DeviceSnapshot {
        ticks_remaining: 120,
        ..imminent(0, 4, 4)
    }]);
    let actors = ActorView::from_snapshots(vec![actor(0, 4, 4), actor(1, 7, 7)]);

    for seed in 0..8 {
        let mut agent = Agent::new(ActorId::new(0), offensive(), 120, seed);
        let decision = decide_on(&mut agent, &terrain, &devices, &actors, 0);
        assert!(matches!(decision, Decision::Move(_)), "seed {seed}: {decision:?}");
    }
}

#[test]
fn does_not_place_without_a_safe_exit() {
    let terrain =
        Terrain::bordered(9, 9).with_cell(CellCoord::new(4, 6), CellKind::DestructibleWall);
    // Every neighbour of (4, 4) lies on an axis of an imminent device; (4, 4) does not.
    let devices = DeviceView::from_snapshots(vec![
        imminent(0, 3, 6),
        imminent(1, 5, 2),
        imminent(2, 6, 3),
        imminent(3, 2, 5),
    ]);
    let actors = ActorView::from_snapshots(vec![actor(0, 4, 4), actor(1, 7, 7)]);

    for seed in 0..8 {
        let mut agent = Agent::new(ActorId::new(0), offensive(), 120, seed);
        assert_eq!(
            decide_on(&mut agent, &terrain, &devices, &actors, 0),
            Decision::Wait
        );
    }
}

#[test]
fn does_not_place_without_a_target_in_reach() {
    let terrain = Terrain::bordered(9, 9);
    let actors = ActorView::from_snapshots(vec![actor(0, 4, 4), actor(1, 7, 7)]);

    for seed in 0..8 {
        let mut agent = Agent::new(ActorId::new(0), offensive(), 120, seed);
        let decision = decide_on(&mut agent, &terrain, &DeviceView::default(), &actors, 0);
        assert!(matches!(decision, Decision::Move(_)), "seed {seed}: {decision:?}");
    }
}

#[test]
fn hunts_lined_up_opponent_without_walls_in_reach() {
    let terrain = Terrain::bordered(9, 9);
    let actors = ActorView::from_snapshots(vec![actor(0, 4, 4), actor(1, 4, 6)]);

    let mut hunter = Agent::new(ActorId::new(0), offensive(), 120, 9);
    assert_eq!(
        decide_on(&mut hunter, &terrain, &DeviceView::default(), &actors, 0),
        Decision::PlaceDevice
    );

    let idle = AgentConfig {
        hunt_probability: 0.0,
        ..offensive()
    };
    let mut bystander = Agent::new(ActorId::new(0), idle, 120, 9);
    assert!(matches!(
        decide_on(&mut bystander, &terrain, &DeviceView::default(), &actors, 0),
        Decision::Move(_)
    ));
}

#[test]
fn escapes_imminent_device_instead_of_positioning() {
    let terrain = Terrain::bordered(9, 9);
    let devices = DeviceView::from_snapshots(vec![DeviceSnapshot {
        id: DeviceId::new(0),
        owner: Some(ActorId::new(1)),
        cell: CellCoord::new(2, 3),
        ticks_remaining: 60,
        blast_radius: 2,
    }]);
    let actors = ActorView::from_snapshots(vec![actor(0, 2, 2), actor(1, 6, 6)]);

    for seed in 0..32 {
        let mut agent = Agent::new(ActorId::new(0), passive(), 120, seed);
        let decision = decide_on(&mut agent, &terrain, &devices, &actors, 0);
        assert!(
            matches!(
                decision,
                Decision::Move(Direction::Left | Direction::Right)
            ),
            "seed {seed} chose {decision:?}"
        );
    }
}

#[test]
fn retreats_from_close_opponent() {
    let terrain = Terrain::bordered(9, 9);
    let actors = ActorView::from_snapshots(vec![actor(0, 4, 4), actor(1, 4, 6)]);
    let mut agent = Agent::new(ActorId::new(0), steering(), 120, 1);

    let decision = decide_on(&mut agent, &terrain, &DeviceView::default(), &actors, 0);

    assert_eq!(decision, Decision::Move(Direction::Left));
}

#[test]
fn approaches_distant_opponent() {
    let terrain = Terrain::bordered(9, 9);
    let actors = ActorView::from_snapshots(vec![actor(0, 1, 1), actor(1, 7, 7)]);
    let mut agent = Agent::new(ActorId::new(0), steering(), 120, 1);

    let decision = decide_on(&mut agent, &terrain, &DeviceView::default(), &actors, 0);

    assert_eq!(decision, Decision::Move(Direction::Right));
}

#[test]
fn waits_between_decisions() {
    let terrain = Terrain::bordered(9, 9);
    let actors = ActorView::from_snapshots(vec![actor(0, 4, 4), actor(1, 4, 7)]);
    let mut agent = Agent::new(ActorId::new(0), passive(), 120, 3);
    let devices = DeviceView::default();

    assert!(matches!(
        decide_on(&mut agent, &terrain, &devices, &actors, 100),
        Decision::Move(_)
    ));
    assert_eq!(
        decide_on(&mut agent, &terrain, &devices, &actors, 114),
        Decision::Wait
    );
    assert!(matches!(
        decide_on(&mut agent, &terrain, &devices, &actors, 115),
        Decision::Move(_)
    ));
}

#[test]
fn boxed_in_or_eliminated_agent_waits() {
    let terrain = Terrain::bordered(9, 9)
        .with_cell(CellCoord::new(2, 1), CellKind::DestructibleWall)
        .with_cell(CellCoord::new(1, 2), CellKind::DestructibleWall);
    let actors = ActorView::from_snapshots(vec![actor(0, 1, 1), actor(1, 7, 7)]);
    let mut boxed = Agent::new(ActorId::new(0), passive(), 120, 4);

    assert_eq!(
        decide_on(&mut boxed, &terrain, &DeviceView::default(), &actors, 0),
        Decision::Wait
    );

    let open = Terrain::bordered(9, 9);
    let eliminated = ActorSnapshot {
        eliminated: true,
        ..actor(0, 4, 4)
    };
    let actors = ActorView::from_snapshots(vec![eliminated, actor(1, 7, 7)]);
    let mut agent = Agent::new(ActorId::new(0), passive(), 120, 4);

    assert_eq!(
        decide_on(&mut agent, &open, &DeviceView::default(), &actors, 0),
        Decision::Wait
    );
}

#[test]
fn agent_driven_match_replays_identically() {
    let first = play(17, 3_000);
    let second = play(17, 3_000);

    assert!(!first.is_empty());
    assert_eq!(first, second, "agent-driven replay diverged");
}

fn play(seed: u64, ticks: u32) -> Vec<Event> {
    let arena = ArenaConfig::default();
    let mut world = World::new(arena.clone(), seed).expect("valid");
    let mut agents: Vec<Agent> = (0..arena.actor_count)
        .map(|id| {
            Agent::new(
                ActorId::new(id),
                AgentConfig::default(),
                arena.fuse_ticks,
                seed.wrapping_add(u64::from(id) + 1),
            )
        })
        .collect();
    let mut log = Vec::new();
    let mut events = Vec::new();

    for _ in 0..ticks {
        let mut commands = Vec::new();
        {
            let devices = query::device_view(&world);
            let blasts = query::blast_view(&world);
            let actors = query::actor_view(&world);
            let oracle = SafetyOracle::new(
                query::terrain_view(&world),
                &devices,
                &blasts,
                SafetyConfig::default(),
            );
            for agent in &mut agents {
                agent.handle(&events, &oracle, &actors, &mut commands);
            }
        }

        events.clear();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        world::apply(&mut world, Command::Tick, &mut events);
        log.extend(events.iter().cloned());

        if query::is_concluded(&world) {
            break;
        }
    }

    log
}

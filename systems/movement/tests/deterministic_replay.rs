use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tallgrass_core::{
    CharacterId, Command, Direction, Event, KeyState, Position, Rect, BOUNDARY_TILE_ID,
};
use tallgrass_system_movement::Movement;
use tallgrass_world::{self as world, query, MapLayout, World, WorldConfig};

#[test]
fn deterministic_replay_produces_expected_snapshot() {
    let first = replay(scripted_input());
    let second = replay(scripted_input());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first.scrolls > 0, "script never moved the player");
    assert!(first.blocked > 0, "script never hit a boundary");
}

#[derive(Clone, Copy, Debug)]
enum Input {
    Press(Direction),
    Release(Direction),
    Sprint(bool),
    Jump,
    Wait(u32),
}

fn scripted_input() -> Vec<Input> {
    vec![
        Input::Press(Direction::Left),
        Input::Wait(20),
        Input::Sprint(true),
        Input::Press(Direction::Up),
        Input::Wait(40),
        Input::Jump,
        Input::Release(Direction::Up),
        Input::Wait(12),
        Input::Sprint(false),
        Input::Press(Direction::Down),
        Input::Wait(30),
        Input::Release(Direction::Down),
        Input::Release(Direction::Left),
        Input::Wait(5),
    ]
}

fn build_world() -> World {
    let columns = 40;
    let rows = 24;
    let mut collisions = vec![0; columns * rows];
    for column in 0..columns {
        collisions[column] = BOUNDARY_TILE_ID;
        collisions[(rows - 1) * columns + column] = BOUNDARY_TILE_ID;
    }
    let layout = MapLayout {
        columns: columns as u32,
        offset: Position::new(-300.0, 150.0),
        collisions,
        ..MapLayout::default()
    };
    World::new(
        &layout,
        Vec::new(),
        WorldConfig::default(),
        &mut ChaCha8Rng::seed_from_u64(0x7a11),
    )
    .expect("world builds")
}

fn replay(script: Vec<Input>) -> ReplayOutcome {
    let mut world = build_world();
    let movement = Movement::default();
    let mut keys = KeyState::new();
    let mut log = Vec::new();
    let mut scrolls = 0;
    let mut blocked = 0;

    for input in script {
        let frames = match input {
            Input::Press(direction) => {
                keys.press(direction);
                0
            }
            Input::Release(direction) => {
                keys.release(direction);
                0
            }
            Input::Sprint(sprint) => {
                keys.set_sprint(sprint);
                0
            }
            Input::Jump => {
                let mut events = Vec::new();
                world::apply(&mut world, Command::Interact, &mut events);
                record(&events, &mut log);
                0
            }
            Input::Wait(frames) => frames,
        };

        for _ in 0..frames {
            let mut events = Vec::new();
            world::apply(&mut world, Command::Tick, &mut events);

            let mut commands = Vec::new();
            let player = query::player(&world).bounds;
            movement.handle(
                &keys,
                &player,
                query::boundaries(&world),
                Vec::<(CharacterId, Rect)>::new(),
                &mut commands,
            );
            let wants_scroll = keys.active_direction().is_some();
            for command in commands {
                world::apply(&mut world, command, &mut events);
            }

            let scrolled = events
                .iter()
                .any(|event| matches!(event, Event::WorldScrolled { .. }));
            if scrolled {
                scrolls += 1;
            } else if wants_scroll {
                blocked += 1;
            }
            record(&events, &mut log);
        }
    }

    ReplayOutcome {
        background: query::map_bounds(&world).position,
        events: log,
        scrolls,
        blocked,
    }
}

fn record(events: &[Event], log: &mut Vec<String>) {
    for event in events {
        if matches!(event, Event::TimeAdvanced { .. }) {
            continue;
        }
        log.push(format!("{event:?}"));
    }
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    background: Position,
    events: Vec<String>,
    scrolls: u32,
    blocked: u32,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.background.x.to_bits().hash(&mut hasher);
        self.background.y.to_bits().hash(&mut hasher);
        self.events.hash(&mut hasher);
        self.scrolls.hash(&mut hasher);
        self.blocked.hash(&mut hasher);
        hasher.finish()
    }
}

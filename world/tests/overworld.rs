use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tallgrass_core::{
    CharacterId, CollectibleId, Command, Event, Position, SpriteKey, Tint, VILLAGER_TILE_ID,
};
use tallgrass_world::{
    self as world, query, query::Renderable, CollectibleSpec, MapLayout, World, WorldConfig,
};

const COLUMNS: u32 = 20;
const ROWS: u32 = 12;

fn layout() -> MapLayout {
    let mut characters = vec![0; (COLUMNS * ROWS) as usize];
    characters[(2 * COLUMNS + 2) as usize] = VILLAGER_TILE_ID;
    MapLayout {
        columns: COLUMNS,
        offset: Position::new(0.0, 0.0),
        collisions: vec![0; (COLUMNS * ROWS) as usize],
        battle_zones: vec![0; (COLUMNS * ROWS) as usize],
        characters,
        ..MapLayout::default()
    }
}

fn relic_under_player() -> CollectibleSpec {
    CollectibleSpec {
        id: CollectibleId::new("ancient-orb"),
        name: "Ancient Orb".to_owned(),
        description: "Emits a faint hum.".to_owned(),
        tile: (10, 6),
        size: 26.0,
        tint: Tint::from_rgb(0xa9, 0x87, 0xff),
    }
}

fn build() -> World {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    World::new(
        &layout(),
        vec![relic_under_player()],
        WorldConfig::default(),
        &mut rng,
    )
    .expect("world builds")
}

fn villager(world: &World) -> CharacterId {
    query::characters(world).next().expect("villager").id
}

#[test]
fn collecting_twice_reports_once() {
    let mut world = build();
    let id = CollectibleId::new("ancient-orb");
    let mut events = Vec::new();

    world::apply(&mut world, Command::Collect { collectible: id.clone() }, &mut events);
    world::apply(&mut world, Command::Collect { collectible: id.clone() }, &mut events);

    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        Event::CollectibleCollected { name, .. } if name == "Ancient Orb"
    ));
    assert_eq!(query::is_collected(&world, &id), Some(true));
}

#[test]
fn collected_pickups_leave_collision_checks() {
    let mut world = build();
    let player = query::player(&world).bounds;
    let touching = query::touching_collectibles(&world, &player);
    assert_eq!(touching, vec![CollectibleId::new("ancient-orb")]);

    let mut events = Vec::new();
    for collectible in touching {
        world::apply(&mut world, Command::Collect { collectible }, &mut events);
    }

    assert!(query::touching_collectibles(&world, &player).is_empty());
    assert!(!query::render_list(&world)
        .iter()
        .any(|entry| matches!(entry, Renderable::Collectible { .. })));
}

#[test]
fn hydration_marks_known_ids_only() {
    let mut world = build();
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::HydrateCollected {
            collectibles: vec![CollectibleId::new("ancient-orb"), CollectibleId::new("unknown")],
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::CollectionHydrated {
            collectibles: vec![CollectibleId::new("ancient-orb")],
        }]
    );

    events.clear();
    world::apply(
        &mut world,
        Command::Collect {
            collectible: CollectibleId::new("ancient-orb"),
        },
        &mut events,
    );
    assert!(events.is_empty());
}

#[test]
fn scrolling_shifts_every_movable_but_not_the_player() {
    let mut world = build();
    let before = query::movable_positions(&world);
    let player = query::player(&world).bounds;
    let delta = Position::new(-4.8, 3.0);
    let mut events = Vec::new();

    world::apply(&mut world, Command::ScrollWorld { delta }, &mut events);

    let after = query::movable_positions(&world);
    assert_eq!(before.len(), after.len());
    for (old, new) in before.iter().zip(after.iter()) {
        assert_eq!(old.offset(delta), *new);
    }
    assert_eq!(query::player(&world).bounds, player);
    assert_eq!(events, vec![Event::WorldScrolled { delta }]);
}

#[test]
fn villager_dialogue_walks_every_line() {
    let mut world = build();
    let villager = villager(&world);
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::SetInteractionTarget {
            character: Some(villager),
        },
        &mut events,
    );
    world::apply(&mut world, Command::Interact, &mut events);
    world::apply(&mut world, Command::Interact, &mut events);
    world::apply(&mut world, Command::Interact, &mut events);

    assert_eq!(
        events,
        vec![
            Event::InteractionTargetChanged {
                character: Some(villager)
            },
            Event::DialogueLine {
                character: villager,
                text: "...".to_owned(),
            },
            Event::DialogueLine {
                character: villager,
                text: "Hey mister, have you seen my Doggochu?".to_owned(),
            },
            Event::DialogueFinished {
                character: villager
            },
        ]
    );
    assert!(!query::player(&world).is_interacting);
    assert!(!query::is_marketplace_open(&world));
    let view = query::character(&world, villager).expect("villager view");
    assert_eq!(view.dialogue_index, 0);
}

#[test]
fn interaction_target_is_locked_while_talking() {
    let mut world = build();
    let villager = villager(&world);
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::SetInteractionTarget {
            character: Some(villager),
        },
        &mut events,
    );
    world::apply(&mut world, Command::Interact, &mut events);
    world::apply(
        &mut world,
        Command::SetInteractionTarget { character: None },
        &mut events,
    );

    assert_eq!(query::player(&world).interaction_target, Some(villager));
    assert!(!query::player(&world).is_jumping);
}

#[test]
fn render_list_composes_back_to_front() {
    let world = build();
    let list = query::render_list(&world);

    assert!(matches!(
        list.first(),
        Some(Renderable::Backdrop {
            sprite: SpriteKey::Background,
            ..
        })
    ));
    assert!(matches!(
        list.last(),
        Some(Renderable::Backdrop {
            sprite: SpriteKey::Foreground,
            ..
        })
    ));
    assert!(matches!(
        list[list.len() - 2],
        Renderable::Player {
            sprite: SpriteKey::PlayerDown,
            ..
        }
    ));

    let character_at = list
        .iter()
        .position(|entry| matches!(entry, Renderable::Character { .. }))
        .expect("character drawn");
    let boundary_at = list
        .iter()
        .position(|entry| matches!(entry, Renderable::Boundary { .. }))
        .expect("villager tile blocks");
    assert!(boundary_at < character_at);
}

#[test]
fn glowing_points_are_reproducible_per_seed() {
    let first = build();
    let second = build();
    assert_eq!(query::glowing_points(&first), query::glowing_points(&second));

    let map = query::map_bounds(&first);
    for point in query::glowing_points(&first) {
        assert!(point.bounds.left() >= map.left() + 48.0);
        assert!(point.bounds.top() >= map.top() + 48.0);
        assert!(!point.collected);
        assert_eq!(point.points, 100);
    }
}

#[test]
fn claiming_a_glowing_point_is_idempotent() {
    let mut world = build();
    let Some(point) = query::glowing_points(&world).first().map(|point| point.id) else {
        return;
    };
    let mut events = Vec::new();

    world::apply(&mut world, Command::ClaimGlowingPoint { point }, &mut events);
    world::apply(&mut world, Command::ClaimGlowingPoint { point }, &mut events);

    assert_eq!(events, vec![Event::GlowingPointCollected { point, points: 100 }]);
}

//! Frame driver owning the world, the battle session and the collaborators.
//!
//! Each frame routes input into commands, advances the overworld or the
//! battle, and forwards the resulting events to the profile and the scene.

use glam::Vec2;
use rand::Rng;
use tallgrass_core::{
    BonusProvider, CollectionStore, Command, DialoguePresenter, Event, Inventory, InventoryItem,
    KeyState, Position, Rect, RewardSink, SpriteKey, MAX_HEALTH, POINTS_PER_COLLECTIBLE,
};
use tallgrass_rendering::{
    AttackButton, AttackMenuLayout, AttackTypeLabel, BattleHud, CanvasPresentation, Color,
    FrameInput, HealthBar, Scene, SceneItem, SceneMode, SpriteInstance,
};
use tallgrass_system_battle::{BattleConfig, BattleEvent, BattlePhase, BattleSession, Monster};
use tallgrass_system_encounter::{Encounter, EncounterConfig};
use tallgrass_system_movement::{Movement, MovementConfig};
use tallgrass_world::{
    query::{self, Renderable},
    CollectibleSpec, World,
};
use tracing::{debug, info, trace};

use crate::profile::LocalProfile;

const LOOT_NOTICE_FRAMES: u32 = 180;
const MONSTER_FRAMES: u32 = 4;
const MONSTER_HOLD: u64 = 30;
const GLOW: Color = Color::new(1.0, 0.93, 0.55, 1.0);

/// Tunables of the systems driven every frame.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SimulationConfig {
    pub(crate) movement: MovementConfig,
    pub(crate) encounter: EncounterConfig,
    pub(crate) battle: BattleConfig,
    pub(crate) canvas: CanvasPresentation,
}

/// Explicit state bundle advanced once per rendered frame.
pub(crate) struct Simulation<R> {
    world: World,
    profile: LocalProfile,
    rng: R,
    keys: KeyState,
    movement: Movement,
    encounter: Encounter,
    battle: BattleSession,
    menu: AttackMenuLayout,
    specs: Vec<CollectibleSpec>,
    commands: Vec<Command>,
    events: Vec<Event>,
    battle_events: Vec<BattleEvent>,
    loot_notice_frames: u32,
    battle_frames: u64,
}

impl<R: Rng> Simulation<R> {
    /// Wires the systems around an already built world.
    pub(crate) fn new(
        world: World,
        profile: LocalProfile,
        rng: R,
        specs: Vec<CollectibleSpec>,
        config: SimulationConfig,
    ) -> Self {
        Self {
            world,
            profile,
            rng,
            keys: KeyState::new(),
            movement: Movement::new(config.movement),
            encounter: Encounter::new(config.encounter),
            battle: BattleSession::new(config.battle),
            menu: AttackMenuLayout::for_canvas(&config.canvas),
            specs,
            commands: Vec::new(),
            events: Vec::new(),
            battle_events: Vec::new(),
            loot_notice_frames: 0,
            battle_frames: 0,
        }
    }

    /// Marks pickups collected in earlier sessions and seeds the inventory.
    pub(crate) fn hydrate(&mut self, scene: &mut Scene) {
        let collectibles = self.profile.collected_ids();
        self.apply(Command::HydrateCollected { collectibles }, scene);
        scene.points = self.profile.points();
    }

    /// Advances one frame.
    pub(crate) fn step(&mut self, input: FrameInput, scene: &mut Scene) {
        self.handle_input(&input, scene);

        if matches!(
            self.battle.phase(),
            BattlePhase::Engaging { .. } | BattlePhase::Resolving { .. }
        ) {
            let bonuses = self.profile.bonuses();
            self.battle.tick(&bonuses, &mut self.battle_events);
        }

        match self.battle.phase() {
            BattlePhase::Active | BattlePhase::Resolving { .. } => self.battle_frame(scene),
            BattlePhase::Engaging { .. } => self.engaging_frame(scene),
            BattlePhase::Idle => self.overworld_frame(scene),
        }

        self.route_battle_events(scene);
        self.finish_frame(scene);
    }

    fn handle_input(&mut self, input: &FrameInput, scene: &mut Scene) {
        for direction in &input.released {
            self.keys.release(*direction);
        }
        self.keys.set_sprint(input.sprint);

        if self.battle.is_running() {
            self.handle_battle_input(input);
            return;
        }

        if query::is_marketplace_open(&self.world) {
            if input.close_overlay {
                self.apply(Command::CloseMarketplace, scene);
            }
            return;
        }

        if query::player(&self.world).is_interacting {
            if input.interact {
                self.apply(Command::Interact, scene);
            }
            return;
        }

        for direction in &input.pressed {
            self.keys.press(*direction);
        }
        if input.interact {
            self.apply(Command::Interact, scene);
        }
    }

    fn handle_battle_input(&mut self, input: &FrameInput) {
        let attack_count = self
            .battle
            .player()
            .map_or(0, |player| player.attacks().len());
        let hovered = input
            .cursor
            .and_then(|cursor| self.menu.button_at(cursor, attack_count));
        self.battle.hover(hovered);

        if !input.click {
            return;
        }
        if self.battle.accepts_attack() {
            if let Some(index) = hovered {
                let bonuses = self.profile.bonuses();
                let _ = self.battle.select_attack(
                    index,
                    &bonuses,
                    &mut self.rng,
                    &mut self.battle_events,
                );
            }
        } else if self.battle.is_dialogue_visible() {
            self.battle.acknowledge(&mut self.battle_events);
        }
    }

    fn overworld_frame(&mut self, scene: &mut Scene) {
        scene.begin_frame(SceneMode::Overworld);
        self.draw_overworld(scene);

        self.apply(Command::Tick, scene);
        self.apply(
            Command::SetPlayerMotion {
                facing: None,
                sprinting: self.keys.sprinting(),
            },
            scene,
        );

        let battle_active = query::is_battle_active(&self.world);
        if !battle_active {
            self.collect_pickups(scene);
        }
        if battle_active || query::is_marketplace_open(&self.world) {
            return;
        }

        let player = query::player(&self.world).bounds;
        let mut commands = std::mem::take(&mut self.commands);
        let triggered = self.encounter.handle(
            &self.keys,
            battle_active,
            &player,
            query::battle_zones(&self.world),
            &mut self.rng,
            &mut commands,
        );
        if !triggered {
            self.movement.handle(
                &self.keys,
                &player,
                query::boundaries(&self.world),
                query::characters(&self.world).map(|character| (character.id, character.bounds)),
                &mut commands,
            );
        }
        for command in commands.drain(..) {
            self.apply(command, scene);
        }
        self.commands = commands;

        if triggered {
            self.battle.engage(&mut self.battle_events);
        }
    }

    /// Frozen overworld under the transition flash; the world is not advanced.
    fn engaging_frame(&self, scene: &mut Scene) {
        scene.begin_frame(SceneMode::Overworld);
        self.draw_overworld(scene);
    }

    fn collect_pickups(&mut self, scene: &mut Scene) {
        let player = query::player(&self.world).bounds;
        for collectible in query::touching_collectibles(&self.world, &player) {
            self.apply(Command::Collect { collectible }, scene);
        }
        if let Some(point) = query::touching_glowing_point(&self.world, &player) {
            self.apply(Command::ClaimGlowingPoint { point }, scene);
        }
    }

    fn draw_overworld(&self, scene: &mut Scene) {
        let map_size = query::map_bounds(&self.world).size;
        for renderable in query::render_list(&self.world) {
            let item = match renderable {
                Renderable::Backdrop { sprite, position } => {
                    SceneItem::Sprite(SpriteInstance {
                        size: Some(Vec2::new(map_size.width, map_size.height)),
                        ..SpriteInstance::still(sprite, to_vec(position))
                    })
                }
                Renderable::Collectible { bounds, tint } => shape(&bounds, tint.into()),
                Renderable::GlowingPoint { bounds } => shape(&bounds, GLOW),
                Renderable::Boundary { .. } | Renderable::BattleZone { .. } => continue,
                Renderable::Character {
                    sprite,
                    bounds,
                    animation,
                } => SceneItem::Sprite(SpriteInstance::sheet(
                    sprite,
                    to_vec(bounds.position),
                    size_of(&bounds),
                    animation.current(),
                    animation.frames(),
                )),
                Renderable::Player {
                    sprite,
                    bounds,
                    animation,
                    lift,
                } => SceneItem::Sprite(SpriteInstance::sheet(
                    sprite,
                    to_vec(bounds.position) - Vec2::new(0.0, lift),
                    size_of(&bounds),
                    animation.current(),
                    animation.frames(),
                )),
            };
            scene.push(item);
        }
    }

    fn battle_frame(&mut self, scene: &mut Scene) {
        scene.begin_frame(SceneMode::Battle);
        self.battle_frames += 1;

        scene.push(SceneItem::Sprite(SpriteInstance::still(
            SpriteKey::BattleBackground,
            Vec2::ZERO,
        )));

        let (Some(player), Some(enemy)) = (self.battle.player(), self.battle.enemy()) else {
            scene.battle = None;
            return;
        };

        let frame = ((self.battle_frames / MONSTER_HOLD) % u64::from(MONSTER_FRAMES)) as u32;
        for monster in [enemy, player] {
            let position = monster.position();
            scene.push(SceneItem::Sprite(SpriteInstance {
                frame,
                frames: MONSTER_FRAMES,
                opacity: if monster.is_fainted() { 0.0 } else { 1.0 },
                ..SpriteInstance::still(monster.sprite(), Vec2::new(position.x, position.y))
            }));
        }

        scene.battle = Some(BattleHud {
            player: health_bar(player),
            enemy: health_bar(enemy),
            attacks: player
                .attacks()
                .iter()
                .map(|attack| AttackButton {
                    name: attack.name.clone(),
                    tint: attack.tint.into(),
                })
                .collect(),
            hovered: self.battle.hovered_attack().map(|attack| AttackTypeLabel {
                text: attack.kind.label().to_owned(),
                color: attack.tint.into(),
            }),
            menu: self.menu,
        });
    }

    fn apply(&mut self, command: Command, scene: &mut Scene) {
        let mut events = std::mem::take(&mut self.events);
        tallgrass_world::apply(&mut self.world, command, &mut events);
        for event in events.drain(..) {
            self.on_world_event(event, scene);
        }
        self.events = events;
    }

    fn on_world_event(&mut self, event: Event, scene: &mut Scene) {
        match event {
            Event::DialogueLine { text, .. } => scene.dialogue.show_line(&text),
            Event::DialogueFinished { character } => {
                debug!(character = character.get(), "dialogue finished");
                scene.dialogue.hide_dialogue();
            }
            Event::MarketplaceOpened => {
                self.keys.reset();
                scene.marketplace_open = true;
                info!("marketplace opened");
            }
            Event::MarketplaceClosed => scene.marketplace_open = false,
            Event::CollectibleCollected {
                collectible,
                name,
                description,
            } => {
                self.profile.award_points(POINTS_PER_COLLECTIBLE);
                self.profile.record_collected(&collectible);
                let notice = format!("Collected {name}!");
                let _ = self.profile.add_item(InventoryItem {
                    id: collectible,
                    name,
                    description,
                });
                self.show_notice(scene, notice);
            }
            Event::GlowingPointCollected { point, points } => {
                debug!(point = point.get(), points, "glowing point claimed");
                self.profile.award_points(points);
                self.show_notice(scene, format!("Glowing point found! +{points} points"));
            }
            Event::CollectionHydrated { collectibles } => {
                for id in collectibles {
                    let Some(spec) = self.specs.iter().find(|spec| spec.id == id) else {
                        continue;
                    };
                    let _ = self.profile.add_item(InventoryItem {
                        id,
                        name: spec.name.clone(),
                        description: spec.description.clone(),
                    });
                }
            }
            Event::BattleModeChanged { active } => debug!(active, "battle mode changed"),
            Event::JumpStarted | Event::JumpLanded => trace!(?event, "jump"),
            Event::TimeAdvanced { .. }
            | Event::WorldScrolled { .. }
            | Event::InteractionTargetChanged { .. } => {}
        }
    }

    fn route_battle_events(&mut self, scene: &mut Scene) {
        let mut events = std::mem::take(&mut self.battle_events);
        for event in events.drain(..) {
            match event {
                BattleEvent::PhaseChanged { phase } => {
                    if phase == BattlePhase::Active {
                        scene.dialogue.hide_dialogue();
                        self.battle_frames = 0;
                    }
                }
                BattleEvent::ShowLine { text } => scene.dialogue.show_line(&text),
                BattleEvent::HideDialogue => scene.dialogue.hide_dialogue(),
                BattleEvent::RewardGranted { points } => self.profile.award_points(points),
                BattleEvent::Ended { outcome } => {
                    scene.dialogue.hide_dialogue();
                    scene.battle = None;
                    self.apply(Command::SetBattleActive { active: false }, scene);
                    info!(?outcome, points = self.profile.points(), "back to the overworld");
                }
                BattleEvent::AttackLanded { .. }
                | BattleEvent::HealthChanged { .. }
                | BattleEvent::Fainted { .. } => trace!(?event, "battle"),
            }
        }
        self.battle_events = events;
    }

    fn show_notice(&mut self, scene: &mut Scene, text: String) {
        scene.loot_notice = Some(text);
        self.loot_notice_frames = LOOT_NOTICE_FRAMES;
    }

    fn finish_frame(&mut self, scene: &mut Scene) {
        scene.transition_alpha = self.battle.transition_alpha();
        scene.points = self.profile.points();
        if self.loot_notice_frames > 0 {
            self.loot_notice_frames -= 1;
            if self.loot_notice_frames == 0 {
                scene.loot_notice = None;
            }
        }
    }
}

fn to_vec(position: Position) -> Vec2 {
    Vec2::new(position.x, position.y)
}

fn size_of(bounds: &Rect) -> Vec2 {
    Vec2::new(bounds.size.width, bounds.size.height)
}

fn shape(bounds: &Rect, color: Color) -> SceneItem {
    SceneItem::Shape {
        position: to_vec(bounds.position),
        size: size_of(bounds),
        color,
    }
}

fn health_bar(monster: &Monster) -> HealthBar {
    HealthBar {
        name: monster.name().to_owned(),
        health: monster.health(),
        max: MAX_HEALTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tallgrass_core::{
        CollectibleId, Direction, MonsterTemplate, Tint, BOUNDARY_TILE_ID,
        POINTS_PER_BATTLE_VICTORY, VENDOR_TILE_ID,
    };
    use tallgrass_system_battle::Outcome;
    use tallgrass_world::{GlowingPointConfig, MapLayout, WorldConfig};

    const COLUMNS: u32 = 20;
    const ROWS: u32 = 12;

    fn layout() -> MapLayout {
        let tiles = (COLUMNS * ROWS) as usize;
        MapLayout {
            columns: COLUMNS,
            offset: Position::new(0.0, 0.0),
            collisions: vec![0; tiles],
            battle_zones: vec![0; tiles],
            characters: vec![0; tiles],
            ..MapLayout::default()
        }
    }

    fn orb() -> CollectibleSpec {
        CollectibleSpec {
            id: CollectibleId::new("ancient-orb"),
            name: "Ancient Orb".to_owned(),
            description: "Emits a faint hum.".to_owned(),
            tile: (10, 6),
            size: 26.0,
            tint: Tint::from_rgb(0xa9, 0x87, 0xff),
        }
    }

    fn simulation(
        layout: &MapLayout,
        specs: Vec<CollectibleSpec>,
        profile: LocalProfile,
        config: SimulationConfig,
    ) -> Simulation<ChaCha8Rng> {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let world_config = WorldConfig {
            glowing_points: GlowingPointConfig {
                count: 0,
                ..GlowingPointConfig::default()
            },
            ..WorldConfig::default()
        };
        let world = World::new(layout, specs.clone(), world_config, &mut rng).expect("world");
        Simulation::new(world, profile, rng, specs, config)
    }

    fn press(direction: Direction) -> FrameInput {
        FrameInput {
            pressed: vec![direction],
            ..FrameInput::default()
        }
    }

    fn interact() -> FrameInput {
        FrameInput {
            interact: true,
            ..FrameInput::default()
        }
    }

    #[test]
    fn hydration_hides_earlier_pickups_and_restores_the_item() {
        let mut profile = LocalProfile::open(None);
        profile.record_collected(&CollectibleId::new("ancient-orb"));
        let mut sim = simulation(&layout(), vec![orb()], profile, SimulationConfig::default());
        let mut scene = Scene::default();

        sim.hydrate(&mut scene);
        sim.step(FrameInput::default(), &mut scene);

        assert_eq!(
            query::is_collected(&sim.world, &CollectibleId::new("ancient-orb")),
            Some(true)
        );
        assert_eq!(sim.profile.inventory().len(), 1);
        assert_eq!(sim.profile.inventory()[0].name, "Ancient Orb");
        assert_eq!(scene.points, 0);
        assert!(scene.loot_notice.is_none());
    }

    #[test]
    fn walking_onto_a_pickup_pays_once_and_shows_a_notice() {
        let mut sim = simulation(
            &layout(),
            vec![orb()],
            LocalProfile::open(None),
            SimulationConfig::default(),
        );
        let mut scene = Scene::default();

        sim.step(FrameInput::default(), &mut scene);
        sim.step(FrameInput::default(), &mut scene);

        assert_eq!(scene.points, POINTS_PER_COLLECTIBLE);
        assert_eq!(scene.loot_notice.as_deref(), Some("Collected Ancient Orb!"));
        assert_eq!(sim.profile.inventory().len(), 1);
        assert!(scene
            .items
            .iter()
            .all(|item| !matches!(item, SceneItem::Shape { .. })));
    }

    #[test]
    fn loot_notice_expires() {
        let mut sim = simulation(
            &layout(),
            vec![orb()],
            LocalProfile::open(None),
            SimulationConfig::default(),
        );
        let mut scene = Scene::default();

        for _ in 0..LOOT_NOTICE_FRAMES {
            sim.step(FrameInput::default(), &mut scene);
        }

        assert!(scene.loot_notice.is_none());
    }

    #[test]
    fn talking_to_the_vendor_opens_the_marketplace() {
        let mut layout = layout();
        layout.characters[(5 * COLUMNS + 11) as usize] = VENDOR_TILE_ID;
        let mut sim = simulation(
            &layout,
            Vec::new(),
            LocalProfile::open(None),
            SimulationConfig::default(),
        );
        let mut scene = Scene::default();

        sim.step(press(Direction::Right), &mut scene);
        let mut lines = Vec::new();
        for _ in 0..3 {
            sim.step(interact(), &mut scene);
            lines.extend(scene.dialogue.text().map(str::to_owned));
        }
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "Let me show you my NFT stash.");
        assert!(!scene.marketplace_open);

        sim.step(interact(), &mut scene);
        assert!(scene.marketplace_open);
        assert!(!scene.dialogue.is_visible());
        assert_eq!(sim.keys.active_direction(), None);

        sim.step(press(Direction::Down), &mut scene);
        assert_eq!(sim.keys.active_direction(), None);

        sim.step(
            FrameInput {
                close_overlay: true,
                ..FrameInput::default()
            },
            &mut scene,
        );
        assert!(!scene.marketplace_open);
        assert!(!query::is_marketplace_open(&sim.world));
    }

    fn grass_simulation(engage_frames: u32) -> Simulation<ChaCha8Rng> {
        let mut layout = layout();
        layout.offset = Position::new(8.0, 14.0);
        layout.battle_zones = vec![BOUNDARY_TILE_ID; (COLUMNS * ROWS) as usize];
        let config = SimulationConfig {
            encounter: EncounterConfig {
                chance: 1.0,
                ..EncounterConfig::default()
            },
            battle: BattleConfig {
                engage_frames,
                resolve_frames: 1,
                ..BattleConfig::default()
            },
            ..SimulationConfig::default()
        };
        simulation(&layout, Vec::new(), LocalProfile::open(None), config)
    }

    #[test]
    fn overworld_is_frozen_while_the_battle_flash_plays() {
        let mut sim = grass_simulation(30);
        let mut scene = Scene::default();

        sim.step(interact(), &mut scene);
        assert!(query::player(&sim.world).is_jumping);
        sim.step(press(Direction::Down), &mut scene);
        assert!(matches!(sim.battle.phase(), BattlePhase::Engaging { .. }));

        let frame = query::frame_index(&sim.world);
        let player = query::player(&sim.world);
        for _ in 0..10 {
            sim.step(FrameInput::default(), &mut scene);
        }

        assert!(matches!(sim.battle.phase(), BattlePhase::Engaging { .. }));
        assert_eq!(query::frame_index(&sim.world), frame);
        assert_eq!(query::player(&sim.world), player);
        assert_eq!(scene.mode, SceneMode::Overworld);
    }

    #[test]
    fn tall_grass_encounter_pays_out_a_victory_and_returns_to_the_overworld() {
        let mut sim = grass_simulation(1);
        let mut emby = MonsterTemplate::emby();
        emby.attacks[0].damage = MAX_HEALTH;
        sim.battle = BattleSession::with_roster(
            BattleConfig {
                engage_frames: 1,
                resolve_frames: 3,
                ..BattleConfig::default()
            },
            emby,
            MonsterTemplate::draggle(),
        );
        let mut scene = Scene::default();

        sim.step(press(Direction::Down), &mut scene);
        assert!(sim.battle.is_running());
        assert!(query::is_battle_active(&sim.world));

        let release = FrameInput {
            released: vec![Direction::Down],
            ..FrameInput::default()
        };
        sim.step(release, &mut scene);
        for _ in 0..10 {
            if scene.mode == SceneMode::Battle {
                break;
            }
            sim.step(FrameInput::default(), &mut scene);
        }
        assert_eq!(scene.mode, SceneMode::Battle);
        let attack_count = scene.battle.as_ref().map_or(0, |hud| hud.attacks.len());
        assert!(attack_count > 0);

        let (origin, size) = sim.menu.button_rect(0, attack_count).expect("first button");
        let click = FrameInput {
            cursor: Some(origin + size / 2.0),
            click: true,
            ..FrameInput::default()
        };
        let mut outcome = None;
        for _ in 0..50 {
            if let BattlePhase::Resolving { outcome: ended, .. } = sim.battle.phase() {
                outcome = Some(ended);
            }
            if !sim.battle.is_running() {
                break;
            }
            sim.step(click.clone(), &mut scene);
        }

        assert_eq!(outcome, Some(Outcome::Victory));
        assert!(!sim.battle.is_running());
        assert!(!query::is_battle_active(&sim.world));
        sim.step(FrameInput::default(), &mut scene);
        assert_eq!(scene.mode, SceneMode::Overworld);
        assert!(scene.battle.is_none());
        assert_eq!(scene.points, POINTS_PER_BATTLE_VICTORY);
    }
}

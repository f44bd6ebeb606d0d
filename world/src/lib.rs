#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative overworld state for Tallgrass.
//!
//! The world owns every positioned entity on the map. Systems read it through
//! the [`query`] module and request mutations by submitting
//! [`Command`](tallgrass_core::Command) values to [`apply`], which reports the
//! resulting [`Event`](tallgrass_core::Event) values.

mod entities;
mod tile_map;

use rand::Rng;
use tallgrass_core::{
    overlaps, CharacterId, Command, Event, GlowingPointId, JumpConfig, JumpProgress, Position,
    Rect, Size, GLOWING_POINT_VALUE, WELCOME_BANNER,
};
use tracing::{debug, info, trace};

pub use entities::{CharacterRole, CollectibleSpec, FrameAnimation};
pub use tile_map::{MapError, MapLayout};

use entities::{Boundary, Character, Collectible, GlowingPoint, Player, Zone};

/// Placement rules for the glowing points scattered at load.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowingPointConfig {
    /// Number of points to place.
    pub count: u32,
    /// Side length of a point.
    pub size: f32,
    /// Reward carried by each point.
    pub points: u32,
    /// Placement attempts per point before giving up on it.
    pub attempts_per_point: u32,
    /// Share of the tile the position may be jittered across.
    pub jitter: f32,
}

impl Default for GlowingPointConfig {
    fn default() -> Self {
        Self {
            count: 20,
            size: 12.0,
            points: GLOWING_POINT_VALUE,
            attempts_per_point: 50,
            jitter: 0.6,
        }
    }
}

/// Tunables consumed while building and simulating the world.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldConfig {
    /// Jump arc applied to the player.
    pub jump: JumpConfig,
    /// Glowing point placement.
    pub glowing_points: GlowingPointConfig,
}

/// Represents the authoritative Tallgrass overworld.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: WorldConfig,
    map_size: Size,
    background: Position,
    foreground: Position,
    boundaries: Vec<Boundary>,
    zones: Vec<Zone>,
    characters: Vec<Character>,
    collectibles: Vec<Collectible>,
    glowing_points: Vec<GlowingPoint>,
    player: Player,
    frame: u64,
    marketplace_open: bool,
    battle_active: bool,
}

impl World {
    /// Builds a world from a validated layout.
    ///
    /// Glowing points are scattered with `rng`, so a seeded generator yields a
    /// reproducible map.
    pub fn new<R: Rng>(
        layout: &MapLayout,
        collectibles: Vec<CollectibleSpec>,
        config: WorldConfig,
        rng: &mut R,
    ) -> Result<Self, MapError> {
        layout.validate()?;
        let tiles = tile_map::build(layout);
        let collectibles = collectibles
            .into_iter()
            .map(|spec| {
                let (column, row) = spec.tile;
                Collectible::place(spec, layout.tile_position(column, row), layout.tile_size())
            })
            .collect();

        let mut world = Self {
            banner: WELCOME_BANNER,
            config,
            map_size: layout.extent(),
            background: layout.offset,
            foreground: layout.offset,
            boundaries: tiles.boundaries,
            zones: tiles.zones,
            characters: tiles.characters,
            collectibles,
            glowing_points: Vec::new(),
            player: Player::centered(),
            frame: 0,
            marketplace_open: false,
            battle_active: false,
        };
        world.scatter_glowing_points(layout, rng);

        info!(
            boundaries = world.boundaries.len(),
            zones = world.zones.len(),
            characters = world.characters.len(),
            collectibles = world.collectibles.len(),
            glowing_points = world.glowing_points.len(),
            "world built"
        );
        Ok(world)
    }

    fn scatter_glowing_points<R: Rng>(&mut self, layout: &MapLayout, rng: &mut R) {
        let columns = layout.columns;
        let rows = layout.rows();
        if columns == 0 || rows == 0 {
            return;
        }

        let rules = self.config.glowing_points;
        let tile = layout.tile_size();
        let half = rules.size / 2.0;
        let min = Position::new(layout.offset.x + tile.width, layout.offset.y + tile.height);
        let max = Position::new(
            layout.offset.x + self.map_size.width - tile.width,
            layout.offset.y + self.map_size.height - tile.height,
        );

        for index in 0..rules.count {
            for _ in 0..rules.attempts_per_point {
                let origin = layout.tile_position(rng.gen_range(0..columns), rng.gen_range(0..rows));
                let jitter_x = (rng.gen::<f32>() - 0.5) * tile.width * rules.jitter;
                let jitter_y = (rng.gen::<f32>() - 0.5) * tile.height * rules.jitter;
                let position = Position::new(
                    origin.x + tile.width / 2.0 + jitter_x - half,
                    origin.y + tile.height / 2.0 + jitter_y - half,
                );
                let candidate = Rect::new(position, Size::square(rules.size));

                let inside = position.x >= min.x
                    && position.x <= max.x
                    && position.y >= min.y
                    && position.y <= max.y;
                if !inside || self.is_blocked(&candidate) {
                    continue;
                }

                self.glowing_points.push(GlowingPoint {
                    id: GlowingPointId::new(index),
                    bounds: candidate,
                    points: rules.points,
                    collected: false,
                });
                break;
            }
        }
    }

    fn is_blocked(&self, candidate: &Rect) -> bool {
        self.boundaries.iter().any(|boundary| overlaps(candidate, boundary))
            || self.zones.iter().any(|zone| overlaps(candidate, zone))
    }

    fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|character| character.id() == id)
    }

    fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|character| character.id() == id)
    }

    fn scroll(&mut self, delta: Position) {
        self.background.shift(delta);
        self.foreground.shift(delta);
        for boundary in &mut self.boundaries {
            boundary.shift(delta);
        }
        for zone in &mut self.zones {
            zone.shift(delta);
        }
        for character in &mut self.characters {
            character.shift(delta);
        }
        for collectible in &mut self.collectibles {
            collectible.bounds.position.shift(delta);
        }
        for point in &mut self.glowing_points {
            point.bounds.position.shift(delta);
        }
    }

    fn interact(&mut self, out_events: &mut Vec<Event>) {
        if self.player.is_interacting {
            let Some(id) = self.player.interaction_target else {
                self.player.is_interacting = false;
                return;
            };
            let Some(character) = self.character_mut(id) else {
                self.player.is_interacting = false;
                return;
            };

            if let Some(line) = character.advance_dialogue() {
                out_events.push(Event::DialogueLine {
                    character: id,
                    text: line.to_owned(),
                });
                return;
            }

            let opens_marketplace = character.role().is_marketplace_vendor();
            self.player.is_interacting = false;
            debug!(character = id.get(), "dialogue finished");
            out_events.push(Event::DialogueFinished { character: id });
            if opens_marketplace {
                self.marketplace_open = true;
                debug!("marketplace opened");
                out_events.push(Event::MarketplaceOpened);
            }
            return;
        }

        if let Some(id) = self.player.interaction_target {
            let Some(character) = self.character_mut(id) else {
                return;
            };
            if let Some(line) = character.open_dialogue() {
                let text = line.to_owned();
                self.player.is_interacting = true;
                debug!(character = id.get(), "dialogue started");
                out_events.push(Event::DialogueLine { character: id, text });
            }
            return;
        }

        let jump = self.config.jump;
        if self.player.jump.try_start(&jump) {
            out_events.push(Event::JumpStarted);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => {
            world.frame = world.frame.saturating_add(1);
            world.player.animation.advance();
            for character in &mut world.characters {
                character.tick();
            }
            let jump = world.config.jump;
            if world.player.jump.advance(&jump) == JumpProgress::Landed {
                out_events.push(Event::JumpLanded);
            }
            out_events.push(Event::TimeAdvanced { frame: world.frame });
        }
        Command::Interact => {
            if world.marketplace_open || world.battle_active {
                trace!("interaction ignored while an overlay is active");
                return;
            }
            world.interact(out_events);
        }
        Command::SetPlayerMotion { facing, sprinting } => {
            world.player.set_motion(facing, sprinting);
        }
        Command::SetInteractionTarget { character } => {
            if world.player.is_interacting || world.player.interaction_target == character {
                return;
            }
            world.player.interaction_target = character;
            out_events.push(Event::InteractionTargetChanged { character });
        }
        Command::ScrollWorld { delta } => {
            if world.battle_active || world.marketplace_open {
                trace!("scroll ignored while an overlay is active");
                return;
            }
            world.scroll(delta);
            out_events.push(Event::WorldScrolled { delta });
        }
        Command::Collect { collectible } => {
            let Some(entry) = world
                .collectibles
                .iter_mut()
                .find(|entry| entry.spec.id == collectible)
            else {
                return;
            };
            if entry.collect() {
                debug!(collectible = collectible.as_str(), "collectible picked up");
                out_events.push(Event::CollectibleCollected {
                    collectible,
                    name: entry.spec.name.clone(),
                    description: entry.spec.description.clone(),
                });
            }
        }
        Command::ClaimGlowingPoint { point } => {
            let Some(entry) = world.glowing_points.iter_mut().find(|entry| entry.id == point)
            else {
                return;
            };
            if entry.collect() {
                debug!(point = point.get(), "glowing point claimed");
                out_events.push(Event::GlowingPointCollected {
                    point,
                    points: entry.points,
                });
            }
        }
        Command::HydrateCollected { collectibles } => {
            let mut restored = Vec::new();
            for id in collectibles {
                if let Some(entry) = world.collectibles.iter_mut().find(|entry| entry.spec.id == id)
                {
                    if entry.collect() {
                        restored.push(id);
                    }
                }
            }
            debug!(restored = restored.len(), "collection hydrated");
            out_events.push(Event::CollectionHydrated {
                collectibles: restored,
            });
        }
        Command::SetBattleActive { active } => {
            if world.battle_active == active {
                return;
            }
            world.battle_active = active;
            debug!(active, "battle mode changed");
            out_events.push(Event::BattleModeChanged { active });
        }
        Command::CloseMarketplace => {
            if !world.marketplace_open {
                return;
            }
            world.marketplace_open = false;
            debug!("marketplace closed");
            out_events.push(Event::MarketplaceClosed);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tallgrass_core::{
        overlaps, Bounded, CharacterId, CollectibleId, GlowingPointId, Position, Rect, SpriteKey,
        Tint,
    };

    use super::{CharacterRole, FrameAnimation, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Number of frames simulated so far.
    #[must_use]
    pub fn frame_index(world: &World) -> u64 {
        world.frame
    }

    /// Whether the vendor's marketplace overlay is open.
    #[must_use]
    pub fn is_marketplace_open(world: &World) -> bool {
        world.marketplace_open
    }

    /// Whether a battle is initiated.
    #[must_use]
    pub fn is_battle_active(world: &World) -> bool {
        world.battle_active
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerView {
        let player = &world.player;
        PlayerView {
            bounds: player.bounds,
            sprite: SpriteKey::player_facing(player.facing),
            animation: player.animation,
            elevation: player.jump.elevation(),
            is_jumping: player.jump.is_jumping(),
            jump_cooldown: player.jump.cooldown(),
            interaction_target: player.interaction_target,
            is_interacting: player.is_interacting,
        }
    }

    /// Bounding boxes of every boundary in creation order.
    pub fn boundaries(world: &World) -> impl Iterator<Item = Rect> + '_ {
        world.boundaries.iter().map(Bounded::bounds)
    }

    /// Bounding boxes of every battle zone in creation order.
    pub fn battle_zones(world: &World) -> impl Iterator<Item = Rect> + '_ {
        world.zones.iter().map(Bounded::bounds)
    }

    /// Characters with their bounding boxes in creation order.
    pub fn characters(world: &World) -> impl Iterator<Item = CharacterView> + '_ {
        world.characters.iter().map(|character| CharacterView {
            id: character.id(),
            role: character.role(),
            bounds: character.bounds(),
            dialogue_index: character.dialogue_index(),
        })
    }

    /// Looks up a single character.
    #[must_use]
    pub fn character(world: &World, id: CharacterId) -> Option<CharacterView> {
        world.character(id).map(|character| CharacterView {
            id: character.id(),
            role: character.role(),
            bounds: character.bounds(),
            dialogue_index: character.dialogue_index(),
        })
    }

    /// Uncollected collectibles overlapping the provided box.
    #[must_use]
    pub fn touching_collectibles(world: &World, area: &Rect) -> Vec<CollectibleId> {
        world
            .collectibles
            .iter()
            .filter(|entry| !entry.collected && overlaps(area, *entry))
            .map(|entry| entry.spec.id.clone())
            .collect()
    }

    /// First uncollected glowing point overlapping the provided box.
    #[must_use]
    pub fn touching_glowing_point(world: &World, area: &Rect) -> Option<GlowingPointId> {
        world
            .glowing_points
            .iter()
            .find(|point| !point.collected && overlaps(area, *point))
            .map(|point| point.id)
    }

    /// Collection flag for a collectible, `None` when the id is unknown.
    #[must_use]
    pub fn is_collected(world: &World, id: &CollectibleId) -> Option<bool> {
        world
            .collectibles
            .iter()
            .find(|entry| &entry.spec.id == id)
            .map(|entry| entry.collected)
    }

    /// Snapshot of every glowing point.
    #[must_use]
    pub fn glowing_points(world: &World) -> Vec<GlowingPointView> {
        world
            .glowing_points
            .iter()
            .map(|point| GlowingPointView {
                id: point.id,
                bounds: point.bounds,
                points: point.points,
                collected: point.collected,
            })
            .collect()
    }

    /// Current canvas bounds of the whole map.
    #[must_use]
    pub fn map_bounds(world: &World) -> Rect {
        Rect::new(world.background, world.map_size)
    }

    /// Positions of every movable entity, used to detect scrolling.
    #[must_use]
    pub fn movable_positions(world: &World) -> Vec<Position> {
        let mut positions = vec![world.background];
        positions.extend(world.boundaries.iter().map(|entry| entry.bounds().position));
        positions.extend(world.collectibles.iter().map(|entry| entry.bounds.position));
        positions.extend(world.glowing_points.iter().map(|entry| entry.bounds.position));
        positions.push(world.foreground);
        positions.extend(world.zones.iter().map(|entry| entry.bounds().position));
        positions.extend(world.characters.iter().map(|entry| entry.bounds().position));
        positions
    }

    /// Everything to draw this frame, back to front.
    #[must_use]
    pub fn render_list(world: &World) -> Vec<Renderable> {
        let mut list = Vec::with_capacity(
            world.boundaries.len() + world.zones.len() + world.characters.len() + 8,
        );
        list.push(Renderable::Backdrop {
            sprite: SpriteKey::Background,
            position: world.background,
        });
        list.extend(
            world
                .collectibles
                .iter()
                .filter(|entry| !entry.collected)
                .map(|entry| Renderable::Collectible {
                    bounds: entry.bounds,
                    tint: entry.spec.tint,
                }),
        );
        list.extend(
            world
                .glowing_points
                .iter()
                .filter(|point| !point.collected)
                .map(|point| Renderable::GlowingPoint {
                    bounds: point.bounds,
                }),
        );
        list.extend(world.boundaries.iter().map(|entry| Renderable::Boundary {
            bounds: entry.bounds(),
        }));
        list.extend(world.zones.iter().map(|entry| Renderable::BattleZone {
            bounds: entry.bounds(),
        }));
        list.extend(world.characters.iter().map(|character| Renderable::Character {
            sprite: character.sprite(),
            bounds: character.bounds(),
            animation: *character.animation(),
        }));
        let player = player(world);
        list.push(Renderable::Player {
            sprite: player.sprite,
            bounds: player.bounds,
            animation: player.animation,
            lift: player.elevation,
        });
        list.push(Renderable::Backdrop {
            sprite: SpriteKey::Foreground,
            position: world.foreground,
        });
        list
    }

    /// Read-only snapshot of the player.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerView {
        /// Collision box; never affected by the jump arc.
        pub bounds: Rect,
        /// Facing image.
        pub sprite: SpriteKey,
        /// Walk cycle cursor.
        pub animation: FrameAnimation,
        /// Height of the jump arc above the ground.
        pub elevation: f32,
        /// Whether the player is airborne.
        pub is_jumping: bool,
        /// Frames before another jump may start.
        pub jump_cooldown: u32,
        /// Character the player can talk to.
        pub interaction_target: Option<CharacterId>,
        /// Whether a dialogue is open.
        pub is_interacting: bool,
    }

    /// Read-only snapshot of a character.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct CharacterView {
        /// Identifier assigned by the tile map builder.
        pub id: CharacterId,
        /// Which NPC the tile spawned.
        pub role: CharacterRole,
        /// Current bounding box.
        pub bounds: Rect,
        /// Dialogue cursor.
        pub dialogue_index: usize,
    }

    /// Read-only snapshot of a glowing point.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct GlowingPointView {
        /// Identifier assigned at placement.
        pub id: GlowingPointId,
        /// Current bounding box.
        pub bounds: Rect,
        /// Reward carried by the point.
        pub points: u32,
        /// Whether the point was claimed.
        pub collected: bool,
    }

    /// Drawable entry of the overworld composition.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub enum Renderable {
        /// Full-map image anchored at its top-left corner.
        Backdrop {
            /// Image to draw.
            sprite: SpriteKey,
            /// Top-left corner on the canvas.
            position: Position,
        },
        /// Uncollected inventory pickup.
        Collectible {
            /// Bounding box.
            bounds: Rect,
            /// Fill color.
            tint: Tint,
        },
        /// Unclaimed glowing point.
        GlowingPoint {
            /// Bounding box.
            bounds: Rect,
        },
        /// Invisible collision tile.
        Boundary {
            /// Bounding box.
            bounds: Rect,
        },
        /// Invisible tall grass tile.
        BattleZone {
            /// Bounding box.
            bounds: Rect,
        },
        /// NPC sprite.
        Character {
            /// Sprite sheet.
            sprite: SpriteKey,
            /// Bounding box.
            bounds: Rect,
            /// Frame cursor into the sheet.
            animation: FrameAnimation,
        },
        /// Player sprite.
        Player {
            /// Sprite sheet for the current facing.
            sprite: SpriteKey,
            /// Collision box.
            bounds: Rect,
            /// Frame cursor into the sheet.
            animation: FrameAnimation,
            /// Jump elevation lifting the drawn sprite.
            lift: f32,
        },
    }
}

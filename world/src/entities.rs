//! Entity model for everything that lives on the overworld canvas.

use tallgrass_core::{
    Bounded, CharacterId, CollectibleId, Direction, GlowingPointId, JumpState, Position, Rect,
    Size, SpriteKey, Tint, CANVAS_HEIGHT, CANVAS_WIDTH,
};

const PLAYER_FRAMES: u32 = 4;
const PLAYER_HOLD: u32 = 10;
const PLAYER_SPRINT_HOLD: u32 = 6;
const CHARACTER_FRAMES: u32 = 4;
const CHARACTER_HOLD: u32 = 60;

/// Frame cursor for a horizontally laid out sprite sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameAnimation {
    frames: u32,
    hold: u32,
    elapsed: u32,
    current: u32,
    animate: bool,
}

impl FrameAnimation {
    pub(crate) const fn new(frames: u32, hold: u32, animate: bool) -> Self {
        Self {
            frames,
            hold,
            elapsed: 0,
            current: 0,
            animate,
        }
    }

    /// Advances the cursor when animating; the image switches every `hold` frames.
    pub(crate) fn advance(&mut self) {
        if !self.animate || self.frames <= 1 {
            return;
        }
        self.elapsed = self.elapsed.wrapping_add(1);
        if self.elapsed % self.hold.max(1) == 0 {
            self.current = (self.current + 1) % self.frames;
        }
    }

    pub(crate) fn set_animate(&mut self, animate: bool) {
        self.animate = animate;
    }

    pub(crate) fn set_hold(&mut self, hold: u32) {
        self.hold = hold;
    }

    /// Index of the frame currently shown.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Number of frames in the sheet.
    #[must_use]
    pub const fn frames(&self) -> u32 {
        self.frames
    }

    /// Frames each image is held for.
    #[must_use]
    pub const fn hold(&self) -> u32 {
        self.hold
    }

    /// Whether the cursor advances on tick.
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.animate
    }
}

/// Impassable tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Boundary {
    bounds: Rect,
}

impl Boundary {
    pub(crate) const fn new(bounds: Rect) -> Self {
        Self { bounds }
    }

    pub(crate) fn shift(&mut self, delta: Position) {
        self.bounds.position.shift(delta);
    }
}

impl Bounded for Boundary {
    fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Tall grass tile that may start a battle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Zone {
    bounds: Rect,
}

impl Zone {
    pub(crate) const fn new(bounds: Rect) -> Self {
        Self { bounds }
    }

    pub(crate) fn shift(&mut self, delta: Position) {
        self.bounds.position.shift(delta);
    }
}

impl Bounded for Zone {
    fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Which NPC a character tile spawned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharacterRole {
    /// Child looking for a lost pet.
    Villager,
    /// Old trader who opens the marketplace.
    Vendor,
}

impl CharacterRole {
    fn dialogue(self) -> Vec<String> {
        let lines: &[&str] = match self {
            Self::Villager => &["...", "Hey mister, have you seen my Doggochu?"],
            Self::Vendor => &[
                "Ooof, these bones still ache from trading days.",
                "Welcome to the Stellar Bazaar traveler.",
                "Let me show you my NFT stash.",
            ],
        };
        lines.iter().map(|line| (*line).to_owned()).collect()
    }

    const fn sprite(self) -> SpriteKey {
        match self {
            Self::Villager => SpriteKey::Villager,
            Self::Vendor => SpriteKey::Vendor,
        }
    }

    /// Whether finishing this character's dialogue opens the marketplace.
    #[must_use]
    pub const fn is_marketplace_vendor(self) -> bool {
        matches!(self, Self::Vendor)
    }
}

/// NPC with a scripted dialogue.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Character {
    id: CharacterId,
    role: CharacterRole,
    bounds: Rect,
    animation: FrameAnimation,
    dialogue: Vec<String>,
    dialogue_index: usize,
}

impl Character {
    pub(crate) fn new(id: CharacterId, role: CharacterRole, bounds: Rect) -> Self {
        let animate = !role.is_marketplace_vendor();
        Self {
            id,
            role,
            bounds,
            animation: FrameAnimation::new(CHARACTER_FRAMES, CHARACTER_HOLD, animate),
            dialogue: role.dialogue(),
            dialogue_index: 0,
        }
    }

    pub(crate) const fn id(&self) -> CharacterId {
        self.id
    }

    pub(crate) const fn role(&self) -> CharacterRole {
        self.role
    }

    pub(crate) const fn sprite(&self) -> SpriteKey {
        self.role.sprite()
    }

    pub(crate) const fn animation(&self) -> &FrameAnimation {
        &self.animation
    }

    pub(crate) fn tick(&mut self) {
        self.animation.advance();
    }

    pub(crate) fn shift(&mut self, delta: Position) {
        self.bounds.position.shift(delta);
    }

    pub(crate) const fn dialogue_index(&self) -> usize {
        self.dialogue_index
    }

    /// Opens the dialogue at its first line.
    pub(crate) fn open_dialogue(&mut self) -> Option<&str> {
        self.dialogue_index = 0;
        self.dialogue.first().map(String::as_str)
    }

    /// Moves to the next line, rewinding and returning `None` past the end.
    pub(crate) fn advance_dialogue(&mut self) -> Option<&str> {
        self.dialogue_index += 1;
        if self.dialogue_index < self.dialogue.len() {
            return self.dialogue.get(self.dialogue_index).map(String::as_str);
        }
        self.dialogue_index = 0;
        None
    }
}

impl Bounded for Character {
    fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Static description of a collectible placed on the map at load.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectibleSpec {
    /// Stable identifier persisted by the collection store.
    pub id: CollectibleId,
    /// Display name.
    pub name: String,
    /// Inventory description.
    pub description: String,
    /// Column and row of the tile the pickup sits in.
    pub tile: (u32, u32),
    /// Side length of the square pickup.
    pub size: f32,
    /// Fill color of the pickup.
    pub tint: Tint,
}

impl CollectibleSpec {
    /// The three relics hidden around Pellet Town.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                id: CollectibleId::new("ancient-orb"),
                name: "Ancient Orb".to_owned(),
                description: "Emits a faint hum - villagers say it empowers fire attacks."
                    .to_owned(),
                tile: (49, 44),
                size: 26.0,
                tint: Tint::from_rgb(0xa9, 0x87, 0xff),
            },
            Self {
                id: CollectibleId::new("sunshard"),
                name: "Sun Shard".to_owned(),
                description: "Warm to the touch. Rumored to restore fainted allies.".to_owned(),
                tile: (52, 41),
                size: 24.0,
                tint: Tint::from_rgb(0xf7, 0xc9, 0x48),
            },
            Self {
                id: CollectibleId::new("aqua-bloom"),
                name: "Aqua Bloom".to_owned(),
                description: "A rare herb that soothes even the fiercest Draggle.".to_owned(),
                tile: (46, 48),
                size: 24.0,
                tint: Tint::from_rgb(0x5e, 0xc9, 0xf5),
            },
        ]
    }
}

/// One-time pickup that joins the inventory.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Collectible {
    pub(crate) spec: CollectibleSpec,
    pub(crate) bounds: Rect,
    pub(crate) collected: bool,
}

impl Collectible {
    /// Places the pickup centered inside its tile.
    pub(crate) fn place(spec: CollectibleSpec, tile_origin: Position, tile: Size) -> Self {
        let position = Position::new(
            tile_origin.x + (tile.width - spec.size) / 2.0,
            tile_origin.y + (tile.height - spec.size) / 2.0,
        );
        let bounds = Rect::new(position, Size::square(spec.size));
        Self {
            spec,
            bounds,
            collected: false,
        }
    }

    /// Flags the pickup as collected, returning `false` when it already was.
    pub(crate) fn collect(&mut self) -> bool {
        !std::mem::replace(&mut self.collected, true)
    }
}

impl Bounded for Collectible {
    fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// One-time pickup that grants points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct GlowingPoint {
    pub(crate) id: GlowingPointId,
    pub(crate) bounds: Rect,
    pub(crate) points: u32,
    pub(crate) collected: bool,
}

impl GlowingPoint {
    pub(crate) fn collect(&mut self) -> bool {
        !std::mem::replace(&mut self.collected, true)
    }
}

impl Bounded for GlowingPoint {
    fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Player avatar pinned to the canvas center while the world scrolls.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Player {
    pub(crate) bounds: Rect,
    pub(crate) facing: Direction,
    pub(crate) animation: FrameAnimation,
    pub(crate) jump: JumpState,
    pub(crate) interaction_target: Option<CharacterId>,
    pub(crate) is_interacting: bool,
}

impl Player {
    pub(crate) fn centered() -> Self {
        let size = Size::new(48.0, 68.0);
        let position = Position::new(
            CANVAS_WIDTH / 2.0 - size.width / 2.0,
            CANVAS_HEIGHT / 2.0 - size.height / 2.0,
        );
        Self {
            bounds: Rect::new(position, size),
            facing: Direction::Down,
            animation: FrameAnimation::new(PLAYER_FRAMES, PLAYER_HOLD, false),
            jump: JumpState::default(),
            interaction_target: None,
            is_interacting: false,
        }
    }

    pub(crate) fn set_motion(&mut self, facing: Option<Direction>, sprinting: bool) {
        self.animation
            .set_hold(if sprinting { PLAYER_SPRINT_HOLD } else { PLAYER_HOLD });
        self.animation.set_animate(facing.is_some());
        if let Some(direction) = facing {
            self.facing = direction;
        }
    }
}

impl Bounded for Player {
    fn bounds(&self) -> Rect {
        self.bounds
    }
}

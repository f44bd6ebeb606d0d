#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tallgrass engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative overworld, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values that
//! the frame driver forwards to external collaborators. Geometry, key state,
//! the jump arc and the combat templates live here so every crate agrees on
//! the same numbers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Pellet Town.";

/// Number of tile columns in every map layer.
pub const MAP_COLUMNS: u32 = 70;

/// Tile id marking an impassable tile in the collision layer and a battle
/// zone in the zone layer.
pub const BOUNDARY_TILE_ID: u32 = 1025;

/// Tile id marking the villager in the character layer.
pub const VILLAGER_TILE_ID: u32 = 1026;

/// Tile id marking the marketplace vendor in the character layer.
pub const VENDOR_TILE_ID: u32 = 1031;

/// Side length of a map tile in canvas pixels (12px art drawn at 4x zoom).
pub const TILE_LENGTH: f32 = 48.0;

/// Width of the logical canvas the game is composed on.
pub const CANVAS_WIDTH: f32 = 1024.0;

/// Height of the logical canvas the game is composed on.
pub const CANVAS_HEIGHT: f32 = 576.0;

/// Maximum health of any monster.
pub const MAX_HEALTH: u32 = 100;

/// Points granted when a collectible is picked up.
pub const POINTS_PER_COLLECTIBLE: u32 = 25;

/// Points granted when a battle is won.
pub const POINTS_PER_BATTLE_VICTORY: u32 = 50;

/// Default reward carried by a glowing point.
pub const GLOWING_POINT_VALUE: u32 = 100;

/// Commands that express all permissible overworld mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances animation counters and the jump arc by one frame.
    Tick,
    /// Space bar: advances an open dialogue, opens one with the current
    /// interaction target, or starts a jump when nobody is in reach.
    Interact,
    /// Updates the player's facing image and sprint cadence for this frame.
    SetPlayerMotion {
        /// Direction the player walks this frame, `None` when standing still.
        facing: Option<Direction>,
        /// Whether the sprint modifier is held.
        sprinting: bool,
    },
    /// Replaces the character the player can currently talk to.
    SetInteractionTarget {
        /// Character in reach, if any.
        character: Option<CharacterId>,
    },
    /// Shifts every movable entity so the world scrolls under the player.
    ScrollWorld {
        /// Offset added to every movable position.
        delta: Position,
    },
    /// Marks a collectible as picked up.
    Collect {
        /// Identifier of the collectible the player touched.
        collectible: CollectibleId,
    },
    /// Marks a glowing point as claimed.
    ClaimGlowingPoint {
        /// Identifier of the glowing point the player touched.
        point: GlowingPointId,
    },
    /// Restores collected flags from previously persisted identifiers.
    HydrateCollected {
        /// Identifiers the collection store reported as already collected.
        collectibles: Vec<CollectibleId>,
    },
    /// Enters or leaves battle mode, gating overworld movement.
    SetBattleActive {
        /// Whether a battle is initiated.
        active: bool,
    },
    /// Closes the marketplace overlay opened by the vendor.
    CloseMarketplace,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the frame counter advanced.
    TimeAdvanced {
        /// Index of the frame that just completed.
        frame: u64,
    },
    /// The player left the ground.
    JumpStarted,
    /// The player touched down and entered the jump cooldown.
    JumpLanded,
    /// Every movable entity was shifted by the provided delta.
    WorldScrolled {
        /// Offset applied to every movable position.
        delta: Position,
    },
    /// The character in reach of the player changed.
    InteractionTargetChanged {
        /// Character now in reach, if any.
        character: Option<CharacterId>,
    },
    /// A dialogue line should be presented.
    DialogueLine {
        /// Character speaking the line.
        character: CharacterId,
        /// Text of the line.
        text: String,
    },
    /// The last dialogue line was acknowledged and the dialogue closed.
    DialogueFinished {
        /// Character whose dialogue ended.
        character: CharacterId,
    },
    /// The vendor finished talking and the marketplace overlay opened.
    MarketplaceOpened,
    /// The marketplace overlay closed.
    MarketplaceClosed,
    /// A collectible was picked up for the first time.
    CollectibleCollected {
        /// Identifier of the collectible.
        collectible: CollectibleId,
        /// Display name of the collectible.
        name: String,
        /// Description shown in the inventory.
        description: String,
    },
    /// A glowing point was claimed for the first time.
    GlowingPointCollected {
        /// Identifier of the glowing point.
        point: GlowingPointId,
        /// Reward carried by the glowing point.
        points: u32,
    },
    /// Persisted collection state was applied.
    CollectionHydrated {
        /// Collectibles whose flag was restored.
        collectibles: Vec<CollectibleId>,
    },
    /// Battle mode was entered or left.
    BattleModeChanged {
        /// Whether a battle is initiated.
        active: bool,
    },
}

/// Two-dimensional position in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate growing to the right.
    pub x: f32,
    /// Vertical coordinate growing downwards.
    pub y: f32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns this position shifted by `delta`.
    #[must_use]
    pub fn offset(self, delta: Position) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }

    /// Shifts this position in place by `delta`.
    pub fn shift(&mut self, delta: Position) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

/// Width and height of an entity in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Size {
    /// Creates a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Square size with equal sides.
    #[must_use]
    pub const fn square(side: f32) -> Self {
        Self::new(side, side)
    }

    /// Area covered by the size.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub position: Position,
    /// Extent of the rectangle.
    pub size: Size,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(position: Position, size: Size) -> Self {
        Self { position, size }
    }

    /// Left edge.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.position.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.position.x + self.size.width
    }

    /// Top edge.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.position.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }

    /// Returns the rectangle shifted by `delta`.
    #[must_use]
    pub fn translated(&self, delta: Position) -> Self {
        Self::new(self.position.offset(delta), self.size)
    }
}

/// Anything that occupies an axis-aligned box on the canvas.
pub trait Bounded {
    /// Bounding box of the entity in canvas pixels.
    fn bounds(&self) -> Rect;
}

impl Bounded for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

/// Reports whether two boxes intersect.
///
/// Edges are inclusive on all four sides, so boxes that merely touch count as
/// overlapping.
#[must_use]
pub fn overlaps<A, B>(a: &A, b: &B) -> bool
where
    A: Bounded + ?Sized,
    B: Bounded + ?Sized,
{
    let a = a.bounds();
    let b = b.bounds();
    a.right() >= b.left() && a.left() <= b.right() && a.top() <= b.bottom() && a.bottom() >= b.top()
}

/// Area shared by two boxes, zero when they are disjoint.
#[must_use]
pub fn overlap_area<A, B>(a: &A, b: &B) -> f32
where
    A: Bounded + ?Sized,
    B: Bounded + ?Sized,
{
    let a = a.bounds();
    let b = b.bounds();
    let width = (a.right().min(b.right()) - a.left().max(b.left())).max(0.0);
    let height = (a.bottom().min(b.bottom()) - a.top().max(b.top())).max(0.0);
    width * height
}

/// Cardinal directions bound to the W/A/S/D keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// `W`: walk towards the top of the screen.
    Up,
    /// `A`: walk towards the left of the screen.
    Left,
    /// `S`: walk towards the bottom of the screen.
    Down,
    /// `D`: walk towards the right of the screen.
    Right,
}

impl Direction {
    /// Every direction in key order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    /// Offset applied to the world when the player walks in this direction.
    ///
    /// The player stays centered on the canvas, so the world scrolls the
    /// opposite way.
    #[must_use]
    pub fn world_delta(self, speed: f32) -> Position {
        match self {
            Self::Up => Position::new(0.0, speed),
            Self::Left => Position::new(speed, 0.0),
            Self::Down => Position::new(0.0, -speed),
            Self::Right => Position::new(-speed, 0.0),
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Left => 1,
            Self::Down => 2,
            Self::Right => 3,
        }
    }
}

/// Held movement keys plus the most recently pressed one.
///
/// Only the most recently pressed direction moves the player, and only while
/// it is still held, so holding two keys never produces diagonal movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    held: [bool; 4],
    last: Option<Direction>,
    sprint: bool,
}

impl KeyState {
    /// Creates a key state with nothing held.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            held: [false; 4],
            last: None,
            sprint: false,
        }
    }

    /// Records a key press, making it the last pressed direction.
    pub fn press(&mut self, direction: Direction) {
        self.held[direction.index()] = true;
        self.last = Some(direction);
    }

    /// Records a key release.
    pub fn release(&mut self, direction: Direction) {
        self.held[direction.index()] = false;
    }

    /// Updates whether the sprint modifier is held.
    pub fn set_sprint(&mut self, sprint: bool) {
        self.sprint = sprint;
    }

    /// Whether the sprint modifier is held.
    #[must_use]
    pub const fn sprinting(&self) -> bool {
        self.sprint
    }

    /// Whether the provided direction key is held.
    #[must_use]
    pub const fn is_held(&self, direction: Direction) -> bool {
        self.held[direction.index()]
    }

    /// Whether any movement key is held.
    #[must_use]
    pub fn any_direction_held(&self) -> bool {
        self.held.iter().any(|held| *held)
    }

    /// Direction that moves the player this frame.
    #[must_use]
    pub fn active_direction(&self) -> Option<Direction> {
        self.last.filter(|direction| self.is_held(*direction))
    }

    /// Releases every movement key and the sprint modifier.
    pub fn reset(&mut self) {
        self.held = [false; 4];
        self.sprint = false;
    }
}

/// Tuning for the player's jump arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JumpConfig {
    /// Upward velocity at take-off, in pixels per frame.
    pub power: f32,
    /// Velocity lost per frame.
    pub gravity: f32,
    /// Frames that must pass after landing before the next jump.
    pub cooldown_frames: u32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            power: 18.0,
            gravity: 1.2,
            cooldown_frames: 24,
        }
    }
}

/// Result of advancing the jump arc by one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpProgress {
    /// The player is on the ground.
    Grounded,
    /// The player is airborne.
    Airborne,
    /// The player touched down this frame.
    Landed,
}

/// Vertical visual offset arc layered on top of world movement.
///
/// The arc never touches the collision box; it only lifts the drawn sprite.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JumpState {
    is_jumping: bool,
    velocity: f32,
    elevation: f32,
    cooldown: u32,
}

impl JumpState {
    /// Starts a jump when grounded and the cooldown has elapsed.
    ///
    /// Returns `false` without changing anything otherwise.
    pub fn try_start(&mut self, config: &JumpConfig) -> bool {
        if self.is_jumping || self.cooldown > 0 {
            return false;
        }
        self.is_jumping = true;
        self.velocity = config.power;
        true
    }

    /// Advances the arc by a single frame.
    pub fn advance(&mut self, config: &JumpConfig) -> JumpProgress {
        if !self.is_jumping {
            self.cooldown = self.cooldown.saturating_sub(1);
            return JumpProgress::Grounded;
        }

        self.velocity -= config.gravity;
        self.elevation += self.velocity;

        if self.elevation <= 0.0 {
            self.elevation = 0.0;
            self.velocity = 0.0;
            self.is_jumping = false;
            self.cooldown = config.cooldown_frames;
            return JumpProgress::Landed;
        }

        JumpProgress::Airborne
    }

    /// Whether the player is airborne.
    #[must_use]
    pub const fn is_jumping(&self) -> bool {
        self.is_jumping
    }

    /// Current vertical velocity.
    #[must_use]
    pub const fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Height above the ground, never negative.
    #[must_use]
    pub const fn elevation(&self) -> f32 {
        self.elevation
    }

    /// Frames left before another jump may start.
    #[must_use]
    pub const fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Vertical offset applied when drawing the player.
    #[must_use]
    pub fn draw_offset(&self) -> f32 {
        -self.elevation
    }
}

/// Identifier assigned to a character by the tile map builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(u32);

impl CharacterId {
    /// Creates a new character identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier assigned to a glowing point when it is scattered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlowingPointId(u32);

impl GlowingPointId {
    /// Creates a new glowing point identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Stable identity of a collectible, persisted by the collection store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectibleId(String);

impl CollectibleId {
    /// Creates a new collectible identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrowed string form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque handle to an image supplied by the asset adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpriteKey {
    /// Pre-rendered town map.
    Background,
    /// Objects drawn above the player (roof tops, tree crowns).
    Foreground,
    /// Player walking up.
    PlayerUp,
    /// Player walking left.
    PlayerLeft,
    /// Player walking down.
    PlayerDown,
    /// Player walking right.
    PlayerRight,
    /// Villager idle sheet.
    Villager,
    /// Vendor idle sheet.
    Vendor,
    /// Backdrop of the battle screen.
    BattleBackground,
    /// The player's monster.
    Emby,
    /// The wild monster.
    Draggle,
}

impl SpriteKey {
    /// Facing image for the provided direction.
    #[must_use]
    pub const fn player_facing(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::PlayerUp,
            Direction::Left => Self::PlayerLeft,
            Direction::Down => Self::PlayerDown,
            Direction::Right => Self::PlayerRight,
        }
    }
}

/// Byte RGB color attached to attacks and pickups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tint {
    red: u8,
    green: u8,
    blue: u8,
}

impl Tint {
    /// Creates a new tint from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Elemental type of an attack, shown in the hover preview.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    /// Plain physical attack.
    Normal,
    /// Fire attack.
    Fire,
}

impl AttackKind {
    /// Label shown in the attack type box.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Fire => "Fire",
        }
    }
}

/// Read-only attack template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    /// Name shown in the attack menu and used to look up multipliers.
    pub name: String,
    /// Base damage dealt to the opponent.
    pub damage: u32,
    /// Elemental type.
    pub kind: AttackKind,
    /// Color of the attack type label.
    pub tint: Tint,
}

impl Attack {
    /// Basic physical attack.
    #[must_use]
    pub fn tackle() -> Self {
        Self {
            name: "Tackle".to_owned(),
            damage: 10,
            kind: AttackKind::Normal,
            tint: Tint::from_rgb(0, 0, 0),
        }
    }

    /// Fire projectile attack.
    #[must_use]
    pub fn fireball() -> Self {
        Self {
            name: "Fireball".to_owned(),
            damage: 25,
            kind: AttackKind::Fire,
            tint: Tint::from_rgb(0xff, 0, 0),
        }
    }

    /// Returns a copy whose damage is scaled and rounded.
    ///
    /// The template itself is never modified, so repeated uses do not
    /// compound the multiplier.
    #[must_use]
    pub fn scaled(&self, multiplier: f32) -> Self {
        let mut scaled = self.clone();
        if (multiplier - 1.0).abs() > f32::EPSILON {
            let damage = (self.damage as f32 * multiplier).round().max(0.0);
            scaled.damage = damage as u32;
        }
        scaled
    }
}

/// Static description of a monster before it enters a battle.
#[derive(Clone, Debug, PartialEq)]
pub struct MonsterTemplate {
    /// Display name.
    pub name: String,
    /// Image drawn on the battle screen.
    pub sprite: SpriteKey,
    /// Move set offered in the attack menu or drawn from at random.
    pub attacks: Vec<Attack>,
    /// Where the monster stands on the battle screen.
    pub position: Position,
}

impl MonsterTemplate {
    /// The player's fire monster.
    #[must_use]
    pub fn emby() -> Self {
        Self {
            name: "Emby".to_owned(),
            sprite: SpriteKey::Emby,
            attacks: vec![Attack::tackle(), Attack::fireball()],
            position: Position::new(280.0, 325.0),
        }
    }

    /// The wild monster lurking in the tall grass.
    #[must_use]
    pub fn draggle() -> Self {
        Self {
            name: "Draggle".to_owned(),
            sprite: SpriteKey::Draggle,
            attacks: vec![Attack::tackle(), Attack::fireball()],
            position: Position::new(800.0, 100.0),
        }
    }
}

/// Battle effect granted by holding an inventory item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemEffect {
    /// Human-readable description of the effect.
    pub summary: String,
    /// Damage multipliers keyed by attack name.
    pub attack_multipliers: Vec<(String, f32)>,
    /// Health restored once when a battle starts.
    pub start_battle_heal: u32,
    /// Health restored after every enemy attack.
    pub post_enemy_attack_heal: u32,
}

impl ItemEffect {
    /// Effect granted by the item with the provided identifier, if any.
    #[must_use]
    pub fn for_item(id: &CollectibleId) -> Option<Self> {
        match id.as_str() {
            "ancient-orb" => Some(Self {
                summary: "Ancient Orb: Fireball damage +30%.".to_owned(),
                attack_multipliers: vec![("Fireball".to_owned(), 1.3)],
                ..Self::default()
            }),
            "sunshard" => Some(Self {
                summary: "Sun Shard: Restore 25 HP when battle starts.".to_owned(),
                start_battle_heal: 25,
                ..Self::default()
            }),
            "aqua-bloom" => Some(Self {
                summary: "Aqua Bloom: Heal 15 HP after enemy attacks.".to_owned(),
                post_enemy_attack_heal: 15,
                ..Self::default()
            }),
            _ => None,
        }
    }
}

/// Aggregated battle bonuses derived from the inventory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bonuses {
    /// Damage multipliers keyed by attack name.
    pub attack_multipliers: BTreeMap<String, f32>,
    /// Health restored once when a battle starts.
    pub start_battle_heal: u32,
    /// Health restored after every enemy attack.
    pub post_enemy_attack_heal: u32,
    /// De-duplicated effect descriptions in acquisition order.
    pub summaries: Vec<String>,
}

impl Bonuses {
    /// Folds item effects into a single bonus set.
    ///
    /// Multipliers for the same attack multiply, heals add up.
    #[must_use]
    pub fn from_effects<'a, I>(effects: I) -> Self
    where
        I: IntoIterator<Item = &'a ItemEffect>,
    {
        let mut bonuses = Self::default();
        for effect in effects {
            for (attack, multiplier) in &effect.attack_multipliers {
                let current = bonuses.attack_multipliers.entry(attack.clone()).or_insert(1.0);
                *current *= multiplier;
            }
            bonuses.start_battle_heal += effect.start_battle_heal;
            bonuses.post_enemy_attack_heal += effect.post_enemy_attack_heal;
            if !effect.summary.is_empty() && !bonuses.summaries.contains(&effect.summary) {
                bonuses.summaries.push(effect.summary.clone());
            }
        }
        bonuses
    }

    /// Multiplier applied to the named attack, `1.0` when none is held.
    #[must_use]
    pub fn multiplier_for(&self, attack: &str) -> f32 {
        self.attack_multipliers.get(attack).copied().unwrap_or(1.0)
    }
}

/// Entry handed to the inventory collaborator after a pickup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Identifier of the collected item.
    pub id: CollectibleId,
    /// Display name.
    pub name: String,
    /// Description shown in the inventory panel.
    pub description: String,
}

/// Grants points to the player. Persistence is the implementor's concern.
pub trait RewardSink {
    /// Adds `amount` points to the player's total.
    fn award_points(&mut self, amount: u32);
}

/// Supplies battle bonuses derived from held items.
pub trait BonusProvider {
    /// Current aggregated bonuses.
    fn bonuses(&self) -> Bonuses;
}

/// Presents dialogue text for NPC conversations and battle messages.
pub trait DialoguePresenter {
    /// Shows a single line, replacing whatever was shown before.
    fn show_line(&mut self, text: &str);

    /// Hides the dialogue box.
    fn hide_dialogue(&mut self);
}

/// Receives collected items.
pub trait Inventory {
    /// Adds an item, returning `false` when it was already held.
    fn add_item(&mut self, item: InventoryItem) -> bool;
}

/// Persists which collectibles were picked up.
pub trait CollectionStore {
    /// Identifiers collected in earlier sessions.
    fn collected_ids(&self) -> Vec<CollectibleId>;

    /// Records a newly collected identifier.
    fn record_collected(&mut self, id: &CollectibleId);
}

impl BonusProvider for Bonuses {
    fn bonuses(&self) -> Bonuses {
        self.clone()
    }
}

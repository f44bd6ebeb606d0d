#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tallgrass adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::time::Duration;
use tallgrass_core::{DialoguePresenter, Direction, SpriteKey, Tint, CANVAS_HEIGHT, CANVAS_WIDTH};
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with a different alpha.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

impl From<Tint> for Color {
    fn from(tint: Tint) -> Self {
        Self::from_rgb_u8(tint.red(), tint.green(), tint.blue())
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
///
/// Key transitions are edge-triggered: a held key shows up in `pressed` only
/// on the frame it went down.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Movement keys that went down this frame, in detection order.
    pub pressed: Vec<Direction>,
    /// Movement keys that went up this frame.
    pub released: Vec<Direction>,
    /// Whether the sprint modifier is held.
    pub sprint: bool,
    /// Whether the interact/jump key went down this frame.
    pub interact: bool,
    /// Whether an overlay close key went down this frame.
    pub close_overlay: bool,
    /// Cursor position in canvas units, `None` when outside the canvas.
    pub cursor: Option<Vec2>,
    /// Whether the primary button was clicked this frame.
    pub click: bool,
}

/// Letterbox mapping between the fixed canvas and the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Uniform scale applied to canvas units.
    pub scale: f32,
    /// Screen-space position of the canvas origin.
    pub offset: Vec2,
}

impl Viewport {
    /// Fits a canvas into a screen while preserving its aspect ratio.
    #[must_use]
    pub fn fit(canvas: &CanvasPresentation, screen: Vec2) -> Self {
        let scale = (screen.x / canvas.width)
            .min(screen.y / canvas.height)
            .max(0.0);
        let used = Vec2::new(canvas.width, canvas.height) * scale;
        Self {
            scale,
            offset: (screen - used) * 0.5,
        }
    }

    /// Converts a screen position into canvas units.
    #[must_use]
    pub fn to_canvas(&self, screen: Vec2) -> Option<Vec2> {
        if self.scale <= f32::EPSILON {
            return None;
        }
        Some((screen - self.offset) / self.scale)
    }

    /// Converts a canvas position into screen pixels.
    #[must_use]
    pub fn to_screen(&self, canvas: Vec2) -> Vec2 {
        self.offset + canvas * self.scale
    }
}

/// Fixed-size drawing surface the scene is laid out on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasPresentation {
    /// Width in canvas units.
    pub width: f32,
    /// Height in canvas units.
    pub height: f32,
}

impl CanvasPresentation {
    /// Validates and creates a canvas descriptor.
    pub fn new(width: f32, height: f32) -> Result<Self, RenderingError> {
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(RenderingError::InvalidCanvas { width, height });
        }
        Ok(Self { width, height })
    }

    /// Whether a canvas position lies on the surface.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

impl Default for CanvasPresentation {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

/// Image or sprite-sheet frame placed on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteInstance {
    /// Image to draw.
    pub key: SpriteKey,
    /// Top-left corner in canvas units.
    pub position: Vec2,
    /// Destination size, `None` to use the image's native frame size.
    pub size: Option<Vec2>,
    /// Frame drawn from a horizontal sheet.
    pub frame: u32,
    /// Number of frames in the sheet.
    pub frames: u32,
    /// Opacity multiplier.
    pub opacity: f32,
}

impl SpriteInstance {
    /// Single-frame, fully opaque instance drawn at native size.
    #[must_use]
    pub const fn still(key: SpriteKey, position: Vec2) -> Self {
        Self {
            key,
            position,
            size: None,
            frame: 0,
            frames: 1,
            opacity: 1.0,
        }
    }

    /// Instance drawing `frame` out of a `frames`-wide sheet into `size`.
    #[must_use]
    pub fn sheet(key: SpriteKey, position: Vec2, size: Vec2, frame: u32, frames: u32) -> Self {
        let frames = frames.max(1);
        Self {
            key,
            position,
            size: Some(size),
            frame: frame.min(frames - 1),
            frames,
            opacity: 1.0,
        }
    }
}

/// Entry of the back-to-front draw list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneItem {
    /// Textured image.
    Sprite(SpriteInstance),
    /// Solid rectangle used for pickups and primitive fallbacks.
    Shape {
        /// Top-left corner in canvas units.
        position: Vec2,
        /// Rectangle extent.
        size: Vec2,
        /// Fill color.
        color: Color,
    },
}

/// What the scene is currently showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SceneMode {
    /// Exploring the town.
    #[default]
    Overworld,
    /// Fighting a wild monster.
    Battle,
}

/// Health readout drawn above each combatant.
#[derive(Clone, Debug, PartialEq)]
pub struct HealthBar {
    /// Monster name.
    pub name: String,
    /// Remaining health.
    pub health: u32,
    /// Health at full.
    pub max: u32,
}

impl HealthBar {
    /// Share of health left in `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        (self.health.min(self.max) as f32) / self.max as f32
    }
}

/// Attack button of the battle menu.
#[derive(Clone, Debug, PartialEq)]
pub struct AttackButton {
    /// Attack name.
    pub name: String,
    /// Color of the type label when hovered.
    pub tint: Color,
}

/// Type label shown next to the attack menu for the hovered attack.
#[derive(Clone, Debug, PartialEq)]
pub struct AttackTypeLabel {
    /// Type name.
    pub text: String,
    /// Label color.
    pub color: Color,
}

/// Placement of the attack menu at the bottom of the canvas.
///
/// Attack buttons share the left two thirds evenly, the type label uses the
/// remaining third.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackMenuLayout {
    /// Top-left corner of the panel.
    pub origin: Vec2,
    /// Panel extent.
    pub size: Vec2,
}

impl AttackMenuLayout {
    /// Height of the panel in canvas units.
    pub const HEIGHT: f32 = 140.0;

    const BUTTON_SHARE: f32 = 2.0 / 3.0;

    /// Panel docked to the bottom edge of the canvas.
    #[must_use]
    pub fn for_canvas(canvas: &CanvasPresentation) -> Self {
        Self {
            origin: Vec2::new(0.0, canvas.height - Self::HEIGHT),
            size: Vec2::new(canvas.width, Self::HEIGHT),
        }
    }

    /// Top-left corner and size of the button at `index`.
    #[must_use]
    pub fn button_rect(&self, index: usize, count: usize) -> Option<(Vec2, Vec2)> {
        if index >= count {
            return None;
        }
        let width = self.size.x * Self::BUTTON_SHARE / count as f32;
        Some((
            Vec2::new(self.origin.x + width * index as f32, self.origin.y),
            Vec2::new(width, self.size.y),
        ))
    }

    /// Top-left corner and size of the type label box.
    #[must_use]
    pub fn type_box(&self) -> (Vec2, Vec2) {
        let left = self.size.x * Self::BUTTON_SHARE;
        (
            Vec2::new(self.origin.x + left, self.origin.y),
            Vec2::new(self.size.x - left, self.size.y),
        )
    }

    /// Index of the button under `point`, if any.
    #[must_use]
    pub fn button_at(&self, point: Vec2, count: usize) -> Option<usize> {
        (0..count).find(|&index| {
            self.button_rect(index, count).is_some_and(|(origin, size)| {
                point.x >= origin.x
                    && point.x < origin.x + size.x
                    && point.y >= origin.y
                    && point.y <= origin.y + size.y
            })
        })
    }
}

/// Battle overlay: health bars and the attack menu.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleHud {
    /// The player's monster.
    pub player: HealthBar,
    /// The wild monster.
    pub enemy: HealthBar,
    /// Attack buttons in move-set order.
    pub attacks: Vec<AttackButton>,
    /// Type of the hovered attack.
    pub hovered: Option<AttackTypeLabel>,
    /// Where the menu sits.
    pub menu: AttackMenuLayout,
}

/// Text box shared by NPC conversations and battle messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DialogueBox {
    text: Option<String>,
}

impl DialogueBox {
    /// Line currently shown.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Whether the box is visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.text.is_some()
    }
}

impl DialoguePresenter for DialogueBox {
    fn show_line(&mut self, text: &str) {
        self.text = Some(text.to_owned());
    }

    fn hide_dialogue(&mut self) {
        self.text = None;
    }
}

/// Declarative frame content consumed by rendering backends.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scene {
    /// Which screen is shown.
    pub mode: SceneMode,
    /// Draw list, back to front.
    pub items: Vec<SceneItem>,
    /// Battle overlay, present only in battle mode.
    pub battle: Option<BattleHud>,
    /// Dialogue text box.
    pub dialogue: DialogueBox,
    /// Opacity of the black transition curtain.
    pub transition_alpha: f32,
    /// Points collected so far.
    pub points: u32,
    /// Transient pickup message.
    pub loot_notice: Option<String>,
    /// Whether the vendor's marketplace overlay is open.
    pub marketplace_open: bool,
    /// Greeting printed in the corner of the overworld.
    pub banner: Option<String>,
}

impl Scene {
    /// Empty overworld scene carrying the provided greeting.
    #[must_use]
    pub fn new(banner: impl Into<String>) -> Self {
        Self {
            banner: Some(banner.into()),
            ..Self::default()
        }
    }

    /// Drops per-frame content, keeping dialogue, points and overlays.
    pub fn begin_frame(&mut self, mode: SceneMode) {
        self.mode = mode;
        self.items.clear();
        if mode == SceneMode::Overworld {
            self.battle = None;
        }
    }

    /// Pushes a draw entry on top of everything drawn so far.
    pub fn push(&mut self, item: SceneItem) {
        self.items.push(item);
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Logical drawing surface.
    pub canvas: CanvasPresentation,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(
        window_title: T,
        clear_color: Color,
        canvas: CanvasPresentation,
        scene: Scene,
    ) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            canvas,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Tallgrass scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta, per-frame
    /// input captured by the adapter, and mutates the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// The canvas must have a positive, finite extent.
    #[error("canvas must have a positive size (received {width}x{height})")]
    InvalidCanvas {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_creation_rejects_degenerate_sizes() {
        assert!(CanvasPresentation::new(1024.0, 576.0).is_ok());
        let error = CanvasPresentation::new(0.0, 576.0).expect_err("zero width must fail");
        assert!(matches!(error, RenderingError::InvalidCanvas { .. }));
        assert!(CanvasPresentation::new(f32::NAN, 10.0).is_err());
    }

    #[test]
    fn viewport_letterboxes_wide_windows() {
        let canvas = CanvasPresentation::default();
        let viewport = Viewport::fit(&canvas, Vec2::new(2048.0 + 200.0, 1152.0));

        assert_eq!(viewport.scale, 2.0);
        assert_eq!(viewport.offset, Vec2::new(100.0, 0.0));
        assert_eq!(
            viewport.to_canvas(Vec2::new(100.0, 0.0)),
            Some(Vec2::ZERO)
        );
        assert_eq!(
            viewport.to_screen(Vec2::new(1024.0, 576.0)),
            Vec2::new(2148.0, 1152.0)
        );
    }

    #[test]
    fn collapsed_viewport_has_no_canvas_positions() {
        let viewport = Viewport::fit(&CanvasPresentation::default(), Vec2::ZERO);
        assert_eq!(viewport.to_canvas(Vec2::new(5.0, 5.0)), None);
    }

    #[test]
    fn attack_menu_splits_two_thirds_between_buttons() {
        let menu = AttackMenuLayout::for_canvas(&CanvasPresentation::default());
        let y = 576.0 - 70.0;

        assert_eq!(menu.button_at(Vec2::new(10.0, y), 2), Some(0));
        assert_eq!(menu.button_at(Vec2::new(400.0, y), 2), Some(1));
        assert_eq!(menu.button_at(Vec2::new(900.0, y), 2), None);
        assert_eq!(menu.button_at(Vec2::new(10.0, 100.0), 2), None);
        assert_eq!(menu.button_at(Vec2::new(10.0, y), 0), None);

        let (type_origin, type_size) = menu.type_box();
        assert!((type_origin.x + type_size.x - 1024.0).abs() < 1e-3);
    }

    #[test]
    fn dialogue_box_follows_presenter_calls() {
        let mut dialogue = DialogueBox::default();
        dialogue.show_line("Hey mister, have you seen my Doggochu?");
        assert_eq!(
            dialogue.text(),
            Some("Hey mister, have you seen my Doggochu?")
        );
        dialogue.hide_dialogue();
        assert!(!dialogue.is_visible());
    }

    #[test]
    fn begin_frame_keeps_overlays_but_drops_items() {
        let mut scene = Scene::new("Welcome to Pellet Town.");
        scene.points = 25;
        scene.dialogue.show_line("...");
        scene.push(SceneItem::Sprite(SpriteInstance::still(
            SpriteKey::Background,
            Vec2::ZERO,
        )));

        scene.begin_frame(SceneMode::Overworld);

        assert!(scene.items.is_empty());
        assert_eq!(scene.points, 25);
        assert!(scene.dialogue.is_visible());
    }

    #[test]
    fn sheet_instances_clamp_frames() {
        let sprite = SpriteInstance::sheet(
            SpriteKey::PlayerDown,
            Vec2::ZERO,
            Vec2::new(48.0, 68.0),
            7,
            4,
        );
        assert_eq!(sprite.frame, 3);
        assert_eq!(
            SpriteInstance::sheet(SpriteKey::Villager, Vec2::ZERO, Vec2::ONE, 0, 0).frames,
            1
        );
    }

    #[test]
    fn tint_converts_to_opaque_color() {
        let color = Color::from(Tint::from_rgb(255, 0, 0));
        assert_eq!(color, Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(color.with_alpha(2.0).alpha, 1.0);
        assert_eq!(Color::from_rgb_u8(0, 0, 0).lighten(1.0).red, 1.0);
    }

    #[test]
    fn health_bar_fraction_is_bounded() {
        let bar = HealthBar {
            name: "Emby".to_owned(),
            health: 40,
            max: 100,
        };
        assert!((bar.fraction() - 0.4).abs() < f32::EPSILON);
        let empty = HealthBar { max: 0, ..bar };
        assert_eq!(empty.fraction(), 0.0);
    }
}

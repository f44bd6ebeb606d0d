#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Tallgrass.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The scene is laid out on a fixed canvas and letterboxed into the window.
//! Overlays live in the local `hud` module.

mod hud;
mod sprites;

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{
    is_key_down, is_key_pressed, is_key_released, is_mouse_button_pressed, mouse_position,
    KeyCode, MouseButton,
};
use std::{
    collections::VecDeque,
    path::PathBuf,
    time::{Duration, Instant},
};
use tallgrass_core::{Direction, SpriteKey};
use tallgrass_rendering::{
    CanvasPresentation, Color, FrameInput, Presentation, RenderingBackend, Scene, SceneItem,
    SpriteInstance, Viewport,
};
use tracing::{info, warn};

use self::sprites::{DrawParams, SpriteAtlas};

const MOVEMENT_KEYS: [(KeyCode, Direction); 4] = [
    (KeyCode::W, Direction::Up),
    (KeyCode::A, Direction::Left),
    (KeyCode::S, Direction::Down),
    (KeyCode::D, Direction::Right),
];

/// Raw keyboard and mouse observations for a single frame.
///
/// Split from polling so the translation into [`FrameInput`] can be replayed
/// without a window.
#[doc(hidden)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputObservations {
    /// Movement keys that went down this frame.
    pub pressed: Vec<Direction>,
    /// Movement keys that went up this frame.
    pub released: Vec<Direction>,
    /// Whether either shift key is held.
    pub shift_down: bool,
    /// Whether space went down this frame.
    pub space_pressed: bool,
    /// Whether escape went down this frame.
    pub escape_pressed: bool,
    /// Whether `M` went down this frame.
    pub m_pressed: bool,
    /// Cursor position in window pixels.
    pub cursor_screen: Vec2,
    /// Whether the left button was clicked.
    pub left_click: bool,
}

impl InputObservations {
    fn poll() -> Self {
        let mut observations = Self::default();
        for (key, direction) in MOVEMENT_KEYS {
            if is_key_pressed(key) {
                observations.pressed.push(direction);
            }
            if is_key_released(key) {
                observations.released.push(direction);
            }
        }
        observations.shift_down = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);
        observations.space_pressed = is_key_pressed(KeyCode::Space);
        observations.escape_pressed = is_key_pressed(KeyCode::Escape);
        observations.m_pressed = is_key_pressed(KeyCode::M);
        let (x, y) = mouse_position();
        observations.cursor_screen = Vec2::new(x, y);
        observations.left_click = is_mouse_button_pressed(MouseButton::Left);
        observations
    }

    /// Translates the observations into canvas-space frame input.
    #[must_use]
    pub fn into_frame_input(self, canvas: &CanvasPresentation, viewport: &Viewport) -> FrameInput {
        let cursor = viewport
            .to_canvas(self.cursor_screen)
            .filter(|point| canvas.contains(*point));

        FrameInput {
            pressed: self.pressed,
            released: self.released,
            sprint: self.shift_down,
            interact: self.space_pressed,
            close_overlay: self.escape_pressed || self.m_pressed,
            click: self.left_click && cursor.is_some(),
            cursor,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    load_sprites: bool,
    manifest_path: PathBuf,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            load_sprites: true,
            manifest_path: SpriteAtlas::default_manifest_path(),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures whether the backend should attempt to load sprite assets.
    #[must_use]
    pub fn with_sprite_loading(mut self, enabled: bool) -> Self {
        self.load_sprites = enabled;
        self
    }

    /// Overrides the sprite manifest location.
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }
}

/// Per-second frame statistics.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    simulation_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_simulation: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns averages once a second has elapsed.
    fn record_frame(
        &mut self,
        frame: Duration,
        simulation: Duration,
        render: Duration,
    ) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation_accum += simulation;
        self.render_accum += render;

        self.frame_times.push_back(frame);
        self.window_duration += frame;
        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            let Some(removed) = self.frame_times.pop_front() else {
                break;
            };
            self.window_duration = self.window_duration.saturating_sub(removed);
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames.max(1);
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let metrics = FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_simulation: self.simulation_accum / frames,
            avg_render: self.render_accum / frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.simulation_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            load_sprites,
            manifest_path,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            canvas,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: canvas.width as i32,
            window_height: canvas.height as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let sprite_atlas = if load_sprites {
                match SpriteAtlas::from_manifest_path(&manifest_path) {
                    Ok(atlas) => Some(atlas),
                    Err(error) => {
                        warn!(?error, "sprites unavailable, drawing primitives");
                        None
                    }
                }
            } else {
                None
            };

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                macroquad::window::clear_background(background);

                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let viewport = Viewport::fit(&canvas, screen);
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = InputObservations::poll().into_frame_input(&canvas, &viewport);

                let simulation_start = Instant::now();
                update_scene(frame_dt, frame_input, &mut scene);
                let simulation_duration = simulation_start.elapsed();

                let render_start = Instant::now();
                for item in &scene.items {
                    draw_item(item, &canvas, &viewport, sprite_atlas.as_ref());
                }
                hud::draw_overlays(&scene, &canvas, &viewport);
                draw_letterbox(&canvas, &viewport, screen, background);
                let render_duration = render_start.elapsed();

                let metrics =
                    fps_counter.record_frame(frame_dt, simulation_duration, render_duration);
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_simulation,
                        avg_render,
                    }) = metrics
                    {
                        info!(
                            fps = per_second,
                            fps_10s = trailing_ten_seconds,
                            sim_ms = avg_simulation.as_secs_f64() * 1_000.0,
                            render_ms = avg_render.as_secs_f64() * 1_000.0,
                            "frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn draw_item(
    item: &SceneItem,
    canvas: &CanvasPresentation,
    viewport: &Viewport,
    atlas: Option<&SpriteAtlas>,
) {
    match *item {
        SceneItem::Shape {
            position,
            size,
            color,
        } => fill_canvas_rect(viewport, position, size, color),
        SceneItem::Sprite(sprite) => {
            let drawn = atlas
                .filter(|atlas| atlas.contains(sprite.key))
                .map(|atlas| {
                    atlas.draw(
                        sprite.key,
                        DrawParams {
                            position: viewport.to_screen(sprite.position),
                            size: sprite.size.map(|size| size * viewport.scale),
                            scale: viewport.scale,
                            frame: sprite.frame,
                            frames: sprite.frames,
                            tint: Color::new(1.0, 1.0, 1.0, sprite.opacity),
                        },
                    )
                });
            match drawn {
                Some(Ok(())) => {}
                Some(Err(error)) => warn!(?error, key = ?sprite.key, "sprite draw failed"),
                None => draw_primitive_sprite(&sprite, canvas, viewport),
            }
        }
    }
}

/// Flat stand-in used when sprites are disabled or failed to load.
fn draw_primitive_sprite(sprite: &SpriteInstance, canvas: &CanvasPresentation, viewport: &Viewport) {
    let Some(color) = primitive_color(sprite.key) else {
        return;
    };
    let size = match sprite.key {
        SpriteKey::BattleBackground => Vec2::new(canvas.width, canvas.height),
        _ => sprite.size.unwrap_or(Vec2::splat(96.0)),
    };
    fill_canvas_rect(
        viewport,
        sprite.position,
        size,
        color.with_alpha(color.alpha * sprite.opacity),
    );
}

fn primitive_color(key: SpriteKey) -> Option<Color> {
    match key {
        SpriteKey::Background => Some(Color::from_rgb_u8(112, 168, 96)),
        SpriteKey::Foreground => None,
        SpriteKey::PlayerUp
        | SpriteKey::PlayerLeft
        | SpriteKey::PlayerDown
        | SpriteKey::PlayerRight => Some(Color::from_rgb_u8(40, 72, 160)),
        SpriteKey::Villager => Some(Color::from_rgb_u8(200, 120, 40)),
        SpriteKey::Vendor => Some(Color::from_rgb_u8(120, 60, 160)),
        SpriteKey::BattleBackground => Some(Color::from_rgb_u8(200, 224, 184)),
        SpriteKey::Emby => Some(Color::from_rgb_u8(220, 80, 40)),
        SpriteKey::Draggle => Some(Color::from_rgb_u8(80, 160, 80)),
    }
}

fn fill_canvas_rect(viewport: &Viewport, position: Vec2, size: Vec2, color: Color) {
    let screen = viewport.to_screen(position);
    let scaled = size * viewport.scale;
    macroquad::shapes::draw_rectangle(
        screen.x,
        screen.y,
        scaled.x,
        scaled.y,
        to_macroquad_color(color),
    );
}

/// Covers anything drawn outside the canvas, such as the scrolled-off map.
fn draw_letterbox(
    canvas: &CanvasPresentation,
    viewport: &Viewport,
    screen: Vec2,
    background: macroquad::color::Color,
) {
    let origin = viewport.to_screen(Vec2::ZERO);
    let far = viewport.to_screen(Vec2::new(canvas.width, canvas.height));
    let bars = [
        (0.0, 0.0, screen.x, origin.y),
        (0.0, far.y, screen.x, screen.y - far.y),
        (0.0, 0.0, origin.x, screen.y),
        (far.x, 0.0, screen.x - far.x, screen.y),
    ];
    for (x, y, width, height) in bars {
        if width > 0.0 && height > 0.0 {
            macroquad::shapes::draw_rectangle(x, y, width, height, background);
        }
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

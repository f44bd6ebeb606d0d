//! Overlays drawn on top of the scene: battle HUD, dialogue box and notices.
//!
//! Everything is laid out in canvas units and mapped through the letterbox
//! viewport so overlays scale with the window.

use glam::Vec2;
use macroquad::{
    color::{Color as MacroquadColor, BLACK, WHITE},
    shapes::{draw_rectangle, draw_rectangle_lines},
    text::draw_text,
};
use tallgrass_rendering::{
    AttackMenuLayout, BattleHud, CanvasPresentation, HealthBar, Scene, SceneMode, Viewport,
};

use crate::to_macroquad_color;

const FONT_SIZE: f32 = 24.0;
const SMALL_FONT_SIZE: f32 = 18.0;
const HEALTH_BAR_WIDTH: f32 = 250.0;
const HEALTH_BAR_HEIGHT: f32 = 5.0;
const PANEL_BORDER: f32 = 4.0;
const HEALTH_FILL: MacroquadColor = MacroquadColor::new(0.0, 0.8, 0.35, 1.0);
const HEALTH_TRACK: MacroquadColor = MacroquadColor::new(0.8, 0.8, 0.8, 1.0);
const GOLD: MacroquadColor = MacroquadColor::new(1.0, 0.84, 0.3, 1.0);

/// Draws every overlay the scene requests, curtain last.
pub(crate) fn draw_overlays(scene: &Scene, canvas: &CanvasPresentation, viewport: &Viewport) {
    match scene.mode {
        SceneMode::Overworld => draw_status(scene, canvas, viewport),
        SceneMode::Battle => {
            if let Some(hud) = &scene.battle {
                draw_battle_hud(hud, viewport);
            }
        }
    }

    if let Some(line) = scene.dialogue.text() {
        draw_dialogue(line, canvas, viewport);
    }

    if scene.marketplace_open {
        draw_marketplace(canvas, viewport);
    }

    if scene.transition_alpha > 0.0 {
        let curtain = MacroquadColor::new(0.0, 0.0, 0.0, scene.transition_alpha.min(1.0));
        fill(
            viewport,
            Vec2::ZERO,
            Vec2::new(canvas.width, canvas.height),
            curtain,
        );
    }
}

fn draw_status(scene: &Scene, canvas: &CanvasPresentation, viewport: &Viewport) {
    if let Some(banner) = &scene.banner {
        label(viewport, banner, Vec2::new(12.0, 28.0), FONT_SIZE, WHITE);
    }
    let points = format!("Points: {}", scene.points);
    label(
        viewport,
        &points,
        Vec2::new(canvas.width - 180.0, 28.0),
        FONT_SIZE,
        GOLD,
    );
    if let Some(notice) = &scene.loot_notice {
        label(viewport, notice, Vec2::new(12.0, 60.0), SMALL_FONT_SIZE, GOLD);
    }
}

fn draw_battle_hud(hud: &BattleHud, viewport: &Viewport) {
    draw_health_bar(&hud.enemy, Vec2::new(50.0, 50.0), viewport);
    draw_health_bar(&hud.player, Vec2::new(650.0, 330.0), viewport);
    draw_attack_menu(hud, viewport);
}

fn draw_health_bar(bar: &HealthBar, origin: Vec2, viewport: &Viewport) {
    let panel = Vec2::new(HEALTH_BAR_WIDTH + 24.0, 56.0);
    fill(viewport, origin, panel, WHITE);
    outline(viewport, origin, panel, BLACK);
    label(
        viewport,
        &bar.name,
        origin + Vec2::new(12.0, 24.0),
        SMALL_FONT_SIZE,
        BLACK,
    );
    let track = origin + Vec2::new(12.0, 38.0);
    fill(
        viewport,
        track,
        Vec2::new(HEALTH_BAR_WIDTH, HEALTH_BAR_HEIGHT),
        HEALTH_TRACK,
    );
    fill(
        viewport,
        track,
        Vec2::new(HEALTH_BAR_WIDTH * bar.fraction(), HEALTH_BAR_HEIGHT),
        HEALTH_FILL,
    );
}

fn draw_attack_menu(hud: &BattleHud, viewport: &Viewport) {
    let menu = hud.menu;
    fill(viewport, menu.origin, menu.size, WHITE);
    outline(viewport, menu.origin, menu.size, BLACK);

    let count = hud.attacks.len();
    for (index, attack) in hud.attacks.iter().enumerate() {
        let Some((origin, size)) = menu.button_rect(index, count) else {
            continue;
        };
        outline(viewport, origin, size, BLACK);
        label(
            viewport,
            &attack.name,
            origin + Vec2::new(16.0, size.y * 0.5 + 8.0),
            FONT_SIZE,
            BLACK,
        );
    }

    let (origin, size) = menu.type_box();
    outline(viewport, origin, size, BLACK);
    let (text, color) = match &hud.hovered {
        Some(hovered) => (hovered.text.as_str(), to_macroquad_color(hovered.color)),
        None => ("Attack Type", BLACK),
    };
    label(
        viewport,
        text,
        origin + Vec2::new(16.0, size.y * 0.5 + 8.0),
        FONT_SIZE,
        color,
    );
}

fn draw_dialogue(line: &str, canvas: &CanvasPresentation, viewport: &Viewport) {
    let layout = AttackMenuLayout::for_canvas(canvas);
    fill(viewport, layout.origin, layout.size, WHITE);
    outline(viewport, layout.origin, layout.size, BLACK);
    label(
        viewport,
        line,
        layout.origin + Vec2::new(16.0, 40.0),
        FONT_SIZE,
        BLACK,
    );
}

fn draw_marketplace(canvas: &CanvasPresentation, viewport: &Viewport) {
    fill(
        viewport,
        Vec2::ZERO,
        Vec2::new(canvas.width, canvas.height),
        MacroquadColor::new(0.0, 0.0, 0.0, 0.75),
    );
    let center = Vec2::new(canvas.width * 0.5, canvas.height * 0.5);
    label(
        viewport,
        "Stellar Bazaar",
        center - Vec2::new(90.0, 20.0),
        FONT_SIZE * 1.5,
        GOLD,
    );
    label(
        viewport,
        "Press Esc or M to close",
        center + Vec2::new(-100.0, 24.0),
        SMALL_FONT_SIZE,
        WHITE,
    );
}

fn fill(viewport: &Viewport, origin: Vec2, size: Vec2, color: MacroquadColor) {
    let screen = viewport.to_screen(origin);
    let scaled = size * viewport.scale;
    draw_rectangle(screen.x, screen.y, scaled.x, scaled.y, color);
}

fn outline(viewport: &Viewport, origin: Vec2, size: Vec2, color: MacroquadColor) {
    let screen = viewport.to_screen(origin);
    let scaled = size * viewport.scale;
    draw_rectangle_lines(
        screen.x,
        screen.y,
        scaled.x,
        scaled.y,
        PANEL_BORDER * viewport.scale,
        color,
    );
}

fn label(viewport: &Viewport, text: &str, baseline: Vec2, font_size: f32, color: MacroquadColor) {
    let screen = viewport.to_screen(baseline);
    draw_text(text, screen.x, screen.y, font_size * viewport.scale, color);
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure movement controller that turns held keys into world scroll commands.
//!
//! The player never leaves the canvas center. Walking is expressed by
//! scrolling every movable entity the opposite way, and a frame's movement is
//! cancelled outright when the shifted scene would touch any boundary.

use tallgrass_core::{overlaps, CharacterId, Command, KeyState, Rect};
use tracing::trace;

/// Walking speed tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementConfig {
    /// Pixels scrolled per frame while walking.
    pub base_speed: f32,
    /// Factor applied to the base speed while the sprint modifier is held.
    pub sprint_multiplier: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            base_speed: 3.0,
            sprint_multiplier: 1.6,
        }
    }
}

/// Pure system that resolves directional input against the map's boundaries.
#[derive(Clone, Copy, Debug, Default)]
pub struct Movement {
    config: MovementConfig,
}

impl Movement {
    /// Creates a movement controller with the provided tunables.
    #[must_use]
    pub const fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    /// Speed for the current frame.
    #[must_use]
    pub fn speed(&self, sprinting: bool) -> f32 {
        if sprinting {
            self.config.base_speed * self.config.sprint_multiplier
        } else {
            self.config.base_speed
        }
    }

    /// Emits the commands for a single frame of walking.
    ///
    /// Nothing is emitted unless the last pressed direction is still held.
    /// Otherwise the facing is updated, the nearest character in reach of the
    /// step becomes the interaction target and, when no boundary blocks the
    /// step, the world scrolls.
    pub fn handle<B, C>(
        &self,
        keys: &KeyState,
        player: &Rect,
        boundaries: B,
        characters: C,
        out: &mut Vec<Command>,
    ) where
        B: IntoIterator<Item = Rect>,
        C: IntoIterator<Item = (CharacterId, Rect)>,
    {
        let Some(direction) = keys.active_direction() else {
            return;
        };

        let sprinting = keys.sprinting();
        let delta = direction.world_delta(self.speed(sprinting));

        out.push(Command::SetPlayerMotion {
            facing: Some(direction),
            sprinting,
        });

        let target = characters
            .into_iter()
            .find(|(_, bounds)| overlaps(player, &bounds.translated(delta)))
            .map(|(id, _)| id);
        out.push(Command::SetInteractionTarget { character: target });

        let blocked = boundaries
            .into_iter()
            .any(|boundary| overlaps(player, &boundary.translated(delta)));
        if blocked {
            trace!(?direction, "step blocked by boundary");
            return;
        }

        out.push(Command::ScrollWorld { delta });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tallgrass_core::{Direction, Position, Size};

    const NO_TILES: [Rect; 0] = [];
    const NO_CHARACTERS: [(CharacterId, Rect); 0] = [];

    fn player() -> Rect {
        Rect::new(Position::new(488.0, 254.0), Size::new(48.0, 68.0))
    }

    fn tile(x: f32, y: f32) -> Rect {
        Rect::new(Position::new(x, y), Size::square(48.0))
    }

    fn walking(direction: Direction) -> KeyState {
        let mut keys = KeyState::new();
        keys.press(direction);
        keys
    }

    #[test]
    fn sprint_scales_speed() {
        let movement = Movement::default();
        assert_eq!(movement.speed(false), 3.0);
        assert!((movement.speed(true) - 4.8).abs() < 1e-6);
    }

    #[test]
    fn idle_keys_emit_nothing() {
        let mut keys = KeyState::new();
        keys.press(Direction::Up);
        keys.release(Direction::Up);
        let mut out = Vec::new();

        Movement::default().handle(&keys, &player(), NO_TILES, NO_CHARACTERS, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn free_step_scrolls_the_world() {
        let mut out = Vec::new();
        Movement::default().handle(&walking(Direction::Right), &player(), NO_TILES, NO_CHARACTERS, &mut out);

        assert_eq!(
            out,
            vec![
                Command::SetPlayerMotion {
                    facing: Some(Direction::Right),
                    sprinting: false,
                },
                Command::SetInteractionTarget { character: None },
                Command::ScrollWorld {
                    delta: Position::new(-3.0, 0.0),
                },
            ]
        );
    }

    #[test]
    fn boundary_one_step_away_blocks() {
        let mut out = Vec::new();
        let wall = tile(488.0, 254.0 - 48.0 - 3.0);

        Movement::default().handle(&walking(Direction::Up), &player(), [wall], NO_CHARACTERS, &mut out);

        assert!(!out
            .iter()
            .any(|command| matches!(command, Command::ScrollWorld { .. })));
    }

    #[test]
    fn boundary_behind_the_player_does_not_block() {
        let mut out = Vec::new();
        let wall = tile(488.0, 322.0 + 1.0);

        Movement::default().handle(&walking(Direction::Up), &player(), [wall], NO_CHARACTERS, &mut out);

        assert!(matches!(out.last(), Some(Command::ScrollWorld { .. })));
    }

    #[test]
    fn character_in_reach_becomes_target() {
        let mut out = Vec::new();
        let villager = CharacterId::new(3);
        let characters = [(villager, tile(488.0 + 48.0 + 2.0, 254.0))];

        Movement::default().handle(
            &walking(Direction::Right),
            &player(),
            NO_TILES,
            characters,
            &mut out,
        );

        assert!(out.contains(&Command::SetInteractionTarget {
            character: Some(villager)
        }));
    }
}

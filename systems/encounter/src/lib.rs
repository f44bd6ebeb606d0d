#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Random encounter trigger for the tall grass.

use rand::Rng;
use tallgrass_core::{overlap_area, overlaps, Command, KeyState, Rect};
use tracing::debug;

/// Encounter tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncounterConfig {
    /// Probability that a qualifying frame starts a battle.
    pub chance: f64,
    /// Share of the player's area that must lie inside the zone.
    pub min_overlap_ratio: f32,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            chance: 0.01,
            min_overlap_ratio: 0.5,
        }
    }
}

/// Pure system that decides whether walking through grass starts a battle.
#[derive(Clone, Copy, Debug, Default)]
pub struct Encounter {
    config: EncounterConfig,
}

impl Encounter {
    /// Creates an encounter trigger with the provided tunables.
    #[must_use]
    pub const fn new(config: EncounterConfig) -> Self {
        Self { config }
    }

    /// Rolls for an encounter against each zone in creation order.
    ///
    /// Only runs while a movement key is held and no battle is initiated.
    /// The random source is sampled once per zone that sufficiently overlaps
    /// the player, and the first successful roll pushes a single
    /// `SetBattleActive` command.
    pub fn handle<Z, R>(
        &self,
        keys: &KeyState,
        battle_active: bool,
        player: &Rect,
        zones: Z,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> bool
    where
        Z: IntoIterator<Item = Rect>,
        R: Rng,
    {
        if battle_active || !keys.any_direction_held() {
            return false;
        }

        let threshold = player.size.area() * self.config.min_overlap_ratio;
        for zone in zones {
            if !overlaps(player, &zone) || overlap_area(player, &zone) <= threshold {
                continue;
            }
            if rng.gen::<f64>() < self.config.chance {
                debug!(zone_x = zone.left(), zone_y = zone.top(), "wild encounter");
                out.push(Command::SetBattleActive { active: true });
                return true;
            }
        }

        false
    }
}

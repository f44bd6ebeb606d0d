//! Combatants and their health bookkeeping.

use serde::{Deserialize, Serialize};
use tallgrass_core::{Attack, MonsterTemplate, Position, SpriteKey, MAX_HEALTH};

/// Which side of the battle a combatant fights on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The player's monster.
    Player,
    /// The wild monster.
    Enemy,
}

/// Monster taking part in the current battle.
#[derive(Clone, Debug, PartialEq)]
pub struct Monster {
    name: String,
    sprite: SpriteKey,
    attacks: Vec<Attack>,
    position: Position,
    health: u32,
}

impl Monster {
    /// Spawns a monster at full health.
    #[must_use]
    pub fn from_template(template: &MonsterTemplate) -> Self {
        Self {
            name: template.name.clone(),
            sprite: template.sprite,
            attacks: template.attacks.clone(),
            position: template.position,
            health: MAX_HEALTH,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Image drawn on the battle screen.
    #[must_use]
    pub const fn sprite(&self) -> SpriteKey {
        self.sprite
    }

    /// Move set.
    #[must_use]
    pub fn attacks(&self) -> &[Attack] {
        &self.attacks
    }

    /// Where the monster stands on the battle screen.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Remaining health in `0..=100`.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Whether health reached zero.
    #[must_use]
    pub const fn is_fainted(&self) -> bool {
        self.health == 0
    }

    /// Applies damage floored at zero, returning the health actually lost.
    ///
    /// A fainted monster takes no further damage.
    pub fn receive(&mut self, damage: u32) -> u32 {
        if self.is_fainted() {
            return 0;
        }
        let lost = damage.min(self.health);
        self.health -= lost;
        lost
    }

    /// Restores health capped at the maximum, returning the amount restored.
    ///
    /// Fainted monsters cannot be healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.is_fainted() {
            return 0;
        }
        let restored = amount.min(MAX_HEALTH - self.health);
        self.health += restored;
        restored
    }
}

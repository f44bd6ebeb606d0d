#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn-based battle state machine.
//!
//! A [`BattleSession`] walks through `Idle -> Engaging -> Active -> Resolving
//! -> Idle`. While active, the player picks an attack from the menu, and every
//! consequence of that choice (the enemy's counter-attack, item heals, the
//! faint and victory messages) is queued as a [`BattleStep`]. Exactly one step
//! runs per acknowledgment, so the queue never advances on its own. The
//! session reports what happened as [`BattleEvent`] values and leaves dialogue
//! presentation and reward bookkeeping to the caller.

mod monster;

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tallgrass_core::{Attack, Bonuses, MonsterTemplate, POINTS_PER_BATTLE_VICTORY};
use tracing::{debug, info};

pub use monster::{Monster, Side};

/// Battle pacing and rewards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BattleConfig {
    /// Frames the flashing transition plays before the battle opens.
    pub engage_frames: u32,
    /// Frames the fade back to the overworld takes.
    pub resolve_frames: u32,
    /// Points granted for a victory.
    pub victory_points: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            engage_frames: 120,
            resolve_frames: 24,
            victory_points: POINTS_PER_BATTLE_VICTORY,
        }
    }
}

/// How a battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The wild monster fainted.
    Victory,
    /// The player's monster fainted.
    Defeat,
}

/// Lifecycle of a battle session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattlePhase {
    /// No battle; the overworld is in control.
    Idle,
    /// Transition flash; input is not accepted.
    Engaging {
        /// Frames until the battle opens.
        frames_left: u32,
    },
    /// Combatants are on screen and the attack menu is live.
    Active,
    /// Fade back to the overworld.
    Resolving {
        /// How the battle ended.
        outcome: Outcome,
        /// Frames until control returns to the overworld.
        frames_left: u32,
    },
}

/// Pending presentation or effect step, run one per acknowledgment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleStep {
    /// The enemy counter-attacks with the provided move.
    EnemyAttack {
        /// Move chosen from the enemy's move set.
        attack: Attack,
    },
    /// Item heal applied to the player's monster after an enemy attack.
    Heal {
        /// Health to restore before capping.
        amount: u32,
    },
    /// A combatant faints.
    Faint {
        /// Combatant that fainted.
        side: Side,
    },
    /// The defeat message; nothing is granted.
    Defeat,
    /// The victory message and reward claim.
    Victory {
        /// Points granted.
        points: u32,
    },
    /// Leaves the battle screen.
    Conclude {
        /// How the battle ended.
        outcome: Outcome,
    },
}

/// Observable effects of driving a battle session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BattleEvent {
    /// The session moved to a new phase.
    PhaseChanged {
        /// Phase entered.
        phase: BattlePhase,
    },
    /// A dialogue line should be presented.
    ShowLine {
        /// Text of the line.
        text: String,
    },
    /// The dialogue box should be hidden.
    HideDialogue,
    /// An attack hit its target.
    AttackLanded {
        /// Side that attacked.
        attacker: Side,
        /// Name of the attack.
        attack: String,
        /// Health removed from the target.
        damage: u32,
    },
    /// A combatant's health changed.
    HealthChanged {
        /// Combatant affected.
        side: Side,
        /// Health after the change.
        health: u32,
    },
    /// A combatant fainted.
    Fainted {
        /// Combatant that fainted.
        side: Side,
    },
    /// The victory reward should be granted.
    RewardGranted {
        /// Points to award.
        points: u32,
    },
    /// The battle is over and the overworld resumes.
    Ended {
        /// How the battle ended.
        outcome: Outcome,
    },
}

#[derive(Clone, Debug)]
struct Combatants {
    player: Monster,
    enemy: Monster,
}

impl Combatants {
    fn get(&self, side: Side) -> &Monster {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }
}

/// Battle state machine and its acknowledgment-paced step queue.
#[derive(Clone, Debug)]
pub struct BattleSession {
    config: BattleConfig,
    player_template: MonsterTemplate,
    enemy_template: MonsterTemplate,
    phase: BattlePhase,
    combatants: Option<Combatants>,
    queue: VecDeque<BattleStep>,
    dialogue_visible: bool,
    hovered: Option<usize>,
}

impl Default for BattleSession {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}

impl BattleSession {
    /// Creates an idle session pitting Emby against Draggle.
    #[must_use]
    pub fn new(config: BattleConfig) -> Self {
        Self::with_roster(config, MonsterTemplate::emby(), MonsterTemplate::draggle())
    }

    /// Creates an idle session with custom combatants.
    #[must_use]
    pub fn with_roster(
        config: BattleConfig,
        player_template: MonsterTemplate,
        enemy_template: MonsterTemplate,
    ) -> Self {
        Self {
            config,
            player_template,
            enemy_template,
            phase: BattlePhase::Idle,
            combatants: None,
            queue: VecDeque::new(),
            dialogue_visible: false,
            hovered: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Whether a battle occupies the screen.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        !matches!(self.phase, BattlePhase::Idle)
    }

    /// The player's monster, present once the battle opened.
    #[must_use]
    pub fn player(&self) -> Option<&Monster> {
        self.combatants.as_ref().map(|combatants| &combatants.player)
    }

    /// The wild monster, present once the battle opened.
    #[must_use]
    pub fn enemy(&self) -> Option<&Monster> {
        self.combatants.as_ref().map(|combatants| &combatants.enemy)
    }

    /// Whether a message is waiting for acknowledgment.
    #[must_use]
    pub const fn is_dialogue_visible(&self) -> bool {
        self.dialogue_visible
    }

    /// Steps waiting for acknowledgment, front first.
    pub fn pending_steps(&self) -> impl Iterator<Item = &BattleStep> {
        self.queue.iter()
    }

    /// Whether the attack menu accepts a selection right now.
    #[must_use]
    pub fn accepts_attack(&self) -> bool {
        matches!(self.phase, BattlePhase::Active)
            && !self.dialogue_visible
            && self.combatants.as_ref().map_or(false, |combatants| {
                !combatants.player.is_fainted() && !combatants.enemy.is_fainted()
            })
    }

    /// Starts the transition into a battle.
    ///
    /// Ignored unless the session is idle, so re-triggering an initiated
    /// battle does nothing.
    pub fn engage(&mut self, out: &mut Vec<BattleEvent>) {
        if self.phase != BattlePhase::Idle {
            return;
        }
        self.queue.clear();
        self.dialogue_visible = false;
        self.hovered = None;
        self.enter(
            BattlePhase::Engaging {
                frames_left: self.config.engage_frames,
            },
            out,
        );
    }

    /// Advances the transition effects by one frame.
    ///
    /// `bonuses` is consulted when the battle opens to apply the start heal.
    pub fn tick(&mut self, bonuses: &Bonuses, out: &mut Vec<BattleEvent>) {
        match self.phase {
            BattlePhase::Engaging { frames_left } if frames_left > 1 => {
                self.phase = BattlePhase::Engaging {
                    frames_left: frames_left - 1,
                };
            }
            BattlePhase::Engaging { .. } => self.open(bonuses, out),
            BattlePhase::Resolving {
                outcome,
                frames_left,
            } if frames_left > 1 => {
                self.phase = BattlePhase::Resolving {
                    outcome,
                    frames_left: frames_left - 1,
                };
            }
            BattlePhase::Resolving { outcome, .. } => {
                self.combatants = None;
                self.queue.clear();
                self.hovered = None;
                info!(?outcome, "battle ended");
                self.enter(BattlePhase::Idle, out);
                out.push(BattleEvent::Ended { outcome });
            }
            BattlePhase::Idle | BattlePhase::Active => {}
        }
    }

    fn open(&mut self, bonuses: &Bonuses, out: &mut Vec<BattleEvent>) {
        let mut combatants = Combatants {
            player: Monster::from_template(&self.player_template),
            enemy: Monster::from_template(&self.enemy_template),
        };
        self.queue.clear();
        self.dialogue_visible = false;
        self.enter(BattlePhase::Active, out);

        let restored = combatants.player.heal(bonuses.start_battle_heal);
        if restored > 0 {
            out.push(BattleEvent::HealthChanged {
                side: Side::Player,
                health: combatants.player.health(),
            });
            self.show(
                format!("{} healed for {restored} HP!", combatants.player.name()),
                out,
            );
        }
        self.combatants = Some(combatants);
    }

    /// Records the attack under the cursor for the type preview.
    pub fn hover(&mut self, index: Option<usize>) {
        self.hovered = index;
    }

    /// The attack under the cursor, if any.
    #[must_use]
    pub fn hovered_attack(&self) -> Option<&Attack> {
        let index = self.hovered?;
        self.player()?.attacks().get(index)
    }

    /// Resolves the player's choice of attack.
    ///
    /// Returns `false` without side effects when the menu is not accepting
    /// input or the index is out of range. The bonuses scale the attack's
    /// damage on a copy of the template and decide whether a heal step
    /// follows the enemy's counter-attack.
    pub fn select_attack<R: Rng>(
        &mut self,
        index: usize,
        bonuses: &Bonuses,
        rng: &mut R,
        out: &mut Vec<BattleEvent>,
    ) -> bool {
        if !self.accepts_attack() {
            return false;
        }
        let victory_points = self.config.victory_points;
        let Some(combatants) = self.combatants.as_mut() else {
            return false;
        };
        let Some(template) = combatants.player.attacks().get(index) else {
            return false;
        };

        let attack = template.scaled(bonuses.multiplier_for(&template.name));
        let damage = combatants.enemy.receive(attack.damage);
        debug!(attack = %attack.name, damage, "player attacked");
        out.push(BattleEvent::AttackLanded {
            attacker: Side::Player,
            attack: attack.name.clone(),
            damage,
        });
        out.push(BattleEvent::HealthChanged {
            side: Side::Enemy,
            health: combatants.enemy.health(),
        });
        let line = format!("{} used {}", combatants.player.name(), attack.name);

        if combatants.enemy.is_fainted() {
            self.queue.push_back(BattleStep::Faint { side: Side::Enemy });
            self.queue.push_back(BattleStep::Victory {
                points: victory_points,
            });
            self.queue.push_back(BattleStep::Conclude {
                outcome: Outcome::Victory,
            });
        } else if !combatants.enemy.attacks().is_empty() {
            let choice = rng.gen_range(0..combatants.enemy.attacks().len());
            let counter = combatants.enemy.attacks()[choice].clone();
            self.queue.push_back(BattleStep::EnemyAttack { attack: counter });
            if bonuses.post_enemy_attack_heal > 0 {
                self.queue.push_back(BattleStep::Heal {
                    amount: bonuses.post_enemy_attack_heal,
                });
            }
        }

        self.show(line, out);
        true
    }

    /// Runs the next queued step, or hides the dialogue when none is left.
    ///
    /// Steps that turn out to have no visible effect (a heal at full health)
    /// fall through to the next one.
    pub fn acknowledge(&mut self, out: &mut Vec<BattleEvent>) {
        if self.phase != BattlePhase::Active {
            return;
        }

        while let Some(step) = self.queue.pop_front() {
            if self.run(step, out) {
                return;
            }
        }

        if self.dialogue_visible {
            self.dialogue_visible = false;
            out.push(BattleEvent::HideDialogue);
        }
    }

    /// Runs a single step, returning whether it produced something to show.
    fn run(&mut self, step: BattleStep, out: &mut Vec<BattleEvent>) -> bool {
        let Some(combatants) = self.combatants.as_mut() else {
            return false;
        };

        match step {
            BattleStep::EnemyAttack { attack } => {
                if combatants.enemy.is_fainted() || combatants.player.is_fainted() {
                    return false;
                }
                let damage = combatants.player.receive(attack.damage);
                debug!(attack = %attack.name, damage, "enemy attacked");
                out.push(BattleEvent::AttackLanded {
                    attacker: Side::Enemy,
                    attack: attack.name.clone(),
                    damage,
                });
                out.push(BattleEvent::HealthChanged {
                    side: Side::Player,
                    health: combatants.player.health(),
                });
                let line = format!("{} used {}", combatants.enemy.name(), attack.name);
                if combatants.player.is_fainted() {
                    self.queue
                        .retain(|pending| !matches!(pending, BattleStep::Heal { .. }));
                    self.queue.push_back(BattleStep::Faint { side: Side::Player });
                    self.queue.push_back(BattleStep::Defeat);
                    self.queue.push_back(BattleStep::Conclude {
                        outcome: Outcome::Defeat,
                    });
                }
                self.show(line, out);
                true
            }
            BattleStep::Heal { amount } => {
                let restored = combatants.player.heal(amount);
                if restored == 0 {
                    return false;
                }
                out.push(BattleEvent::HealthChanged {
                    side: Side::Player,
                    health: combatants.player.health(),
                });
                let line = format!("{} restored {restored} HP!", combatants.player.name());
                self.show(line, out);
                true
            }
            BattleStep::Faint { side } => {
                let line = format!("{} fainted!", combatants.get(side).name());
                debug!(?side, "combatant fainted");
                out.push(BattleEvent::Fainted { side });
                self.show(line, out);
                true
            }
            BattleStep::Defeat => {
                let line = format!("Defeat! {} can no longer battle.", combatants.player.name());
                info!("battle lost");
                self.show(line, out);
                true
            }
            BattleStep::Victory { points } => {
                out.push(BattleEvent::RewardGranted { points });
                self.show(format!("Victory! Claim {points} Stardust!"), out);
                true
            }
            BattleStep::Conclude { outcome } => {
                self.queue.clear();
                self.dialogue_visible = false;
                self.hovered = None;
                out.push(BattleEvent::HideDialogue);
                self.enter(
                    BattlePhase::Resolving {
                        outcome,
                        frames_left: self.config.resolve_frames,
                    },
                    out,
                );
                true
            }
        }
    }

    /// Opacity of the full-screen transition overlay in `0.0..=1.0`.
    #[must_use]
    pub fn transition_alpha(&self) -> f32 {
        match self.phase {
            BattlePhase::Idle | BattlePhase::Active => 0.0,
            BattlePhase::Engaging { frames_left } => {
                let total = self.config.engage_frames.max(1) as f32;
                let progress = 1.0 - frames_left as f32 / total;
                flash(progress)
            }
            BattlePhase::Resolving { frames_left, .. } => {
                let total = self.config.resolve_frames.max(1) as f32;
                1.0 - frames_left as f32 / total
            }
        }
    }

    fn show(&mut self, text: String, out: &mut Vec<BattleEvent>) {
        self.dialogue_visible = true;
        out.push(BattleEvent::ShowLine { text });
    }

    fn enter(&mut self, phase: BattlePhase, out: &mut Vec<BattleEvent>) {
        debug!(?phase, "battle phase changed");
        self.phase = phase;
        out.push(BattleEvent::PhaseChanged { phase });
    }
}

/// Flashes twice over the first two thirds, then fades in to black.
fn flash(progress: f32) -> f32 {
    let progress = progress.clamp(0.0, 1.0);
    let pulses = 2.0 / 3.0;
    if progress < pulses {
        let phase = (progress / pulses) * 4.0;
        let within = phase.fract();
        if (phase as u32) % 2 == 0 {
            within
        } else {
            1.0 - within
        }
    } else {
        ((progress - pulses) / (1.0 - pulses)).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn active_session(bonuses: &Bonuses) -> (BattleSession, Vec<BattleEvent>) {
        let mut session = BattleSession::new(BattleConfig {
            engage_frames: 3,
            resolve_frames: 2,
            ..BattleConfig::default()
        });
        let mut events = Vec::new();
        session.engage(&mut events);
        for _ in 0..3 {
            session.tick(bonuses, &mut events);
        }
        (session, events)
    }

    #[test]
    fn engaging_counts_down_into_active() {
        let (session, events) = active_session(&Bonuses::default());
        assert_eq!(session.phase(), BattlePhase::Active);
        assert_eq!(
            events,
            vec![
                BattleEvent::PhaseChanged {
                    phase: BattlePhase::Engaging { frames_left: 3 }
                },
                BattleEvent::PhaseChanged {
                    phase: BattlePhase::Active
                },
            ]
        );
        assert_eq!(session.player().map(Monster::health), Some(100));
        assert_eq!(session.enemy().map(Monster::health), Some(100));
    }

    #[test]
    fn engage_is_idempotent() {
        let (mut session, _) = active_session(&Bonuses::default());
        let mut events = Vec::new();
        session.engage(&mut events);
        assert!(events.is_empty());
        assert_eq!(session.phase(), BattlePhase::Active);
    }

    #[test]
    fn input_is_rejected_while_engaging() {
        let mut session = BattleSession::default();
        let mut events = Vec::new();
        session.engage(&mut events);
        events.clear();

        let mut rng = StepRng::new(0, 1);
        assert!(!session.select_attack(0, &Bonuses::default(), &mut rng, &mut events));
        session.acknowledge(&mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn start_heal_at_full_health_is_silent() {
        let bonuses = Bonuses {
            start_battle_heal: 25,
            ..Bonuses::default()
        };
        let (session, events) = active_session(&bonuses);
        assert!(!session.is_dialogue_visible());
        assert!(!events
            .iter()
            .any(|event| matches!(event, BattleEvent::ShowLine { .. })));
    }

    #[test]
    fn menu_waits_for_dialogue_to_close() {
        let bonuses = Bonuses::default();
        let (mut session, _) = active_session(&bonuses);
        let mut rng = StepRng::new(0, 1);
        let mut events = Vec::new();

        assert!(session.select_attack(0, &bonuses, &mut rng, &mut events));
        assert!(!session.select_attack(0, &bonuses, &mut rng, &mut events));

        session.acknowledge(&mut events);
        assert!(session.is_dialogue_visible());
        session.acknowledge(&mut events);
        assert!(!session.is_dialogue_visible());
        assert_eq!(events.last(), Some(&BattleEvent::HideDialogue));
        assert!(session.accepts_attack());
    }

    #[test]
    fn empty_queue_acknowledgment_is_idempotent() {
        let (mut session, _) = active_session(&Bonuses::default());
        let mut events = Vec::new();
        session.acknowledge(&mut events);
        session.acknowledge(&mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn multiplier_applies_to_every_use_without_compounding() {
        let bonuses = Bonuses {
            attack_multipliers: [("Tackle".to_owned(), 1.3)].into_iter().collect(),
            ..Bonuses::default()
        };
        let (mut session, _) = active_session(&bonuses);
        let mut rng = StepRng::new(0, 1);

        for expected_health in [87, 74] {
            let mut events = Vec::new();
            assert!(session.select_attack(0, &bonuses, &mut rng, &mut events));
            assert!(events.contains(&BattleEvent::AttackLanded {
                attacker: Side::Player,
                attack: "Tackle".to_owned(),
                damage: 13,
            }));
            assert_eq!(session.enemy().map(Monster::health), Some(expected_health));
            session.acknowledge(&mut events);
            session.acknowledge(&mut events);
        }
        assert_eq!(session.player().map(|monster| monster.attacks()[0].damage), Some(10));
    }

    #[test]
    fn hover_previews_the_attack_type() {
        let (mut session, _) = active_session(&Bonuses::default());
        session.hover(Some(1));
        assert_eq!(session.hovered_attack().map(|attack| attack.kind.label()), Some("Fire"));
        session.hover(Some(9));
        assert!(session.hovered_attack().is_none());
    }

    #[test]
    fn transition_alpha_stays_in_range() {
        let mut session = BattleSession::default();
        let mut events = Vec::new();
        session.engage(&mut events);
        for _ in 0..200 {
            let alpha = session.transition_alpha();
            assert!((0.0..=1.0).contains(&alpha));
            session.tick(&Bonuses::default(), &mut events);
        }
        assert_eq!(session.transition_alpha(), 0.0);
    }

    #[test]
    fn battle_step_round_trips_through_bincode() {
        let step = BattleStep::EnemyAttack {
            attack: Attack::fireball(),
        };
        let bytes = bincode::serialize(&step).expect("serialize");
        let restored: BattleStep = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, step);
    }
}

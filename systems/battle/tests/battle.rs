use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tallgrass_core::{Attack, AttackKind, Bonuses, MonsterTemplate, Tint};
use tallgrass_system_battle::{
    BattleConfig, BattleEvent, BattlePhase, BattleSession, BattleStep, Monster, Outcome, Side,
};

fn quick() -> BattleConfig {
    BattleConfig {
        engage_frames: 1,
        resolve_frames: 1,
        ..BattleConfig::default()
    }
}

fn attack(name: &str, damage: u32) -> Attack {
    Attack {
        name: name.to_owned(),
        damage,
        kind: AttackKind::Normal,
        tint: Tint::from_rgb(0, 0, 0),
    }
}

fn roster(player_attacks: Vec<Attack>, enemy_attacks: Vec<Attack>) -> BattleSession {
    let mut player = MonsterTemplate::emby();
    player.attacks = player_attacks;
    let mut enemy = MonsterTemplate::draggle();
    enemy.attacks = enemy_attacks;
    BattleSession::with_roster(quick(), player, enemy)
}

fn open(session: &mut BattleSession, bonuses: &Bonuses) -> Vec<BattleEvent> {
    let mut events = Vec::new();
    session.engage(&mut events);
    session.tick(bonuses, &mut events);
    assert_eq!(session.phase(), BattlePhase::Active);
    events
}

fn lines(events: &[BattleEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            BattleEvent::ShowLine { text } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn fifteen_health_enemy_hit_for_twenty_faints() {
    let bonuses = Bonuses::default();
    let mut session = roster(
        vec![attack("Crush", 85), attack("Jab", 20)],
        vec![attack("Nibble", 1)],
    );
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let _ = open(&mut session, &bonuses);

    let mut events = Vec::new();
    assert!(session.select_attack(0, &bonuses, &mut rng, &mut events));
    assert_eq!(session.enemy().map(Monster::health), Some(15));
    session.acknowledge(&mut events);
    session.acknowledge(&mut events);

    events.clear();
    assert!(session.select_attack(1, &bonuses, &mut rng, &mut events));
    assert_eq!(session.enemy().map(Monster::health), Some(0));
    let queued: Vec<_> = session.pending_steps().cloned().collect();
    assert_eq!(
        queued,
        vec![
            BattleStep::Faint { side: Side::Enemy },
            BattleStep::Victory { points: 50 },
            BattleStep::Conclude {
                outcome: Outcome::Victory
            },
        ]
    );

    session.acknowledge(&mut events);
    assert!(!session.select_attack(1, &bonuses, &mut rng, &mut events));
    assert_eq!(session.enemy().map(Monster::health), Some(0));
}

#[test]
fn victory_walks_faint_reward_and_fade() {
    let bonuses = Bonuses::default();
    let mut session = roster(vec![attack("Finisher", 100)], vec![attack("Nibble", 1)]);
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let _ = open(&mut session, &bonuses);

    let mut events = Vec::new();
    assert!(session.select_attack(0, &bonuses, &mut rng, &mut events));
    for _ in 0..3 {
        session.acknowledge(&mut events);
    }
    assert!(matches!(
        session.phase(),
        BattlePhase::Resolving {
            outcome: Outcome::Victory,
            ..
        }
    ));
    session.tick(&bonuses, &mut events);

    assert_eq!(session.phase(), BattlePhase::Idle);
    assert_eq!(
        lines(&events),
        vec![
            "Emby used Finisher".to_owned(),
            "Draggle fainted!".to_owned(),
            "Victory! Claim 50 Stardust!".to_owned(),
        ]
    );
    let rewards: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, BattleEvent::RewardGranted { .. }))
        .collect();
    assert_eq!(rewards, vec![&BattleEvent::RewardGranted { points: 50 }]);
    assert_eq!(
        events.last(),
        Some(&BattleEvent::Ended {
            outcome: Outcome::Victory
        })
    );
    assert!(session.player().is_none());
}

#[test]
fn defeat_skips_pending_heals_and_grants_nothing() {
    let bonuses = Bonuses {
        post_enemy_attack_heal: 15,
        ..Bonuses::default()
    };
    let mut session = roster(vec![attack("Poke", 1)], vec![attack("Crush", 40)]);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let _ = open(&mut session, &bonuses);

    let mut events = Vec::new();
    let mut guard = 0;
    while session.phase() == BattlePhase::Active {
        if session.accepts_attack() {
            assert!(session.select_attack(0, &bonuses, &mut rng, &mut events));
        } else {
            session.acknowledge(&mut events);
        }
        guard += 1;
        assert!(guard < 100, "battle never concluded");
    }

    assert!(matches!(
        session.phase(),
        BattlePhase::Resolving {
            outcome: Outcome::Defeat,
            ..
        }
    ));
    assert_eq!(session.player().map(Monster::health), Some(0));
    assert!(!events
        .iter()
        .any(|event| matches!(event, BattleEvent::RewardGranted { .. })));
    let shown = lines(&events);
    let tail: Vec<&str> = shown.iter().rev().take(2).rev().map(String::as_str).collect();
    assert_eq!(tail, vec!["Emby fainted!", "Defeat! Emby can no longer battle."]);
    assert!(shown.iter().any(|line| line == "Emby restored 15 HP!"));
}

#[test]
fn fatal_counter_queues_faint_then_defeat() {
    let bonuses = Bonuses::default();
    let mut session = roster(vec![attack("Poke", 1)], vec![attack("Crush", 100)]);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let _ = open(&mut session, &bonuses);

    let mut events = Vec::new();
    assert!(session.select_attack(0, &bonuses, &mut rng, &mut events));
    session.acknowledge(&mut events);

    assert_eq!(session.player().map(Monster::health), Some(0));
    assert_eq!(
        session.pending_steps().cloned().collect::<Vec<_>>(),
        vec![
            BattleStep::Faint { side: Side::Player },
            BattleStep::Defeat,
            BattleStep::Conclude {
                outcome: Outcome::Defeat
            },
        ]
    );
}

#[test]
fn post_attack_heal_follows_the_counter() {
    let bonuses = Bonuses {
        post_enemy_attack_heal: 15,
        ..Bonuses::default()
    };
    let mut session = roster(vec![attack("Poke", 1)], vec![attack("Scratch", 10)]);
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let _ = open(&mut session, &bonuses);

    let mut events = Vec::new();
    assert!(session.select_attack(0, &bonuses, &mut rng, &mut events));
    assert_eq!(
        session.pending_steps().cloned().collect::<Vec<_>>(),
        vec![
            BattleStep::EnemyAttack {
                attack: attack("Scratch", 10)
            },
            BattleStep::Heal { amount: 15 },
        ]
    );

    session.acknowledge(&mut events);
    assert_eq!(session.player().map(Monster::health), Some(90));
    session.acknowledge(&mut events);
    assert_eq!(session.player().map(Monster::health), Some(100));
    assert!(lines(&events).contains(&"Emby restored 10 HP!".to_owned()));
}

#[test]
fn heal_at_full_health_falls_through_to_hiding() {
    let bonuses = Bonuses {
        post_enemy_attack_heal: 15,
        ..Bonuses::default()
    };
    let mut session = roster(vec![attack("Poke", 1)], vec![attack("Miss", 0)]);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let _ = open(&mut session, &bonuses);

    let mut events = Vec::new();
    assert!(session.select_attack(0, &bonuses, &mut rng, &mut events));
    session.acknowledge(&mut events);
    events.clear();
    session.acknowledge(&mut events);

    assert_eq!(events, vec![BattleEvent::HideDialogue]);
    assert!(session.accepts_attack());
}

#[test]
fn start_heal_is_applied_once_and_capped() {
    let bonuses = Bonuses {
        start_battle_heal: 25,
        ..Bonuses::default()
    };
    let mut session = roster(vec![attack("Poke", 1)], vec![attack("Scratch", 10)]);
    let events = open(&mut session, &bonuses);

    assert_eq!(session.player().map(Monster::health), Some(100));
    assert!(lines(&events).is_empty());
}

#[test]
fn counter_attacks_draw_from_the_whole_move_set() {
    let bonuses = Bonuses::default();
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    let mut seen_tackle = false;
    let mut seen_fireball = false;

    for _ in 0..200 {
        let mut session = BattleSession::new(quick());
        let _ = open(&mut session, &bonuses);
        let mut events = Vec::new();
        assert!(session.select_attack(0, &bonuses, &mut rng, &mut events));
        match session.pending_steps().next() {
            Some(BattleStep::EnemyAttack { attack }) if attack.name == "Tackle" => {
                seen_tackle = true;
            }
            Some(BattleStep::EnemyAttack { attack }) if attack.name == "Fireball" => {
                seen_fireball = true;
            }
            other => panic!("unexpected step {other:?}"),
        };
    }

    assert!(seen_tackle && seen_fireball);
}

//! Integration test: quest selection and lifecycle
//!
//! Role weights, repetition damping, refresh with nobody alive, and
//! completion without a quest.

use std::sync::Arc;
use std::time::Duration;

use encounter::character::{Disposition, Npc, NpcRole, Player};
use encounter::encounter::EncounterState;
use encounter::narrative::TemplateGenerator;
use encounter::quest::{select_quest_type, QuestPolicy, QuestType};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn policy() -> QuestPolicy {
    QuestPolicy::new(Arc::new(TemplateGenerator::seeded(11)), Duration::from_millis(100))
}

fn repeat_rate(feed_back: bool, seed: u64) -> f64 {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let trials = 5000;
    let mut last = None;
    let mut repeats = 0;
    for _ in 0..trials {
        let hint = if feed_back { last } else { None };
        let chosen = select_quest_type(NpcRole::Enemy, hint, &mut rng);
        if Some(chosen) == last {
            repeats += 1;
        }
        last = Some(chosen);
    }
    repeats as f64 / trials as f64
}

#[test]
fn test_merchant_never_gets_defeat_quest() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut policy = policy();
    for _ in 0..1000 {
        assert_ne!(
            policy.choose_quest_type(NpcRole::Merchant, &mut rng),
            QuestType::Defeat
        );
    }
}

#[test]
fn test_repetition_is_damped_not_eliminated() {
    let undamped = repeat_rate(false, 21);
    let damped = repeat_rate(true, 21);

    // Independent draws repeat about 54% of the time for enemies
    assert!(undamped > 0.45, "undamped {}", undamped);
    assert!(damped < undamped - 0.1, "damped {} vs {}", damped, undamped);
    assert!(damped > 0.05, "damped {}", damped);
}

#[test]
fn test_refresh_with_no_living_npcs_clears_quest() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut policy = policy();
    let mut state = EncounterState::new(Player::default(), vec![Npc::enemy("Goblin", 50, 7)]);
    policy.refresh_quest(&mut state, &mut rng);
    assert!(state.current_quest.is_some());

    state.npcs[0].stats.current_hp = 0;
    policy.refresh_quest(&mut state, &mut rng);
    assert!(state.current_quest.is_none());

    let mut empty = EncounterState::new(Player::default(), vec![]);
    policy.refresh_quest(&mut empty, &mut rng);
    assert!(empty.current_quest.is_none());
    assert!(empty.narrative.is_empty());
}

#[test]
fn test_complete_without_quest_leaves_state_unchanged() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut policy = policy();
    let mut state = EncounterState::new(
        Player::default(),
        vec![Npc::new("Merchant", 30, 3, NpcRole::Merchant, Disposition::Neutral)],
    );

    assert!(!policy.complete_quest(&mut state, &mut rng));
    assert!(state.current_quest.is_none());
    assert!(state.narrative.is_empty());
    assert!(state.player.quest_log.active.is_empty());
    assert!(state.player.quest_log.completed.is_empty());
    assert_eq!(state.focused_npc, None);
}

#[test]
fn test_low_health_player_gets_merchant_quest() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let mut policy = policy();
    let shop = Npc::new("Merchant", 30, 3, NpcRole::Merchant, Disposition::Neutral);
    let shop_id = shop.id;
    let mut state = EncounterState::new(Player::default(), vec![Npc::enemy("Goblin", 50, 7), shop]);
    state.player.stats.current_hp = 30;

    policy.refresh_quest(&mut state, &mut rng);

    let quest = state.current_quest.as_ref().expect("quest");
    assert_eq!(quest.target, shop_id);
    assert_ne!(quest.quest_type, QuestType::Defeat);
    assert_eq!(state.focused_npc, Some(shop_id));
}

//! Periodic difficulty balancing.

use rand::Rng;

use super::state::EncounterState;
use crate::character::{Disposition, Npc, NpcId, NpcRole};
use crate::core::config::EncounterConfig;
use crate::core::constants::*;
use crate::core::dice::roll_chance;
use crate::quest::QuestPolicy;

/// What the director changed, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorEvent {
    /// A strong player ran out of opponents; a reinforcement joined.
    Reinforcement(NpcId),
    /// The last NPC standing recovered health.
    SecondWind { npc: NpcId, healed: i32 },
    /// A struggling player met a helpful merchant.
    Helper(NpcId),
}

/// Push the encounter back toward a fair fight.
///
/// A thriving player facing at most one opponent gets a reinforcement or a
/// second wind for that opponent. A struggling player may meet a merchant.
pub fn adjust_difficulty(
    state: &mut EncounterState,
    policy: &mut QuestPolicy,
    config: &EncounterConfig,
    rng: &mut impl Rng,
) -> Option<DirectorEvent> {
    if !state.is_playing() {
        return None;
    }

    let player_fraction = state.player.health_fraction();
    let living = state.living_count();
    tracing::debug!(
        "Director check: player at {:.0}%, {} living NPCs",
        player_fraction * 100.0,
        living
    );

    if player_fraction > DIRECTOR_STRONG_PLAYER_FRACTION && living <= 1 {
        if living == 0 {
            return Some(spawn_reinforcement(state, policy, rng));
        }
        return second_wind(state);
    }

    if player_fraction < DIRECTOR_WEAK_PLAYER_FRACTION
        && living > 0
        && roll_chance(config.helper_spawn_chance, rng)
    {
        let (name, max_hp, strength) = HELPER_NPC;
        let helper = Npc::new(name, max_hp, strength, NpcRole::Merchant, Disposition::Friendly);
        let id = state.add_npc(helper);
        state.narrate("A wandering merchant appears, offering assistance!");
        tracing::info!("Director spawned helper {}", name);
        return Some(DirectorEvent::Helper(id));
    }

    None
}

fn spawn_reinforcement(
    state: &mut EncounterState,
    policy: &mut QuestPolicy,
    rng: &mut impl Rng,
) -> DirectorEvent {
    let (name, max_hp, strength) = REINFORCEMENT_NPC;
    let id = state.add_npc(Npc::enemy(name, max_hp, strength));
    state.focused_npc = Some(id);
    state.narrate(format!(
        "A {} appears, drawn by the sounds of battle!",
        name
    ));
    tracing::info!("Director spawned reinforcement {}", name);
    policy.refresh_quest(state, rng);
    DirectorEvent::Reinforcement(id)
}

fn second_wind(state: &mut EncounterState) -> Option<DirectorEvent> {
    let npc = state.npcs.iter_mut().find(|n| n.is_alive())?;
    if npc.health_fraction() >= SECOND_WIND_THRESHOLD {
        return None;
    }

    let healed = npc.stats.max_hp * SECOND_WIND_HEAL_PERCENT / 100;
    npc.heal(healed);
    let (id, line) = (
        npc.id,
        format!("The {} finds renewed strength and vigor!", npc.name),
    );
    tracing::info!("Director granted second wind: {}", line);
    state.narrate(line);
    Some(DirectorEvent::SecondWind { npc: id, healed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Player;
    use crate::narrative::TemplateGenerator;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;
    use std::time::Duration;

    fn policy() -> QuestPolicy {
        QuestPolicy::new(Arc::new(TemplateGenerator::seeded(1)), Duration::from_millis(50))
    }

    #[test]
    fn test_noop_outside_play() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut state = EncounterState::new(Player::default(), vec![]);
        state.phase = crate::encounter::EncounterPhase::GameOver;
        let event = adjust_difficulty(&mut state, &mut policy(), &EncounterConfig::default(), &mut rng);
        assert_eq!(event, None);
        assert!(state.npcs.is_empty());
    }

    #[test]
    fn test_second_wind_heals_thirty_percent() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut goblin = Npc::enemy("Goblin", 50, 7);
        goblin.stats.current_hp = 10;
        let id = goblin.id;
        let mut state = EncounterState::new(Player::default(), vec![goblin]);

        let event = adjust_difficulty(&mut state, &mut policy(), &EncounterConfig::default(), &mut rng);

        assert_eq!(event, Some(DirectorEvent::SecondWind { npc: id, healed: 15 }));
        assert_eq!(state.npcs[0].stats.current_hp, 25);
        assert_eq!(
            state.last_line(),
            Some("The Goblin finds renewed strength and vigor!")
        );
    }

    #[test]
    fn test_healthy_lone_npc_untouched() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut state = EncounterState::new(Player::default(), vec![Npc::enemy("Goblin", 50, 7)]);
        let event = adjust_difficulty(&mut state, &mut policy(), &EncounterConfig::default(), &mut rng);
        assert_eq!(event, None);
        assert_eq!(state.npcs[0].stats.current_hp, 50);
    }

    #[test]
    fn test_helper_spawn_respects_chance() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut state = EncounterState::new(Player::default(), vec![Npc::enemy("Goblin", 50, 7)]);
        state.player.stats.current_hp = 20;
        let before_hp = state.player.stats.current_hp;

        let never = EncounterConfig {
            helper_spawn_chance: 0.0,
            ..Default::default()
        };
        assert_eq!(adjust_difficulty(&mut state, &mut policy(), &never, &mut rng), None);

        let always = EncounterConfig {
            helper_spawn_chance: 1.0,
            ..Default::default()
        };
        let event = adjust_difficulty(&mut state, &mut policy(), &always, &mut rng);
        assert!(matches!(event, Some(DirectorEvent::Helper(_))));
        let helper = state.npcs.last().unwrap();
        assert_eq!(helper.name, "Wandering Merchant");
        assert_eq!(helper.role, NpcRole::Merchant);
        assert_eq!(helper.disposition, Disposition::Friendly);
        assert_eq!(state.player.stats.current_hp, before_hp);
    }
}

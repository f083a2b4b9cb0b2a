//! Heuristic scoring of a hypothetical combat state.

use crate::character::Combatant;
use crate::core::constants::*;

/// Score a state from the NPC's point of view (attacker = NPC, defender = player).
///
/// Terminal states return ±1000 regardless of depth. Otherwise the NPC plays
/// for survival below 30% health and for advantage above it, and the result
/// is discounted linearly by how deep in the search the state sits. At
/// `current_depth == max_depth` the discount is zero.
pub fn evaluate_state(
    attacker: &Combatant,
    defender: &Combatant,
    is_quest_target: bool,
    max_depth: u32,
    current_depth: u32,
) -> f64 {
    if attacker.current_hp <= 0 {
        return EVAL_LOSS_SCORE;
    }
    if defender.current_hp <= 0 {
        return EVAL_WIN_SCORE;
    }

    let depth_discount = (max_depth as f64 - current_depth as f64) / max_depth as f64;

    let attacker_fraction = attacker.health_fraction();
    let defender_fraction = defender.health_fraction();
    let health_advantage = attacker_fraction - defender_fraction;
    let quest_importance = if is_quest_target {
        QUEST_TARGET_IMPORTANCE
    } else {
        1.0
    };

    let score = if attacker_fraction < EVAL_SURVIVAL_THRESHOLD {
        let survival_score = attacker_fraction * EVAL_SURVIVAL_WEIGHT;
        let attack_score = health_advantage * EVAL_SURVIVAL_ADVANTAGE_WEIGHT;
        (survival_score + attack_score) * quest_importance
    } else {
        let health_score = health_advantage * EVAL_ADVANTAGE_WEIGHT;
        let position_score = if attacker_fraction > defender_fraction {
            EVAL_POSITION_SCORE
        } else {
            -EVAL_POSITION_SCORE
        };
        (health_score + position_score) * quest_importance
    };

    score * depth_discount
}

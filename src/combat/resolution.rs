//! Dice-based resolution of the real turn.
//!
//! The search plans with flat numbers; what actually happens is rolled here.

use rand::Rng;

use crate::character::{Combatant, Npc};
use crate::core::constants::*;
use crate::core::dice::{roll_dice, strength_modifier};

/// Result of one attack roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    /// The d20 attack roll including the strength modifier.
    pub roll: i32,
    /// Damage actually applied, None on a miss.
    pub damage: Option<i32>,
}

/// Player swings at an NPC: d20 + mod to hit, d6 + mod damage.
pub fn resolve_player_attack(player: &Combatant, npc: &mut Npc, rng: &mut impl Rng) -> AttackOutcome {
    let modifier = strength_modifier(player.strength);
    let roll = roll_dice(ATTACK_DIE, 1, modifier, rng);
    if roll < ATTACK_HIT_THRESHOLD {
        return AttackOutcome { roll, damage: None };
    }

    let damage_roll = roll_dice(PLAYER_DAMAGE_DIE, 1, modifier, rng).max(MIN_DAMAGE);
    let dealt = npc.take_damage(damage_roll, player.strength);
    AttackOutcome {
        roll,
        damage: Some(dealt),
    }
}

/// NPC swings at the player: d20 + mod to hit, d4 + mod damage.
pub fn resolve_npc_attack(npc: &Npc, player: &mut Combatant, rng: &mut impl Rng) -> AttackOutcome {
    let modifier = strength_modifier(npc.stats.strength);
    let roll = roll_dice(ATTACK_DIE, 1, modifier, rng);
    if roll < ATTACK_HIT_THRESHOLD {
        return AttackOutcome { roll, damage: None };
    }

    let damage_roll = roll_dice(NPC_DAMAGE_DIE, 1, modifier, rng).max(MIN_DAMAGE);
    let dealt = player.take_damage(damage_roll, npc.stats.strength, false);
    AttackOutcome {
        roll,
        damage: Some(dealt),
    }
}

/// Flee attempt: succeeds on a d20 above 15. Returns (roll, escaped).
pub fn resolve_flee(rng: &mut impl Rng) -> (i32, bool) {
    let roll = roll_dice(FLEE_DIE, 1, 0, rng);
    (roll, roll > FLEE_SUCCESS_ABOVE)
}

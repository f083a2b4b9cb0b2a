//! Health/strength block shared by the player and every NPC.

use serde::{Deserialize, Serialize};

use crate::core::constants::*;
use crate::quest::QuestLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub current_hp: i32,
    pub max_hp: i32,
    pub strength: i32,
}

impl Combatant {
    /// A combatant at full health. `max_hp` is raised to 1 if smaller.
    pub fn new(max_hp: i32, strength: i32) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            current_hp: max_hp,
            max_hp,
            strength,
        }
    }

    /// A combatant at the given health, clamped into `[0, max_hp]`.
    pub fn with_hp(current_hp: i32, max_hp: i32, strength: i32) -> Self {
        let mut combatant = Self::new(max_hp, strength);
        combatant.current_hp = current_hp.clamp(0, combatant.max_hp);
        combatant
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn health_fraction(&self) -> f64 {
        self.current_hp as f64 / self.max_hp as f64
    }

    /// Apply a hit and return the damage actually dealt.
    ///
    /// The attacker's strength advantage shifts the hit by at most
    /// `STRENGTH_MODIFIER_CAP`, defending halves it, and every hit deals at
    /// least `MIN_DAMAGE`. Health never drops below zero.
    pub fn take_damage(&mut self, amount: i32, attacker_strength: i32, defending: bool) -> i32 {
        let modifier =
            (attacker_strength - self.strength).clamp(-STRENGTH_MODIFIER_CAP, STRENGTH_MODIFIER_CAP);
        let modified = amount + modifier;
        let reduced = if defending {
            modified.div_euclid(DEFEND_DAMAGE_DIVISOR)
        } else {
            modified
        };
        let actual = reduced.max(MIN_DAMAGE);
        self.current_hp = (self.current_hp - actual).max(0);
        actual
    }

    /// Unmodified damage used by the search's planning model.
    pub fn lose_hp(&mut self, amount: i32) {
        self.current_hp = (self.current_hp - amount).clamp(0, self.max_hp);
    }

    pub fn heal(&mut self, amount: i32) {
        self.current_hp = (self.current_hp + amount.max(0)).min(self.max_hp);
    }
}

/// The player: a combatant plus their quest log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub stats: Combatant,
    pub quest_log: QuestLog,
}

impl Player {
    pub fn new(max_hp: i32, strength: i32) -> Self {
        Self {
            stats: Combatant::new(max_hp, strength),
            quest_log: QuestLog::default(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }

    pub fn health_fraction(&self) -> f64 {
        self.stats.health_fraction()
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(PLAYER_START_HP, PLAYER_START_STRENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_new_combatant_full_health() {
        let c = Combatant::new(50, 7);
        assert_eq!(c.current_hp, 50);
        assert_eq!(c.max_hp, 50);
        assert!(c.is_alive());
        assert!((c.health_fraction() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_with_hp_clamps() {
        assert_eq!(Combatant::with_hp(80, 50, 5).current_hp, 50);
        assert_eq!(Combatant::with_hp(-3, 50, 5).current_hp, 0);
        assert_eq!(Combatant::new(0, 5).max_hp, 1);
    }

    #[test]
    fn test_take_damage_strength_modifier() {
        // Stronger attacker adds the (capped) difference
        let mut c = Combatant::new(100, 5);
        assert_eq!(c.take_damage(10, 7, false), 12);
        assert_eq!(c.current_hp, 88);

        // Difference capped at +5
        let mut c = Combatant::new(100, 5);
        assert_eq!(c.take_damage(10, 30, false), 15);

        // Weaker attacker capped at -5
        let mut c = Combatant::new(100, 20);
        assert_eq!(c.take_damage(10, 0, false), 5);
    }

    #[test]
    fn test_take_damage_defending_halves() {
        let mut c = Combatant::new(100, 10);
        assert_eq!(c.take_damage(10, 10, true), 5);
        assert_eq!(c.current_hp, 95);
    }

    #[test]
    fn test_take_damage_minimum_one() {
        let mut c = Combatant::new(100, 20);
        assert_eq!(c.take_damage(1, 0, true), 1);
        assert_eq!(c.current_hp, 99);
    }

    #[test]
    fn test_take_damage_floors_at_zero() {
        let mut c = Combatant::with_hp(3, 50, 5);
        let dealt = c.take_damage(40, 5, false);
        assert_eq!(dealt, 40);
        assert_eq!(c.current_hp, 0);
        assert!(!c.is_alive());
    }

    #[test]
    fn test_take_damage_invariants_randomized() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..2_000 {
            let max_hp = rng.gen_range(1..200);
            let mut c = Combatant::with_hp(rng.gen_range(0..=max_hp), max_hp, rng.gen_range(0..25));
            let dealt = c.take_damage(
                rng.gen_range(-10..60),
                rng.gen_range(0..25),
                rng.gen_bool(0.5),
            );
            assert!(dealt >= 1);
            assert!(c.current_hp >= 0);
            assert!(c.current_hp <= c.max_hp);
        }
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..2_000 {
            let max_hp = rng.gen_range(1..200);
            let mut c = Combatant::with_hp(rng.gen_range(0..=max_hp), max_hp, 5);
            c.heal(rng.gen_range(0..300));
            assert!(c.current_hp <= c.max_hp);
        }
    }

    #[test]
    fn test_lose_hp_clamps() {
        let mut c = Combatant::with_hp(15, 50, 5);
        c.lose_hp(20);
        assert_eq!(c.current_hp, 0);
    }

    #[test]
    fn test_default_player() {
        let player = Player::default();
        assert_eq!(player.stats.current_hp, 100);
        assert_eq!(player.stats.strength, 10);
        assert!(player.quest_log.active.is_empty());
    }
}

//! Non-player characters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Combatant;
use crate::combat::NpcAction;
use crate::core::constants::LOW_HEALTH_FRACTION;

/// Stable identifier for an NPC, valid for the whole encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NpcId(pub Uuid);

impl NpcId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NpcId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an NPC is for in the encounter. Drives quest targeting and weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcRole {
    Enemy,
    Merchant,
    QuestGiver,
}

impl NpcRole {
    pub fn name(&self) -> &'static str {
        match self {
            NpcRole::Enemy => "enemy",
            NpcRole::Merchant => "merchant",
            NpcRole::QuestGiver => "quest giver",
        }
    }
}

/// Surface attitude used for dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Hostile,
    Neutral,
    Friendly,
}

impl Disposition {
    pub fn name(&self) -> &'static str {
        match self {
            Disposition::Hostile => "hostile",
            Disposition::Neutral => "neutral",
            Disposition::Friendly => "friendly",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Npc {
    pub id: NpcId,
    pub name: String,
    pub stats: Combatant,
    pub role: NpcRole,
    pub disposition: Disposition,
    pub is_defending: bool,
    pub is_fleeing: bool,
    pub last_action: Option<NpcAction>,
}

impl Npc {
    pub fn new(
        name: impl Into<String>,
        max_hp: i32,
        strength: i32,
        role: NpcRole,
        disposition: Disposition,
    ) -> Self {
        Self {
            id: NpcId::new(),
            name: name.into(),
            stats: Combatant::new(max_hp, strength),
            role,
            disposition,
            is_defending: false,
            is_fleeing: false,
            last_action: None,
        }
    }

    pub fn enemy(name: impl Into<String>, max_hp: i32, strength: i32) -> Self {
        Self::new(name, max_hp, strength, NpcRole::Enemy, Disposition::Hostile)
    }

    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }

    pub fn health_fraction(&self) -> f64 {
        self.stats.health_fraction()
    }

    /// Take a hit, halved while defending.
    pub fn take_damage(&mut self, amount: i32, attacker_strength: i32) -> i32 {
        self.stats
            .take_damage(amount, attacker_strength, self.is_defending)
    }

    pub fn heal(&mut self, amount: i32) {
        self.stats.heal(amount);
    }

    /// Record the action chosen for this turn and update the stance flags.
    pub fn set_action(&mut self, action: NpcAction) {
        self.last_action = Some(action);
        self.is_defending = false;
        self.is_fleeing = false;
        match action {
            NpcAction::Defend => self.is_defending = true,
            NpcAction::Flee => self.is_fleeing = true,
            NpcAction::Attack => {}
        }
    }

    /// Badly wounded NPCs turn hostile unless they are friendly at heart.
    pub fn dialogue_disposition(&self) -> Disposition {
        if self.health_fraction() < LOW_HEALTH_FRACTION && self.disposition != Disposition::Friendly
        {
            Disposition::Hostile
        } else {
            self.disposition
        }
    }
}

//! Combat action types.

use serde::{Deserialize, Serialize};

/// The three things an NPC can do on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NpcAction {
    Attack,
    Defend,
    Flee,
}

impl NpcAction {
    /// Search order. Ties keep the earliest entry, so Attack wins ties.
    pub const ALL: [NpcAction; 3] = [NpcAction::Attack, NpcAction::Defend, NpcAction::Flee];

    pub fn name(&self) -> &'static str {
        match self {
            NpcAction::Attack => "Attack",
            NpcAction::Defend => "Defend",
            NpcAction::Flee => "Flee",
        }
    }
}

/// Outcome of asking an NPC what it does this turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDecision {
    /// None when the NPC was missing or already defeated.
    pub action: Option<NpcAction>,
    pub description: String,
}

/// Narrative line for an NPC's chosen action.
pub fn describe_action(action: Option<NpcAction>, npc_name: &str) -> String {
    match action {
        Some(NpcAction::Attack) => {
            format!("The {} lunges forward with an aggressive attack!", npc_name)
        }
        Some(NpcAction::Defend) => format!(
            "The {} takes a defensive stance, preparing for your next move.",
            npc_name
        ),
        Some(NpcAction::Flee) => format!("The {} attempts to flee from the battle!", npc_name),
        None => format!("The {} seems confused about what to do next.", npc_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_order() {
        assert_eq!(NpcAction::ALL[0], NpcAction::Attack);
        assert_eq!(NpcAction::ALL.len(), 3);
    }

    #[test]
    fn test_describe_action() {
        assert!(describe_action(Some(NpcAction::Attack), "Goblin").contains("lunges forward"));
        assert!(describe_action(Some(NpcAction::Defend), "Goblin").contains("defensive stance"));
        assert!(describe_action(Some(NpcAction::Flee), "Goblin").contains("attempts to flee"));
        assert_eq!(
            describe_action(None, "Goblin"),
            "The Goblin seems confused about what to do next."
        );
    }
}

//! Minimax with alpha-beta pruning for NPC combat decisions.
//!
//! The tree alternates NPC plies (max, three actions) with a single scripted
//! player reply (min, a flat hit). Nodes work on copied combatants, so the
//! live player and NPC are never touched while searching.

use super::evaluator::evaluate_state;
use super::types::{describe_action, ActionDecision, NpcAction};
use crate::character::{Combatant, Npc};
use crate::core::constants::*;

/// Line used when asked to act for a missing or defeated NPC.
pub const CANNOT_ACT_LINE: &str = "The NPC is no longer able to act.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatSearch {
    max_depth: u32,
}

impl Default for CombatSearch {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEPTH)
    }
}

impl CombatSearch {
    /// Depth is counted in plies; anything below 1 is raised to 1.
    pub fn new(max_depth: u32) -> Self {
        let max_depth = max_depth.max(1);
        tracing::debug!("Combat search initialized with max_depth={}", max_depth);
        Self { max_depth }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Pick the NPC's action against `player`.
    ///
    /// Alpha is carried across the three root actions and only raised when a
    /// root action strictly beats the best so far, so ties keep the earlier
    /// action and Attack is the default.
    pub fn choose_action(&self, player: &Combatant, npc: &Combatant, is_quest_target: bool) -> NpcAction {
        let mut alpha = f64::NEG_INFINITY;
        let beta = f64::INFINITY;

        let mut best_score = f64::NEG_INFINITY;
        let mut best_action = NpcAction::Attack;

        for action in NpcAction::ALL {
            let (mut sim_player, mut sim_npc) = (*player, *npc);
            apply_npc_action(action, &mut sim_player, &mut sim_npc);

            let score = self.min_value(&sim_player, &sim_npc, is_quest_target, 1, alpha, beta);
            tracing::debug!("Action {} scored {}", action.name(), score);

            if score > best_score {
                best_score = score;
                best_action = action;
                alpha = alpha.max(best_score);
            }
        }

        tracing::debug!(
            "Search chose {} with score {}",
            best_action.name(),
            best_score
        );
        best_action
    }

    /// Boundary-checked decision for a live NPC.
    ///
    /// Records the chosen action on the NPC and returns its narrative line.
    /// A missing or defeated NPC gets no search and no action.
    pub fn decide(&self, player: &Combatant, npc: Option<&mut Npc>, is_quest_target: bool) -> ActionDecision {
        let npc = match npc {
            Some(npc) if npc.is_alive() => npc,
            _ => {
                tracing::warn!("Attempted to determine action for missing or defeated NPC");
                return ActionDecision {
                    action: None,
                    description: CANNOT_ACT_LINE.to_string(),
                };
            }
        };

        tracing::info!(
            "Determining action for {} (quest target: {})",
            npc.name,
            is_quest_target
        );
        let action = self.choose_action(player, &npc.stats, is_quest_target);
        npc.set_action(action);

        ActionDecision {
            action: Some(action),
            description: describe_action(Some(action), &npc.name),
        }
    }

    fn is_terminal(&self, player: &Combatant, npc: &Combatant, depth: u32) -> bool {
        depth >= self.max_depth || player.current_hp <= 0 || npc.current_hp <= 0
    }

    /// NPC ply: best of the three actions.
    fn max_value(
        &self,
        player: &Combatant,
        npc: &Combatant,
        is_quest_target: bool,
        depth: u32,
        mut alpha: f64,
        beta: f64,
    ) -> f64 {
        if self.is_terminal(player, npc, depth) {
            return evaluate_state(npc, player, is_quest_target, self.max_depth, depth);
        }

        let mut value = f64::NEG_INFINITY;
        for action in NpcAction::ALL {
            let (mut sim_player, mut sim_npc) = (*player, *npc);
            apply_npc_action(action, &mut sim_player, &mut sim_npc);

            value = value.max(self.min_value(
                &sim_player,
                &sim_npc,
                is_quest_target,
                depth + 1,
                alpha,
                beta,
            ));
            if value >= beta {
                return value;
            }
            alpha = alpha.max(value);
        }
        value
    }

    /// Player ply: the player always attacks for a flat hit.
    fn min_value(
        &self,
        player: &Combatant,
        npc: &Combatant,
        is_quest_target: bool,
        depth: u32,
        alpha: f64,
        mut beta: f64,
    ) -> f64 {
        if self.is_terminal(player, npc, depth) {
            return evaluate_state(npc, player, is_quest_target, self.max_depth, depth);
        }

        let sim_player = *player;
        let mut sim_npc = *npc;
        sim_npc.lose_hp(SIM_PLAYER_REPLY_DAMAGE);

        let value = self.max_value(&sim_player, &sim_npc, is_quest_target, depth + 1, alpha, beta);
        if value <= alpha {
            return value;
        }
        beta = beta.min(value);
        tracing::trace!("min ply at depth {} tightened beta to {}", depth, beta);
        value
    }
}

/// Planning model for one NPC action. Deterministic, no dice.
fn apply_npc_action(action: NpcAction, player: &mut Combatant, npc: &mut Combatant) {
    match action {
        NpcAction::Attack => player.lose_hp(SIM_NPC_ATTACK_DAMAGE),
        NpcAction::Defend => npc.heal(SIM_NPC_DEFEND_HEAL),
        NpcAction::Flee => npc.heal(SIM_NPC_FLEE_HEAL),
    }
}

//! Quest selection: who the quest is about, what kind it is, and its text.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use super::types::{Quest, QuestType};
use crate::character::{Npc, NpcId, NpcRole};
use crate::core::config::EncounterConfig;
use crate::core::constants::*;
use crate::core::dice::{choose_uniform, choose_weighted};
use crate::encounter::EncounterState;
use crate::narrative::{DialogueContext, GenerationSession, NarrativeGenerator, NarrativeRequest};

/// Base quest-type weights per NPC role. Zero means never.
pub fn quest_weights(role: NpcRole) -> [(QuestType, u32); 3] {
    match role {
        NpcRole::Enemy => [
            (QuestType::Defeat, 70),
            (QuestType::Talk, 10),
            (QuestType::Find, 20),
        ],
        NpcRole::Merchant => [
            (QuestType::Defeat, 0),
            (QuestType::Talk, 70),
            (QuestType::Find, 30),
        ],
        NpcRole::QuestGiver => [
            (QuestType::Defeat, 0),
            (QuestType::Talk, 40),
            (QuestType::Find, 60),
        ],
    }
}

/// Pick the quest target from the living NPCs.
///
/// Quest givers first, then merchants when the player is below half
/// health, then enemies, then anyone.
pub fn select_quest_target(
    living: &[&Npc],
    player_health_fraction: f64,
    rng: &mut impl Rng,
) -> Option<NpcId> {
    if living.len() == 1 {
        return Some(living[0].id);
    }

    let of_role = |role: NpcRole| -> Vec<NpcId> {
        living.iter().filter(|n| n.role == role).map(|n| n.id).collect()
    };

    let quest_givers = of_role(NpcRole::QuestGiver);
    if !quest_givers.is_empty() {
        return choose_uniform(&quest_givers, rng).copied();
    }

    if player_health_fraction < MERCHANT_PRIORITY_HEALTH_FRACTION {
        let merchants = of_role(NpcRole::Merchant);
        if !merchants.is_empty() {
            return choose_uniform(&merchants, rng).copied();
        }
    }

    let enemies = of_role(NpcRole::Enemy);
    if !enemies.is_empty() {
        return choose_uniform(&enemies, rng).copied();
    }

    choose_uniform(living, rng).map(|n| n.id)
}

/// Weighted quest-type draw for a target role.
///
/// The previous quest type keeps a third of its weight (at least 1) so the
/// same kind of quest rarely comes up twice in a row.
pub fn select_quest_type(
    role: NpcRole,
    last_quest_type: Option<QuestType>,
    rng: &mut impl Rng,
) -> QuestType {
    let weights: Vec<(QuestType, u32)> = quest_weights(role)
        .into_iter()
        .filter(|(_, weight)| *weight > 0)
        .map(|(quest_type, weight)| {
            if Some(quest_type) == last_quest_type {
                (quest_type, (weight / REPEAT_DAMPING_DIVISOR).max(1))
            } else {
                (quest_type, weight)
            }
        })
        .collect();

    match choose_weighted(&weights, rng) {
        Some(quest_type) => {
            tracing::debug!(
                "Selected {} quest for {} (last: {:?})",
                quest_type.name(),
                role.name(),
                last_quest_type
            );
            quest_type
        }
        None => {
            tracing::warn!("No quest type available for {}; defaulting to talk", role.name());
            QuestType::Talk
        }
    }
}

/// Owns quest-selection memory and the narrative session.
pub struct QuestPolicy {
    last_quest_type: Option<QuestType>,
    session: GenerationSession,
    generation_timeout: Duration,
}

impl QuestPolicy {
    pub fn new(generator: Arc<dyn NarrativeGenerator>, generation_timeout: Duration) -> Self {
        Self {
            last_quest_type: None,
            session: GenerationSession::new(generator),
            generation_timeout,
        }
    }

    pub fn from_config(config: &EncounterConfig) -> Self {
        Self::new(config.build_generator(), config.generation_timeout())
    }

    pub fn last_quest_type(&self) -> Option<QuestType> {
        self.last_quest_type
    }

    pub fn is_generating(&mut self) -> bool {
        self.session.is_busy()
    }

    pub fn choose_quest_type(&mut self, role: NpcRole, rng: &mut impl Rng) -> QuestType {
        let quest_type = select_quest_type(role, self.last_quest_type, rng);
        self.last_quest_type = Some(quest_type);
        quest_type
    }

    /// Replace the current quest with a freshly generated one.
    ///
    /// Outside play, or with nobody left alive, the current quest is
    /// cleared instead.
    pub fn refresh_quest(&mut self, state: &mut EncounterState, rng: &mut impl Rng) {
        if !state.is_playing() {
            drop_current_quest(state);
            return;
        }

        let player_fraction = state.player.health_fraction();
        let target = {
            let living = state.living_npcs();
            if living.is_empty() {
                None
            } else {
                select_quest_target(&living, player_fraction, rng)
            }
        };
        let Some(target) = target.and_then(|id| state.npc(id)) else {
            tracing::info!("No living NPCs available for a quest");
            drop_current_quest(state);
            return;
        };
        let (target_id, target_name, target_role) = (target.id, target.name.clone(), target.role);

        state.focused_npc = Some(target_id);
        let quest_type = self.choose_quest_type(target_role, rng);
        let description =
            self.session
                .request_quest_description(quest_type, &target_name, self.generation_timeout);

        drop_current_quest(state);
        let quest = Quest::new(quest_type, target_id, target_name, description.clone());
        tracing::info!(
            "New {} quest targeting {}: {}",
            quest_type.name(),
            quest.target_name,
            description
        );
        state.player.quest_log.add(quest.clone());
        state.current_quest = Some(quest);

        let message = format!("New Quest: {}", description);
        if !state.last_line().is_some_and(|line| line.contains(&message)) {
            state.narrate(message);
        }
    }

    /// Resolve the current quest and line up the next one.
    ///
    /// Returns false, touching nothing, when there is no current quest.
    pub fn complete_quest(&mut self, state: &mut EncounterState, rng: &mut impl Rng) -> bool {
        let Some(quest) = state.current_quest.take() else {
            tracing::warn!("Attempted to complete a quest with no current quest");
            return false;
        };

        let text = self.session.request_quest_completion(
            quest.quest_type,
            &quest.target_name,
            self.generation_timeout,
        );
        state.narrate(text);
        if !state.player.quest_log.complete(quest.id) {
            tracing::warn!("Completed quest {} was not in the active log", quest.id);
        }
        tracing::info!("Quest {} completed ({})", quest.id, quest.quest_type.name());

        if state.all_npcs_defeated() {
            return true;
        }
        self.refresh_quest(state, rng);
        true
    }

    /// Dialogue lines for an NPC, shaped by its health and the current quest.
    pub fn npc_dialogue(&mut self, state: &EncounterState, npc_id: NpcId) -> Vec<String> {
        let Some(npc) = state.npc(npc_id) else {
            tracing::warn!("Dialogue requested for unknown NPC {}", npc_id);
            return Vec::new();
        };
        let context = DialogueContext {
            role: npc.role,
            health_fraction: npc.health_fraction(),
            quest_relevant: state.is_quest_target(npc_id),
            player_health_fraction: state.player.health_fraction(),
        };
        self.session.request_npc_dialogue(
            &npc.name,
            npc.dialogue_disposition(),
            context,
            self.generation_timeout,
        )
    }

    /// Apply generations that landed after their caller stopped waiting.
    ///
    /// A late quest description replaces the fallback text of the current
    /// quest only if that quest still has the same type and target. Returns
    /// how many results were applied.
    pub fn reconcile_late_results(&mut self, state: &mut EncounterState) -> usize {
        let mut applied = 0;
        while let Some(done) = self.session.fetch_result() {
            let NarrativeRequest::QuestDescription {
                quest_type,
                ref npc_name,
            } = done.request
            else {
                tracing::debug!("Discarding late {} result", done.request.kind());
                continue;
            };

            let fallback = done.request.fallback().into_text();
            let Some(quest) = state.current_quest.as_mut() else {
                tracing::debug!("Discarding late quest description: no current quest");
                continue;
            };
            if quest.quest_type != quest_type
                || quest.target_name != *npc_name
                || quest.description != fallback
            {
                tracing::debug!("Discarding late quest description for {}", npc_name);
                continue;
            }

            let description = done.output.into_text();
            quest.description = description.clone();
            let quest_id = quest.id;
            if let Some(logged) = state.player.quest_log.active_mut(quest_id) {
                logged.description = description.clone();
            }
            tracing::info!("Applied late quest description: {}", description);
            applied += 1;
        }
        applied
    }
}

fn drop_current_quest(state: &mut EncounterState) {
    if let Some(old) = state.current_quest.take() {
        state.player.quest_log.abandon(old.id);
    }
}

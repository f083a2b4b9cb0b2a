//! Turn routing for a single encounter.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::director::adjust_difficulty;
use super::state::{EncounterPhase, EncounterState};
use crate::character::{Disposition, Npc, NpcId, NpcRole, Player};
use crate::combat::{resolve_flee, resolve_npc_attack, resolve_player_attack, CombatSearch, NpcAction};
use crate::core::config::EncounterConfig;
use crate::core::constants::MERCHANT_POTION_HEAL;
use crate::core::dice::choose_uniform;
use crate::quest::{QuestPolicy, QuestType};

const OPENING_LINE: &str = "You find yourself in a forest clearing.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerChoice {
    Move,
    Attack,
    Talk,
    Interact,
    Trade,
    AcceptQuest,
}

impl PlayerChoice {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerChoice::Move => "Move",
            PlayerChoice::Attack => "Attack",
            PlayerChoice::Talk => "Talk",
            PlayerChoice::Interact => "Interact",
            PlayerChoice::Trade => "Trade",
            PlayerChoice::AcceptQuest => "Accept Quest",
        }
    }
}

/// What happened during one call to `handle_choice`.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    /// Narrative lines appended this turn.
    pub lines: Vec<String>,
    pub npc_action: Option<NpcAction>,
    pub quest_completed: bool,
    pub new_quest: bool,
    pub phase: EncounterPhase,
}

pub struct Encounter {
    state: EncounterState,
    policy: QuestPolicy,
    search: CombatSearch,
    config: EncounterConfig,
    rng: StdRng,
}

impl Encounter {
    pub fn new(config: EncounterConfig) -> Self {
        let roster = config.build_roster();
        Self::with_roster(config, roster)
    }

    pub fn with_roster(config: EncounterConfig, npcs: Vec<Npc>) -> Self {
        let policy = QuestPolicy::from_config(&config);
        Self::with_policy(config, npcs, policy)
    }

    /// Full control over the quest policy, mainly for custom narrative backends.
    pub fn with_policy(config: EncounterConfig, npcs: Vec<Npc>, policy: QuestPolicy) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut encounter = Self {
            state: EncounterState::new(Player::default(), npcs),
            policy,
            search: CombatSearch::new(config.search_depth),
            config,
            rng,
        };
        encounter.open();
        encounter
    }

    pub fn state(&self) -> &EncounterState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EncounterState {
        &mut self.state
    }

    pub fn phase(&self) -> EncounterPhase {
        self.state.phase
    }

    /// Choices that make sense against the focused NPC.
    pub fn available_choices(&self) -> Vec<PlayerChoice> {
        if !self.state.is_playing() {
            return Vec::new();
        }
        match self.state.focused().map(|n| n.role) {
            Some(NpcRole::Merchant) => vec![PlayerChoice::Move, PlayerChoice::Talk, PlayerChoice::Trade],
            Some(NpcRole::QuestGiver) => vec![
                PlayerChoice::Move,
                PlayerChoice::Talk,
                PlayerChoice::AcceptQuest,
            ],
            Some(NpcRole::Enemy) | None => vec![
                PlayerChoice::Move,
                PlayerChoice::Attack,
                PlayerChoice::Interact,
            ],
        }
    }

    fn open(&mut self) {
        self.state.narrate(OPENING_LINE);

        let (focus, line) = {
            let living = self.state.living_npcs();
            let givers: Vec<&Npc> = living
                .iter()
                .copied()
                .filter(|n| n.role == NpcRole::QuestGiver)
                .collect();
            let enemies: Vec<&Npc> = living
                .iter()
                .copied()
                .filter(|n| n.role == NpcRole::Enemy)
                .collect();

            if let Some(npc) = choose_uniform(&givers, &mut self.rng) {
                (
                    Some(npc.id),
                    format!("A figure of interest, {}, seems to acknowledge your presence.", npc.name),
                )
            } else if let Some(npc) = choose_uniform(&enemies, &mut self.rng) {
                (
                    Some(npc.id),
                    format!("A hostile {} blocks your path, eyeing you warily!", npc.name),
                )
            } else if let Some(npc) = choose_uniform(&living, &mut self.rng) {
                (Some(npc.id), format!("You notice {} nearby.", npc.name))
            } else {
                (None, "The clearing is eerily silent. There's no one around.".to_string())
            }
        };

        self.state.focused_npc = focus;
        self.state.narrate(line);
        if focus.is_none() {
            tracing::info!("No living NPCs at encounter start");
            self.state.phase = EncounterPhase::Victory;
            return;
        }
        self.policy.refresh_quest(&mut self.state, &mut self.rng);
    }

    /// Apply one player choice, let the NPC respond, then run end-of-turn
    /// bookkeeping. Does nothing once the encounter is over.
    pub fn handle_choice(&mut self, choice: PlayerChoice) -> TurnReport {
        let start = self.state.narrative.len();
        let completed_before = self.state.player.quest_log.completed.len();
        let quest_before = self.state.current_quest.as_ref().map(|q| q.id);
        let mut npc_action = None;

        if self.state.is_playing() {
            self.policy.reconcile_late_results(&mut self.state);

            if !self.available_choices().contains(&choice) {
                tracing::warn!("Invalid choice {} for current focus", choice.name());
                self.state.narrate("Invalid choice. Try again.");
            } else {
                tracing::info!("Player chose {}", choice.name());
                match choice {
                    PlayerChoice::Move => self.player_move(),
                    PlayerChoice::Attack => npc_action = self.player_attack(),
                    PlayerChoice::Talk | PlayerChoice::Interact => self.player_talk(),
                    PlayerChoice::Trade => self.player_trade(),
                    PlayerChoice::AcceptQuest => self.player_accept_quest(),
                }
            }

            if self.state.is_playing() {
                self.update();
            }
        }

        let quest_after = self.state.current_quest.as_ref().map(|q| q.id);
        TurnReport {
            lines: self.state.narrative[start..].to_vec(),
            npc_action,
            quest_completed: self.state.player.quest_log.completed.len() > completed_before,
            new_quest: quest_after.is_some() && quest_after != quest_before,
            phase: self.state.phase,
        }
    }

    /// End-of-turn bookkeeping: outcome checks, director cadence, refocus
    /// and quest refresh.
    pub fn update(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        self.state.turn_counter += 1;

        if !self.state.player.is_alive() {
            tracing::info!("Player defeated on turn {}", self.state.turn_counter);
            self.finish(EncounterPhase::GameOver, "Game Over. You have been defeated.");
            return;
        }

        let has_roster = !self.state.npcs.is_empty();
        if self.state.current_quest.is_none() && has_roster && self.state.all_npcs_defeated() {
            self.finish(
                EncounterPhase::Victory,
                "All threats have been neutralized. You are victorious!",
            );
            return;
        }

        if self.state.turn_counter % self.config.director_interval() == 0 {
            tracing::info!("Turn {}: evaluating difficulty", self.state.turn_counter);
            adjust_difficulty(&mut self.state, &mut self.policy, &self.config, &mut self.rng);
        }

        if self.state.focused().is_some_and(|n| !n.is_alive()) {
            let next = {
                let living = self.state.living_npcs();
                choose_uniform(&living, &mut self.rng).map(|n| (n.id, n.name.clone()))
            };
            match next {
                Some((id, name)) => {
                    self.state.focused_npc = Some(id);
                    self.state.narrate(format!("You encounter a {}.", name));
                }
                None => self.state.focused_npc = None,
            }
        }

        let any_living = self.state.living_count() > 0;
        if self.state.current_quest.is_none() && any_living {
            self.policy.refresh_quest(&mut self.state, &mut self.rng);
        } else if !any_living && has_roster {
            self.finish(
                EncounterPhase::Victory,
                "The last foe is vanquished. Victory is yours!",
            );
        }
    }

    fn finish(&mut self, phase: EncounterPhase, line: &str) {
        self.state.phase = phase;
        self.state.narrate(line);
        // Outside play the refresh only clears the current quest
        self.policy.refresh_quest(&mut self.state, &mut self.rng);
    }

    fn focused_index(&self) -> Option<usize> {
        let id = self.state.focused_npc?;
        self.state.npcs.iter().position(|n| n.id == id)
    }

    fn player_move(&mut self) {
        let Some(current) = self.state.focused().map(|n| n.id) else {
            self.state.narrate("You explore the quiet clearing.");
            return;
        };

        let next = {
            let others: Vec<&Npc> = self
                .state
                .living_npcs()
                .into_iter()
                .filter(|n| n.id != current)
                .collect();
            choose_uniform(&others, &mut self.rng).map(|n| (n.id, n.name.clone(), n.role))
        };

        match next {
            Some((id, name, role)) => {
                self.state.focused_npc = Some(id);
                self.state
                    .narrate(format!("You move to another area and encounter a {}.", name));
                self.state.narrate(match role {
                    NpcRole::Merchant => "They appear to be selling various goods and potions.".to_string(),
                    NpcRole::QuestGiver => {
                        "They look like they might have a task for an adventurer like you.".to_string()
                    }
                    NpcRole::Enemy => format!("The {} watches you with hostile intent.", name),
                });
            }
            None => {
                let name = self.state.focused().map(|n| n.name.clone()).unwrap_or_default();
                self.state.narrate("You explore the forest clearing.");
                self.state.narrate(format!("The {} watches you closely.", name));
            }
        }
    }

    fn player_attack(&mut self) -> Option<NpcAction> {
        let Some(index) = self.focused_index() else {
            self.state.narrate("There is no one to attack.");
            return None;
        };
        let npc_id = self.state.npcs[index].id;
        let name = self.state.npcs[index].name.clone();
        if !self.state.npcs[index].is_alive() {
            self.state.narrate(format!("The {} is already defeated.", name));
            return None;
        }

        let reduced = self.state.npcs[index].is_defending;
        let outcome = resolve_player_attack(
            &self.state.player.stats,
            &mut self.state.npcs[index],
            &mut self.rng,
        );
        self.state
            .narrate(format!("You roll a {} for your attack!", outcome.roll));
        match outcome.damage {
            Some(dealt) => {
                let npc = &self.state.npcs[index];
                let line = format!(
                    "Hit! You deal {} {}damage to the {}.",
                    dealt,
                    if reduced { "reduced " } else { "" },
                    name
                );
                let health = format!("{} health: {}/{}", name, npc.stats.current_hp, npc.stats.max_hp);
                self.state.narrate(line);
                self.state.narrate(health);
            }
            None => self
                .state
                .narrate(format!("Miss! Your attack fails to connect with the {}.", name)),
        }

        if !self.state.npcs[index].is_alive() {
            self.state.narrate(format!("You defeated the {}!", name));
            tracing::info!("{} defeated by player", name);
            let defeat_quest = self
                .state
                .current_quest
                .as_ref()
                .is_some_and(|q| q.targets(npc_id) && q.quest_type == QuestType::Defeat);
            if defeat_quest {
                self.policy.complete_quest(&mut self.state, &mut self.rng);
            }
            return None;
        }

        let is_target = self.state.is_quest_target(npc_id);
        let decision = self.search.decide(
            &self.state.player.stats,
            Some(&mut self.state.npcs[index]),
            is_target,
        );
        self.state.narrate(decision.description);

        match decision.action {
            Some(NpcAction::Attack) => {
                let outcome = resolve_npc_attack(
                    &self.state.npcs[index],
                    &mut self.state.player.stats,
                    &mut self.rng,
                );
                self.state
                    .narrate(format!("The {} rolls a {} for their attack!", name, outcome.roll));
                match outcome.damage {
                    Some(dealt) => {
                        let stats = self.state.player.stats;
                        self.state
                            .narrate(format!("Hit! The {} strikes you for {} damage!", name, dealt));
                        self.state
                            .narrate(format!("Your health: {}/{}", stats.current_hp, stats.max_hp));
                    }
                    None => self
                        .state
                        .narrate(format!("Miss! The {}'s attack fails to hit you.", name)),
                }
            }
            Some(NpcAction::Defend) => self.state.narrate(format!(
                "The {} is now defending, reducing incoming damage.",
                name
            )),
            Some(NpcAction::Flee) => {
                let (roll, escaped) = resolve_flee(&mut self.rng);
                if escaped {
                    self.state.npcs[index].stats.current_hp = 0;
                    self.state
                        .narrate(format!("The {} successfully flees from battle!", name));
                    tracing::info!("{} fled from battle", name);
                } else {
                    self.state.narrate(format!(
                        "The {} tries to flee but fails! (Rolled {}, needed >15)",
                        name, roll
                    ));
                }
            }
            None => {}
        }

        if !self.state.player.is_alive() {
            self.state.narrate("You have fallen in battle.");
        }
        decision.action
    }

    fn player_talk(&mut self) {
        let Some(npc) = self.state.focused() else {
            self.state.narrate("There is no one to talk to.");
            return;
        };
        let (id, name, role) = (npc.id, npc.name.clone(), npc.role);
        if !npc.is_alive() {
            self.state
                .narrate(format!("The {} is no longer able to speak.", name));
            return;
        }
        let hostile_voice = role == NpcRole::Enemy || npc.dialogue_disposition() == Disposition::Hostile;

        let lines = self.policy.npc_dialogue(&self.state, id);
        if lines.is_empty() {
            self.state.narrate(format!("The {} has nothing to say.", name));
            return;
        }

        let verb = if hostile_voice {
            "growls"
        } else {
            match role {
                NpcRole::Merchant => "offers",
                NpcRole::QuestGiver => "proclaims",
                NpcRole::Enemy => "says",
            }
        };
        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                self.state
                    .narrate(format!("{} {}: \"{}\"", name, verb, line));
            } else {
                self.state.narrate(format!("\"{}\"", line));
            }
        }
        tracing::info!("Dialogue with {} ended", name);

        if !self.dialogue_completes_quest(id, role)
            || !self.policy.complete_quest(&mut self.state, &mut self.rng)
        {
            self.state
                .narrate(format!("You finish speaking with {}.", name));
        }
    }

    fn dialogue_completes_quest(&self, id: NpcId, role: NpcRole) -> bool {
        match &self.state.current_quest {
            Some(quest) if quest.targets(id) => match quest.quest_type {
                QuestType::Talk => true,
                QuestType::Find => role != NpcRole::Enemy,
                QuestType::Defeat => false,
            },
            _ => false,
        }
    }

    fn player_trade(&mut self) {
        let Some(index) = self.focused_index() else {
            self.state.narrate("There is no merchant to trade with.");
            return;
        };
        let npc = &self.state.npcs[index];
        let name = npc.name.clone();
        if npc.role != NpcRole::Merchant {
            self.state.narrate("There is no merchant to trade with.");
            return;
        }
        if !npc.is_alive() {
            self.state
                .narrate(format!("The {} is no longer able to trade.", name));
            return;
        }

        self.state
            .narrate(format!("The {} offers you a healing potion.", name));
        self.state.player.stats.heal(MERCHANT_POTION_HEAL);
        let stats = self.state.player.stats;
        self.state.narrate(format!(
            "You consume the potion and recover {} health.",
            MERCHANT_POTION_HEAL
        ));
        self.state
            .narrate(format!("Your health: {}/{}", stats.current_hp, stats.max_hp));
        tracing::info!("Player traded with {} for a potion", name);
    }

    fn player_accept_quest(&mut self) {
        let Some(npc) = self.state.focused() else {
            self.state.narrate("There is no quest giver here.");
            return;
        };
        let name = npc.name.clone();
        if npc.role != NpcRole::QuestGiver {
            self.state.narrate("There is no quest giver here.");
            return;
        }
        if !npc.is_alive() {
            self.state
                .narrate(format!("The {} is no longer able to give quests.", name));
            return;
        }

        let old = self.state.current_quest.clone();
        self.policy.refresh_quest(&mut self.state, &mut self.rng);
        if self.state.current_quest.is_some() {
            self.state
                .narrate(format!("You accept a new quest from {}.", name));
            return;
        }

        if let Some(old) = old {
            self.state.player.quest_log.add(old.clone());
            self.state.current_quest = Some(old);
        }
        self.state.narrate(format!(
            "The {} has no new quests for you at this time.",
            name
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> EncounterConfig {
        EncounterConfig {
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_encounter_opens_with_quest() {
        let encounter = Encounter::new(seeded());
        let state = encounter.state();
        assert_eq!(state.phase, EncounterPhase::Playing);
        assert_eq!(state.narrative[0], OPENING_LINE);
        assert!(state.narrative[1].contains("Quest Giver"));
        assert!(state.current_quest.is_some());
        assert_eq!(state.npcs.len(), 3);
    }

    #[test]
    fn test_empty_roster_is_victory() {
        let encounter = Encounter::with_roster(seeded(), vec![]);
        assert_eq!(encounter.phase(), EncounterPhase::Victory);
        assert!(encounter.state().current_quest.is_none());
        assert!(encounter.available_choices().is_empty());
    }

    #[test]
    fn test_choices_follow_focus_role() {
        let shop = Npc::new("Merchant", 30, 3, NpcRole::Merchant, Disposition::Neutral);
        let encounter = Encounter::with_roster(seeded(), vec![shop]);
        assert_eq!(
            encounter.available_choices(),
            vec![PlayerChoice::Move, PlayerChoice::Talk, PlayerChoice::Trade]
        );
    }

    #[test]
    fn test_invalid_choice_is_reported() {
        let shop = Npc::new("Merchant", 30, 3, NpcRole::Merchant, Disposition::Neutral);
        let mut encounter = Encounter::with_roster(seeded(), vec![shop]);
        let report = encounter.handle_choice(PlayerChoice::Attack);
        assert_eq!(report.lines[0], "Invalid choice. Try again.");
        assert_eq!(encounter.state().npcs[0].stats.current_hp, 30);
        assert_eq!(encounter.state().turn_counter, 1);
    }

    #[test]
    fn test_trade_heals_player() {
        let shop = Npc::new("Merchant", 30, 3, NpcRole::Merchant, Disposition::Neutral);
        let mut encounter = Encounter::with_roster(seeded(), vec![shop]);
        encounter.state_mut().player.stats.current_hp = 50;
        let report = encounter.handle_choice(PlayerChoice::Trade);
        assert_eq!(encounter.state().player.stats.current_hp, 70);
        assert!(report.lines.contains(&"Your health: 70/100".to_string()));
    }

    #[test]
    fn test_narrative_is_append_only() {
        let mut encounter = Encounter::new(seeded());
        let before = encounter.state().narrative.clone();
        encounter.handle_choice(PlayerChoice::Move);
        let after = &encounter.state().narrative;
        assert!(after.len() > before.len());
        assert_eq!(&after[..before.len()], &before[..]);
    }

    #[test]
    fn test_finished_encounter_ignores_choices() {
        let mut encounter = Encounter::new(seeded());
        encounter.state_mut().player.stats.current_hp = 0;
        encounter.update();
        assert_eq!(encounter.phase(), EncounterPhase::GameOver);
        let turns = encounter.state().turn_counter;

        let report = encounter.handle_choice(PlayerChoice::Move);
        assert!(report.lines.is_empty());
        assert_eq!(report.phase, EncounterPhase::GameOver);
        assert_eq!(encounter.state().turn_counter, turns);
    }
}

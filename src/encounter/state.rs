//! Shared encounter state.

use serde::{Deserialize, Serialize};

use crate::character::{Npc, NpcId, Player};
use crate::quest::Quest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterPhase {
    Playing,
    GameOver,
    Victory,
}

/// Everything the engines read and write during a turn.
///
/// The roster keeps defeated NPCs in place so ids and order stay stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterState {
    pub phase: EncounterPhase,
    pub player: Player,
    pub npcs: Vec<Npc>,
    /// The NPC the player is currently facing.
    pub focused_npc: Option<NpcId>,
    pub current_quest: Option<Quest>,
    pub turn_counter: u32,
    /// Append-only story log.
    pub narrative: Vec<String>,
}

impl EncounterState {
    pub fn new(player: Player, npcs: Vec<Npc>) -> Self {
        Self {
            phase: EncounterPhase::Playing,
            player,
            npcs,
            focused_npc: None,
            current_quest: None,
            turn_counter: 0,
            narrative: Vec::new(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == EncounterPhase::Playing
    }

    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.id == id)
    }

    pub fn living_npcs(&self) -> Vec<&Npc> {
        self.npcs.iter().filter(|n| n.is_alive()).collect()
    }

    pub fn living_count(&self) -> usize {
        self.npcs.iter().filter(|n| n.is_alive()).count()
    }

    pub fn all_npcs_defeated(&self) -> bool {
        self.npcs.iter().all(|n| !n.is_alive())
    }

    pub fn focused(&self) -> Option<&Npc> {
        self.focused_npc.and_then(|id| self.npc(id))
    }

    pub fn add_npc(&mut self, npc: Npc) -> NpcId {
        let id = npc.id;
        self.npcs.push(npc);
        id
    }

    pub fn is_quest_target(&self, id: NpcId) -> bool {
        self.current_quest.as_ref().is_some_and(|q| q.targets(id))
    }

    pub fn narrate(&mut self, line: impl Into<String>) {
        self.narrative.push(line.into());
    }

    pub fn last_line(&self) -> Option<&str> {
        self.narrative.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_living_excludes_defeated_but_keeps_roster() {
        let mut goblin = Npc::enemy("Goblin", 50, 7);
        goblin.stats.current_hp = 0;
        let goblin_id = goblin.id;
        let troll = Npc::enemy("Troll", 70, 12);
        let state = EncounterState::new(Player::default(), vec![goblin, troll]);

        assert_eq!(state.living_count(), 1);
        assert_eq!(state.living_npcs()[0].name, "Troll");
        assert!(state.npc(goblin_id).is_some());
        assert!(!state.all_npcs_defeated());
    }

    #[test]
    fn test_focused_lookup() {
        let goblin = Npc::enemy("Goblin", 50, 7);
        let id = goblin.id;
        let mut state = EncounterState::new(Player::default(), vec![goblin]);
        assert!(state.focused().is_none());
        state.focused_npc = Some(id);
        assert_eq!(state.focused().map(|n| n.name.as_str()), Some("Goblin"));
    }
}

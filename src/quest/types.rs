//! Quest data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::character::NpcId;

/// Unique identifier for quests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestId(pub Uuid);

impl QuestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QuestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for QuestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestType {
    /// Resolved when the player brings the target to 0 health.
    Defeat,
    /// Resolved when a dialogue with the target concludes.
    Talk,
    /// Resolved by talking to a target that is not an enemy.
    Find,
}

impl QuestType {
    pub const ALL: [QuestType; 3] = [QuestType::Defeat, QuestType::Talk, QuestType::Find];

    pub fn name(&self) -> &'static str {
        match self {
            QuestType::Defeat => "defeat",
            QuestType::Talk => "talk",
            QuestType::Find => "find",
        }
    }

    /// Short tag shown in front of quest descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            QuestType::Defeat => "[Combat Quest]",
            QuestType::Talk => "[Dialogue Quest]",
            QuestType::Find => "[Exploration Quest]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub quest_type: QuestType,
    pub target: NpcId,
    pub target_name: String,
    pub description: String,
    pub completed: bool,
}

impl Quest {
    pub fn new(
        quest_type: QuestType,
        target: NpcId,
        target_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: QuestId::new(),
            quest_type,
            target,
            target_name: target_name.into(),
            description: description.into(),
            completed: false,
        }
    }

    pub fn targets(&self, npc: NpcId) -> bool {
        self.target == npc
    }
}

/// Player quest history. Completed quests never return to the active list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestLog {
    pub active: Vec<Quest>,
    pub completed: Vec<Quest>,
}

impl QuestLog {
    /// Register a new active quest. Returns false for an id already in the log.
    pub fn add(&mut self, quest: Quest) -> bool {
        if self.contains(quest.id) {
            return false;
        }
        self.active.push(quest);
        true
    }

    /// Move a quest from active to completed.
    pub fn complete(&mut self, id: QuestId) -> bool {
        let Some(index) = self.active.iter().position(|q| q.id == id) else {
            return false;
        };
        let mut quest = self.active.remove(index);
        quest.completed = true;
        self.completed.push(quest);
        true
    }

    /// Drop an active quest that was replaced before completion.
    pub fn abandon(&mut self, id: QuestId) -> bool {
        let before = self.active.len();
        self.active.retain(|q| q.id != id);
        self.active.len() != before
    }

    pub fn contains(&self, id: QuestId) -> bool {
        self.active.iter().chain(self.completed.iter()).any(|q| q.id == id)
    }

    pub fn is_completed(&self, id: QuestId) -> bool {
        self.completed.iter().any(|q| q.id == id)
    }

    pub fn active_mut(&mut self, id: QuestId) -> Option<&mut Quest> {
        self.active.iter_mut().find(|q| q.id == id)
    }
}

//! The narrative capability boundary.

use serde::{Deserialize, Serialize};

use super::error::NarrativeError;
use crate::character::{Disposition, NpcRole};
use crate::quest::QuestType;

/// What a dialogue line should reflect about the moment it is spoken in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DialogueContext {
    pub role: NpcRole,
    pub health_fraction: f64,
    pub quest_relevant: bool,
    pub player_health_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NarrativeRequest {
    QuestDescription {
        quest_type: QuestType,
        npc_name: String,
    },
    NpcDialogue {
        npc_name: String,
        disposition: Disposition,
        context: DialogueContext,
    },
    QuestCompletion {
        npc_name: String,
        quest_type: QuestType,
    },
}

impl NarrativeRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            NarrativeRequest::QuestDescription { .. } => "quest_description",
            NarrativeRequest::NpcDialogue { .. } => "npc_dialogue",
            NarrativeRequest::QuestCompletion { .. } => "quest_completion",
        }
    }

    pub fn npc_name(&self) -> &str {
        match self {
            NarrativeRequest::QuestDescription { npc_name, .. }
            | NarrativeRequest::NpcDialogue { npc_name, .. }
            | NarrativeRequest::QuestCompletion { npc_name, .. } => npc_name,
        }
    }

    /// Built-in text used whenever generation is busy, slow or failing.
    pub fn fallback(&self) -> NarrativeOutput {
        match self {
            NarrativeRequest::QuestDescription { npc_name, .. } => NarrativeOutput::Text(format!(
                "Quest: Help {} with an important task.",
                npc_name
            )),
            NarrativeRequest::NpcDialogue { npc_name, .. } => {
                NarrativeOutput::Lines(vec![format!("{} regards you in silence.", npc_name)])
            }
            NarrativeRequest::QuestCompletion { npc_name, .. } => NarrativeOutput::Text(format!(
                "Quest complete! {} has been dealt with.",
                npc_name
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrativeOutput {
    Text(String),
    Lines(Vec<String>),
}

impl NarrativeOutput {
    /// Collapse to a single string, lines joined by a space.
    pub fn into_text(self) -> String {
        match self {
            NarrativeOutput::Text(text) => text,
            NarrativeOutput::Lines(lines) => lines.join(" "),
        }
    }

    pub fn into_lines(self) -> Vec<String> {
        match self {
            NarrativeOutput::Text(text) => vec![text],
            NarrativeOutput::Lines(lines) => lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            NarrativeOutput::Text(text) => text.trim().is_empty(),
            NarrativeOutput::Lines(lines) => lines.iter().all(|l| l.trim().is_empty()),
        }
    }
}

/// A source of narrative text.
///
/// Implementations may block (network calls); the generation session moves
/// those onto a worker thread unless `runs_inline` says otherwise.
pub trait NarrativeGenerator: Send + Sync {
    fn generate(&self, request: &NarrativeRequest) -> Result<NarrativeOutput, NarrativeError>;

    /// Cheap backends answer on the caller's thread.
    fn runs_inline(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_texts() {
        let quest = NarrativeRequest::QuestDescription {
            quest_type: QuestType::Defeat,
            npc_name: "Goblin".to_string(),
        };
        assert_eq!(
            quest.fallback().into_text(),
            "Quest: Help Goblin with an important task."
        );

        let completion = NarrativeRequest::QuestCompletion {
            npc_name: "Goblin".to_string(),
            quest_type: QuestType::Defeat,
        };
        assert_eq!(
            completion.fallback().into_text(),
            "Quest complete! Goblin has been dealt with."
        );

        let dialogue = NarrativeRequest::NpcDialogue {
            npc_name: "Merchant".to_string(),
            disposition: Disposition::Neutral,
            context: DialogueContext {
                role: NpcRole::Merchant,
                health_fraction: 1.0,
                quest_relevant: false,
                player_health_fraction: 1.0,
            },
        };
        assert_eq!(
            dialogue.fallback().into_lines(),
            vec!["Merchant regards you in silence.".to_string()]
        );
        assert_eq!(dialogue.kind(), "npc_dialogue");
        assert_eq!(dialogue.npc_name(), "Merchant");
    }

    #[test]
    fn test_output_emptiness() {
        assert!(NarrativeOutput::Text("  ".to_string()).is_empty());
        assert!(NarrativeOutput::Lines(vec![]).is_empty());
        assert!(!NarrativeOutput::Lines(vec!["hi".to_string()]).is_empty());
    }
}

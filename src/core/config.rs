//! Runtime configuration for an encounter.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::*;
use crate::character::{Disposition, Npc, NpcRole};
use crate::narrative::{HostedGenerator, NarrativeGenerator, TemplateGenerator};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which narrative backend to use.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum NarrativeBackend {
    #[default]
    Template,
    Hosted {
        endpoint: String,
        model: String,
        #[serde(default)]
        api_key_env: Option<String>,
    },
}

/// One NPC in a roster override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcSpec {
    pub name: String,
    pub max_hp: i32,
    pub strength: i32,
    pub role: NpcRole,
    pub disposition: Disposition,
}

impl NpcSpec {
    pub fn build(&self) -> Npc {
        Npc::new(
            self.name.clone(),
            self.max_hp,
            self.strength,
            self.role,
            self.disposition,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Minimax depth in plies.
    pub search_depth: u32,
    /// The director runs every this many turns.
    pub director_interval: u32,
    pub helper_spawn_chance: f64,
    /// How long a turn waits for narrative text before using the fallback.
    pub generation_timeout_ms: u64,
    /// Seeds the encounter RNG and the template backend.
    pub seed: Option<u64>,
    pub narrative: NarrativeBackend,
    /// Replaces the default Goblin / Merchant / Quest Giver roster.
    pub roster: Option<Vec<NpcSpec>>,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            search_depth: DEFAULT_SEARCH_DEPTH,
            director_interval: DIRECTOR_INTERVAL_TURNS,
            helper_spawn_chance: HELPER_SPAWN_CHANCE,
            generation_timeout_ms: DEFAULT_GENERATION_TIMEOUT_MS,
            seed: None,
            narrative: NarrativeBackend::Template,
            roster: None,
        }
    }
}

impl EncounterConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }

    /// Never zero.
    pub fn director_interval(&self) -> u32 {
        self.director_interval.max(1)
    }

    pub fn build_generator(&self) -> Arc<dyn NarrativeGenerator> {
        match &self.narrative {
            NarrativeBackend::Template => match self.seed {
                Some(seed) => Arc::new(TemplateGenerator::seeded(seed)),
                None => Arc::new(TemplateGenerator::new()),
            },
            NarrativeBackend::Hosted {
                endpoint,
                model,
                api_key_env,
            } => Arc::new(HostedGenerator::new(
                endpoint.as_str(),
                model.as_str(),
                api_key_env.as_deref(),
            )),
        }
    }

    pub fn build_roster(&self) -> Vec<Npc> {
        match &self.roster {
            Some(specs) => specs.iter().map(NpcSpec::build).collect(),
            None => default_roster(),
        }
    }
}

/// Goblin, Merchant and Quest Giver.
pub fn default_roster() -> Vec<Npc> {
    vec![
        Npc::enemy("Goblin", 50, 7),
        Npc::new("Merchant", 30, 3, NpcRole::Merchant, Disposition::Neutral),
        Npc::new("Quest Giver", 40, 5, NpcRole::QuestGiver, Disposition::Friendly),
    ]
}

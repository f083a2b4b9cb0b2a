//! Hosted chat-completion backend.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. Calls block,
//! so the generation session always runs this backend on a worker thread.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::NarrativeError;
use super::generator::{DialogueContext, NarrativeGenerator, NarrativeOutput, NarrativeRequest};
use crate::character::{Disposition, NpcRole};
use crate::quest::QuestType;

/// Per-request network timeout. The session's wait budget is separate.
const HTTP_TIMEOUT_SECS: u64 = 60;
const MAX_TOKENS: u32 = 120;
const TEMPERATURE: f32 = 0.75;

/// Bracketed dates and times, bare clock stamps and `#<digits>` tags.
const NOISE_PATTERN: &str = r"\(\d+[/:.]\d+[/:.]\d+\)|\d+[:.]\d+|#\d+";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

pub struct HostedGenerator {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HostedGenerator {
    /// `api_key_env` names the environment variable holding the bearer token.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key_env: Option<&str>) -> Self {
        let api_key = api_key_env.and_then(|var| std::env::var(var).ok());
        if api_key_env.is_some() && api_key.is_none() {
            tracing::warn!("API key variable {:?} is not set; sending unauthenticated requests", api_key_env);
        }
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build();
        Self {
            agent,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        }
    }

    fn complete(&self, prompt: String) -> Result<String, NarrativeError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let mut call = self.agent.post(&url);
        if let Some(key) = &self.api_key {
            call = call.set("Authorization", &format!("Bearer {}", key));
        }
        let response: ChatResponse = call.send_json(&body)?.into_json()?;

        let raw = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(NarrativeError::EmptyResponse)?;
        let cleaned = clean_text(&raw);
        if cleaned.is_empty() {
            return Err(NarrativeError::EmptyResponse);
        }
        Ok(cleaned)
    }
}

const SYSTEM_PROMPT: &str = "You write short lines for a medieval fantasy adventure. \
Never use modern language, game mechanics terms or rules references.";

fn quest_prompt(quest_type: QuestType, npc_name: &str) -> String {
    let mut prompt = format!(
        "Write a short, immersive fantasy quest description. The quest is a {} quest involving a character named {}. ",
        quest_type.name(),
        npc_name
    );
    prompt.push_str(&match quest_type {
        QuestType::Defeat => format!(
            "This {} is a dangerous threat that must be eliminated. Write a compelling call to action for a hero. ",
            npc_name
        ),
        QuestType::Talk => format!(
            "{} possesses vital information or a long-lost secret. Describe what the hero might learn. ",
            npc_name
        ),
        QuestType::Find => format!(
            "A rare artifact is associated with {}, possibly guarded or hidden. Hint at its significance. ",
            npc_name
        ),
    });
    prompt.push_str("Answer in 1-2 sentences.");
    prompt
}

fn dialogue_prompt(npc_name: &str, disposition: Disposition, context: &DialogueContext) -> String {
    let mut prompt = format!(
        "You are {}, a {} in a fantasy world, and your mood is {}. ",
        npc_name,
        context.role.name(),
        disposition.name()
    );
    prompt.push_str(match (disposition, context.role) {
        (Disposition::Hostile, _) => "You are aggressive and ready for a fight. ",
        (Disposition::Friendly, _) => "You are welcoming and helpful. ",
        (_, NpcRole::Merchant) => "You are keen to trade goods or offer services. ",
        (_, NpcRole::QuestGiver) => "You have an important task for the adventurer. ",
        (_, NpcRole::Enemy) => "You are cautious but open to interaction. ",
    });
    if context.health_fraction < 0.3 {
        prompt.push_str("You are badly wounded and desperate. ");
    } else if context.health_fraction < 0.6 {
        prompt.push_str("You appear injured and wary. ");
    }
    if context.quest_relevant {
        prompt.push_str("The adventurer is on a quest that involves you directly. ");
    }
    if context.player_health_fraction < 0.3 {
        prompt.push_str("The adventurer looks close to collapse. ");
    }
    prompt.push_str("Say one or two short sentences to the adventurer.");
    prompt
}

fn completion_prompt(quest_type: QuestType, npc_name: &str) -> String {
    format!(
        "The hero has just completed a {} quest involving {}. Write a short celebratory message in 1-2 sentences.",
        quest_type.name(),
        npc_name
    )
}

impl NarrativeGenerator for HostedGenerator {
    fn generate(&self, request: &NarrativeRequest) -> Result<NarrativeOutput, NarrativeError> {
        tracing::debug!("Requesting {} from {}", request.kind(), self.endpoint);
        match request {
            NarrativeRequest::QuestDescription {
                quest_type,
                npc_name,
            } => {
                let text = self.complete(quest_prompt(*quest_type, npc_name))?;
                Ok(NarrativeOutput::Text(format!("{} {}", quest_type.label(), text)))
            }
            NarrativeRequest::NpcDialogue {
                npc_name,
                disposition,
                context,
            } => {
                let text = self.complete(dialogue_prompt(npc_name, *disposition, context))?;
                Ok(NarrativeOutput::Lines(split_sentences(&text)))
            }
            NarrativeRequest::QuestCompletion {
                npc_name,
                quest_type,
            } => Ok(NarrativeOutput::Text(
                self.complete(completion_prompt(*quest_type, npc_name))?,
            )),
        }
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    text.split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn noise_regex() -> Option<&'static Regex> {
    static NOISE: OnceLock<Option<Regex>> = OnceLock::new();
    NOISE
        .get_or_init(|| {
            Regex::new(NOISE_PATTERN)
                .map_err(|err| tracing::warn!("Narrative noise filter disabled: {}", err))
                .ok()
        })
        .as_ref()
}

/// Strip markup noise, time stamps and number tags, collapse whitespace and
/// keep at most two sentences.
pub fn clean_text(raw: &str) -> String {
    let stripped = match noise_regex() {
        Some(noise) => noise.replace_all(raw, ""),
        None => raw.into(),
    };
    let replaced: String = stripped
        .chars()
        .map(|c| match c {
            '_' | '~' | '|' | '*' | '#' | '"' => ' ',
            c if c.is_whitespace() => ' ',
            c => c,
        })
        .collect();
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");

    let sentences: Vec<&str> = collapsed
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(2)
        .collect();
    if sentences.is_empty() {
        return String::new();
    }
    format!("{}.", sentences.join(". "))
}

//! Deterministic template backend. Always available, never blocks.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::error::NarrativeError;
use super::generator::{DialogueContext, NarrativeGenerator, NarrativeOutput, NarrativeRequest};
use crate::character::{Disposition, NpcRole};
use crate::core::dice::choose_uniform;
use crate::quest::QuestType;

const DEFEAT_TEMPLATES: &[&str] = &[
    "Vanquish the {npc}, a menace terrorizing the forest glades.",
    "Defeat the {npc} to safeguard the village from its wrath.",
    "Slay the fearsome {npc} to earn the gratitude of the realm.",
    "Challenge and overcome the {npc} to prove your heroism.",
];

const TALK_TEMPLATES: &[&str] = &[
    "Seek the wisdom of {npc}, who holds secrets of the ancient woods.",
    "Converse with {npc} to uncover clues to your next adventure.",
    "Engage {npc} in dialogue to gain their trust and knowledge.",
    "Speak with {npc} to learn of hidden paths and treasures.",
];

const FIND_TEMPLATES: &[&str] = &[
    "Discover the lost relic guarded by {npc} in the shadowed groves.",
    "Find the sacred artifact before {npc} claims its power.",
    "Uncover the treasure hidden near {npc}'s lair in the forest.",
    "Search for the enchanted item that {npc} seeks to possess.",
];

const HOSTILE_LINES: &[&str] = &[
    "You dare face me, {npc}? Your doom awaits!",
    "I, {npc}, will crush you where you stand!",
    "Foolish adventurer, {npc} shall end your tale!",
    "No mercy for you! {npc} will prevail!",
];

const NEUTRAL_LINES: &[&str] = &[
    "What brings you here, traveler? I am {npc}.",
    "{npc} has seen many wanderers. What is your purpose?",
    "Tread carefully, for {npc} watches your every move.",
    "Speak, adventurer. Why do you approach {npc}?",
];

const FRIENDLY_LINES: &[&str] = &[
    "Greetings, brave soul! I, {npc}, offer my aid.",
    "{npc} welcomes you. How may I assist your quest?",
    "A friend at last! {npc} is eager to help.",
    "Well met, hero! {npc} has much to share.",
];

const MERCHANT_LINES: &[&str] = &[
    "Welcome to {npc}'s wares! Potions, weapons, you name it!",
    "Fine goods for a fine adventurer! What does {npc} have for you?",
    "{npc}'s shop has the best in the realm. Care to browse?",
    "Rare finds await! {npc} offers only the finest.",
];

const QUEST_GIVER_LINES: &[&str] = &[
    "{npc} seeks a champion for a vital task. Are you the one?",
    "Hear me, adventurer. {npc} has a quest of great import.",
    "{npc} needs your skills to avert a looming peril.",
    "A reward awaits if you aid {npc} in this endeavor.",
];

const WOUNDED_LINES: &[&str] = &[
    "Stay back... I have little left to lose.",
    "My wounds are deep, but I am not finished yet.",
];

const QUEST_RELEVANT_LINES: &[&str] = &[
    "I know why you have come. Our fates are bound, it seems.",
    "So the tales of your errand reached me before you did.",
];

const COMPLETION_TEMPLATES: &[&str] = &[
    "Triumph! You have vanquished {npc} and completed your quest.",
    "Well done! {npc} no longer threatens the land. Quest complete!",
    "Victory is yours! {npc}'s defeat marks your success.",
    "Your quest is fulfilled! {npc} is dealt with, and peace is restored.",
];

const TALK_COMPLETION_TEMPLATES: &[&str] = &[
    "Your words with {npc} have borne fruit. Quest complete!",
    "{npc} shares what you sought. Your quest is fulfilled!",
];

const FIND_COMPLETION_TEMPLATES: &[&str] = &[
    "With {npc}'s help the lost treasure is found. Quest complete!",
    "The search ends at {npc}'s side. Your quest is fulfilled!",
];

/// Badly wounded threshold for the extra dialogue line.
const WOUNDED_FRACTION: f64 = 0.3;

/// Randomised fill-in-the-blank text per quest type, disposition and role.
pub struct TemplateGenerator {
    rng: Mutex<StdRng>,
}

impl TemplateGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick(&self, templates: &[&str], npc_name: &str) -> Result<String, NarrativeError> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let template = choose_uniform(templates, &mut *rng).ok_or(NarrativeError::EmptyResponse)?;
        Ok(template.replace("{npc}", npc_name))
    }

    fn quest_description(&self, quest_type: QuestType, npc_name: &str) -> Result<String, NarrativeError> {
        let templates = match quest_type {
            QuestType::Defeat => DEFEAT_TEMPLATES,
            QuestType::Talk => TALK_TEMPLATES,
            QuestType::Find => FIND_TEMPLATES,
        };
        let text = self.pick(templates, npc_name)?;
        Ok(format!("{} {}", quest_type.label(), text))
    }

    fn dialogue(
        &self,
        npc_name: &str,
        disposition: Disposition,
        context: &DialogueContext,
    ) -> Result<Vec<String>, NarrativeError> {
        let opening = match context.role {
            NpcRole::Merchant => MERCHANT_LINES,
            NpcRole::QuestGiver => QUEST_GIVER_LINES,
            NpcRole::Enemy => match disposition {
                Disposition::Hostile => HOSTILE_LINES,
                Disposition::Neutral => NEUTRAL_LINES,
                Disposition::Friendly => FRIENDLY_LINES,
            },
        };

        let mut lines = vec![self.pick(opening, npc_name)?];
        if context.health_fraction < WOUNDED_FRACTION {
            lines.push(self.pick(WOUNDED_LINES, npc_name)?);
        }
        if context.quest_relevant {
            lines.push(self.pick(QUEST_RELEVANT_LINES, npc_name)?);
        }
        Ok(lines)
    }

    fn completion(&self, quest_type: QuestType, npc_name: &str) -> Result<String, NarrativeError> {
        let templates = match quest_type {
            QuestType::Defeat => COMPLETION_TEMPLATES,
            QuestType::Talk => TALK_COMPLETION_TEMPLATES,
            QuestType::Find => FIND_COMPLETION_TEMPLATES,
        };
        self.pick(templates, npc_name)
    }
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrativeGenerator for TemplateGenerator {
    fn generate(&self, request: &NarrativeRequest) -> Result<NarrativeOutput, NarrativeError> {
        let output = match request {
            NarrativeRequest::QuestDescription {
                quest_type,
                npc_name,
            } => NarrativeOutput::Text(self.quest_description(*quest_type, npc_name)?),
            NarrativeRequest::NpcDialogue {
                npc_name,
                disposition,
                context,
            } => NarrativeOutput::Lines(self.dialogue(npc_name, *disposition, context)?),
            NarrativeRequest::QuestCompletion {
                npc_name,
                quest_type,
            } => NarrativeOutput::Text(self.completion(*quest_type, npc_name)?),
        };
        tracing::debug!("Template generated {}: {:?}", request.kind(), output);
        Ok(output)
    }

    fn runs_inline(&self) -> bool {
        true
    }
}

//! The knowledge one persona may draw on.
//!
//! A persona sees the shared facts, the timeline, its own secrets and what it
//! knows about the others. Another persona's secrets only reach it through
//! its own `knows_about_others` fragments.

use crate::render::RenderError;
use crate::scenario::{KnowsAboutOthers, Persona, Scenario, TimelineEntry};

/// Everything visible to one persona. Borrowed from the scenario.
#[derive(Debug, Clone, Copy)]
pub struct KnowledgePartition<'a> {
    pub persona: &'a Persona,
    pub shared_knowledge: &'a [String],
    pub private_knowledge: &'a [String],
    pub knows_about_others: &'a KnowsAboutOthers,
    pub timeline: &'a [TimelineEntry],
    pub is_murderer: bool,
}

impl<'a> KnowledgePartition<'a> {
    /// The partition for the persona with `slug`.
    pub fn for_persona(scenario: &'a Scenario, slug: &str) -> Result<Self, RenderError> {
        let persona = scenario
            .persona(slug)
            .ok_or_else(|| RenderError::UnknownPersona {
                slug: slug.to_string(),
            })?;

        Ok(Self {
            persona,
            shared_knowledge: &scenario.shared_knowledge,
            private_knowledge: &persona.private_knowledge,
            knows_about_others: &persona.knows_about_others,
            timeline: &scenario.timeline,
            is_murderer: scenario.is_murderer(slug),
        })
    }

    /// Every text in the partition.
    pub fn texts(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.shared_knowledge
            .iter()
            .chain(self.private_knowledge)
            .map(String::as_str)
            .chain(self.knows_about_others.fragments())
            .chain(
                self.timeline
                    .iter()
                    .flat_map(|entry| [entry.time.as_str(), entry.event.as_str()]),
            )
    }

    /// Whether `text` is already visible through this partition.
    pub fn exposes(&self, text: &str) -> bool {
        let text = text.trim();
        !text.is_empty() && self.texts().any(|visible| visible.contains(text))
    }
}

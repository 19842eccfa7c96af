//! Persona instruction rendering.
//!
//! Turns a scenario, a persona slug and the persona's current stress into the
//! instruction string handed to the dialogue engine. The result depends on
//! nothing but its inputs.

use crate::difficulty::Difficulty;
use crate::partition::KnowledgePartition;
use crate::prompts::PERSONA_SYSTEM_PROMPT;
use crate::scenario::{Scenario, OTHERS_KEY};
use crate::stress::StressLevel;
use crate::template::PromptTemplate;
use crate::Placeholders;
use thiserror::Error;

/// Errors from template parsing and rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("unknown persona {slug:?}")]
    UnknownPersona { slug: String },

    #[error("placeholder {{{placeholder}}} has no value")]
    MissingField { placeholder: String },

    #[error("unknown placeholder {{{placeholder}}} at byte {offset}")]
    UnknownPlaceholder { placeholder: String, offset: usize },

    #[error("placeholder opened at byte {offset} is never closed")]
    UnterminatedPlaceholder { offset: usize },
}

/// The values substituted into a persona instruction template.
#[derive(Debug, Clone, PartialEq, Eq, Placeholders)]
pub struct PersonaPrompt {
    pub persona_name: String,
    pub persona_role: String,
    pub company_name: String,
    pub personality: String,
    pub private_knowledge: String,
    pub shared_facts: String,
    pub timeline: String,
    /// Empty for a persona who knows nothing about the others.
    #[placeholder(optional)]
    pub knows_about_others: String,
    #[placeholder(optional)]
    pub stress_modifier: String,
}

/// Renders persona instructions from a parsed template.
#[derive(Debug, Clone)]
pub struct PromptRenderer {
    template: PromptTemplate<PersonaPrompt>,
    difficulty: Difficulty,
    company_name: Option<String>,
}

impl PromptRenderer {
    pub fn new(template: PromptTemplate<PersonaPrompt>) -> Self {
        Self {
            template,
            difficulty: Difficulty::default(),
            company_name: None,
        }
    }

    /// A renderer for a stored template body.
    pub fn from_body(body: &str) -> Result<Self, RenderError> {
        Ok(Self::new(PromptTemplate::parse(body)?))
    }

    /// A renderer for the built-in persona template.
    pub fn standard() -> Result<Self, RenderError> {
        Self::from_body(PERSONA_SYSTEM_PROMPT)
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Use a fixed company name instead of deriving it from the scenario name.
    pub fn with_company_name(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = Some(company_name.into());
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn template(&self) -> &PromptTemplate<PersonaPrompt> {
        &self.template
    }

    /// Collect the placeholder values for one persona.
    pub fn prompt_for(
        &self,
        scenario: &Scenario,
        slug: &str,
        stress: StressLevel,
    ) -> Result<PersonaPrompt, RenderError> {
        let partition = KnowledgePartition::for_persona(scenario, slug)?;
        let persona = partition.persona;

        let personality = if partition.is_murderer {
            format!(
                "{}\n\n{}",
                persona.personality.trim_end(),
                self.difficulty.murderer_directive()
            )
        } else {
            persona.personality.clone()
        };

        let knows_about_others = partition
            .knows_about_others
            .iter()
            .map(|(key, fragment)| {
                if key == OTHERS_KEY {
                    return bullet_lines(fragment);
                }
                let name = scenario
                    .resolve_persona(key)
                    .map(|p| p.name.as_str())
                    .unwrap_or(key);
                format!("- {name}: {fragment}")
            })
            .collect::<Vec<_>>()
            .join("\n");

        let timeline = partition
            .timeline
            .iter()
            .map(|entry| format!("- {}: {}", entry.time, entry.event))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(PersonaPrompt {
            persona_name: persona.name.clone(),
            persona_role: persona.role.clone(),
            company_name: self
                .company_name
                .clone()
                .unwrap_or_else(|| company_name_for(&scenario.name)),
            personality,
            private_knowledge: bullet_list(partition.private_knowledge),
            shared_facts: bullet_list(partition.shared_knowledge),
            timeline,
            knows_about_others,
            stress_modifier: stress.modifier(partition.is_murderer),
        })
    }

    /// Render the instruction for the persona with `slug`.
    pub fn render(
        &self,
        scenario: &Scenario,
        slug: &str,
        stress: StressLevel,
    ) -> Result<String, RenderError> {
        let prompt = self.prompt_for(scenario, slug, stress)?;
        let rendered = self.template.fill(&prompt)?;
        tracing::debug!(
            persona = slug,
            stance = stress.stance().name(),
            chars = rendered.len(),
            "Rendered persona instruction"
        );
        Ok(rendered)
    }
}

/// Render with the built-in template at the default difficulty.
pub fn render(scenario: &Scenario, slug: &str, stress: StressLevel) -> Result<String, RenderError> {
    PromptRenderer::standard()?.render(scenario, slug, stress)
}

/// The organisation name derived from a case name.
///
/// `The InnoTech Case` becomes `InnoTech`, `Der Fall Sonnenhof` becomes `Sonnenhof`.
pub fn company_name_for(scenario_name: &str) -> String {
    let mut name = scenario_name.trim();
    for prefix in ["The ", "Der Fall "] {
        if let Some(stripped) = name.strip_prefix(prefix) {
            name = stripped;
        }
    }
    if let Some(stripped) = name.strip_suffix(" Case") {
        name = stripped;
    }
    name.trim().to_string()
}

/// One `- item` line per item. Items ending in `:` are headers and kept bare.
fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| {
            if item.ends_with(':') {
                item.clone()
            } else {
                format!("- {item}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bullet_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("- {}", line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

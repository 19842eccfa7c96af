//! Scenario authoring through the AI service.
//!
//! The generator is asked for a complete case, the reply is parsed and
//! validated, and failed attempts are retried a bounded number of times.
//! Only a scenario that passes [`validate`] is ever returned.

use crate::difficulty::Difficulty;
use crate::prompts::{generation_request, SCENARIO_GENERATOR_PROMPT};
use crate::scenario::Scenario;
use crate::store::{stored_generator_prompt, TemplateStore};
use crate::validate::{validate, ValidationError};
use ai_client::{AiService, GenerationRequest};
use thiserror::Error;

/// Extra attempts after the first failed one.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Errors from scenario authoring.
#[derive(Debug, Error)]
pub enum AuthoringError {
    #[error("AI service error: {0}")]
    Service(#[from] ai_client::Error),

    #[error("generated scenario is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("generated scenario failed validation with {} error(s)", .0.len())]
    Invalid(Vec<ValidationError>),

    #[error("scenario generation failed after {attempts} attempt(s): {last}")]
    Exhausted {
        attempts: u32,
        last: Box<AuthoringError>,
    },
}

/// Asks the AI service for new scenarios.
pub struct ScenarioAuthor<E: AiService> {
    service: E,
    system_prompt: String,
    difficulty: Difficulty,
    max_retries: u32,
}

impl<E: AiService> ScenarioAuthor<E> {
    pub fn new(service: E) -> Self {
        Self {
            service,
            system_prompt: SCENARIO_GENERATOR_PROMPT.to_string(),
            difficulty: Difficulty::default(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Use the generator prompt stored in `store`, if any.
    pub fn from_store<S: TemplateStore + ?Sized>(service: E, store: &S) -> Self {
        Self::new(service).with_system_prompt(stored_generator_prompt(store))
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Generate a validated scenario. Empty `wishes` ask for a random case.
    pub async fn author(&self, wishes: &str) -> Result<Scenario, AuthoringError> {
        let request = GenerationRequest {
            system: self.system_prompt.clone(),
            prompt: generation_request(wishes, self.difficulty),
            difficulty: self.difficulty.as_str().to_string(),
        };

        tracing::info!(
            difficulty = %self.difficulty,
            random = wishes.trim().is_empty(),
            "Generating scenario"
        );

        let mut attempt = 1;
        loop {
            match self.attempt(request.clone()).await {
                Ok(scenario) => {
                    tracing::info!(attempt, scenario = %scenario.name, "Scenario generated and validated");
                    return Ok(scenario);
                }
                Err(e) if attempt > self.max_retries => {
                    tracing::warn!(attempts = attempt, error = %e, "Scenario generation failed");
                    return Err(AuthoringError::Exhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Scenario attempt failed, retrying");
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(&self, request: GenerationRequest) -> Result<Scenario, AuthoringError> {
        let text = self.service.generate(request).await?;
        let scenario = Scenario::from_json(extract_json(&text))?;
        validate(&scenario).map_err(AuthoringError::Invalid)?;
        Ok(scenario)
    }
}

/// Extract the JSON object from a reply that may wrap it in markdown or prose.
fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        let content_start = start + 7;
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        let content_start = start + 3;
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    // Prose around a bare object
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

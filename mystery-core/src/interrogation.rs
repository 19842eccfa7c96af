//! Interrogation sessions.
//!
//! A session questions the suspects of one scenario. Each persona keeps its
//! own stress level and its own conversation history; a persona never sees
//! what was said to the others.

use crate::difficulty::Difficulty;
use crate::render::{PromptRenderer, RenderError};
use crate::scenario::Scenario;
use crate::stress::StressLevel;
use ai_client::{AiService, DialogueRequest, Turn};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Turns of history kept per persona.
pub const MAX_HISTORY_TURNS: usize = 10;

/// Errors from an interrogation.
#[derive(Debug, Error)]
pub enum InterrogationError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("AI service error: {0}")]
    Service(#[from] ai_client::Error),
}

/// A persona's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub reply: String,
    /// Clue marker reported by the dialogue engine, passed through untouched.
    pub clue: Option<String>,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct Thread {
    stress: StressLevel,
    history: Vec<Turn>,
}

impl Thread {
    fn record(&mut self, question: &str, reply: &str) {
        self.history.push(Turn::player(question));
        self.history.push(Turn::persona(reply));
        if self.history.len() > MAX_HISTORY_TURNS {
            let excess = self.history.len() - MAX_HISTORY_TURNS;
            self.history.drain(0..excess);
        }
        self.stress.record_question();
    }
}

/// Questioning of one scenario's suspects.
pub struct Interrogation<E: AiService> {
    service: E,
    scenario: Arc<Scenario>,
    renderer: PromptRenderer,
    threads: HashMap<String, Thread>,
    clues: Vec<String>,
}

impl<E: AiService> Interrogation<E> {
    /// Start a session with the built-in persona template.
    pub fn new(service: E, scenario: Arc<Scenario>) -> Result<Self, RenderError> {
        Ok(Self::with_renderer(service, scenario, PromptRenderer::standard()?))
    }

    pub fn with_renderer(service: E, scenario: Arc<Scenario>, renderer: PromptRenderer) -> Self {
        Self {
            service,
            scenario,
            renderer,
            threads: HashMap::new(),
            clues: Vec::new(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.renderer = self.renderer.with_difficulty(difficulty);
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.renderer.difficulty()
    }

    pub fn scenario(&self) -> &Arc<Scenario> {
        &self.scenario
    }

    /// Current stress of a persona. Personas not yet questioned are calm.
    pub fn stress(&self, slug: &str) -> StressLevel {
        self.threads
            .get(slug)
            .map(|thread| thread.stress)
            .unwrap_or_default()
    }

    /// The turns exchanged with one persona, oldest first.
    pub fn history(&self, slug: &str) -> &[Turn] {
        self.threads
            .get(slug)
            .map(|thread| thread.history.as_slice())
            .unwrap_or_default()
    }

    /// Clue markers reported so far, in discovery order.
    pub fn clues(&self) -> &[String] {
        &self.clues
    }

    /// Put a question to the persona with `slug`.
    pub async fn ask(&mut self, slug: &str, message: &str) -> Result<Answer, InterrogationError> {
        let stress = self.stress(slug);
        let instruction = self.renderer.render(&self.scenario, slug, stress)?;

        let request =
            DialogueRequest::new(instruction, message).with_history(self.history(slug).to_vec());
        let reply = self.service.chat(request).await?;

        self.threads
            .entry(slug.to_string())
            .or_default()
            .record(message, &reply.reply);

        if let Some(clue) = &reply.clue {
            if !self.clues.contains(clue) {
                tracing::info!(persona = slug, clue = %clue, "Clue discovered");
                self.clues.push(clue.clone());
            }
        }

        tracing::debug!(
            persona = slug,
            stress = self.stress(slug).level(),
            "Persona answered"
        );

        Ok(Answer {
            reply: reply.reply,
            clue: reply.clue,
            hint: reply.hint,
        })
    }
}

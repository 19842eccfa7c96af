//! Scenario knowledge model for an AI-driven murder mystery game.
//!
//! This crate provides:
//! - The scenario document (victim, solution, timeline, suspects) and its JSON encoding
//! - A consistency validator that reports every defect of a scenario at once
//! - Per-persona knowledge partitions and persona instruction rendering
//! - A prompt template store with seeding and scenario publication
//! - Scenario authoring and interrogation sessions on top of the AI service
//!
//! # Quick Start
//!
//! ```ignore
//! use mystery_core::{render, store::default_scenario, validate, StressLevel};
//!
//! let scenario = default_scenario()?;
//! validate(&scenario).map_err(|errors| format!("{} errors", errors.len()))?;
//!
//! let instruction = render(&scenario, "robert", StressLevel::after_questions(4))?;
//! println!("{instruction}");
//! ```

extern crate self as mystery_core;

pub mod authoring;
pub mod difficulty;
pub mod interrogation;
pub mod partition;
pub mod prompts;
pub mod registry;
pub mod render;
pub mod scenario;
pub mod slug;
pub mod store;
pub mod stress;
pub mod template;
pub mod testing;
pub mod validate;

// Re-export for convenience
pub use mystery_macros::Placeholders;
pub use template::Placeholders;

// Primary public API
pub use authoring::{AuthoringError, ScenarioAuthor};
pub use difficulty::{Difficulty, UnknownDifficulty};
pub use interrogation::{Answer, Interrogation, InterrogationError};
pub use partition::KnowledgePartition;
pub use registry::{CleanupReport, GameRegistry, RegistryError};
pub use render::{render, PersonaPrompt, PromptRenderer, RenderError};
pub use scenario::{KnowsAboutOthers, Persona, Scenario, Solution, TimelineEntry, Victim};
pub use store::{MemoryTemplateStore, PublishError, StoreError, TemplateRecord, TemplateStore};
pub use stress::{Stance, StressLevel};
pub use template::PromptTemplate;
pub use testing::{MockAiService, MockGeneration};
pub use validate::{validate, ValidationError};

//! Prompt template store.
//!
//! Templates are keyed text bodies: the persona instruction template, the
//! scenario generator prompt and published scenarios. The in-memory store
//! persists to a versioned JSON file.

use crate::prompts::{
    DEFAULT_SCENARIO_KEY, PERSONA_SYSTEM_PROMPT, PERSONA_SYSTEM_PROMPT_KEY,
    SCENARIO_GENERATOR_PROMPT, SCENARIO_GENERATOR_PROMPT_KEY,
};
use crate::render::{PromptRenderer, RenderError};
use crate::scenario::Scenario;
use crate::validate::{validate, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Current store file version.
const STORE_VERSION: u32 = 1;

/// The built-in Villa Sonnenhof scenario.
const DEFAULT_SCENARIO_JSON: &str = include_str!("../fixtures/villa_sonnenhof.json");

/// Errors from the template store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("template {key:?} not found")]
    NotFound { key: String },

    #[error("template {key:?} is not a valid scenario: {source}")]
    Parse {
        key: String,
        source: serde_json::Error,
    },
}

/// Errors from publishing a scenario.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("scenario failed validation with {} error(s)", .0.len())]
    Invalid(Vec<ValidationError>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One stored template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub key: String,
    pub name: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// Listing entry without the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub key: String,
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

/// Keyed template storage.
pub trait TemplateStore {
    fn find_by_key(&self, key: &str) -> Option<TemplateRecord>;

    /// Every template without its body, ordered by key.
    fn list_all(&self) -> Vec<TemplateSummary>;

    /// Every body by key.
    fn all(&self) -> BTreeMap<String, String>;

    /// Update the template with `key`, or create it.
    fn upsert(&mut self, key: &str, name: &str, body: &str) -> TemplateRecord;
}

/// Template store held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateStore {
    records: BTreeMap<String, TemplateRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    saved_at: DateTime<Utc>,
    templates: Vec<TemplateRecord>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Save all templates to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let file = StoreFile {
            version: STORE_VERSION,
            saved_at: Utc::now(),
            templates: self.records.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(path.as_ref(), json).await?;
        tracing::debug!(path = %path.as_ref().display(), templates = self.records.len(), "Template store saved");
        Ok(())
    }

    /// Load templates from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let json = fs::read_to_string(path.as_ref()).await?;
        let file: StoreFile = serde_json::from_str(&json)?;

        if file.version != STORE_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: STORE_VERSION,
                found: file.version,
            });
        }

        let records = file
            .templates
            .into_iter()
            .map(|record| (record.key.clone(), record))
            .collect();
        Ok(Self { records })
    }

    /// Load the file at `path`, or start empty if it does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        if fs::try_exists(path.as_ref()).await? {
            Self::load_json(path).await
        } else {
            Ok(Self::new())
        }
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn find_by_key(&self, key: &str) -> Option<TemplateRecord> {
        self.records.get(key).cloned()
    }

    fn list_all(&self) -> Vec<TemplateSummary> {
        self.records
            .values()
            .map(|record| TemplateSummary {
                key: record.key.clone(),
                name: record.name.clone(),
                updated_at: record.updated_at,
            })
            .collect()
    }

    fn all(&self) -> BTreeMap<String, String> {
        self.records
            .iter()
            .map(|(key, record)| (key.clone(), record.body.clone()))
            .collect()
    }

    fn upsert(&mut self, key: &str, name: &str, body: &str) -> TemplateRecord {
        let record = TemplateRecord {
            key: key.to_string(),
            name: name.to_string(),
            body: body.to_string(),
            updated_at: Utc::now(),
        };
        self.records.insert(key.to_string(), record.clone());
        record
    }
}

/// Write the built-in templates. Existing entries with the same keys are replaced.
pub fn seed_defaults<S: TemplateStore + ?Sized>(store: &mut S) -> usize {
    let defaults = [
        (PERSONA_SYSTEM_PROMPT_KEY, "Persona System Prompt", PERSONA_SYSTEM_PROMPT),
        (SCENARIO_GENERATOR_PROMPT_KEY, "Scenario Generator Prompt", SCENARIO_GENERATOR_PROMPT),
        (DEFAULT_SCENARIO_KEY, "Default Scenario (Villa Sonnenhof)", DEFAULT_SCENARIO_JSON),
    ];
    for (key, name, body) in defaults {
        store.upsert(key, name, body);
    }
    tracing::info!(templates = defaults.len(), "Prompt templates seeded");
    defaults.len()
}

/// Validate `scenario` and store it under `key`. Nothing is written if it is invalid.
pub fn publish_scenario<S: TemplateStore + ?Sized>(
    store: &mut S,
    key: &str,
    name: &str,
    scenario: &Scenario,
) -> Result<TemplateRecord, PublishError> {
    validate(scenario).map_err(PublishError::Invalid)?;
    let body = scenario.to_json()?;
    let record = store.upsert(key, name, &body);
    tracing::info!(key, scenario = %scenario.name, "Scenario published");
    Ok(record)
}

/// Read the scenario stored under `key`.
pub fn load_scenario<S: TemplateStore + ?Sized>(store: &S, key: &str) -> Result<Scenario, StoreError> {
    let record = store.find_by_key(key).ok_or_else(|| StoreError::NotFound {
        key: key.to_string(),
    })?;
    Scenario::from_json(&record.body).map_err(|source| StoreError::Parse {
        key: key.to_string(),
        source,
    })
}

/// The built-in Villa Sonnenhof scenario.
pub fn default_scenario() -> Result<Scenario, serde_json::Error> {
    Scenario::from_json(DEFAULT_SCENARIO_JSON)
}

/// A renderer for the stored persona template, or the built-in one if none is stored.
pub fn stored_renderer<S: TemplateStore + ?Sized>(store: &S) -> Result<PromptRenderer, RenderError> {
    match store.find_by_key(PERSONA_SYSTEM_PROMPT_KEY) {
        Some(record) => PromptRenderer::from_body(&record.body),
        None => PromptRenderer::standard(),
    }
}

/// The stored generator prompt, or the built-in one.
pub fn stored_generator_prompt<S: TemplateStore + ?Sized>(store: &S) -> String {
    store
        .find_by_key(SCENARIO_GENERATOR_PROMPT_KEY)
        .map(|record| record.body)
        .unwrap_or_else(|| SCENARIO_GENERATOR_PROMPT.to_string())
}

//! Running games and their expiry.
//!
//! A game references one stored scenario by key and collects the messages
//! exchanged during play. Games expire after a fixed lifetime and are
//! removed together with their messages by [`GameRegistry::cleanup_expired`].

use ai_client::Role;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

/// Current games file version.
const REGISTRY_VERSION: u32 = 1;

/// Default game lifetime.
pub const DEFAULT_GAME_TTL_HOURS: i64 = 24;

/// Errors from the game registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("unknown game {0}")]
    UnknownGame(Uuid),
}

/// One message sent during a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMessage {
    /// Persona the message was exchanged with.
    pub persona: String,
    pub role: Role,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub scenario_key: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub messages: Vec<GameMessage>,
}

impl Game {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// What a cleanup removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub games_deleted: usize,
    pub messages_deleted: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    version: u32,
    games: Vec<Game>,
}

/// All known games.
#[derive(Debug, Clone, Default)]
pub struct GameRegistry {
    games: BTreeMap<Uuid, Game>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a game for the scenario stored under `scenario_key`.
    pub fn create(&mut self, scenario_key: &str, ttl: Duration) -> Uuid {
        self.create_at(scenario_key, Utc::now(), ttl)
    }

    /// Start a game with an explicit creation time.
    pub fn create_at(&mut self, scenario_key: &str, now: DateTime<Utc>, ttl: Duration) -> Uuid {
        let id = Uuid::new_v4();
        self.games.insert(
            id,
            Game {
                id,
                scenario_key: scenario_key.to_string(),
                created_at: now,
                expires_at: now + ttl,
                messages: Vec::new(),
            },
        );
        tracing::debug!(game = %id, scenario = scenario_key, "Game created");
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&Game> {
        self.games.get(&id)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Append a message to a game.
    pub fn record_message(
        &mut self,
        id: Uuid,
        persona: &str,
        role: Role,
        content: &str,
    ) -> Result<(), RegistryError> {
        let game = self.games.get_mut(&id).ok_or(RegistryError::UnknownGame(id))?;
        game.messages.push(GameMessage {
            persona: persona.to_string(),
            role,
            content: content.to_string(),
            sent_at: Utc::now(),
        });
        Ok(())
    }

    /// Remove every game that expired at or before `now`.
    pub fn cleanup_expired(&mut self, now: DateTime<Utc>) -> CleanupReport {
        let mut report = CleanupReport::default();
        self.games.retain(|_, game| {
            if game.is_expired(now) {
                report.games_deleted += 1;
                report.messages_deleted += game.messages.len();
                false
            } else {
                true
            }
        });

        tracing::info!(
            games_deleted = report.games_deleted,
            messages_deleted = report.messages_deleted,
            "Expired games cleaned up"
        );
        report
    }

    /// Save all games to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), RegistryError> {
        let file = RegistryFile {
            version: REGISTRY_VERSION,
            games: self.games.values().cloned().collect(),
        };
        fs::write(path.as_ref(), serde_json::to_string_pretty(&file)?).await?;
        Ok(())
    }

    /// Load games from a JSON file, or start empty if it does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        if !fs::try_exists(path.as_ref()).await? {
            return Ok(Self::new());
        }
        let json = fs::read_to_string(path.as_ref()).await?;
        let file: RegistryFile = serde_json::from_str(&json)?;
        if file.version != REGISTRY_VERSION {
            return Err(RegistryError::VersionMismatch {
                expected: REGISTRY_VERSION,
                found: file.version,
            });
        }
        Ok(Self {
            games: file.games.into_iter().map(|game| (game.id, game)).collect(),
        })
    }
}

//! Minimal client for the murder mystery AI service.
//!
//! The AI service hosts the dialogue engine that plays the suspects and the
//! scenario generator. This crate only moves requests and replies across
//! the wire:
//! - Persona dialogue (`POST /chat`) carrying a rendered instruction plus history
//! - Scenario generation (`POST /scenarios/generate`) returning raw scenario text
//! - A fire-and-forget log relay (see [`relay`])
//!
//! Reply payloads such as discovered-clue markers and hints are passed
//! through untouched.

pub mod relay;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use relay::{LogLevel, LogRecord, LogRelay};

const DEFAULT_BASE_URL: &str = "http://ai-service:8000";

/// Timeout applied to every call against the AI service.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when talking to the AI service.
#[derive(Debug, Error)]
pub enum Error {
    #[error("AI service not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// The calls the game makes against the AI service.
///
/// Implemented by [`AiClient`]; tests substitute scripted services.
#[async_trait]
pub trait AiService: Send + Sync {
    /// Ask a persona to answer one message.
    async fn chat(&self, request: DialogueRequest) -> Result<DialogueReply, Error>;

    /// Ask the generator for a new scenario; returns the raw text it produced.
    async fn generate(&self, request: GenerationRequest) -> Result<String, Error>;
}

#[async_trait]
impl<T: AiService + ?Sized> AiService for Arc<T> {
    async fn chat(&self, request: DialogueRequest) -> Result<DialogueReply, Error> {
        (**self).chat(request).await
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, Error> {
        (**self).generate(request).await
    }
}

/// HTTP client for the AI service.
#[derive(Clone)]
pub struct AiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl AiClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a client from `AI_SERVICE_URL` (and `AI_SERVICE_API_KEY` if set).
    pub fn from_env() -> Result<Self, Error> {
        let base_url = match std::env::var("AI_SERVICE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            Ok(_) => return Err(Error::NotConfigured),
            Err(_) => DEFAULT_BASE_URL.to_string(),
        };
        let client = Self::new(base_url);
        Ok(match std::env::var("AI_SERVICE_API_KEY") {
            Ok(key) if !key.is_empty() => client.with_api_key(key),
            _ => client,
        })
    }

    /// Attach a bearer token to every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The service base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let headers = self.build_headers()?;

        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .headers(headers)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status, path, "AI service returned an error");
            return Err(Error::Api { status, message });
        }

        response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout(self.timeout)
        } else {
            Error::Network(e.to_string())
        }
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {key}"))
                    .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
            );
        }
        Ok(headers)
    }
}

#[async_trait]
impl AiService for AiClient {
    async fn chat(&self, request: DialogueRequest) -> Result<DialogueReply, Error> {
        let api_request = ApiChatRequest::from(&request);
        let api_response: ApiChatResponse = self.post("/chat", &api_request).await?;
        Ok(api_response.into())
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, Error> {
        let api_response: ApiGenerateResponse =
            self.post("/scenarios/generate", &request).await?;
        api_response.into_text()
    }
}

// ============================================================================
// Public types
// ============================================================================

/// One persona dialogue turn sent to the engine.
#[derive(Debug, Clone)]
pub struct DialogueRequest {
    /// Fully rendered persona instruction.
    pub instruction: String,
    /// Earlier turns with this persona only.
    pub history: Vec<Turn>,
    /// The player's new message.
    pub message: String,
}

impl DialogueRequest {
    pub fn new(instruction: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            history: Vec::new(),
            message: message.into(),
        }
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }
}

/// A message in the conversation with one persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    /// A message from the player.
    pub fn player(text: impl Into<String>) -> Self {
        Self {
            role: Role::Player,
            content: text.into(),
        }
    }

    /// A reply from the persona.
    pub fn persona(text: impl Into<String>) -> Self {
        Self {
            role: Role::Persona,
            content: text.into(),
        }
    }
}

/// Who sent a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    Player,
    #[serde(rename = "assistant")]
    Persona,
}

/// The engine's answer. `clue` and `hint` are opaque to the game core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogueReply {
    pub reply: String,
    pub clue: Option<String>,
    pub hint: Option<String>,
}

impl DialogueReply {
    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            ..Default::default()
        }
    }

    pub fn with_clue(mut self, clue: impl Into<String>) -> Self {
        self.clue = Some(clue.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// A scenario generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    /// The generator's system prompt.
    pub system: String,
    /// The concrete request (player wishes, difficulty, language).
    pub prompt: String,
    /// Difficulty tag, e.g. `medium`.
    pub difficulty: String,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiChatRequest<'a> {
    instruction: &'a str,
    history: &'a [Turn],
    message: &'a str,
}

impl<'a> From<&'a DialogueRequest> for ApiChatRequest<'a> {
    fn from(request: &'a DialogueRequest) -> Self {
        Self {
            instruction: &request.instruction,
            history: &request.history,
            message: &request.message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    reply: String,
    #[serde(default)]
    clue: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl From<ApiChatResponse> for DialogueReply {
    fn from(response: ApiChatResponse) -> Self {
        Self {
            reply: response.reply,
            clue: response.clue.filter(|c| !c.trim().is_empty()),
            hint: response.hint.filter(|h| !h.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiGenerateResponse {
    scenario: serde_json::Value,
}

impl ApiGenerateResponse {
    /// The generator may answer with the scenario as an object or as text.
    fn into_text(self) -> Result<String, Error> {
        match self.scenario {
            serde_json::Value::String(text) => Ok(text),
            serde_json::Value::Object(_) => serde_json::to_string(&self.scenario)
                .map_err(|e| Error::Parse(e.to_string())),
            other => Err(Error::Parse(format!(
                "expected scenario object or text, got {other}"
            ))),
        }
    }
}

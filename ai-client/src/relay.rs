//! Fire-and-forget log relay.
//!
//! Sends structured log records to the web application's internal log
//! endpoint so AI-service activity ends up in the game log channel. Sending
//! never blocks the caller and never fails it: records are posted from a
//! spawned task with a short timeout and any error is dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Path of the internal log endpoint.
const LOG_PATH: &str = "/api/internal/log";

/// Default web application URL inside the compose network.
const DEFAULT_LARAVEL_URL: &str = "http://nginx:80";

/// Relay requests give up quickly; losing a log line is acceptable.
pub const LOG_TIMEOUT: Duration = Duration::from_millis(500);

/// Messages longer than this are rejected by the endpoint.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Levels accepted by the log endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warning" | "warn" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// One structured log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl LogRecord {
    /// Create a record, truncating the message to [`MAX_MESSAGE_CHARS`].
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        let message: String = message.into();
        let message = match message.char_indices().nth(MAX_MESSAGE_CHARS) {
            Some((cut, _)) => message[..cut].to_string(),
            None => message,
        };
        Self {
            level,
            message,
            context: Map::new(),
        }
    }

    /// Add a context entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Check the record against the endpoint's rules.
    pub fn validate(&self) -> Result<(), String> {
        if self.message.trim().is_empty() {
            return Err("message is required".to_string());
        }
        let chars = self.message.chars().count();
        if chars > MAX_MESSAGE_CHARS {
            return Err(format!(
                "message has {chars} characters, at most {MAX_MESSAGE_CHARS} allowed"
            ));
        }
        Ok(())
    }
}

/// Sends log records to the web application without waiting for them.
#[derive(Clone)]
pub struct LogRelay {
    client: reqwest::Client,
    endpoint: String,
    source: String,
}

impl LogRelay {
    /// Create a relay for the web application at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}{LOG_PATH}", base_url.trim_end_matches('/')),
            source: "mystery-core".to_string(),
        }
    }

    /// Create a relay from `LARAVEL_URL`, falling back to the compose default.
    pub fn from_env() -> Self {
        let base_url = std::env::var("LARAVEL_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LARAVEL_URL.to_string());
        Self::new(base_url)
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Set the `source` tag added to every record's context.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// The full endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Stamp the record with this relay's source tag.
    pub fn prepare(&self, mut record: LogRecord) -> LogRecord {
        record
            .context
            .insert("source".to_string(), Value::String(self.source.clone()));
        record
    }

    /// Send a record in the background.
    ///
    /// Returns immediately. Without a running tokio runtime the record is
    /// dropped, as are invalid records and any delivery failure.
    pub fn send(&self, record: LogRecord) {
        if record.validate().is_err() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let record = self.prepare(record);
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        handle.spawn(async move {
            let _ = client
                .post(endpoint)
                .timeout(LOG_TIMEOUT)
                .json(&record)
                .send()
                .await;
        });
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.send(LogRecord::new(LogLevel::Debug, message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.send(LogRecord::new(LogLevel::Info, message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.send(LogRecord::new(LogLevel::Warning, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(LogRecord::new(LogLevel::Error, message));
    }
}

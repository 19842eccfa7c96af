//! Testing utilities.
//!
//! - `MockAiService` answers from a script instead of calling the AI service
//! - fixture scenarios for the structured and the free-text encodings

use crate::scenario::Scenario;
use ai_client::{AiService, DialogueReply, DialogueRequest, Error, GenerationRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// Reply used once the dialogue script runs out.
const EXHAUSTED_REPLY: &str = "I have nothing more to say.";

/// A scripted generator outcome.
#[derive(Debug, Clone)]
pub enum MockGeneration {
    /// Raw text the generator returns.
    Text(String),
    /// A network failure with this message.
    Failure(String),
}

/// An AI service that plays back scripted replies and records every request.
///
/// Wrap it in an `Arc` to keep inspecting requests after handing it to a session.
#[derive(Default)]
pub struct MockAiService {
    replies: Mutex<VecDeque<DialogueReply>>,
    generations: Mutex<VecDeque<MockGeneration>>,
    chat_requests: Mutex<Vec<DialogueRequest>>,
    generation_requests: Mutex<Vec<GenerationRequest>>,
}

impl MockAiService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script dialogue replies, returned in order.
    pub fn with_replies(replies: impl IntoIterator<Item = DialogueReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Script generator outcomes, returned in order.
    pub fn with_generations(generations: impl IntoIterator<Item = MockGeneration>) -> Self {
        Self {
            generations: Mutex::new(generations.into_iter().collect()),
            ..Self::default()
        }
    }

    pub async fn queue_reply(&self, reply: DialogueReply) {
        self.replies.lock().await.push_back(reply);
    }

    pub async fn queue_generation(&self, generation: MockGeneration) {
        self.generations.lock().await.push_back(generation);
    }

    /// Every dialogue request received so far.
    pub async fn chat_requests(&self) -> Vec<DialogueRequest> {
        self.chat_requests.lock().await.clone()
    }

    /// Every generation request received so far.
    pub async fn generation_requests(&self) -> Vec<GenerationRequest> {
        self.generation_requests.lock().await.clone()
    }
}

#[async_trait]
impl AiService for MockAiService {
    async fn chat(&self, request: DialogueRequest) -> Result<DialogueReply, Error> {
        self.chat_requests.lock().await.push(request);
        Ok(self
            .replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| DialogueReply::text(EXHAUSTED_REPLY)))
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, Error> {
        self.generation_requests.lock().await.push(request);
        match self.generations.lock().await.pop_front() {
            Some(MockGeneration::Text(text)) => Ok(text),
            Some(MockGeneration::Failure(message)) => Err(Error::Network(message)),
            None => Err(Error::Api {
                status: 503,
                message: "no scripted scenario left".to_string(),
            }),
        }
    }
}

/// The built-in Villa Sonnenhof case, structured encoding.
pub fn villa_sonnenhof() -> Result<Scenario, serde_json::Error> {
    crate::store::default_scenario()
}

/// The InnoTech case in the older free-text encoding.
pub fn innotech_legacy() -> Result<Scenario, serde_json::Error> {
    Scenario::from_json(include_str!("../fixtures/innotech_legacy.json"))
}

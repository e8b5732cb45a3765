//! In-memory fakes of the port traits, shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use holicard_types::card::CachedCard;
use holicard_types::chat::{Keyboard, MessageRef, SessionId};
use holicard_types::error::{ImageError, RepositoryError, TransportError};
use holicard_types::holiday::CardKey;
use holicard_types::image::ImageQuery;
use holicard_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason, Usage,
};

use crate::flow::transport::ChatTransport;
use crate::image::ImageSearch;
use crate::llm::provider::LlmProvider;
use crate::storage::card_cache::CardCache;

// ---------------------------------------------------------------------------
// LLM
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum MockReply {
    Text(String),
    Error(String),
}

pub struct MockProvider {
    capabilities: ProviderCapabilities,
    reply: MockReply,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    pub fn replying(text: &str) -> Self {
        Self::with_reply(MockReply::Text(text.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_reply(MockReply::Error(message.to_string()))
    }

    fn with_reply(reply: MockReply) -> Self {
        Self {
            capabilities: ProviderCapabilities {
                max_context_tokens: 128_000,
                max_output_tokens: 4_096,
            },
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            MockReply::Text(text) => Ok(CompletionResponse {
                id: "resp-mock".to_string(),
                content: text.clone(),
                model: "mock-model".to_string(),
                stop_reason: StopReason::EndTurn,
                usage: Usage {
                    input_tokens: 10,
                    output_tokens: 20,
                },
            }),
            MockReply::Error(message) => Err(LlmError::Provider {
                message: message.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Card cache
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemoryCardCache {
    cards: Arc<Mutex<HashMap<CardKey, CachedCard>>>,
    pub reads: Arc<AtomicUsize>,
    pub writes: Arc<AtomicUsize>,
}

impl MemoryCardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<CardKey> {
        self.cards.lock().unwrap().keys().cloned().collect()
    }
}

impl CardCache for MemoryCardCache {
    async fn get(&self, key: &CardKey) -> Result<Option<String>, RepositoryError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.cards.lock().unwrap().get(key).map(|c| c.body.clone()))
    }

    async fn put(&self, key: &CardKey, body: &str) -> Result<(), RepositoryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let mut cards = self.cards.lock().unwrap();
        let created_at = cards.get(key).map(|c| c.created_at).unwrap_or(now);
        cards.insert(
            key.clone(),
            CachedCard {
                key: key.clone(),
                body: body.to_string(),
                created_at,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn count_distinct_countries(&self) -> Result<u64, RepositoryError> {
        let cards = self.cards.lock().unwrap();
        let mut countries: Vec<&str> = cards.keys().map(|k| k.country.as_str()).collect();
        countries.sort_unstable();
        countries.dedup();
        Ok(countries.len() as u64)
    }

    async fn count_all(&self) -> Result<u64, RepositoryError> {
        Ok(self.cards.lock().unwrap().len() as u64)
    }

    async fn clear_all(&self) -> Result<u64, RepositoryError> {
        let mut cards = self.cards.lock().unwrap();
        let removed = cards.len() as u64;
        cards.clear();
        Ok(removed)
    }

    async fn list_entries(&self) -> Result<Vec<CachedCard>, RepositoryError> {
        Ok(self.cards.lock().unwrap().values().cloned().collect())
    }
}

/// A cache whose every call fails, for the generic error path.
pub struct BrokenCardCache;

impl CardCache for BrokenCardCache {
    async fn get(&self, _key: &CardKey) -> Result<Option<String>, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn put(&self, _key: &CardKey, _body: &str) -> Result<(), RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn count_distinct_countries(&self) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn count_all(&self) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn clear_all(&self) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn list_entries(&self) -> Result<Vec<CachedCard>, RepositoryError> {
        Err(RepositoryError::Connection)
    }
}

// ---------------------------------------------------------------------------
// Image search
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum ImageScript {
    Urls(Vec<String>),
    Fail,
    NoCredentials,
}

#[derive(Clone)]
pub struct ScriptedImageSearch {
    script: ImageScript,
    pub queries: Arc<Mutex<Vec<ImageQuery>>>,
}

impl ScriptedImageSearch {
    pub fn new(script: ImageScript) -> Self {
        Self {
            script,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn urls(count: usize) -> Self {
        Self::new(ImageScript::Urls(
            (1..=count)
                .map(|i| format!("https://images.example/{i}.jpg"))
                .collect(),
        ))
    }
}

impl ImageSearch for ScriptedImageSearch {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn search(&self, query: &ImageQuery) -> Result<Vec<String>, ImageError> {
        self.queries.lock().unwrap().push(query.clone());
        match &self.script {
            ImageScript::Urls(urls) => Ok(urls.clone()),
            ImageScript::Fail => Err(ImageError::Request("connection refused".to_string())),
            ImageScript::NoCredentials => Err(ImageError::MissingCredentials),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Text {
        session: SessionId,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Photos {
        session: SessionId,
        urls: Vec<String>,
    },
    Edit {
        message: MessageRef,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Delete(MessageRef),
    Ack(String),
}

#[derive(Clone, Default)]
pub struct RecordingTransport {
    pub sent: Arc<Mutex<Vec<Outgoing>>>,
    next_id: Arc<AtomicI64>,
    fail_photos: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_photos() -> Self {
        Self {
            fail_photos: true,
            ..Self::default()
        }
    }

    pub fn outgoing(&self) -> Vec<Outgoing> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts sent as new messages, in order.
    pub fn texts(&self) -> Vec<String> {
        self.outgoing()
            .into_iter()
            .filter_map(|o| match o {
                Outgoing::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn last_text(&self) -> Option<(String, Option<Keyboard>)> {
        self.outgoing().into_iter().rev().find_map(|o| match o {
            Outgoing::Text { text, keyboard, .. } => Some((text, keyboard)),
            _ => None,
        })
    }
}

impl ChatTransport for RecordingTransport {
    async fn send_text(
        &self,
        session: SessionId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef, TransportError> {
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent.lock().unwrap().push(Outgoing::Text {
            session,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(MessageRef {
            session,
            message_id,
        })
    }

    async fn send_photos(&self, session: SessionId, urls: &[String]) -> Result<(), TransportError> {
        if self.fail_photos {
            return Err(TransportError::Rejected(
                "Bad Request: wrong file identifier".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(Outgoing::Photos {
            session,
            urls: urls.to_vec(),
        });
        Ok(())
    }

    async fn edit_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(Outgoing::Edit {
            message,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(Outgoing::Delete(message));
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push(Outgoing::Ack(callback_id.to_string()));
        Ok(())
    }
}

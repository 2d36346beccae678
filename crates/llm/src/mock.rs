//! Mock Chat Backend Implementation
//!
//! Records every request and answers deterministically, or with a scripted
//! reply or failure. Thread-safe via `Arc<Mutex<>>`.

use std::sync::{Arc, Mutex};

use crate::{BackendError, ChatBackend, ChatReply, ChatRequest};

#[derive(Debug, Clone)]
enum Behavior {
    Echo,
    Reply(ChatReply),
    Fail(String),
}

/// Mock chat backend for testing
#[derive(Debug, Clone)]
pub struct MockChatBackend {
    requests: Arc<Mutex<Vec<ChatRequest>>>,
    behavior: Behavior,
}

impl MockChatBackend {
    /// Echo backend: answers `Mock response to: <query>` and keeps or mints a
    /// conversation id.
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    /// Backend that always returns the given reply.
    pub fn with_reply(reply: ChatReply) -> Self {
        Self::with_behavior(Behavior::Reply(reply))
    }

    /// Backend whose every call fails with a response error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            behavior,
        }
    }

    /// Return all recorded requests.
    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .expect("requests lock poisoned: prior test panicked")
            .clone()
    }

    /// Clear all recorded requests.
    pub fn reset(&self) {
        self.requests
            .lock()
            .expect("requests lock poisoned: prior test panicked")
            .clear();
    }
}

impl Default for MockChatBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ChatBackend for MockChatBackend {
    async fn send_message(&self, request: ChatRequest) -> Result<ChatReply, BackendError> {
        tracing::info!("Mock chat backend processing request");

        let call_index = {
            let mut requests = self
                .requests
                .lock()
                .map_err(|e| BackendError::Request(format!("requests lock poisoned: {e}")))?;
            requests.push(request.clone());
            requests.len()
        };

        match &self.behavior {
            Behavior::Echo => Ok(ChatReply {
                answer: Some(format!("Mock response to: {}", request.query)),
                conversation_id: Some(
                    request
                        .conversation_id
                        .unwrap_or_else(|| format!("mock-conv-{}", call_index)),
                ),
            }),
            Behavior::Reply(reply) => Ok(reply.clone()),
            Behavior::Fail(message) => Err(BackendError::Response(message.clone())),
        }
    }
}

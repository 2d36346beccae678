//! Threadbridge AI Backend Service
//!
//! Provides the conversational backend used by the relay:
//! - Dify chat-messages API integration in blocking mode
//! - Scripted mock backend for testing and local development

pub mod dify;
pub mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use threadbridge_common::Config;

pub use dify::DifyClient;
pub use mock::MockChatBackend;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("AI backend configuration error: {0}")]
    Configuration(String),

    #[error("AI backend request error: {0}")]
    Request(String),

    #[error("AI backend response error: {0}")]
    Response(String),

    #[error("AI backend rate limit exceeded")]
    RateLimit,
}

/// One user turn sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User text with bot mentions already stripped
    pub query: String,
    /// Chat platform id of the sender
    pub user: String,
    /// Existing backend session; `None` starts a new one
    pub conversation_id: Option<String>,
}

/// Backend answer for one turn.
///
/// Both fields are optional: the backend may omit either, and callers must
/// fall back accordingly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: Option<String>,
    pub conversation_id: Option<String>,
}

/// Dify client configuration
#[derive(Clone)]
pub struct DifyConfig {
    pub api_key: String,
    pub base_url: String,
    /// Request timeout in seconds; `None` means no client-side timeout
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for DifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DifyConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl From<&Config> for DifyConfig {
    fn from(config: &Config) -> Self {
        Self {
            api_key: config.dify_api_key.clone(),
            base_url: config.dify_base_url.clone(),
            timeout_secs: config.dify_timeout_secs,
        }
    }
}

/// Conversational AI backend.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one message and wait for the complete answer.
    async fn send_message(&self, request: ChatRequest) -> Result<ChatReply, BackendError>;
}

//! Threadbridge Slack Service
//!
//! Delivers relay replies into chat threads:
//! - Slack Web API `chat.postMessage` integration for production
//! - Mock notifier that records posts for testing and development

pub mod client;
pub mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use threadbridge_common::Config;

pub use client::SlackClient;
pub use mock::MockChatNotifier;

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("Slack request error: {0}")]
    Request(String),

    #[error("Slack response error: {0}")]
    Response(String),

    /// Slack answered 200 with `ok: false`
    #[error("Slack API error: {0}")]
    Api(String),
}

/// A reply addressed to one thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPost {
    pub channel: String,
    pub text: String,
    pub thread_ts: String,
}

/// Slack client configuration.
#[derive(Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    /// Web API host, e.g. `https://slack.com`
    pub api_base_url: String,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl From<&Config> for SlackConfig {
    fn from(config: &Config) -> Self {
        Self {
            bot_token: config.slack_bot_token.clone(),
            api_base_url: config.slack_api_base_url.clone(),
        }
    }
}

/// Posts replies into the originating chat thread.
#[async_trait::async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn post_reply(&self, post: ChatPost) -> Result<(), NotifierError>;
}

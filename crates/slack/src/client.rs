//! Slack Web API Client Implementation
//!
//! POSTs thread replies to `{api_base_url}/api/chat.postMessage`.

use serde::Deserialize;

use crate::{ChatNotifier, ChatPost, NotifierError, SlackConfig};

/// Common envelope of every Web API response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Real Slack client for posting thread replies.
pub struct SlackClient {
    http: reqwest::Client,
    bot_token: String,
    post_message_url: String,
}

impl SlackClient {
    /// Create a new Slack client from configuration.
    pub fn new(config: SlackConfig) -> Self {
        let post_message_url = format!(
            "{}/api/chat.postMessage",
            config.api_base_url.trim_end_matches('/')
        );
        Self {
            http: reqwest::Client::new(),
            bot_token: config.bot_token,
            post_message_url,
        }
    }
}

#[async_trait::async_trait]
impl ChatNotifier for SlackClient {
    async fn post_reply(&self, post: ChatPost) -> Result<(), NotifierError> {
        let response = self
            .http
            .post(&self.post_message_url)
            .bearer_auth(&self.bot_token)
            .json(&post)
            .send()
            .await
            .map_err(|e| NotifierError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(NotifierError::Response(format!(
                "Slack API returned {}: {}",
                status, body
            )));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| NotifierError::Response(format!("Failed to parse response: {}", e)))?;

        if !api_response.ok {
            return Err(NotifierError::Api(
                api_response
                    .error
                    .unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        tracing::debug!(channel = %post.channel, thread_ts = %post.thread_ts, "Slack reply posted");
        Ok(())
    }
}

//! Dify Chat API Implementation
//!
//! Calls the Dify chat-messages endpoint (`{base_url}/v1/chat-messages`)
//! in blocking response mode using reqwest HTTP client.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{BackendError, ChatBackend, ChatReply, ChatRequest, DifyConfig};

const RESPONSE_MODE: &str = "blocking";

/// Dify chat-messages request body
#[derive(Debug, Serialize)]
struct ChatMessagesRequest<'a> {
    inputs: serde_json::Map<String, serde_json::Value>,
    query: &'a str,
    // Serialized as `null` for a new conversation, never omitted
    conversation_id: Option<&'a str>,
    user: &'a str,
    response_mode: &'static str,
}

/// Dify chat-messages response body (blocking mode)
#[derive(Debug, Deserialize)]
struct ChatMessagesResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    conversation_id: Option<String>,
}

/// Dify API error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    code: String,
    message: String,
}

/// Dify chat backend
pub struct DifyClient {
    client: Client,
    config: DifyConfig,
}

impl DifyClient {
    /// Create a new Dify client
    pub fn new(config: DifyConfig) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Configuration(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat-messages",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl ChatBackend for DifyClient {
    async fn send_message(&self, request: ChatRequest) -> Result<ChatReply, BackendError> {
        let body = ChatMessagesRequest {
            inputs: serde_json::Map::new(),
            query: &request.query,
            conversation_id: request.conversation_id.as_deref(),
            user: &request.user,
            response_mode: RESPONSE_MODE,
        };

        tracing::debug!(
            user = %request.user,
            conversation_id = ?request.conversation_id,
            "Sending Dify chat-messages request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::RateLimit);
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_body) {
                return Err(BackendError::Response(format!(
                    "Dify API error ({}): {}",
                    error_response.code, error_response.message
                )));
            }

            return Err(BackendError::Response(format!(
                "Dify API returned {}: {}",
                status, error_body
            )));
        }

        let api_response: ChatMessagesResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Response(format!("Failed to parse response: {}", e)))?;

        tracing::debug!(
            conversation_id = ?api_response.conversation_id,
            has_answer = api_response.answer.is_some(),
            "Dify response received"
        );

        Ok(ChatReply {
            answer: api_response.answer.filter(|a| !a.is_empty()),
            conversation_id: api_response.conversation_id.filter(|c| !c.is_empty()),
        })
    }
}

//! Domain entities for Threads domain

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::StoreError;

/// Correlation between one chat thread and one AI conversation.
///
/// Created once, after the backend confirmed a conversation id for a thread
/// that had none. Never reassigned or deleted by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ThreadMapping {
    /// Root timestamp of the chat thread; unique in the store
    #[serde(rename = "slack_thread_ts")]
    #[sqlx(rename = "slack_thread_ts")]
    pub thread_key: String,
    pub conversation_id: String,
    /// Sender of the message that opened the conversation
    pub user_id: String,
    /// Assigned by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ThreadMapping {
    /// Create a new, not yet persisted mapping
    pub fn new(
        thread_key: impl Into<String>,
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let mapping = Self {
            thread_key: thread_key.into(),
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
            created_at: None,
        };

        if mapping.thread_key.is_empty() {
            return Err(StoreError::InvalidMapping("thread key is required".to_string()));
        }
        if mapping.conversation_id.is_empty() {
            return Err(StoreError::InvalidMapping(
                "conversation id is required".to_string(),
            ));
        }

        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_mapping() {
        let mapping = ThreadMapping::new("100.1", "conv-9", "U1").unwrap();
        assert_eq!(mapping.thread_key, "100.1");
        assert_eq!(mapping.conversation_id, "conv-9");
        assert_eq!(mapping.user_id, "U1");
        assert!(mapping.created_at.is_none());
    }

    #[test]
    fn test_empty_keys_rejected() {
        assert!(ThreadMapping::new("", "conv-9", "U1").is_err());
        assert!(ThreadMapping::new("100.1", "", "U1").is_err());
    }

    #[test]
    fn test_serializes_with_store_column_names() {
        let mapping = ThreadMapping::new("100.1", "conv-9", "U1").unwrap();
        let json = serde_json::to_value(&mapping).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "slack_thread_ts": "100.1",
                "conversation_id": "conv-9",
                "user_id": "U1"
            })
        );
    }
}

//! Supabase thread store
//!
//! Talks to the PostgREST API exposed at `{supabase_url}/rest/v1/{table}`.
//! Upserts rely on the unique constraint on `slack_thread_ts` together with
//! `Prefer: resolution=merge-duplicates`, so a second writer updates the row
//! instead of failing.

use reqwest::Client;
use serde::Deserialize;

use super::{validate_table_name, StoreConfig, StoreError, ThreadStore};
use crate::domain::entities::ThreadMapping;

const CONFLICT_COLUMN: &str = "slack_thread_ts";
const UPSERT_PREFERENCE: &str = "resolution=merge-duplicates,return=minimal";

#[derive(Debug, Deserialize)]
struct ConversationRow {
    conversation_id: Option<String>,
}

/// PostgREST error body
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

pub struct SupabaseThreadStore {
    client: Client,
    table_url: String,
    api_key: String,
}

impl SupabaseThreadStore {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        validate_table_name(&config.table)?;
        if config.supabase_url.is_empty() {
            return Err(StoreError::Configuration(
                "Supabase URL is required".to_string(),
            ));
        }

        let table_url = format!(
            "{}/rest/v1/{}",
            config.supabase_url.trim_end_matches('/'),
            config.table
        );

        Ok(Self {
            client: Client::new(),
            table_url,
            api_key: config.supabase_key,
        })
    }

    async fn error_from(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());

        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => StoreError::Response(format!(
                "Supabase returned {} ({}): {}",
                status,
                err.code.unwrap_or_else(|| "unknown".to_string()),
                err.message
            )),
            Err(_) => StoreError::Response(format!("Supabase returned {}: {}", status, body)),
        }
    }
}

#[async_trait::async_trait]
impl ThreadStore for SupabaseThreadStore {
    async fn find_conversation(&self, thread_key: &str) -> Result<Option<String>, StoreError> {
        let response = self
            .client
            .get(&self.table_url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[
                ("select", "conversation_id".to_string()),
                (CONFLICT_COLUMN, format!("eq.{}", thread_key)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let rows: Vec<ConversationRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Response(format!("Failed to parse response: {}", e)))?;

        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.conversation_id)
            .filter(|id| !id.is_empty()))
    }

    async fn upsert_mapping(&self, mapping: &ThreadMapping) -> Result<(), StoreError> {
        let response = self
            .client
            .post(&self.table_url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", UPSERT_PREFERENCE)
            .query(&[("on_conflict", CONFLICT_COLUMN)])
            .json(mapping)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        tracing::debug!(thread_key = %mapping.thread_key, "Supabase upsert succeeded");
        Ok(())
    }
}

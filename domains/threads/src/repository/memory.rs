//! In-memory thread store
//!
//! Keeps mappings in a process-local map with the same last-write-wins
//! upsert policy as the database stores. Used for local runs and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::{StoreError, ThreadStore};
use crate::domain::entities::ThreadMapping;

#[derive(Debug, Clone, Default)]
pub struct MemoryThreadStore {
    rows: Arc<Mutex<HashMap<String, ThreadMapping>>>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with existing mappings
    pub fn with_mappings(mappings: impl IntoIterator<Item = ThreadMapping>) -> Self {
        let rows = mappings
            .into_iter()
            .map(|m| (m.thread_key.clone(), m))
            .collect();
        Self {
            rows: Arc::new(Mutex::new(rows)),
        }
    }

    /// Snapshot of every stored mapping
    pub fn mappings(&self) -> Vec<ThreadMapping> {
        self.rows
            .lock()
            .expect("rows lock poisoned: prior test panicked")
            .values()
            .cloned()
            .collect()
    }

    pub fn get(&self, thread_key: &str) -> Option<ThreadMapping> {
        self.rows
            .lock()
            .expect("rows lock poisoned: prior test panicked")
            .get(thread_key)
            .cloned()
    }
}

#[async_trait::async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn find_conversation(&self, thread_key: &str) -> Result<Option<String>, StoreError> {
        let rows = self
            .rows
            .lock()
            .map_err(|e| StoreError::Request(format!("rows lock poisoned: {e}")))?;
        Ok(rows.get(thread_key).map(|m| m.conversation_id.clone()))
    }

    async fn upsert_mapping(&self, mapping: &ThreadMapping) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|e| StoreError::Request(format!("rows lock poisoned: {e}")))?;

        let created_at = rows
            .get(&mapping.thread_key)
            .and_then(|existing| existing.created_at)
            .unwrap_or_else(Utc::now);

        rows.insert(
            mapping.thread_key.clone(),
            ThreadMapping {
                created_at: Some(created_at),
                ..mapping.clone()
            },
        );
        Ok(())
    }
}

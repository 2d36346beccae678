//! Direct Postgres thread store
//!
//! Same table layout as the Supabase deployment, reached through sqlx.

use sqlx::PgPool;

use super::{validate_table_name, StoreError, ThreadStore};
use crate::domain::entities::ThreadMapping;

/// Table created by the bundled migrations
pub const MIGRATED_TABLE: &str = "conversation_threads";

#[derive(Clone)]
pub struct PgThreadStore {
    pool: PgPool,
    table: String,
}

impl PgThreadStore {
    pub fn new(pool: PgPool, table: &str) -> Result<Self, StoreError> {
        validate_table_name(table)?;
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    /// Connect to the database at `database_url`
    pub async fn connect(database_url: &str, table: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        tracing::info!("Thread store database connection established");
        Self::new(pool, table)
    }

    /// Apply the bundled migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    /// Find the full mapping for a thread
    pub async fn find(&self, thread_key: &str) -> Result<Option<ThreadMapping>, StoreError> {
        let mapping = sqlx::query_as::<_, ThreadMapping>(&format!(
            r#"
            SELECT slack_thread_ts, conversation_id, user_id, created_at
            FROM {}
            WHERE slack_thread_ts = $1
            "#,
            self.table
        ))
        .bind(thread_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(mapping)
    }
}

#[async_trait::async_trait]
impl ThreadStore for PgThreadStore {
    async fn find_conversation(&self, thread_key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .find(thread_key)
            .await?
            .map(|m| m.conversation_id)
            .filter(|id| !id.is_empty()))
    }

    async fn upsert_mapping(&self, mapping: &ThreadMapping) -> Result<(), StoreError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (slack_thread_ts, conversation_id, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (slack_thread_ts) DO UPDATE SET
                conversation_id = EXCLUDED.conversation_id,
                user_id = EXCLUDED.user_id
            "#,
            self.table
        ))
        .bind(&mapping.thread_key)
        .bind(&mapping.conversation_id)
        .bind(&mapping.user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

//! Repository implementations for Threads domain
//!
//! Every store keys mappings on the thread key and resolves duplicate writes
//! itself; callers never see a uniqueness violation.

pub mod memory;
pub mod postgres;
pub mod supabase;

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use threadbridge_common::Config;

use crate::domain::entities::ThreadMapping;

pub use memory::MemoryThreadStore;
pub use postgres::PgThreadStore;
pub use supabase::SupabaseThreadStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store configuration error: {0}")]
    Configuration(String),

    #[error("Store request error: {0}")]
    Request(String),

    #[error("Store response error: {0}")]
    Response(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),
}

/// Durable thread key → conversation id mapping.
#[async_trait::async_trait]
pub trait ThreadStore: Send + Sync {
    /// Look up the conversation bound to a thread.
    async fn find_conversation(&self, thread_key: &str) -> Result<Option<String>, StoreError>;

    /// Insert the mapping, or resolve against an existing row for the same
    /// thread key without raising a conflict.
    async fn upsert_mapping(&self, mapping: &ThreadMapping) -> Result<(), StoreError>;
}

/// Store configuration.
#[derive(Clone)]
pub struct StoreConfig {
    /// Store provider (supabase, postgres, memory)
    pub provider: String,
    pub supabase_url: String,
    pub supabase_key: String,
    pub table: String,
    pub database_url: Option<String>,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("provider", &self.provider)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &"[REDACTED]")
            .field("table", &self.table)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl From<&Config> for StoreConfig {
    fn from(config: &Config) -> Self {
        Self {
            provider: config.store_provider.clone(),
            supabase_url: config.supabase_url.clone(),
            supabase_key: config.supabase_anon_key.clone(),
            table: config.store_table.clone(),
            database_url: config.database_url.clone(),
        }
    }
}

/// Table names are interpolated into URLs and SQL, so only plain
/// identifiers within the Postgres length limit are accepted.
static TABLE_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("table name pattern is valid")
});

pub(crate) fn validate_table_name(table: &str) -> Result<(), StoreError> {
    if TABLE_NAME_REGEX.is_match(table) {
        Ok(())
    } else {
        Err(StoreError::Configuration(format!(
            "Invalid table name: '{}'",
            table
        )))
    }
}

/// Factory for creating ThreadStore implementations.
pub struct ThreadStoreFactory;

impl ThreadStoreFactory {
    /// Create a ThreadStore based on configuration.
    ///
    /// The postgres provider connects and applies migrations before returning.
    pub async fn create(config: StoreConfig) -> Result<Box<dyn ThreadStore>, StoreError> {
        validate_table_name(&config.table)?;

        match config.provider.as_str() {
            "supabase" => {
                tracing::info!(table = %config.table, "Creating Supabase thread store");
                Ok(Box::new(SupabaseThreadStore::new(config)?))
            }
            "postgres" => {
                if config.table != postgres::MIGRATED_TABLE {
                    return Err(StoreError::Configuration(format!(
                        "postgres provider only supports the migrated table '{}', got '{}'",
                        postgres::MIGRATED_TABLE,
                        config.table
                    )));
                }
                tracing::info!(table = %config.table, "Creating Postgres thread store");
                let database_url = config.database_url.as_deref().ok_or_else(|| {
                    StoreError::Configuration(
                        "DATABASE_URL is required for postgres provider".to_string(),
                    )
                })?;
                let store = PgThreadStore::connect(database_url, &config.table).await?;
                store.migrate().await?;
                Ok(Box::new(store))
            }
            "memory" => {
                tracing::warn!("Creating in-memory thread store; mappings are lost on restart");
                Ok(Box::new(MemoryThreadStore::new()))
            }
            provider => Err(StoreError::Configuration(format!(
                "Unknown thread store provider: {}. Supported providers: supabase, postgres, memory",
                provider
            ))),
        }
    }
}

//! Threads domain: chat thread to AI conversation mappings

pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::ThreadMapping;

// Re-export repository types
pub use repository::{
    MemoryThreadStore, PgThreadStore, StoreConfig, StoreError, SupabaseThreadStore, ThreadStore,
    ThreadStoreFactory,
};

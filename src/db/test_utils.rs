//! Shared test utilities for database operations
//!
//! Every helper goes through `Database::new(None)` so tests run against the
//! same schema as production.

use sqlx::SqlitePool;

use super::{Database, KvStore};

/// Create an in-memory test database pool with full schema
pub async fn test_pool() -> SqlitePool {
    let db = Database::new(None)
        .await
        .expect("Failed to create test database");
    db.pool().clone()
}

/// Create an in-memory key-value store
pub async fn test_store() -> KvStore {
    KvStore::new(test_pool().await)
}

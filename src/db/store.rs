//! JSON values stored by key

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

/// Key-value storage with JSON-encoded values
#[derive(Debug, Clone)]
pub struct KvStore {
    pool: SqlitePool,
}

impl KvStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load and decode the value under `key`
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((raw,)) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encode and store `value` under `key`, replacing any previous value
    pub async fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        let updated_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(&raw)
        .bind(&updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete the value under `key`
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_store;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = test_store().await;

        store.put_json("list", &vec!["Prone", "Stunned"]).await.unwrap();
        let list: Option<Vec<String>> = store.get_json("list").await.unwrap();
        assert_eq!(list, Some(vec!["Prone".to_string(), "Stunned".to_string()]));
    }

    #[tokio::test]
    async fn test_overwrite_and_delete() {
        let store = test_store().await;

        store.put_json("k", &1).await.unwrap();
        store.put_json("k", &2).await.unwrap();
        assert_eq!(store.get_json::<i32>("k").await.unwrap(), Some(2));

        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert_eq!(store.get_json::<i32>("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_undecodable_value_errors() {
        let store = test_store().await;

        store.put_json("k", "not a number").await.unwrap();
        assert!(store.get_json::<i32>("k").await.is_err());
    }
}

//! SQLite storage backend

use super::traits::{DurableStore, OpenStore, StorageError, StorageResult, StoredEntry};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SQLite-backed key/value store
///
/// One table, one row per key. Thread-safe via internal mutex on the
/// connection. Queries run on tokio's blocking pool, never on a runtime
/// worker.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Enable WAL mode for concurrent reads during writes
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    /// Run `op` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StorageError::Unavailable("connection mutex poisoned".to_string()))?;
            op(&conn)
        })
        .await
        .map_err(|e| StorageError::Unavailable(format!("storage task failed: {}", e)))?
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl DurableStore for SqliteStore {
    async fn read_all(&self) -> StorageResult<Vec<StoredEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key, value_json FROM kv ORDER BY key")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut entries = Vec::new();
            for row in rows {
                let (key, value_json) = row?;
                entries.push((key, serde_json::from_str(&value_json)?));
            }
            Ok(entries)
        })
        .await
    }

    async fn write(&self, key: &str, value: &Value) -> StorageResult<()> {
        let key = key.to_string();
        let value_json = serde_json::to_string(value)?;
        let updated_at = chrono::Utc::now().to_rfc3339();

        self.with_conn(move |conn| {
            conn.execute(
                r#"
                INSERT INTO kv (key, value_json, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value_json = excluded.value_json,
                    updated_at = excluded.updated_at
                "#,
                params![key, value_json, updated_at],
            )?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[tokio::test]
    async fn test_empty_store_reads_nothing() {
        let store = create_test_store();
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_and_read_all() {
        let store = create_test_store();
        store
            .write("scanResult:a.com", &json!({"techs": []}))
            .await
            .unwrap();
        store.write("other", &json!(1)).await.unwrap();

        let entries = store.read_all().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.contains(&("scanResult:a.com".to_string(), json!({"techs": []}))));
        assert!(entries.contains(&("other".to_string(), json!(1))));
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_key() {
        let store = create_test_store();
        store.write("k", &json!({"v": 1})).await.unwrap();
        store.write("k", &json!({"v": 2})).await.unwrap();

        let entries = store.read_all().await.unwrap();
        assert_eq!(entries, vec![("k".to_string(), json!({"v": 2}))]);
    }

    #[test]
    fn test_wal_mode_enabled_at_connection() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test-wal.db");
        let store = SqliteStore::open(&db_path).unwrap();

        let journal_mode: String = store
            .conn
            .lock()
            .unwrap()
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();

        assert_eq!(journal_mode, "wal");
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("sitelens.db");

        {
            let store = SqliteStore::open(&db_path).unwrap();
            store
                .write("scanResult:a.com", &json!({"seo": {"visits": 100}}))
                .await
                .unwrap();
        }

        let reopened = SqliteStore::open(&db_path).unwrap();
        let entries = reopened.read_all().await.unwrap();
        assert_eq!(
            entries,
            vec![("scanResult:a.com".to_string(), json!({"seo": {"visits": 100}}))]
        );
    }
}

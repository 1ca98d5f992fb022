//! Key-value document storage.
//!
//! Writes are last-write-wins per `(namespace, key)`; there is no versioning.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Mutex, RwLock};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{IndexerError, Result};

/// Namespace holding serialized documents keyed by URI.
pub const DOCUMENTS: &str = "documents";

pub trait DocumentStore: Send + Sync {
    fn store(&self, namespace: &str, key: &str, value: &[u8]) -> Result<()>;
    fn fetch(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>>;
    fn keys(&self, namespace: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> IndexerError {
    IndexerError::Store("store lock poisoned".to_string())
}

impl DocumentStore for MemoryStore {
    fn store(&self, namespace: &str, key: &str, value: &[u8]) -> Result<()> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        tables
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn fetch(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.get(namespace).and_then(|t| t.get(key)).cloned())
    }

    fn keys(&self, namespace: &str) -> Result<Vec<String>> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables
            .get(namespace)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default())
    }
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::configure_pragmas(&conn)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )?;
        Ok(())
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(poisoned)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value BLOB NOT NULL,
                PRIMARY KEY (namespace, key)
            );
            "#,
        )?;
        Ok(())
    }
}

impl DocumentStore for SqliteStore {
    fn store(&self, namespace: &str, key: &str, value: &[u8]) -> Result<()> {
        let conn = self.conn.lock().map_err(poisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (namespace, key, value) VALUES (?1, ?2, ?3)",
            params![namespace, key, value],
        )?;
        Ok(())
    }

    fn fetch(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock().map_err(poisoned)?;
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn keys(&self, namespace: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock().map_err(poisoned)?;
        let mut stmt = conn.prepare("SELECT key FROM kv WHERE namespace = ?1 ORDER BY key")?;
        let keys = stmt
            .query_map(params![namespace], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(keys)
    }
}

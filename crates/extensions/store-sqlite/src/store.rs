//! SQLite memory store implementation.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use memvault_protocols::{
    Memory, MemoryPatch, MemoryStats, MemoryStore, Metadata, ScanFilter, ScanOrder, StatsQuery,
    StoreError, Timestamp,
};

use crate::rows::{format_ts, load_memory, memory_from_row, with_tags, write_tags, COLUMNS};
use crate::schema::init_schema;

#[path = "store_scan.rs"]
mod store_scan;
use store_scan::scan_memories;

#[path = "store_stats.rs"]
mod store_stats;
use store_stats::aggregate_stats;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

/// SQLite-based structured memory store.
pub struct SqliteMemoryStore {
    conn: Connection,
}

impl SqliteMemoryStore {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    /// Open (or create) a file-backed database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Connection(e.to_string()))?;
        }
        info!(path = %path.display(), "Opening SQLite memory store");
        let conn = Connection::open(path)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(to_store_error)?;
        Ok(Self { conn })
    }
}

pub(crate) fn to_store_error(err: tokio_rusqlite::Error) -> StoreError {
    match err {
        tokio_rusqlite::Error::ConnectionClosed => {
            StoreError::Connection("connection closed".to_string())
        }
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::FromSqlConversionFailure(
            idx,
            _,
            source,
        )) => StoreError::Serialization(format!("column {}: {}", idx, source)),
        other => StoreError::Query(other.to_string()),
    }
}

fn to_json(metadata: &Metadata) -> Result<String, StoreError> {
    serde_json::to_string(metadata).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl MemoryStore for SqliteMemoryStore {
    fn id(&self) -> &str {
        "sqlite"
    }

    async fn insert(&self, memory: &Memory) -> Result<(), StoreError> {
        let metadata = to_json(&memory.metadata)?;
        let memory = memory.clone();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;

                tx.execute(
                    &format!(
                        "INSERT INTO memories ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                        COLUMNS
                    ),
                    params![
                        memory.id,
                        memory.content,
                        memory.context,
                        memory.user_id,
                        memory.conversation_id,
                        memory.importance_score,
                        metadata,
                        memory.access_count as i64,
                        memory.last_accessed.as_ref().map(format_ts),
                        format_ts(&memory.created_at),
                        format_ts(&memory.updated_at),
                        memory.vector_id,
                    ],
                )?;
                write_tags(&tx, &memory.id, &memory.tags)?;

                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(to_store_error)
    }

    async fn get(&self, id: &str) -> Result<Option<Memory>, StoreError> {
        let id = id.to_string();
        self.conn
            .call(move |conn| Ok(load_memory(conn, &id)?))
            .await
            .map_err(to_store_error)
    }

    async fn record_access(&self, id: &str, at: Timestamp) -> Result<Option<Memory>, StoreError> {
        let id = id.to_string();
        let at = format_ts(&at);
        self.conn
            .call(move |conn| {
                // Increment and timestamp bump happen in one statement.
                let sql = format!(
                    "UPDATE memories SET access_count = access_count + 1,
                     last_accessed = CASE
                         WHEN last_accessed IS NULL OR last_accessed < ?2 THEN ?2
                         ELSE last_accessed
                     END
                     WHERE id = ?1 RETURNING {}",
                    COLUMNS
                );
                let memory = conn
                    .query_row(&sql, params![id, at], memory_from_row)
                    .optional()?;
                Ok(with_tags(conn, memory)?)
            })
            .await
            .map_err(to_store_error)
    }

    async fn update(
        &self,
        id: &str,
        patch: &MemoryPatch,
        at: Timestamp,
    ) -> Result<Option<Memory>, StoreError> {
        let id = id.to_string();
        let mut sets = vec!["updated_at = ?"];
        let mut values = vec![Value::from(format_ts(&at))];

        if let Some(content) = &patch.content {
            sets.push("content = ?");
            sets.push("vector_id = NULL");
            values.push(Value::from(content.clone()));
        }
        if let Some(context) = &patch.context {
            sets.push("context = ?");
            values.push(Value::from(context.clone()));
        }
        if let Some(importance) = patch.importance_score {
            sets.push("importance_score = ?");
            values.push(Value::from(i64::from(importance)));
        }
        if let Some(metadata) = &patch.metadata {
            sets.push("metadata = ?");
            values.push(Value::from(to_json(metadata)?));
        }
        values.push(Value::from(id.clone()));

        let sql = format!("UPDATE memories SET {} WHERE id = ?", sets.join(", "));
        let tags = patch.tags.clone();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;

                let changed = tx.execute(&sql, params_from_iter(values))?;
                if changed == 0 {
                    return Ok(None);
                }
                if let Some(tags) = tags {
                    write_tags(&tx, &id, &tags)?;
                }
                let memory = load_memory(&tx, &id)?;

                tx.commit()?;
                Ok(memory)
            })
            .await
            .map_err(to_store_error)
    }

    async fn set_vector_id(&self, id: &str, vector_id: Option<&str>) -> Result<bool, StoreError> {
        let id = id.to_string();
        let vector_id = vector_id.map(String::from);
        self.conn
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE memories SET vector_id = ?2 WHERE id = ?1",
                    params![id, vector_id],
                )?;
                Ok(changed > 0)
            })
            .await
            .map_err(to_store_error)
    }

    async fn delete(&self, id: &str) -> Result<Option<Memory>, StoreError> {
        let id = id.to_string();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;

                let memory = load_memory(&tx, &id)?;
                if memory.is_some() {
                    tx.execute("DELETE FROM memories WHERE id = ?1", [&id])?;
                    debug!(memory_id = %id, "Deleted memory record");
                }

                tx.commit()?;
                Ok(memory)
            })
            .await
            .map_err(to_store_error)
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        order: ScanOrder,
        limit: usize,
    ) -> Result<Vec<Memory>, StoreError> {
        if limit == 0 || filter.vector_ids.as_ref().is_some_and(Vec::is_empty) {
            return Ok(Vec::new());
        }
        let filter = filter.clone();
        self.conn
            .call(move |conn| Ok(scan_memories(conn, &filter, order, limit)?))
            .await
            .map_err(to_store_error)
    }

    async fn aggregate(&self, query: &StatsQuery) -> Result<MemoryStats, StoreError> {
        let query = *query;
        self.conn
            .call(move |conn| Ok(aggregate_stats(conn, &query)?))
            .await
            .map_err(to_store_error)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.conn
            .call(|conn| {
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
                Ok(())
            })
            .await
            .map_err(to_store_error)
    }
}

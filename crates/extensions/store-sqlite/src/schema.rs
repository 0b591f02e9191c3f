//! Database schema management.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use tokio_rusqlite::Error;

/// SQL name of the Unicode lowercase function used by text search.
pub const CASEFOLD_FN: &str = "casefold";

/// Initialize the database schema and the connection's SQL functions.
pub fn init_schema(conn: &Connection) -> Result<(), Error> {
    register_functions(conn)?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Register `casefold(text)`. SQLite's own `lower()` and `LIKE` fold ASCII
/// only. NULL stays NULL.
pub fn register_functions(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.create_scalar_function(
        CASEFOLD_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| casefold(&t)))
        },
    )
}

/// Unicode lowercase, shared by the SQL function and query preparation.
pub fn casefold(text: &str) -> String {
    text.to_lowercase()
}

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- Memory records
CREATE TABLE IF NOT EXISTS memories (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    context TEXT,
    user_id TEXT,
    conversation_id TEXT,
    importance_score INTEGER NOT NULL DEFAULT 1,
    metadata TEXT NOT NULL DEFAULT '{}',
    access_count INTEGER NOT NULL DEFAULT 0,
    last_accessed TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    vector_id TEXT
);

-- Ordered tags, one row per (memory, tag)
CREATE TABLE IF NOT EXISTS memory_tags (
    memory_id TEXT NOT NULL,
    tag TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (memory_id, tag),
    FOREIGN KEY (memory_id) REFERENCES memories(id) ON DELETE CASCADE
);

-- Indexes for filters and orderings
CREATE INDEX IF NOT EXISTS idx_memories_context ON memories(context);
CREATE INDEX IF NOT EXISTS idx_memories_user ON memories(user_id);
CREATE INDEX IF NOT EXISTS idx_memories_conversation ON memories(conversation_id);
CREATE INDEX IF NOT EXISTS idx_memories_created ON memories(created_at);
CREATE INDEX IF NOT EXISTS idx_memories_importance ON memories(importance_score, created_at);
CREATE INDEX IF NOT EXISTS idx_memories_vector ON memories(vector_id);
CREATE INDEX IF NOT EXISTS idx_memory_tags_tag ON memory_tags(tag);
"#;

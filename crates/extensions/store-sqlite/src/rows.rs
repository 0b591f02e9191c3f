//! Row mapping between `memories`/`memory_tags` and [`Memory`].

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use memvault_protocols::{Memory, Metadata, Timestamp};

/// Column list shared by every query that materialises a [`Memory`].
pub(crate) const COLUMNS: &str = "id, content, context, user_id, conversation_id, \
     importance_score, metadata, access_count, last_accessed, created_at, updated_at, vector_id";

/// Fixed-width RFC 3339 so stored timestamps sort lexically.
pub(crate) fn format_ts(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<Timestamp> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Map a row selected with [`COLUMNS`]. Tags are left empty.
pub(crate) fn memory_from_row(row: &Row<'_>) -> rusqlite::Result<Memory> {
    let metadata_raw: String = row.get(6)?;
    let metadata: Metadata = serde_json::from_str(&metadata_raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    let access_count: i64 = row.get(7)?;
    let last_accessed = row
        .get::<_, Option<String>>(8)?
        .map(|raw| parse_ts(8, &raw))
        .transpose()?;
    let created_at = parse_ts(9, &row.get::<_, String>(9)?)?;
    let updated_at = parse_ts(10, &row.get::<_, String>(10)?)?;

    Ok(Memory {
        id: row.get(0)?,
        content: row.get(1)?,
        context: row.get(2)?,
        tags: Vec::new(),
        user_id: row.get(3)?,
        conversation_id: row.get(4)?,
        importance_score: row.get(5)?,
        metadata,
        access_count: access_count.max(0) as u64,
        last_accessed,
        created_at,
        updated_at,
        vector_id: row.get(11)?,
    })
}

/// Fill `tags` for every memory in `memories` with one query.
pub(crate) fn attach_tags(conn: &Connection, memories: &mut [Memory]) -> rusqlite::Result<()> {
    if memories.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["?"; memories.len()].join(",");
    let sql = format!(
        "SELECT memory_id, tag FROM memory_tags WHERE memory_id IN ({}) \
         ORDER BY memory_id, position",
        placeholders
    );
    let mut stmt = conn.prepare(&sql)?;
    let ids = memories.iter().map(|m| Value::from(m.id.clone()));

    let mut by_id: HashMap<String, Vec<String>> = HashMap::new();
    let rows = stmt.query_map(params_from_iter(ids), |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    for row in rows {
        let (memory_id, tag) = row?;
        by_id.entry(memory_id).or_default().push(tag);
    }

    for memory in memories.iter_mut() {
        memory.tags = by_id.remove(&memory.id).unwrap_or_default();
    }
    Ok(())
}

/// Load one memory with its tags.
pub(crate) fn load_memory(conn: &Connection, id: &str) -> rusqlite::Result<Option<Memory>> {
    let sql = format!("SELECT {} FROM memories WHERE id = ?1", COLUMNS);
    let memory = conn.query_row(&sql, [id], memory_from_row).optional()?;
    with_tags(conn, memory)
}

/// Attach tags to an optional single record.
pub(crate) fn with_tags(
    conn: &Connection,
    memory: Option<Memory>,
) -> rusqlite::Result<Option<Memory>> {
    match memory {
        Some(memory) => {
            let mut one = [memory];
            attach_tags(conn, &mut one)?;
            let [memory] = one;
            Ok(Some(memory))
        }
        None => Ok(None),
    }
}

/// Replace the tag set of a memory, keeping first-occurrence order.
pub(crate) fn write_tags(conn: &Connection, memory_id: &str, tags: &[String]) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM memory_tags WHERE memory_id = ?1", [memory_id])?;
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO memory_tags (memory_id, tag, position) VALUES (?1, ?2, ?3)",
    )?;
    for (position, tag) in tags.iter().enumerate() {
        stmt.execute(params![memory_id, tag, position as i64])?;
    }
    Ok(())
}

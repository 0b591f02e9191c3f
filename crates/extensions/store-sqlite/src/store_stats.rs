//! Aggregate statistics for the SQLite memory store.

use std::collections::BTreeMap;

use chrono::Duration;
use rusqlite::Connection;

use memvault_protocols::{MemoryStats, StatsQuery, TagCount};

use crate::rows::format_ts;

/// Label for memories without a context.
const UNCATEGORIZED: &str = "uncategorized";

pub(crate) fn aggregate_stats(
    conn: &Connection,
    query: &StatsQuery,
) -> Result<MemoryStats, rusqlite::Error> {
    let (total_memories, total_users, avg_access_count) = conn.query_row(
        "SELECT COUNT(*), COUNT(DISTINCT user_id), COALESCE(AVG(access_count), 0.0)
         FROM memories",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, f64>(2)?,
            ))
        },
    )?;

    let memories_by_context = count_groups(
        conn,
        "SELECT COALESCE(context, ?1) AS ctx, COUNT(*) FROM memories GROUP BY ctx",
        UNCATEGORIZED,
    )?;

    let cutoff = query.now - Duration::days(i64::from(query.window_days));
    let memories_by_day = count_groups(
        conn,
        "SELECT substr(created_at, 1, 10) AS day, COUNT(*) FROM memories
         WHERE created_at >= ?1 GROUP BY day",
        &format_ts(&cutoff),
    )?;

    let mut stmt = conn.prepare(
        "SELECT tag, COUNT(*) AS n FROM memory_tags
         GROUP BY tag ORDER BY n DESC, tag ASC LIMIT ?1",
    )?;
    let top_tags = stmt
        .query_map([query.top_tags as i64], |row| {
            Ok(TagCount {
                tag: row.get(0)?,
                count: row.get::<_, i64>(1)? as u64,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MemoryStats {
        total_memories: total_memories as u64,
        total_users: total_users as u64,
        memories_by_context,
        memories_by_day,
        top_tags,
        avg_access_count,
    })
}

fn count_groups(
    conn: &Connection,
    sql: &str,
    param: &str,
) -> Result<BTreeMap<String, u64>, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([param], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
    })?;
    rows.collect()
}

//! Filtered listings for the SQLite memory store.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use memvault_protocols::{Memory, ScanFilter, ScanOrder};

use crate::rows::{attach_tags, memory_from_row, COLUMNS};
use crate::schema::casefold;

pub(crate) fn scan_memories(
    conn: &Connection,
    filter: &ScanFilter,
    order: ScanOrder,
    limit: usize,
) -> Result<Vec<Memory>, rusqlite::Error> {
    let (sql, values) = build_scan_query(filter, order, limit);
    let mut stmt = conn.prepare(&sql)?;
    let mut memories = stmt
        .query_map(params_from_iter(values), memory_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    attach_tags(conn, &mut memories)?;
    Ok(memories)
}

fn build_scan_query(filter: &ScanFilter, order: ScanOrder, limit: usize) -> (String, Vec<Value>) {
    let mut sql = format!("SELECT {} FROM memories m WHERE 1=1", COLUMNS);
    let mut values = Vec::new();

    if let Some(text) = &filter.text {
        // Literal substring on Unicode-folded text; no LIKE wildcards.
        sql.push_str(
            " AND (instr(casefold(m.content), ?) > 0 OR EXISTS \
             (SELECT 1 FROM memory_tags t WHERE t.memory_id = m.id AND instr(casefold(t.tag), ?) > 0))",
        );
        let needle = casefold(text);
        values.push(Value::from(needle.clone()));
        values.push(Value::from(needle));
    }

    for (column, value) in [
        ("m.context", &filter.context),
        ("m.user_id", &filter.user_id),
        ("m.conversation_id", &filter.conversation_id),
    ] {
        if let Some(value) = value {
            sql.push_str(&format!(" AND {} = ?", column));
            values.push(Value::from(value.clone()));
        }
    }

    for tag in &filter.tags {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM memory_tags t WHERE t.memory_id = m.id AND t.tag = ?)",
        );
        values.push(Value::from(tag.clone()));
    }

    if let Some(vector_ids) = &filter.vector_ids {
        sql.push_str(" AND m.vector_id IN (");
        sql.push_str(&vec!["?"; vector_ids.len()].join(","));
        sql.push(')');
        values.extend(vector_ids.iter().cloned().map(Value::from));
    }

    sql.push_str(match order {
        ScanOrder::Importance => {
            " ORDER BY m.importance_score DESC, m.created_at DESC, m.rowid DESC"
        }
        ScanOrder::Newest => " ORDER BY m.created_at DESC, m.rowid DESC",
    });
    sql.push_str(" LIMIT ?");
    values.push(Value::from(i64::try_from(limit).unwrap_or(i64::MAX)));

    (sql, values)
}

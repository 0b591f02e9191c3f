use std::sync::Arc;

use chrono::{Duration, Utc};
use memvault_protocols::{Metadata, TagCount, DEFAULT_IMPORTANCE};

use super::*;

fn memory(content: &str) -> Memory {
    let now = Utc::now();
    Memory {
        id: uuid::Uuid::new_v4().to_string(),
        content: content.to_string(),
        context: None,
        tags: Vec::new(),
        user_id: None,
        conversation_id: None,
        importance_score: DEFAULT_IMPORTANCE,
        metadata: Metadata::new(),
        access_count: 0,
        last_accessed: None,
        created_at: now,
        updated_at: now,
        vector_id: None,
    }
}

fn tag_count(tag: &str, count: u64) -> TagCount {
    TagCount {
        tag: tag.to_string(),
        count,
    }
}

fn stats_query() -> StatsQuery {
    StatsQuery {
        top_tags: 10,
        window_days: 30,
        now: Utc::now(),
    }
}

#[tokio::test]
async fn test_store_id() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    assert_eq!(store.id(), "sqlite");
    store.ping().await.unwrap();
}

#[tokio::test]
async fn test_insert_and_get() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let mut m = memory("User prefers morning coffee");
    m.context = Some("preferences".to_string());
    m.tags = vec!["morning".to_string(), "coffee".to_string()];
    m.user_id = Some("u1".to_string());
    m.importance_score = 8;
    m.vector_id = Some("vec-1".to_string());
    m.metadata.insert("source".to_string(), serde_json::json!("chat"));

    store.insert(&m).await.unwrap();
    let loaded = store.get(&m.id).await.unwrap().unwrap();

    assert_eq!(loaded.content, m.content);
    assert_eq!(loaded.tags, vec!["morning", "coffee"]);
    assert_eq!(loaded.context.as_deref(), Some("preferences"));
    assert_eq!(loaded.importance_score, 8);
    assert_eq!(loaded.vector_id.as_deref(), Some("vec-1"));
    assert_eq!(loaded.metadata.get("source"), Some(&serde_json::json!("chat")));
    assert_eq!(loaded.access_count, 0);
    assert!(loaded.last_accessed.is_none());
}

#[tokio::test]
async fn test_get_nonexistent() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    assert!(store.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_id_rejected() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let m = memory("first");
    store.insert(&m).await.unwrap();
    assert!(store.insert(&m).await.is_err());
}

#[tokio::test]
async fn test_record_access_increments() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let m = memory("tracked");
    store.insert(&m).await.unwrap();

    let first = store.record_access(&m.id, Utc::now()).await.unwrap().unwrap();
    assert_eq!(first.access_count, 1);
    let stamp = first.last_accessed.unwrap();

    let second = store.record_access(&m.id, Utc::now()).await.unwrap().unwrap();
    assert_eq!(second.access_count, 2);
    assert!(second.last_accessed.unwrap() >= stamp);
}

#[tokio::test]
async fn test_record_access_never_moves_backwards() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let m = memory("tracked");
    store.insert(&m).await.unwrap();

    let now = Utc::now();
    store.record_access(&m.id, now).await.unwrap();
    let after = store
        .record_access(&m.id, now - Duration::hours(1))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(after.access_count, 2);
    assert_eq!(format_ts(&after.last_accessed.unwrap()), format_ts(&now));
}

#[tokio::test]
async fn test_record_access_missing() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    assert!(store.record_access("missing", Utc::now()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_access_is_not_lost() {
    let store = Arc::new(SqliteMemoryStore::in_memory().await.unwrap());
    let m = memory("popular");
    store.insert(&m).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let store = store.clone();
        let id = m.id.clone();
        handles.push(tokio::spawn(async move {
            store.record_access(&id, Utc::now()).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let loaded = store.get(&m.id).await.unwrap().unwrap();
    assert_eq!(loaded.access_count, 20);
}

#[tokio::test]
async fn test_update_content_clears_vector_id() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let mut m = memory("old text");
    m.vector_id = Some("vec-old".to_string());
    store.insert(&m).await.unwrap();

    let later = Utc::now() + Duration::seconds(1);
    let updated = store
        .update(&m.id, &MemoryPatch::content("new text"), later)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.content, "new text");
    assert!(updated.vector_id.is_none());
    assert!(updated.updated_at > m.updated_at);
    assert_eq!(format_ts(&updated.created_at), format_ts(&m.created_at));
}

#[tokio::test]
async fn test_update_metadata_keeps_vector_id() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let mut m = memory("stable");
    m.vector_id = Some("vec-1".to_string());
    m.tags = vec!["a".to_string()];
    store.insert(&m).await.unwrap();

    let patch = MemoryPatch {
        context: Some("work".to_string()),
        tags: Some(vec!["b".to_string(), "c".to_string()]),
        importance_score: Some(9),
        ..Default::default()
    };
    let updated = store.update(&m.id, &patch, Utc::now()).await.unwrap().unwrap();

    assert_eq!(updated.vector_id.as_deref(), Some("vec-1"));
    assert_eq!(updated.context.as_deref(), Some("work"));
    assert_eq!(updated.tags, vec!["b", "c"]);
    assert_eq!(updated.importance_score, 9);
}

#[tokio::test]
async fn test_update_missing() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let result = store
        .update("missing", &MemoryPatch::content("x"), Utc::now())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_set_vector_id() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let m = memory("degraded");
    store.insert(&m).await.unwrap();

    assert!(store.set_vector_id(&m.id, Some("vec-9")).await.unwrap());
    let loaded = store.get(&m.id).await.unwrap().unwrap();
    assert_eq!(loaded.vector_id.as_deref(), Some("vec-9"));
    assert_eq!(format_ts(&loaded.updated_at), format_ts(&m.updated_at));

    assert!(store.set_vector_id(&m.id, None).await.unwrap());
    assert!(!store.set_vector_id("missing", Some("x")).await.unwrap());
}

#[tokio::test]
async fn test_delete_returns_record_and_removes_tags() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let mut m = memory("to delete");
    m.tags = vec!["temp".to_string()];
    store.insert(&m).await.unwrap();

    let deleted = store.delete(&m.id).await.unwrap().unwrap();
    assert_eq!(deleted.tags, vec!["temp"]);
    assert!(store.get(&m.id).await.unwrap().is_none());
    assert!(store.delete(&m.id).await.unwrap().is_none());

    let stats = store.aggregate(&stats_query()).await.unwrap();
    assert!(stats.top_tags.is_empty());
}

#[tokio::test]
async fn test_scan_text_matches_content_and_tags() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let a = memory("Loves Morning COFFEE");
    let mut b = memory("Drinks tea");
    b.tags = vec!["coffee-alternative".to_string()];
    let c = memory("Walks the dog");
    for m in [&a, &b, &c] {
        store.insert(m).await.unwrap();
    }

    let found = store
        .scan(&ScanFilter::text("coffee"), ScanOrder::Importance, 10)
        .await
        .unwrap();
    let ids: Vec<_> = found.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(found.len(), 2);
    assert!(ids.contains(&a.id.as_str()));
    assert!(ids.contains(&b.id.as_str()));
}

#[tokio::test]
async fn test_scan_text_treats_wildcards_literally() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    store.insert(&memory("battery at 100% charge")).await.unwrap();
    store.insert(&memory("battery at 100 volts")).await.unwrap();

    let found = store
        .scan(&ScanFilter::text("100%"), ScanOrder::Newest, 10)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].content.contains("100%"));
}

#[tokio::test]
async fn test_scan_text_folds_unicode_case() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let cafe = memory("Likes Café au lait");
    let mut greek = memory("Reads philosophy");
    greek.tags = vec!["ΣΟΦΙΑ".to_string()];
    store.insert(&cafe).await.unwrap();
    store.insert(&greek).await.unwrap();
    store.insert(&memory("Likes cafe latte")).await.unwrap();

    let found = store
        .scan(&ScanFilter::text("CAFÉ"), ScanOrder::Newest, 10)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, cafe.id);

    let found = store
        .scan(&ScanFilter::text("σοφια"), ScanOrder::Newest, 10)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, greek.id);
}

#[tokio::test]
async fn test_scan_metadata_filters() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let mut a = memory("a");
    a.user_id = Some("u1".to_string());
    a.context = Some("work".to_string());
    a.tags = vec!["x".to_string(), "y".to_string()];
    let mut b = memory("b");
    b.user_id = Some("u1".to_string());
    b.tags = vec!["x".to_string()];
    let mut c = memory("c");
    c.user_id = Some("u2".to_string());
    c.tags = vec!["x".to_string(), "y".to_string()];
    for m in [&a, &b, &c] {
        store.insert(m).await.unwrap();
    }

    let filter = ScanFilter {
        user_id: Some("u1".to_string()),
        tags: vec!["x".to_string(), "y".to_string()],
        ..Default::default()
    };
    let found = store.scan(&filter, ScanOrder::Newest, 10).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, a.id);

    let filter = ScanFilter {
        context: Some("work".to_string()),
        ..Default::default()
    };
    assert_eq!(store.scan(&filter, ScanOrder::Newest, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_scan_by_vector_ids() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let mut a = memory("a");
    a.vector_id = Some("v-a".to_string());
    let mut b = memory("b");
    b.vector_id = Some("v-b".to_string());
    store.insert(&a).await.unwrap();
    store.insert(&b).await.unwrap();

    let filter = ScanFilter::vector_ids(vec!["v-b".to_string(), "v-gone".to_string()]);
    let found = store.scan(&filter, ScanOrder::Newest, 10).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, b.id);

    let empty = ScanFilter::vector_ids(Vec::new());
    assert!(store.scan(&empty, ScanOrder::Newest, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_scan_orderings_and_limit() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let base = Utc::now();
    let mut low_new = memory("low new");
    low_new.importance_score = 2;
    low_new.created_at = base;
    let mut high_old = memory("high old");
    high_old.importance_score = 9;
    high_old.created_at = base - Duration::minutes(5);
    let mut mid = memory("mid");
    mid.importance_score = 5;
    mid.created_at = base - Duration::minutes(1);
    for m in [&low_new, &high_old, &mid] {
        store.insert(m).await.unwrap();
    }

    let by_importance = store
        .scan(&ScanFilter::default(), ScanOrder::Importance, 10)
        .await
        .unwrap();
    let order: Vec<_> = by_importance.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(order, vec!["high old", "mid", "low new"]);

    let newest = store
        .scan(&ScanFilter::default(), ScanOrder::Newest, 2)
        .await
        .unwrap();
    let order: Vec<_> = newest.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(order, vec!["low new", "mid"]);
}

#[tokio::test]
async fn test_scan_newest_breaks_timestamp_ties_by_insertion() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let at = Utc::now();
    let mut first = memory("first");
    first.created_at = at;
    let mut second = memory("second");
    second.created_at = at;
    store.insert(&first).await.unwrap();
    store.insert(&second).await.unwrap();

    let found = store
        .scan(&ScanFilter::default(), ScanOrder::Newest, 10)
        .await
        .unwrap();
    assert_eq!(found[0].content, "second");
}

#[tokio::test]
async fn test_aggregate_empty_store() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let stats = store.aggregate(&stats_query()).await.unwrap();
    assert_eq!(stats.total_memories, 0);
    assert_eq!(stats.total_users, 0);
    assert_eq!(stats.avg_access_count, 0.0);
    assert!(stats.memories_by_context.is_empty());
    assert!(stats.memories_by_day.is_empty());
}

#[tokio::test]
async fn test_aggregate_stats() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let now = Utc::now();

    let mut a1 = memory("a1");
    a1.context = Some("a".to_string());
    a1.user_id = Some("u1".to_string());
    a1.tags = vec!["food".to_string(), "tea".to_string()];
    let mut a2 = memory("a2");
    a2.context = Some("a".to_string());
    a2.user_id = Some("u2".to_string());
    a2.tags = vec!["food".to_string()];
    let mut b1 = memory("b1");
    b1.context = Some("b".to_string());
    b1.user_id = Some("u1".to_string());
    let mut old = memory("old");
    old.created_at = now - Duration::days(90);
    for m in [&a1, &a2, &b1, &old] {
        store.insert(m).await.unwrap();
    }
    store.record_access(&a1.id, now).await.unwrap();
    store.record_access(&a1.id, now).await.unwrap();

    let stats = store
        .aggregate(&StatsQuery {
            top_tags: 10,
            window_days: 30,
            now,
        })
        .await
        .unwrap();

    assert_eq!(stats.total_memories, 4);
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.memories_by_context.get("a"), Some(&2));
    assert_eq!(stats.memories_by_context.get("b"), Some(&1));
    assert_eq!(stats.memories_by_context.get("uncategorized"), Some(&1));
    assert_eq!(stats.memories_by_day.values().sum::<u64>(), 3);
    assert_eq!(stats.top_tags[0], tag_count("food", 2));
    assert_eq!(stats.top_tags[1], tag_count("tea", 1));
    assert!((stats.avg_access_count - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_aggregate_top_tags_limit_and_tiebreak() {
    let store = SqliteMemoryStore::in_memory().await.unwrap();
    let mut m = memory("tagged");
    m.tags = vec!["zeta".to_string(), "alpha".to_string(), "mid".to_string()];
    store.insert(&m).await.unwrap();

    let stats = store
        .aggregate(&StatsQuery {
            top_tags: 2,
            window_days: 30,
            now: Utc::now(),
        })
        .await
        .unwrap();
    let tags: Vec<_> = stats.top_tags.iter().map(|t| t.tag.as_str()).collect();
    assert_eq!(tags, vec!["alpha", "mid"]);
}

#[tokio::test]
async fn test_file_backed_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("memories.db");
    let m = memory("survives restart");

    {
        let store = SqliteMemoryStore::open(&path).await.unwrap();
        store.insert(&m).await.unwrap();
    }

    let store = SqliteMemoryStore::open(&path).await.unwrap();
    let loaded = store.get(&m.id).await.unwrap().unwrap();
    assert_eq!(loaded.content, "survives restart");
}

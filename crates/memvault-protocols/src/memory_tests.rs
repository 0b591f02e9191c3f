use super::*;

fn sample_memory() -> Memory {
    let now = chrono::Utc::now();
    Memory {
        id: "mem-1".to_string(),
        content: "User prefers morning coffee".to_string(),
        context: Some("preferences".to_string()),
        tags: vec!["coffee".to_string(), "morning".to_string()],
        user_id: Some("user-1".to_string()),
        conversation_id: None,
        importance_score: 8,
        metadata: Metadata::new(),
        access_count: 0,
        last_accessed: None,
        created_at: now,
        updated_at: now,
        vector_id: None,
    }
}

#[test]
fn test_new_memory_builder() {
    let new = NewMemory::new("Likes tea")
        .with_context("preferences")
        .with_tags(["tea", "drinks"])
        .with_user("u1")
        .with_conversation("c1")
        .with_importance(4);

    assert_eq!(new.content, "Likes tea");
    assert_eq!(new.context.as_deref(), Some("preferences"));
    assert_eq!(new.tags, vec!["tea", "drinks"]);
    assert_eq!(new.user_id.as_deref(), Some("u1"));
    assert_eq!(new.conversation_id.as_deref(), Some("c1"));
    assert_eq!(new.importance_score, Some(4));
}

#[test]
fn test_new_memory_deserialization_defaults() {
    let json = r#"{"content":"Test"}"#;
    let new: NewMemory = serde_json::from_str(json).unwrap();
    assert_eq!(new.content, "Test");
    assert!(new.tags.is_empty());
    assert!(new.importance_score.is_none());
    assert!(new.metadata.is_empty());
}

#[test]
fn test_search_request_defaults() {
    let json = r#"{"query":"coffee"}"#;
    let request: SearchRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.limit, 10);
    assert!((request.min_similarity - 0.7).abs() < f32::EPSILON);
    assert!(request.include_semantic);
    assert!(request.include_keyword);

    let built = SearchRequest::new("coffee");
    assert_eq!(built.limit, request.limit);
}

#[test]
fn test_search_request_mode_builders() {
    let keyword = SearchRequest::new("q").keyword_only();
    assert!(keyword.include_keyword && !keyword.include_semantic);

    let semantic = SearchRequest::new("q").semantic_only();
    assert!(semantic.include_semantic && !semantic.include_keyword);
}

#[test]
fn test_search_type_serialization() {
    assert_eq!(serde_json::to_string(&SearchType::Hybrid).unwrap(), "\"hybrid\"");
    assert_eq!(SearchType::Keyword.to_string(), "keyword");
    assert!(SearchType::Hybrid.includes_keyword());
    assert!(SearchType::Hybrid.includes_semantic());
    assert!(!SearchType::Semantic.includes_keyword());
}

#[test]
fn test_scored_memory_flattens_record() {
    let scored = ScoredMemory {
        memory: sample_memory(),
        similarity_score: Some(0.91),
    };
    let value = serde_json::to_value(&scored).unwrap();
    assert_eq!(value["id"], "mem-1");
    assert_eq!(value["importance_score"], 8);
    assert!(value["similarity_score"].as_f64().unwrap() > 0.9);
    assert!(value.get("memory").is_none());
}

#[test]
fn test_memory_is_semantic() {
    let mut memory = sample_memory();
    assert!(!memory.is_semantic());
    memory.vector_id = Some("vec-1".to_string());
    assert!(memory.is_semantic());
}

#[test]
fn test_patch_is_empty() {
    assert!(MemoryPatch::default().is_empty());
    assert!(!MemoryPatch::content("x").is_empty());
}

#[test]
fn test_recent_query_builder() {
    let query = RecentQuery::default().with_limit(2).for_user("X");
    assert_eq!(query.limit, 2);
    assert_eq!(query.user_id.as_deref(), Some("X"));
}

#[test]
fn test_delete_outcome_warning() {
    assert!(DeleteOutcome::Purged.warning().is_none());
    assert!(DeleteOutcome::KeywordOnly.warning().is_none());

    let orphaned = DeleteOutcome::VectorOrphaned {
        vector_id: "vec-9".to_string(),
        reason: "timeout".to_string(),
    };
    let warning = orphaned.warning().unwrap();
    assert!(warning.contains("vec-9"));
    assert!(warning.contains("timeout"));

    let json = serde_json::to_value(&orphaned).unwrap();
    assert_eq!(json["status"], "vector_orphaned");
}

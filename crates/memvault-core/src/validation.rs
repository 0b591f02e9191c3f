//! Input validation and normalisation.
//!
//! Every function consumes the request and returns the normalised form the
//! engine works with: trimmed content and query, tags trimmed and deduplicated
//! in first-occurrence order.

use memvault_protocols::{MemoryError, MemoryPatch, NewMemory, RecentQuery, SearchRequest};

use crate::config::{MAX_FIELD_LENGTH, MAX_LIMIT};

const IMPORTANCE_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

pub fn validate_new(mut new: NewMemory, max_content: usize) -> Result<NewMemory, MemoryError> {
    new.content = validate_content(&new.content, max_content)?;
    check_field("context", new.context.as_deref())?;
    check_field("user_id", new.user_id.as_deref())?;
    check_field("conversation_id", new.conversation_id.as_deref())?;
    check_importance(new.importance_score)?;
    new.tags = normalize_tags(new.tags)?;
    Ok(new)
}

pub fn validate_patch(mut patch: MemoryPatch, max_content: usize) -> Result<MemoryPatch, MemoryError> {
    if let Some(content) = &patch.content {
        patch.content = Some(validate_content(content, max_content)?);
    }
    check_field("context", patch.context.as_deref())?;
    check_importance(patch.importance_score)?;
    if let Some(tags) = patch.tags.take() {
        patch.tags = Some(normalize_tags(tags)?);
    }
    Ok(patch)
}

pub fn validate_search(mut request: SearchRequest) -> Result<SearchRequest, MemoryError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(MemoryError::validation("query cannot be empty"));
    }
    request.query = query.to_string();

    check_limit(request.limit)?;
    if !(0.0..=1.0).contains(&request.min_similarity) {
        return Err(MemoryError::validation(
            "min_similarity must be between 0.0 and 1.0",
        ));
    }
    if !request.include_semantic && !request.include_keyword {
        return Err(MemoryError::validation(
            "at least one of include_semantic or include_keyword must be true",
        ));
    }
    request.tags = normalize_tags(request.tags)?;
    Ok(request)
}

pub fn validate_recent(query: &RecentQuery) -> Result<(), MemoryError> {
    check_limit(query.limit)
}

fn validate_content(content: &str, max: usize) -> Result<String, MemoryError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(MemoryError::validation("content cannot be empty"));
    }
    let len = trimmed.chars().count();
    if len > max {
        return Err(MemoryError::validation(format!(
            "content is {} characters, maximum is {}",
            len, max
        )));
    }
    Ok(trimmed.to_string())
}

fn check_field(name: &str, value: Option<&str>) -> Result<(), MemoryError> {
    match value {
        Some(v) if v.chars().count() > MAX_FIELD_LENGTH => Err(MemoryError::validation(format!(
            "{} exceeds {} characters",
            name, MAX_FIELD_LENGTH
        ))),
        _ => Ok(()),
    }
}

fn check_importance(importance: Option<u8>) -> Result<(), MemoryError> {
    match importance {
        Some(score) if !IMPORTANCE_RANGE.contains(&score) => Err(MemoryError::validation(
            format!("importance_score must be between 1 and 10, got {}", score),
        )),
        _ => Ok(()),
    }
}

fn check_limit(limit: usize) -> Result<(), MemoryError> {
    if limit == 0 || limit > MAX_LIMIT {
        return Err(MemoryError::validation(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }
    Ok(())
}

fn normalize_tags(tags: Vec<String>) -> Result<Vec<String>, MemoryError> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || normalized.iter().any(|t| t == tag) {
            continue;
        }
        check_field("tag", Some(tag))?;
        normalized.push(tag.to_string());
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_memory_is_trimmed_and_tags_deduplicated() {
        let new = NewMemory::new("  likes tea \n").with_tags([" tea", "tea", "", "drinks ", "tea "]);
        let new = validate_new(new, 10_000).unwrap();
        assert_eq!(new.content, "likes tea");
        assert_eq!(new.tags, vec!["tea", "drinks"]);
    }

    #[test]
    fn test_blank_content_rejected() {
        let err = validate_new(NewMemory::new("   "), 10_000).unwrap_err();
        assert!(matches!(err, MemoryError::Validation(_)));
    }

    #[test]
    fn test_content_length_counts_characters() {
        assert!(validate_new(NewMemory::new("é".repeat(10)), 10).is_ok());
        assert!(validate_new(NewMemory::new("é".repeat(11)), 10).is_err());
    }

    #[test]
    fn test_importance_bounds() {
        assert!(validate_new(NewMemory::new("x").with_importance(1), 100).is_ok());
        assert!(validate_new(NewMemory::new("x").with_importance(10), 100).is_ok());
        assert!(validate_new(NewMemory::new("x").with_importance(0), 100).is_err());
        assert!(validate_new(NewMemory::new("x").with_importance(11), 100).is_err());
    }

    #[test]
    fn test_long_user_id_rejected() {
        let new = NewMemory::new("x").with_user("u".repeat(256));
        assert!(validate_new(new, 100).is_err());
    }

    #[test]
    fn test_empty_patch_is_valid() {
        let patch = validate_patch(MemoryPatch::default(), 100).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_patch_blank_content_rejected() {
        assert!(validate_patch(MemoryPatch::content(" "), 100).is_err());
    }

    #[test]
    fn test_search_validation() {
        assert!(validate_search(SearchRequest::new("  ")).is_err());
        assert!(validate_search(SearchRequest::new("q").with_limit(0)).is_err());
        assert!(validate_search(SearchRequest::new("q").with_limit(101)).is_err());
        assert!(validate_search(SearchRequest::new("q").with_min_similarity(1.5)).is_err());
        assert!(validate_search(SearchRequest::new("q").with_min_similarity(f32::NAN)).is_err());

        let mut neither = SearchRequest::new("q");
        neither.include_keyword = false;
        neither.include_semantic = false;
        assert!(validate_search(neither).is_err());

        let ok = validate_search(SearchRequest::new(" coffee ").with_min_similarity(1.0)).unwrap();
        assert_eq!(ok.query, "coffee");
    }

    #[test]
    fn test_recent_limit() {
        assert!(validate_recent(&RecentQuery::default()).is_ok());
        assert!(validate_recent(&RecentQuery::default().with_limit(0)).is_err());
    }
}

//! Result fusion for hybrid search.

use std::cmp::Ordering;
use std::collections::HashMap;

use memvault_protocols::{Memory, ScoredMemory, SearchType};

/// Fused, ranked and truncated search results.
#[derive(Debug, Clone)]
pub struct Fused {
    pub memories: Vec<ScoredMemory>,
    pub search_type: SearchType,
}

struct Candidate {
    scored: ScoredMemory,
    semantic: bool,
    keyword: bool,
}

/// Merge semantic and keyword hits under one ranking.
///
/// A memory found by both branches appears once with its semantic score.
/// Ranking: similarity desc (keyword-only hits count as `0.0`), then
/// `importance_score` desc, then `created_at` desc, then `id` asc.
///
/// `search_type` reflects which branches contributed to the returned list;
/// an empty result reports `requested`.
pub fn fuse(
    semantic: Vec<ScoredMemory>,
    keyword: Vec<Memory>,
    limit: usize,
    requested: SearchType,
) -> Fused {
    let mut by_id: HashMap<String, Candidate> = HashMap::new();

    for scored in semantic {
        match by_id.get_mut(&scored.memory.id) {
            Some(existing) => {
                if scored.similarity_score > existing.scored.similarity_score {
                    existing.scored.similarity_score = scored.similarity_score;
                }
            }
            None => {
                by_id.insert(
                    scored.memory.id.clone(),
                    Candidate {
                        scored,
                        semantic: true,
                        keyword: false,
                    },
                );
            }
        }
    }

    for memory in keyword {
        by_id
            .entry(memory.id.clone())
            .and_modify(|c| c.keyword = true)
            .or_insert_with(|| Candidate {
                scored: ScoredMemory {
                    memory,
                    similarity_score: None,
                },
                semantic: false,
                keyword: true,
            });
    }

    let mut ranked: Vec<Candidate> = by_id.into_values().collect();
    ranked.sort_by(|a, b| rank(&a.scored, &b.scored));
    ranked.truncate(limit);

    let semantic_hit = ranked.iter().any(|c| c.semantic);
    let keyword_hit = ranked.iter().any(|c| c.keyword);
    let search_type = match (semantic_hit, keyword_hit) {
        (true, true) => SearchType::Hybrid,
        (true, false) => SearchType::Semantic,
        (false, true) => SearchType::Keyword,
        (false, false) => requested,
    };

    Fused {
        memories: ranked.into_iter().map(|c| c.scored).collect(),
        search_type,
    }
}

fn rank(a: &ScoredMemory, b: &ScoredMemory) -> Ordering {
    let score_a = a.similarity_score.unwrap_or(0.0);
    let score_b = b.similarity_score.unwrap_or(0.0);
    score_b
        .total_cmp(&score_a)
        .then_with(|| b.memory.importance_score.cmp(&a.memory.importance_score))
        .then_with(|| b.memory.created_at.cmp(&a.memory.created_at))
        .then_with(|| a.memory.id.cmp(&b.memory.id))
}

#[cfg(test)]
#[path = "fusion_tests.rs"]
mod tests;

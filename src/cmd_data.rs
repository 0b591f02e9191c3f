//! Offline data commands: `stats` and `seed`.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use memvault_core::MemoryEngine;
use memvault_protocols::NewMemory;

const SEED_CHUNK: usize = 100;

/// Print aggregate statistics as pretty JSON.
pub(crate) async fn run_stats(engine: &MemoryEngine) -> anyhow::Result<()> {
    let stats = engine.stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Parse a seed file: a JSON array of memories.
pub(crate) fn read_seed_file(path: &Path) -> anyhow::Result<Vec<NewMemory>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing seed file {}", path.display()))
}

/// Create every memory in `path`, in batches. Invalid entries are skipped by
/// the engine. Returns how many were created.
pub(crate) async fn run_seed(engine: &MemoryEngine, path: &Path) -> anyhow::Result<usize> {
    let memories = read_seed_file(path)?;
    let total = memories.len();

    let mut created = 0;
    let mut iter = memories.into_iter().peekable();
    while iter.peek().is_some() {
        let chunk: Vec<NewMemory> = iter.by_ref().take(SEED_CHUNK).collect();
        created += engine.create_batch(chunk).await?.len();
    }

    info!(created, skipped = total - created, "Seed complete");
    println!("Seeded {} of {} memories", created, total);
    Ok(created)
}

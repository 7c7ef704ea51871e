//! `contextloom export-training`: Episodes to JSONL training data.

use contextloom_config::LoomConfig;
use contextloom_episodes::{Episode, export_episodes};
use std::path::{Path, PathBuf};

pub fn run(
    config: &LoomConfig,
    episodes_path: &Path,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let out = out.unwrap_or_else(|| config.training.path.clone());
    let count = export(episodes_path, &out)?;
    println!("✅ Exported {count} training pairs to {}", out.display());
    Ok(())
}

/// Read a JSON array of episodes and write one training pair per episode.
pub fn export(episodes_path: &Path, out: &Path) -> Result<usize, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(episodes_path)
        .map_err(|e| format!("Failed to read episodes {}: {e}", episodes_path.display()))?;
    let episodes: Vec<Episode> = serde_json::from_str(&content)?;

    export_episodes(&episodes, out)?;
    Ok(episodes.len())
}

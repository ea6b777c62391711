//! Trend-Diff Generator - diff artifact for the narration consumer
//!
//! Reads the persisted snapshot store, compares the two most recent
//! patches per champion, and writes the thresholded, rank-weighted diff
//! list as a single JSON document. The artifact is a view: it can be
//! regenerated at any time from the store.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin trend_diff
//! ```
//!
//! ## Environment Variables
//!
//! - RIFTPULSE_DATA_DIR - Root data directory (default: data)
//! - RIFTPULSE_WIN_THRESHOLD - Winrate delta threshold (default: 2.0)
//! - RIFTPULSE_GENERAL_THRESHOLD - Pick/ban delta threshold (default: 3.0)
//! - RUST_LOG - Logging level (optional, default: info)

use riftpulse::{build_diff_artifact, DiffConfig, FileStore, IngestConfig};
use std::error::Error;
use std::fs;

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = IngestConfig::from_env();
    let diff_config = DiffConfig::from_env();
    log::info!(
        "🚀 Computing trend diffs (win >= {}, pick/ban >= {})",
        diff_config.win_threshold,
        diff_config.general_threshold
    );

    let store = FileStore::new(config.store_dir());
    let records = store.load_all()?;

    let (artifact, report) = build_diff_artifact(&records, &diff_config);

    let output_path = config.diff_artifact_path();
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, serde_json::to_string_pretty(&artifact)?)?;

    log::info!(
        "📊 Diff complete: {} compared, {} with insufficient history, {} entries across {} characters",
        report.characters_compared,
        report.insufficient_history,
        report.entries_emitted,
        artifact.len()
    );
    log::info!("✅ Wrote diff artifact to {}", output_path.display());
    Ok(())
}

//! Ingestion Runtime - fetch, merge, rebuild views
//!
//! One batch/cron-style run: fetch the provider roster and rank stats,
//! merge every record into the per-champion snapshot store under the
//! current patch label, then rebuild the aggregate view JSON and the
//! SQLite export.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin ingest
//! ```
//!
//! ## Environment Variables
//!
//! - RIFTPULSE_DATA_DIR - Root data directory (default: data)
//! - RIFTPULSE_ROSTER_URL / RIFTPULSE_STATS_URL - Provider endpoints
//! - RIFTPULSE_REPLAY_ROSTER / RIFTPULSE_REPLAY_STATS - Saved payloads
//!   for offline replay (both set: no network access)
//! - RUST_LOG - Logging level (optional, default: info)

use riftpulse::ingest::{current_patch_label, CanonicalChampion, PatchNote};
use riftpulse::{
    build_aggregate_view, BatchMerger, CodeTables, FileStore, IdentityResolver, IngestConfig,
    SqliteExporter,
};
use std::error::Error;
use std::fs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = IngestConfig::from_env();
    log::info!("🚀 Starting ingestion run (data dir: {})", config.data_dir.display());

    // Collaborator-produced inputs: canonical roster and patch notes
    let champions: Vec<CanonicalChampion> =
        serde_json::from_str(&fs::read_to_string(config.champions_path())?)?;
    let patch_notes: Vec<PatchNote> =
        serde_json::from_str(&fs::read_to_string(config.patch_notes_path())?)?;
    let patch_label = current_patch_label(&patch_notes)
        .ok_or("patch_notes.json is empty; cannot resolve current patch")?
        .to_string();
    log::info!("Current patch: {}", patch_label);

    let source = config.stats_source();
    log::info!("Stats source: {}", source.source_type());
    let roster = source.fetch_roster().await?;
    let payload = source.fetch_rank_stats().await?;

    let resolver = IdentityResolver::from_rosters(&champions, &roster);
    log::info!(
        "Identity resolver: {} of {} champions matched",
        resolver.len(),
        champions.len()
    );

    let store = FileStore::new(config.store_dir());
    store.ensure_dir()?;
    let existing = store.load_all()?;

    let mut merger = BatchMerger::new(CodeTables::wild_rift(), &patch_label, existing);
    merger.run_batch(&payload, &resolver);
    let outcome = merger.finish();

    // Persist changed records; a failed write loses that champion's
    // update but never the rest of the batch.
    let mut write_failures = 0;
    for record in &outcome.records {
        if !outcome.dirty.contains(&record.canonical_id) {
            continue;
        }
        if let Err(e) = store.save(record) {
            write_failures += 1;
            log::error!("❌ Failed to save {}: {}", record.canonical_id, e);
        }
    }

    let report = &outcome.report;
    log::info!(
        "📊 Merge complete: {} merged, {} duplicates, {} unresolved ids, {} unknown codes, {} write failures",
        report.merged,
        report.duplicates,
        report.unresolved,
        report.unknown_codes,
        write_failures
    );

    // Rebuild the derived artifacts from the updated record set
    let views = build_aggregate_view(&outcome.records);
    fs::write(
        config.aggregate_view_path(),
        serde_json::to_string_pretty(&views)?,
    )?;
    log::info!(
        "📝 Wrote aggregate view ({} characters) to {}",
        views.len(),
        config.aggregate_view_path().display()
    );

    let mut exporter = SqliteExporter::open(config.sqlite_path())?;
    exporter.export(&views)?;

    log::info!("✅ Ingestion run complete");
    Ok(())
}

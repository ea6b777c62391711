//! Ingestion configuration from environment variables

use super::provider::{FileStatsSource, HttpStatsSource, StatsSource};
use std::env;
use std::path::PathBuf;

const DEFAULT_ROSTER_URL: &str =
    "https://game.gtimg.cn/images/lgamem/act/lrlib/js/heroList/hero_list.js";
const DEFAULT_STATS_URL: &str = "https://mlol.qt.qq.com/go/lgame_battle_info/hero_rank_list_v2";

/// Configuration for the ingestion runtime
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Root data directory shared with the frontend and scraping layer
    pub data_dir: PathBuf,

    /// Provider roster endpoint (heroList document)
    pub roster_url: String,

    /// Provider rank-stats endpoint
    pub stats_url: String,

    /// Optional saved roster document for offline replay
    pub replay_roster: Option<PathBuf>,

    /// Optional saved rank-stats payload for offline replay
    pub replay_stats: Option<PathBuf>,
}

impl IngestConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `RIFTPULSE_DATA_DIR` (default: data)
    /// - `RIFTPULSE_ROSTER_URL` (default: provider hero_list endpoint)
    /// - `RIFTPULSE_STATS_URL` (default: provider hero_rank_list_v2 endpoint)
    /// - `RIFTPULSE_REPLAY_ROSTER` / `RIFTPULSE_REPLAY_STATS`
    ///   (both set: replay saved payloads instead of fetching)
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("RIFTPULSE_DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),

            roster_url: env::var("RIFTPULSE_ROSTER_URL")
                .unwrap_or_else(|_| DEFAULT_ROSTER_URL.to_string()),

            stats_url: env::var("RIFTPULSE_STATS_URL")
                .unwrap_or_else(|_| DEFAULT_STATS_URL.to_string()),

            replay_roster: env::var("RIFTPULSE_REPLAY_ROSTER").ok().map(PathBuf::from),

            replay_stats: env::var("RIFTPULSE_REPLAY_STATS").ok().map(PathBuf::from),
        }
    }

    /// Per-character record store directory
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("champion_data")
    }

    /// Canonical champion roster, produced by the scraping layer
    pub fn champions_path(&self) -> PathBuf {
        self.data_dir.join("champions.json")
    }

    /// Patch-notes list, produced by the scraping layer
    pub fn patch_notes_path(&self) -> PathBuf {
        self.data_dir.join("patch_notes.json")
    }

    /// Flattened aggregate view consumed by the frontend
    pub fn aggregate_view_path(&self) -> PathBuf {
        self.data_dir.join("champion_summary.json")
    }

    /// SQLite export of the aggregate view
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("riftpulse.sqlite")
    }

    /// Diff artifact consumed by the narration generator
    pub fn diff_artifact_path(&self) -> PathBuf {
        self.data_dir.join("ai").join("diff_input.json")
    }

    /// HTTP source by default; file replay when both replay paths are set
    pub fn stats_source(&self) -> Box<dyn StatsSource> {
        match (&self.replay_roster, &self.replay_stats) {
            (Some(roster), Some(stats)) => Box::new(FileStatsSource::new(roster, stats)),
            _ => Box::new(HttpStatsSource::new(
                self.roster_url.clone(),
                self.stats_url.clone(),
            )),
        }
    }
}

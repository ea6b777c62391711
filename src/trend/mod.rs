//! Trend-diff engine for surfacing balance changes between patches

pub mod config;
pub mod diff;

pub use config::DiffConfig;
pub use diff::{build_diff_artifact, compute_diffs, CharacterDiff, DiffEntry, DiffReport};

//! Trend-diff engine: per-(lane, rank) deltas between the two most
//! recent patch snapshots, rank-weighted and thresholded
//!
//! The engine is pure given a record and a [`DiffConfig`]; it performs
//! no I/O. Output order follows the latest snapshot's entry insertion
//! order; the score is carried as data for downstream consumers to sort
//! by, not used to order the output.

use super::config::DiffConfig;
use crate::store::record::{CharacterRecord, InsufficientHistory, LaneKey, MetricEntry, RankKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One newsworthy (lane, rank) change between consecutive patches.
/// Derived and ephemeral; recomputed on each run, never authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub canonical_id: String,
    pub lane: LaneKey,
    pub rank: RankKey,
    /// Latest snapshot's absolute rates, carried for the narration consumer
    pub winrate: f64,
    pub pickrate: f64,
    pub banrate: f64,
    pub win_diff: f64,
    pub pick_diff: f64,
    pub ban_diff: f64,
    pub score: f64,
    /// Direction signature, e.g. `win↑ pick↓ ban↓`
    pub trend: String,
}

/// Diff list for one character, keyed under its canonical id in the
/// batch artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDiff {
    pub patch_label: String,
    pub observed_date: String,
    pub entries: Vec<DiffEntry>,
}

/// Aggregate counters for one batch diff run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    /// Characters with enough history to compare
    pub characters_compared: usize,
    /// Characters skipped for having fewer than two snapshots
    pub insufficient_history: usize,
    /// Retained diff entries across all characters
    pub entries_emitted: usize,
}

/// Compare the two most recent snapshots of one character.
///
/// Keys present in only one snapshot are skipped (no diff without a
/// comparable baseline). A delta exactly at its threshold is included.
pub fn compute_diffs(
    record: &CharacterRecord,
    config: &DiffConfig,
) -> Result<Vec<DiffEntry>, InsufficientHistory> {
    let (previous, latest) = record.latest_two()?;

    let baseline: HashMap<(LaneKey, RankKey), &MetricEntry> =
        previous.entries.iter().map(|e| (e.key(), e)).collect();

    let mut diffs = Vec::new();
    for entry in &latest.entries {
        let Some(prev) = baseline.get(&entry.key()) else {
            continue;
        };

        let win_diff = entry.winrate - prev.winrate;
        let pick_diff = entry.pickrate - prev.pickrate;
        let ban_diff = entry.banrate - prev.banrate;

        let retained = win_diff.abs() >= config.win_threshold
            || pick_diff.abs() >= config.general_threshold
            || ban_diff.abs() >= config.general_threshold;
        if !retained {
            continue;
        }

        let weight = config.weight(entry.rank);
        let score = win_diff.abs() * weight
            + pick_diff.abs() * weight * 0.5
            + ban_diff.abs() * weight * 0.5;

        diffs.push(DiffEntry {
            canonical_id: record.canonical_id.clone(),
            lane: entry.lane,
            rank: entry.rank,
            winrate: entry.winrate,
            pickrate: entry.pickrate,
            banrate: entry.banrate,
            win_diff: round3(win_diff),
            pick_diff: round3(pick_diff),
            ban_diff: round3(ban_diff),
            score: round2(score),
            trend: format!(
                "win{} pick{} ban{}",
                arrow(win_diff),
                arrow(pick_diff),
                arrow(ban_diff)
            ),
        });
    }

    Ok(diffs)
}

/// Build the per-character diff artifact for a full record set.
///
/// Characters with insufficient history are skipped and counted, never
/// fatal for the batch. `BTreeMap` keeps the document order stable.
pub fn build_diff_artifact(
    records: &[CharacterRecord],
    config: &DiffConfig,
) -> (BTreeMap<String, CharacterDiff>, DiffReport) {
    let mut artifact = BTreeMap::new();
    let mut report = DiffReport::default();

    for record in records {
        let entries = match compute_diffs(record, config) {
            Ok(entries) => {
                report.characters_compared += 1;
                entries
            }
            Err(err) => {
                report.insufficient_history += 1;
                log::debug!("Skipping {}: {}", record.canonical_id, err);
                continue;
            }
        };
        if entries.is_empty() {
            continue;
        }

        report.entries_emitted += entries.len();
        // latest_two succeeded above, so a latest snapshot exists
        if let Ok((_, latest)) = record.latest_two() {
            artifact.insert(
                record.canonical_id.clone(),
                CharacterDiff {
                    patch_label: latest.patch_label.clone(),
                    observed_date: latest.observed_date.clone(),
                    entries,
                },
            );
        }
    }

    (artifact, report)
}

/// Zero deltas point down; there is deliberately no "unchanged" marker
fn arrow(delta: f64) -> &'static str {
    if delta > 0.0 {
        "↑"
    } else {
        "↓"
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

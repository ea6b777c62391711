//! Flattened history view across all characters
//!
//! Read-only projection of the snapshot store for the display layer:
//! every distinct (patch, lane, rank) tuple ever observed, one document
//! per character, in first-observation order. Deterministic given the
//! same input ordering; never mutates the store.

use crate::store::record::{CharacterRecord, LaneKey, RankKey};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub patch_label: String,
    pub observed_date: String,
    pub lane: LaneKey,
    pub rank: RankKey,
    pub winrate: f64,
    pub pickrate: f64,
    pub banrate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterView {
    pub canonical_id: String,
    pub display_name: Option<String>,
    /// Distinct known lanes this character has been observed in, sorted
    pub lanes: Vec<String>,
    pub entries: Vec<AggregateEntry>,
}

/// Build the aggregate view for a full record set
pub fn build_aggregate_view(records: &[CharacterRecord]) -> Vec<CharacterView> {
    records.iter().map(character_view).collect()
}

fn character_view(record: &CharacterRecord) -> CharacterView {
    let mut seen: HashSet<(String, LaneKey, RankKey)> = HashSet::new();
    let mut lanes: HashSet<&'static str> = HashSet::new();
    let mut entries = Vec::new();

    for snapshot in &record.patches {
        for entry in &snapshot.entries {
            if let LaneKey::Known(lane) = entry.lane {
                lanes.insert(lane.as_str());
            }
            let key = (snapshot.patch_label.clone(), entry.lane, entry.rank);
            if !seen.insert(key) {
                continue;
            }
            entries.push(AggregateEntry {
                patch_label: snapshot.patch_label.clone(),
                observed_date: snapshot.observed_date.clone(),
                lane: entry.lane,
                rank: entry.rank,
                winrate: entry.winrate,
                pickrate: entry.pickrate,
                banrate: entry.banrate,
            });
        }
    }

    let mut lanes: Vec<String> = lanes.into_iter().map(|s| s.to_string()).collect();
    lanes.sort();

    CharacterView {
        canonical_id: record.canonical_id.clone(),
        display_name: record.display_name.clone(),
        lanes,
        entries,
    }
}

//! Batch merge of provider records into the snapshot store
//!
//! One ingestion run walks the full payload sequentially, one record at
//! a time. Per-record problems (unresolved identity, unknown codes,
//! malformed dates) degrade and are counted; a single bad record never
//! aborts the batch.

use super::codes::CodeTables;
use super::identity::IdentityResolver;
use super::provider::{RankStatsPayload, RawStatRecord};
use crate::store::record::{CharacterRecord, LaneKey, MetricEntry, RankKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// One patch-notes entry, produced by the excluded scraping layer.
/// The list is ordered oldest to newest; the last entry is current.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchNote {
    pub patch_name: String,
    #[serde(default)]
    pub patch_link: Option<String>,
}

/// The patch label every record observed in this run is bucketed under
pub fn current_patch_label(notes: &[PatchNote]) -> Option<&str> {
    notes.last().map(|n| n.patch_name.as_str())
}

/// Aggregate counters for one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// New entries appended to a snapshot
    pub merged: usize,
    /// Records skipped because their (lane, rank) key was already present
    pub duplicates: usize,
    /// Records whose hero id had no canonical match (kept under raw id)
    pub unresolved: usize,
    /// Lane or rank codes with no known mapping (kept opaquely)
    pub unknown_codes: usize,
}

/// Outcome of one batch run: the full record set, which records changed,
/// and the counters.
pub struct BatchOutcome {
    pub records: Vec<CharacterRecord>,
    pub dirty: HashSet<String>,
    pub report: IngestReport,
}

/// Merges raw provider records into per-character records, bucketed
/// under a single patch label per run.
pub struct BatchMerger {
    codes: CodeTables,
    patch_label: String,
    records: HashMap<String, CharacterRecord>,
    order: Vec<String>,
    dirty: HashSet<String>,
    report: IngestReport,
}

impl BatchMerger {
    /// `existing` is the durable record set loaded from the store;
    /// records for newly seen characters are created on demand.
    pub fn new(codes: CodeTables, patch_label: &str, existing: Vec<CharacterRecord>) -> Self {
        let mut records = HashMap::with_capacity(existing.len());
        let mut order = Vec::with_capacity(existing.len());
        for record in existing {
            order.push(record.canonical_id.clone());
            records.insert(record.canonical_id.clone(), record);
        }
        Self {
            codes,
            patch_label: patch_label.to_string(),
            records,
            order,
            dirty: HashSet::new(),
            report: IngestReport::default(),
        }
    }

    /// Merge one raw record into the store state.
    ///
    /// Rates arrive fractional and are stored as percentages. If the
    /// (lane, rank) key already exists in the patch snapshot the call is
    /// a no-op (first-write-wins).
    pub fn merge_observation(
        &mut self,
        record: &RawStatRecord,
        lane_code: u32,
        rank_code: u32,
        resolver: &IdentityResolver,
    ) {
        let resolved = resolver.resolve(&record.hero_id);
        if !resolved.is_resolved() {
            self.report.unresolved += 1;
            log::warn!(
                "No canonical id for hero_id {}, keeping raw id",
                record.hero_id
            );
        }

        let lane = self.codes.lane(lane_code);
        let rank = self.codes.rank(rank_code);
        if matches!(lane, LaneKey::Raw(_)) {
            self.report.unknown_codes += 1;
            log::warn!("Unknown lane code {}, keeping opaquely", lane_code);
        }
        if matches!(rank, RankKey::Raw(_)) {
            self.report.unknown_codes += 1;
            log::warn!("Unknown rank code {}, keeping opaquely", rank_code);
        }

        let canonical_id = resolved.canonical().to_string();
        let character = match self.records.entry(canonical_id.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.order.push(canonical_id.clone());
                let display_name = resolver.display_name(&canonical_id).map(|s| s.to_string());
                entry.insert(CharacterRecord::new(canonical_id.clone(), display_name))
            }
        };

        let observed_date = canonical_date(&record.dtstatdate);
        let snapshot = character.snapshot_mut(&self.patch_label, &observed_date);

        let entry = MetricEntry {
            lane,
            rank,
            winrate: scale_rate(record.win_rate),
            pickrate: scale_rate(record.appear_rate),
            banrate: scale_rate(record.forbid_rate),
        };

        if snapshot.push_entry(entry) {
            self.report.merged += 1;
            self.dirty.insert(canonical_id);
        } else {
            self.report.duplicates += 1;
        }
    }

    /// Walk the full payload sequentially: rank bucket, lane bucket,
    /// record, in deterministic order.
    pub fn run_batch(&mut self, payload: &RankStatsPayload, resolver: &IdentityResolver) {
        for (rank_code, lanes) in &payload.data {
            for (lane_code, records) in lanes {
                for record in records {
                    self.merge_observation(record, *lane_code, *rank_code, resolver);
                }
            }
        }
    }

    pub fn report(&self) -> &IngestReport {
        &self.report
    }

    /// Consume the merger, returning records in first-observation order
    pub fn finish(self) -> BatchOutcome {
        let mut records = self.records;
        let ordered = self
            .order
            .into_iter()
            .filter_map(|id| records.remove(&id))
            .collect();
        BatchOutcome {
            records: ordered,
            dirty: self.dirty,
            report: self.report,
        }
    }
}

/// Scale a fractional rate to a percentage, clipped to 4 decimals so
/// stored values stay readable.
fn scale_rate(fraction: f64) -> f64 {
    (fraction * 100.0 * 10_000.0).round() / 10_000.0
}

/// Convert the provider's `YYYYMMDD` date to the canonical `YYYY/MM/DD`
/// form. Unparseable dates are kept verbatim, consistent with the
/// lenient pass-through for unknown codes.
fn canonical_date(dtstatdate: &str) -> String {
    match NaiveDate::parse_from_str(dtstatdate, "%Y%m%d") {
        Ok(date) => date.format("%Y/%m/%d").to_string(),
        Err(_) => {
            log::warn!("Unparseable dtstatdate {:?}, keeping verbatim", dtstatdate);
            dtstatdate.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::identity::CanonicalChampion;
    use crate::ingest::provider::{ProviderHero, ProviderRoster};
    use crate::store::record::{Lane, LaneKey, Rank, RankKey};

    fn ahri_resolver() -> IdentityResolver {
        let canonical = vec![CanonicalChampion {
            id: "ahri".to_string(),
            name_ja: Some("アーリ".to_string()),
            name_cn: Some("九尾妖狐".to_string()),
        }];
        let provider = ProviderRoster {
            hero_list: std::collections::HashMap::from([(
                "7".to_string(),
                ProviderHero {
                    name: "九尾妖狐".to_string(),
                },
            )]),
        };
        IdentityResolver::from_rosters(&canonical, &provider)
    }

    fn raw_record(hero_id: &str, win_rate: f64) -> RawStatRecord {
        let json = format!(
            r#"{{"hero_id": "{}", "dtstatdate": "20240101", "win_rate": {}, "appear_rate": 0.10, "forbid_rate": 0.01}}"#,
            hero_id, win_rate
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_merge_scales_and_buckets() {
        // Hero 7 in lane bucket 3 (ADC) / rank bucket 0 (Emerald)
        let resolver = ahri_resolver();
        let mut merger = BatchMerger::new(CodeTables::wild_rift(), "Patch 6.1", Vec::new());

        merger.merge_observation(&raw_record("7", 0.52), 3, 0, &resolver);

        let outcome = merger.finish();
        assert_eq!(outcome.report.merged, 1);
        assert_eq!(outcome.report.unresolved, 0);

        let record = &outcome.records[0];
        assert_eq!(record.canonical_id, "ahri");
        assert_eq!(record.display_name.as_deref(), Some("アーリ"));
        assert_eq!(record.patches.len(), 1);

        let snap = &record.patches[0];
        assert_eq!(snap.patch_label, "Patch 6.1");
        assert_eq!(snap.observed_date, "2024/01/01");
        assert_eq!(snap.entries.len(), 1);

        let entry = &snap.entries[0];
        assert_eq!(entry.lane, LaneKey::Known(Lane::Adc));
        assert_eq!(entry.rank, RankKey::Known(Rank::Emerald));
        assert_eq!(entry.winrate, 52.0);
        assert_eq!(entry.pickrate, 10.0);
        assert_eq!(entry.banrate, 1.0);
    }

    #[test]
    fn test_remerge_is_idempotent() {
        let resolver = ahri_resolver();
        let mut merger = BatchMerger::new(CodeTables::wild_rift(), "Patch 6.1", Vec::new());

        merger.merge_observation(&raw_record("7", 0.52), 3, 0, &resolver);
        merger.merge_observation(&raw_record("7", 0.52), 3, 0, &resolver);

        let outcome = merger.finish();
        assert_eq!(outcome.report.merged, 1);
        assert_eq!(outcome.report.duplicates, 1);
        assert_eq!(outcome.records[0].patches[0].entries.len(), 1);
    }

    #[test]
    fn test_unresolved_keeps_raw_id() {
        let resolver = ahri_resolver();
        let mut merger = BatchMerger::new(CodeTables::wild_rift(), "Patch 6.1", Vec::new());

        merger.merge_observation(&raw_record("999", 0.50), 3, 0, &resolver);

        let outcome = merger.finish();
        assert_eq!(outcome.report.unresolved, 1);
        assert_eq!(outcome.records[0].canonical_id, "999");
        assert_eq!(outcome.records[0].display_name, None);
    }

    #[test]
    fn test_unknown_codes_counted_and_kept() {
        let resolver = ahri_resolver();
        let mut merger = BatchMerger::new(CodeTables::wild_rift(), "Patch 6.1", Vec::new());

        merger.merge_observation(&raw_record("7", 0.50), 9, 7, &resolver);

        let outcome = merger.finish();
        assert_eq!(outcome.report.unknown_codes, 2);
        let entry = &outcome.records[0].patches[0].entries[0];
        assert_eq!(entry.lane, LaneKey::Raw(9));
        assert_eq!(entry.rank, RankKey::Raw(7));
    }

    #[test]
    fn test_no_cross_contamination() {
        let resolver = ahri_resolver();
        let mut merger = BatchMerger::new(CodeTables::wild_rift(), "Patch 6.1", Vec::new());

        merger.merge_observation(&raw_record("7", 0.52), 3, 0, &resolver);
        let before = merger.records.get("ahri").cloned().unwrap();

        merger.merge_observation(&raw_record("999", 0.40), 1, 2, &resolver);
        assert_eq!(merger.records.get("ahri").unwrap(), &before);
    }

    #[test]
    fn test_append_only_across_patches() {
        let resolver = ahri_resolver();
        let mut existing = Vec::new();

        for (i, patch) in ["Patch 6.1", "Patch 6.2", "Patch 6.3"].iter().enumerate() {
            let mut merger = BatchMerger::new(CodeTables::wild_rift(), patch, existing);
            let mut record = raw_record("7", 0.50 + i as f64 * 0.01);
            record.dtstatdate = format!("2024010{}", i + 1);
            merger.merge_observation(&record, 3, 0, &resolver);
            existing = merger.finish().records;
        }

        assert_eq!(existing[0].patches.len(), 3);
        for (i, snap) in existing[0].patches.iter().enumerate() {
            assert_eq!(snap.entries.len(), 1);
            assert_eq!(snap.observed_date, format!("2024/01/0{}", i + 1));
        }
    }

    #[test]
    fn test_dirty_tracks_only_changed_records() {
        let resolver = ahri_resolver();

        let mut merger = BatchMerger::new(CodeTables::wild_rift(), "Patch 6.1", Vec::new());
        merger.merge_observation(&raw_record("7", 0.52), 3, 0, &resolver);
        let outcome = merger.finish();
        assert!(outcome.dirty.contains("ahri"));

        // Re-run over unchanged data: nothing is dirty
        let mut merger = BatchMerger::new(CodeTables::wild_rift(), "Patch 6.1", outcome.records);
        merger.merge_observation(&raw_record("7", 0.52), 3, 0, &resolver);
        let outcome = merger.finish();
        assert!(outcome.dirty.is_empty());
    }

    #[test]
    fn test_malformed_date_kept_verbatim() {
        assert_eq!(canonical_date("20240101"), "2024/01/01");
        assert_eq!(canonical_date("not-a-date"), "not-a-date");
    }

    #[test]
    fn test_scale_rate_is_clean_percentage() {
        assert_eq!(scale_rate(0.52), 52.0);
        assert_eq!(scale_rate(0.0), 0.0);
        assert_eq!(scale_rate(1.0), 100.0);
        assert_eq!(scale_rate(0.12345), 12.345);
    }

    #[test]
    fn test_current_patch_label_is_last_entry() {
        let notes = vec![
            PatchNote {
                patch_name: "Patch 6.0".to_string(),
                patch_link: None,
            },
            PatchNote {
                patch_name: "Patch 6.1".to_string(),
                patch_link: None,
            },
        ];
        assert_eq!(current_patch_label(&notes), Some("Patch 6.1"));
        assert_eq!(current_patch_label(&[]), None);
    }
}

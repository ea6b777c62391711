//! Per-character patch history: metric entries, snapshots, records

use serde::{Deserialize, Serialize};

/// Map role a statistics bucket belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    #[serde(rename = "TOP")]
    Top,
    #[serde(rename = "MID")]
    Mid,
    #[serde(rename = "ADC")]
    Adc,
    #[serde(rename = "SUP")]
    Sup,
    #[serde(rename = "JG")]
    Jg,
}

impl Lane {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::Top => "TOP",
            Lane::Mid => "MID",
            Lane::Adc => "ADC",
            Lane::Sup => "SUP",
            Lane::Jg => "JG",
        }
    }
}

/// Skill-tier bracket a statistics bucket belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    Emerald,
    Diamond,
    Master,
    Challenger,
    Legendary,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Emerald => "Emerald",
            Rank::Diamond => "Diamond",
            Rank::Master => "Master",
            Rank::Challenger => "Challenger",
            Rank::Legendary => "Legendary",
        }
    }
}

/// Lane dimension of a dedup key.
///
/// Provider codes with no known lane mapping are preserved verbatim as
/// `Raw` instead of being rejected (lenient-ingestion policy). Serialized
/// untagged: known lanes round-trip as their names, raw codes as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LaneKey {
    Known(Lane),
    Raw(u32),
}

impl std::fmt::Display for LaneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaneKey::Known(lane) => write!(f, "{}", lane.as_str()),
            LaneKey::Raw(code) => write!(f, "{}", code),
        }
    }
}

/// Rank dimension of a dedup key, same pass-through rule as [`LaneKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RankKey {
    Known(Rank),
    Raw(u32),
}

impl std::fmt::Display for RankKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankKey::Known(rank) => write!(f, "{}", rank.as_str()),
            RankKey::Raw(code) => write!(f, "{}", code),
        }
    }
}

/// One observed statistics bucket. Rates are percentages in [0, 100].
/// Immutable once written into a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub lane: LaneKey,
    pub rank: RankKey,
    pub winrate: f64,
    pub pickrate: f64,
    pub banrate: f64,
}

impl MetricEntry {
    /// Dedup key within a snapshot
    pub fn key(&self) -> (LaneKey, RankKey) {
        (self.lane, self.rank)
    }
}

/// Statistics observed for one character during one patch.
///
/// At most one entry per (lane, rank); a later write for a present key is
/// a no-op, so re-running ingestion against unchanged source data never
/// duplicates or alters entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchSnapshot {
    pub patch_label: String,
    pub observed_date: String,
    pub entries: Vec<MetricEntry>,
}

impl PatchSnapshot {
    pub fn new(patch_label: String, observed_date: String) -> Self {
        Self {
            patch_label,
            observed_date,
            entries: Vec::new(),
        }
    }

    pub fn contains_key(&self, lane: LaneKey, rank: RankKey) -> bool {
        self.entries.iter().any(|e| e.lane == lane && e.rank == rank)
    }

    /// Append an entry unless its (lane, rank) key is already present.
    ///
    /// Returns `true` if the entry was new (first-write-wins dedup).
    pub fn push_entry(&mut self, entry: MetricEntry) -> bool {
        if self.contains_key(entry.lane, entry.rank) {
            return false;
        }
        self.entries.push(entry);
        true
    }
}

/// Raised when a character has fewer than two patch snapshots and can't
/// be diffed against a previous patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientHistory {
    pub have: usize,
}

impl std::fmt::Display for InsufficientHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "need at least 2 patch snapshots, have {}", self.have)
    }
}

impl std::error::Error for InsufficientHistory {}

/// Full patch-snapshot history for one character.
///
/// Snapshots are appended in observation order and never deleted; the
/// store rewrites the document as a whole but individual entries are
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub canonical_id: String,
    pub display_name: Option<String>,
    pub patches: Vec<PatchSnapshot>,
}

impl CharacterRecord {
    pub fn new(canonical_id: String, display_name: Option<String>) -> Self {
        Self {
            canonical_id,
            display_name,
            patches: Vec::new(),
        }
    }

    /// Locate or create the snapshot for a patch label.
    ///
    /// The first observation for a new label fixes the snapshot's date;
    /// later observations in the same patch reuse the existing snapshot.
    pub fn snapshot_mut(&mut self, patch_label: &str, observed_date: &str) -> &mut PatchSnapshot {
        if let Some(idx) = self.patches.iter().position(|p| p.patch_label == patch_label) {
            return &mut self.patches[idx];
        }
        self.patches.push(PatchSnapshot::new(
            patch_label.to_string(),
            observed_date.to_string(),
        ));
        self.patches.last_mut().unwrap()
    }

    /// The two most recent snapshots as `(previous, latest)`, ordered by
    /// observed date ascending.
    pub fn latest_two(&self) -> Result<(&PatchSnapshot, &PatchSnapshot), InsufficientHistory> {
        if self.patches.len() < 2 {
            return Err(InsufficientHistory {
                have: self.patches.len(),
            });
        }
        // Stable sort on the canonical YYYY/MM/DD form; lexicographic
        // order matches chronological order.
        let mut indices: Vec<usize> = (0..self.patches.len()).collect();
        indices.sort_by(|&a, &b| self.patches[a].observed_date.cmp(&self.patches[b].observed_date));
        let prev = &self.patches[indices[indices.len() - 2]];
        let latest = &self.patches[indices[indices.len() - 1]];
        Ok((prev, latest))
    }
}

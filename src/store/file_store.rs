//! JSON-file persistence for character records
//!
//! One document per character, `<canonical_id>.json`, under a data
//! directory. Documents are rewritten whole on save, but the write goes
//! through a temp file and an atomic rename so an interrupted run never
//! leaves a half-written record behind. Single-writer: two concurrent
//! ingestion runs against the same directory are not supported.

use super::record::CharacterRecord;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the store directory if it does not exist yet
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn record_path(&self, canonical_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", canonical_id))
    }

    /// Load one character record, `None` if it has never been written
    pub fn load(&self, canonical_id: &str) -> Result<Option<CharacterRecord>, StoreError> {
        let path = self.record_path(canonical_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        let record: CharacterRecord = serde_json::from_str(&json)?;
        Ok(Some(record))
    }

    /// Save a record via temp file + rename
    pub fn save(&self, record: &CharacterRecord) -> Result<(), StoreError> {
        let path = self.record_path(&record.canonical_id);
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(record)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;

        log::debug!(
            "Saved {} ({} patches) to {}",
            record.canonical_id,
            record.patches.len(),
            path.display()
        );
        Ok(())
    }

    /// Load every record in the store, in filename order
    pub fn load_all(&self) -> Result<Vec<CharacterRecord>, StoreError> {
        if !self.dir.exists() {
            log::info!("No existing store directory: {}", self.dir.display());
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            records.push(load_record(&path)?);
        }

        log::info!("Loaded {} records from {}", records.len(), self.dir.display());
        Ok(records)
    }
}

fn load_record(path: &Path) -> Result<CharacterRecord, StoreError> {
    let json = fs::read_to_string(path)?;
    let record: CharacterRecord = serde_json::from_str(&json)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::record::{Lane, LaneKey, MetricEntry, Rank, RankKey};
    use tempfile::TempDir;

    fn test_record(id: &str) -> CharacterRecord {
        let mut record = CharacterRecord::new(id.to_string(), Some("アーリ".to_string()));
        record
            .snapshot_mut("Patch 6.1", "2024/01/01")
            .push_entry(MetricEntry {
                lane: LaneKey::Known(Lane::Mid),
                rank: RankKey::Known(Rank::Master),
                winrate: 52.0,
                pickrate: 10.0,
                banrate: 1.0,
            });
        record
    }

    #[test]
    fn test_save_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());

        let record = test_record("ahri");
        store.save(&record).unwrap();

        let loaded = store.load("ahri").unwrap().unwrap();
        assert_eq!(loaded, record);

        // Temp file must not linger after a successful save
        assert!(!store.record_path("ahri").with_extension("json.tmp").exists());
    }

    #[test]
    fn test_load_missing_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(store.load("nilah").unwrap().is_none());
    }

    #[test]
    fn test_load_all_filename_order() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());

        store.save(&test_record("zed")).unwrap();
        store.save(&test_record("ahri")).unwrap();
        store.save(&test_record("lux")).unwrap();

        let records = store.load_all().unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.canonical_id.as_str()).collect();
        assert_eq!(ids, vec!["ahri", "lux", "zed"]);
    }

    #[test]
    fn test_load_all_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("does_not_exist"));
        assert!(store.load_all().unwrap().is_empty());
    }
}

//! SQLite export of the aggregate view
//!
//! Mirrors the JSON aggregate document into a small SQLite database for
//! ad-hoc queries. Inserts are `INSERT OR IGNORE` on the natural keys,
//! so repeated exports over a growing store stay idempotent.

use super::aggregate::CharacterView;
use rusqlite::{params, Connection};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS characters (
    canonical_id TEXT PRIMARY KEY,
    display_name TEXT
);

CREATE TABLE IF NOT EXISTS stat_entries (
    canonical_id  TEXT NOT NULL,
    patch_label   TEXT NOT NULL,
    observed_date TEXT NOT NULL,
    lane          TEXT NOT NULL,
    rank          TEXT NOT NULL,
    winrate       REAL NOT NULL,
    pickrate      REAL NOT NULL,
    banrate       REAL NOT NULL,
    PRIMARY KEY (canonical_id, patch_label, lane, rank)
);
";

pub struct SqliteExporter {
    conn: Connection,
}

impl SqliteExporter {
    /// Open (or create) the database and apply the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Export the full view in one transaction.
    ///
    /// Returns the number of newly inserted stat rows.
    pub fn export(&mut self, views: &[CharacterView]) -> Result<usize, rusqlite::Error> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        {
            let mut insert_character = tx.prepare(
                "INSERT OR IGNORE INTO characters (canonical_id, display_name) VALUES (?1, ?2)",
            )?;
            let mut insert_entry = tx.prepare(
                "INSERT OR IGNORE INTO stat_entries
                 (canonical_id, patch_label, observed_date, lane, rank, winrate, pickrate, banrate)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for view in views {
                insert_character.execute(params![view.canonical_id, view.display_name])?;
                for entry in &view.entries {
                    inserted += insert_entry.execute(params![
                        view.canonical_id,
                        entry.patch_label,
                        entry.observed_date,
                        entry.lane.to_string(),
                        entry.rank.to_string(),
                        entry.winrate,
                        entry.pickrate,
                        entry.banrate,
                    ])?;
                }
            }
        }

        tx.commit()?;
        log::info!(
            "SQLite export: {} characters, {} new stat rows",
            views.len(),
            inserted
        );
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::record::{Lane, LaneKey, Rank, RankKey};
    use crate::view::aggregate::AggregateEntry;
    use tempfile::TempDir;

    fn ahri_view() -> CharacterView {
        CharacterView {
            canonical_id: "ahri".to_string(),
            display_name: Some("アーリ".to_string()),
            lanes: vec!["MID".to_string()],
            entries: vec![AggregateEntry {
                patch_label: "Patch 6.1".to_string(),
                observed_date: "2024/01/01".to_string(),
                lane: LaneKey::Known(Lane::Mid),
                rank: RankKey::Known(Rank::Master),
                winrate: 52.0,
                pickrate: 10.0,
                banrate: 1.0,
            }],
        }
    }

    #[test]
    fn test_export_and_requery() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("export.sqlite");

        let mut exporter = SqliteExporter::open(&db_path).unwrap();
        assert_eq!(exporter.export(&[ahri_view()]).unwrap(), 1);

        let (lane, rank, winrate): (String, String, f64) = exporter
            .conn
            .query_row(
                "SELECT lane, rank, winrate FROM stat_entries WHERE canonical_id = 'ahri'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(lane, "MID");
        assert_eq!(rank, "Master");
        assert_eq!(winrate, 52.0);
    }

    #[test]
    fn test_export_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("export.sqlite");

        let mut exporter = SqliteExporter::open(&db_path).unwrap();
        assert_eq!(exporter.export(&[ahri_view()]).unwrap(), 1);
        assert_eq!(exporter.export(&[ahri_view()]).unwrap(), 0);

        let count: i64 = exporter
            .conn
            .query_row("SELECT COUNT(*) FROM stat_entries", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_raw_keys_export_as_code_strings() {
        let tmp = TempDir::new().unwrap();
        let mut exporter = SqliteExporter::open(tmp.path().join("export.sqlite")).unwrap();

        let mut view = ahri_view();
        view.entries[0].lane = LaneKey::Raw(9);
        view.entries[0].rank = RankKey::Raw(7);
        exporter.export(&[view]).unwrap();

        let (lane, rank): (String, String) = exporter
            .conn
            .query_row("SELECT lane, rank FROM stat_entries", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(lane, "9");
        assert_eq!(rank, "7");
    }
}

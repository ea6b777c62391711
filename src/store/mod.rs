//! Snapshot store: append-only per-character patch history
//!
//! Each character owns an ordered sequence of patch snapshots, each
//! holding deduplicated (lane, rank) metric entries. Merging is
//! idempotent (first write wins per key); snapshots and entries are
//! never deleted or mutated in place. Persistence is one JSON document
//! per character.

pub mod file_store;
pub mod record;

pub use file_store::{FileStore, StoreError};
pub use record::{
    CharacterRecord, InsufficientHistory, Lane, LaneKey, MetricEntry, PatchSnapshot, Rank, RankKey,
};

//! # riftpulse
//!
//! Ingests periodic win/pick/ban statistics for Wild Rift champions,
//! persists them as an append-only per-champion patch history, and
//! computes rank-weighted trend diffs between consecutive patches to
//! surface the most significant balance changes.
//!
//! Data flows one way:
//!
//! ```text
//! provider payload -> identity resolver -> snapshot store (merge)
//!                  -> { aggregate view, trend-diff engine } -> consumers
//! ```
//!
//! ## Module organization
//!
//! - `store` - per-champion patch snapshots and JSON-file persistence
//! - `ingest` - provider payloads, identity resolution, batch merge
//! - `trend` - weighted, thresholded diff between the latest two patches
//! - `view` - flattened aggregate view and SQLite export

pub mod ingest;
pub mod store;
pub mod trend;
pub mod view;

pub use ingest::{BatchMerger, CodeTables, IdentityResolver, IngestConfig, IngestReport};
pub use store::{CharacterRecord, FileStore, PatchSnapshot};
pub use trend::{build_diff_artifact, compute_diffs, DiffConfig};
pub use view::{build_aggregate_view, SqliteExporter};

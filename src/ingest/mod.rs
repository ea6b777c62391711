//! Ingestion boundary: provider payloads in, typed records out
//!
//! Everything loosely typed from the stats provider is validated and
//! converted here. Degraded records (unresolved identity, unknown
//! bucket codes, malformed dates) are kept with their raw values and
//! counted; a single bad record never aborts a batch run.

pub mod codes;
pub mod config;
pub mod identity;
pub mod provider;
pub mod runner;

pub use codes::CodeTables;
pub use config::IngestConfig;
pub use identity::{CanonicalChampion, IdentityResolver, ResolvedId};
pub use provider::{
    FileStatsSource, HttpStatsSource, ProviderError, ProviderRoster, RankStatsPayload,
    RawStatRecord, StatsSource,
};
pub use runner::{current_patch_label, BatchMerger, BatchOutcome, IngestReport, PatchNote};

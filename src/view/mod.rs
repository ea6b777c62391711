//! Read-only projections over the snapshot store

pub mod aggregate;
pub mod sqlite_export;

pub use aggregate::{build_aggregate_view, AggregateEntry, CharacterView};
pub use sqlite_export::SqliteExporter;

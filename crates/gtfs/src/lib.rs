//! GTFS side of the synthesis pipeline: reading the raw input tables from
//! CSV files or zip archives, and publishing a synthesis result as a GTFS
//! schedule feed.

pub mod data_model;
pub mod domain_model;
pub mod error;
pub mod export;
pub mod ingest;

pub use error::{ExportError, IngestError};
pub use export::{ExportFormat, GtfsFeed};
pub use ingest::InputTables;

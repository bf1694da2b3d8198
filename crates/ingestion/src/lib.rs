//! Data ingestion and normalization for the volume-crossover system.
//!
//! This crate handles:
//! - Date/time parsing across the supported input layouts
//! - Raw row to record conversion with per-row diagnostics
//! - Row sources (in-memory and CSV)
//! - Grouping intraday ticks into per-instrument series

pub mod grouping;
pub mod records;
pub mod source;
pub mod timestamp;

pub use grouping::group_by_instrument;
pub use records::{NormalizeStats, RecordNormalizer};
pub use source::{CsvRowSource, RowSource};
pub use timestamp::{DateFormat, TimestampError};

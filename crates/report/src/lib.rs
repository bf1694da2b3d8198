//! Run orchestration and reporting for the volume-crossover system.
//!
//! This crate provides:
//! - The end-to-end pipeline over row sources
//! - Session report assembly and JSON rendering
//! - Atomic report persistence
//! - Run summaries

pub mod pipeline;
pub mod report;
pub mod writer;

pub use pipeline::{Pipeline, RunOutput, RunSummary, SessionSummary};
pub use report::{format_timestamp, ReportEntry, SessionReport};
pub use writer::write_report;

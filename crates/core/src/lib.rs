//! Core types and configuration for the volume-crossover system.
//!
//! This crate provides shared types used across all other crates:
//! - Daily and intraday record types, baselines and results
//! - Configuration structures
//! - Common error types and the diagnostic channel

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod types;

pub use config::{
    BaselineConfig, ColumnConfig, Config, EngineConfig, SessionConfig, WindowBound, WindowConfig,
};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, RowKind, TracingSink};
pub use error::{Error, Result};
pub use types::*;

//! Feature computation for the volume-crossover system.
//!
//! This crate handles:
//! - Baseline (average daily volume) computation
//! - Trading session filtering
//! - Rolling-window crossover detection
//! - Per-instrument orchestration across a worker pool

pub mod baseline;
pub mod detector;
pub mod engine;
pub mod session;

pub use baseline::BaselineCalculator;
pub use detector::{CrossoverDetector, Crossing};
pub use engine::CrossoverEngine;
pub use session::SessionFilter;

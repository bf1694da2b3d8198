//! Diagnostics for problems absorbed locally during a run.
//!
//! Dropped rows and instruments without a result are never fatal. They are
//! reported through a [`DiagnosticSink`] so callers can log, count or assert
//! on them without the pipeline writing to the console itself.

use crate::types::Timestamp;
use serde::Serialize;
use std::sync::Mutex;

/// Which input a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Daily volume history.
    Daily,
    /// Intraday trade prints.
    Intraday,
}

/// A locally absorbed problem or a scan trace event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Date/time fields did not form a valid instant. The row was dropped.
    MalformedTimestamp {
        row_kind: RowKind,
        row: usize,
        value: String,
        reason: String,
    },
    /// A timestamp was required but the time field was absent. The row was dropped.
    MissingTimestamp { row_kind: RowKind, row: usize },
    /// A required column was absent or blank. The row was dropped.
    MissingField {
        row_kind: RowKind,
        row: usize,
        column: String,
    },
    /// A volume or quantity was not a non-negative integer. The row was dropped.
    MalformedQuantity {
        row_kind: RowKind,
        row: usize,
        value: String,
    },
    /// The instrument has intraday data but no daily history.
    MissingBaseline { instrument_id: String },
    /// The instrument has no ticks inside the session window.
    EmptySessionData { instrument_id: String, dropped: usize },
    /// Rolling volume evaluated at one tick.
    WindowEvaluated {
        instrument_id: String,
        timestamp: Timestamp,
        rolling_volume: u64,
    },
}

impl Diagnostic {
    /// Whether this diagnostic means an input row was discarded.
    pub fn is_dropped_row(&self) -> bool {
        matches!(
            self,
            Diagnostic::MalformedTimestamp { .. }
                | Diagnostic::MissingTimestamp { .. }
                | Diagnostic::MissingField { .. }
                | Diagnostic::MalformedQuantity { .. }
        )
    }
}

/// Receiver for diagnostics. Shared across worker threads.
pub trait DiagnosticSink: Send + Sync {
    /// Record one diagnostic.
    fn record(&self, diagnostic: Diagnostic);

    /// Whether per-window trace events should be produced at all.
    fn wants_trace(&self) -> bool {
        false
    }
}

/// Sink that forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    trace: bool,
}

impl TracingSink {
    /// Create a sink. With `trace` set, per-window events are logged at TRACE.
    pub fn new(trace: bool) -> Self {
        Self { trace }
    }
}

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::MalformedTimestamp { row_kind, row, value, reason } => {
                tracing::warn!(?row_kind, row, value = %value, reason = %reason, "dropping row with malformed timestamp");
            }
            Diagnostic::MissingTimestamp { row_kind, row } => {
                tracing::warn!(?row_kind, row, "dropping row without timestamp");
            }
            Diagnostic::MissingField { row_kind, row, column } => {
                tracing::warn!(?row_kind, row, column = %column, "dropping row with missing field");
            }
            Diagnostic::MalformedQuantity { row_kind, row, value } => {
                tracing::warn!(?row_kind, row, value = %value, "dropping row with malformed quantity");
            }
            Diagnostic::MissingBaseline { instrument_id } => {
                tracing::info!(instrument = %instrument_id, "no daily history, crossover not evaluated");
            }
            Diagnostic::EmptySessionData { instrument_id, dropped } => {
                tracing::info!(instrument = %instrument_id, dropped, "no ticks inside session window");
            }
            Diagnostic::WindowEvaluated { instrument_id, timestamp, rolling_volume } => {
                tracing::trace!(instrument = %instrument_id, %timestamp, rolling_volume, "window evaluated");
            }
        }
    }

    fn wants_trace(&self) -> bool {
        self.trace
    }
}

/// Sink that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    trace: bool,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Create a sink that ignores trace events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that also collects trace events.
    pub fn with_trace() -> Self {
        Self {
            trace: true,
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything recorded so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.diagnostics.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of dropped-row diagnostics.
    pub fn dropped_rows(&self) -> usize {
        self.diagnostics().iter().filter(|d| d.is_dropped_row()).count()
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&self, diagnostic: Diagnostic) {
        match self.diagnostics.lock() {
            Ok(mut guard) => guard.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }

    fn wants_trace(&self) -> bool {
        self.trace
    }
}

//! PyO3 bindings for volume-crossover Rust components.
//!
//! Exposes the crossover pipeline to Python:
//! - Timestamp normalization
//! - Session window checks
//! - Baseline computation and crossover detection over dict rows

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use crossover_core::{
    Config as RustConfig, CrossoverResult as RustCrossoverResult, Error as RustError, RawRow,
    TracingSink,
};
use crossover_features::SessionFilter;
use crossover_ingestion::timestamp::{normalize, parse_time};
use crossover_report::{format_timestamp, Pipeline};

fn to_py_err(err: RustError) -> PyErr {
    match err {
        RustError::Config(_) | RustError::InsufficientData(_) => {
            PyValueError::new_err(err.to_string())
        }
        RustError::Upstream(_) | RustError::Io(_) | RustError::Csv(_) => {
            PyIOError::new_err(err.to_string())
        }
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// Crossover outcome for one instrument.
#[pyclass]
#[derive(Clone)]
pub struct CrossoverResult {
    #[pyo3(get)]
    pub instrument_id: String,
    /// `YYYY-MM-DD HH:MM:SS`, or None when no crossing was found.
    #[pyo3(get)]
    pub timestamp: Option<String>,
}

#[pymethods]
impl CrossoverResult {
    #[getter]
    fn found(&self) -> bool {
        self.timestamp.is_some()
    }

    fn __repr__(&self) -> String {
        format!(
            "CrossoverResult(instrument_id={:?}, timestamp={})",
            self.instrument_id,
            self.timestamp
                .as_deref()
                .map(|t| format!("{t:?}"))
                .unwrap_or_else(|| "None".to_string())
        )
    }
}

impl From<RustCrossoverResult> for CrossoverResult {
    fn from(r: RustCrossoverResult) -> Self {
        CrossoverResult {
            timestamp: r.crossing_timestamp.as_ref().map(format_timestamp),
            instrument_id: r.instrument_id,
        }
    }
}

/// Trading session time-of-day window, inclusive on both ends.
#[pyclass]
#[derive(Clone)]
pub struct SessionWindow {
    inner: SessionFilter,
}

#[pymethods]
impl SessionWindow {
    #[new]
    #[pyo3(signature = (start = "09:15:00", end = "15:30:00"))]
    fn new(start: &str, end: &str) -> PyResult<Self> {
        let start = parse_time(start).map_err(|e| PyValueError::new_err(e.to_string()))?;
        let end = parse_time(end).map_err(|e| PyValueError::new_err(e.to_string()))?;
        let inner = SessionFilter::new(start, end).map_err(to_py_err)?;
        Ok(SessionWindow { inner })
    }

    /// Whether a date/time pair falls inside the window.
    fn contains(&self, date: &str, time: &str) -> PyResult<bool> {
        match normalize(date, Some(time)) {
            Ok(Some(ts)) => Ok(self.inner.contains(&ts)),
            Ok(None) => Err(PyValueError::new_err("time is blank")),
            Err(e) => Err(PyValueError::new_err(e.to_string())),
        }
    }

    fn __repr__(&self) -> String {
        format!("SessionWindow(start={}, end={})", self.inner.start(), self.inner.end())
    }
}

/// Normalize a date and optional time into `YYYY-MM-DD HH:MM:SS`.
///
/// Returns None when the time is absent.
#[pyfunction]
#[pyo3(signature = (date, time = None))]
fn parse_timestamp(date: &str, time: Option<&str>) -> PyResult<Option<String>> {
    normalize(date, time)
        .map(|ts| ts.as_ref().map(format_timestamp))
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

// ============================================================================
// Python-exposed Engine Classes
// ============================================================================

/// Crossover pipeline over rows given as `dict[str, str]`.
#[pyclass(name = "CrossoverEngine")]
pub struct PyCrossoverEngine {
    inner: Pipeline,
}

#[pymethods]
impl PyCrossoverEngine {
    /// Create an engine. `config_json` may override any configuration section.
    #[new]
    #[pyo3(signature = (config_json = None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => RustConfig::from_json_str(json).map_err(to_py_err)?,
            None => RustConfig::default(),
        };
        let sink = Arc::new(TracingSink::new(config.engine.trace_scan));
        let inner = Pipeline::new(config, sink).map_err(to_py_err)?;
        Ok(PyCrossoverEngine { inner })
    }

    /// Average daily volume per instrument.
    fn baselines(&self, daily_rows: Vec<RawRow>) -> PyResult<HashMap<String, f64>> {
        let mut rows = daily_rows;
        let (map, _) = self.inner.baselines(&mut rows).map_err(to_py_err)?;
        Ok(map.iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    /// Crossover results for a single intraday session.
    fn detect(
        &self,
        daily_rows: Vec<RawRow>,
        intraday_rows: Vec<RawRow>,
    ) -> PyResult<Vec<CrossoverResult>> {
        let mut daily = daily_rows;
        let mut intraday = intraday_rows;
        let (baselines, _) = self.inner.baselines(&mut daily).map_err(to_py_err)?;
        let (results, _) = self
            .inner
            .session("session", &mut intraday, &baselines)
            .map_err(to_py_err)?;
        Ok(results.into_iter().map(CrossoverResult::from).collect())
    }

    /// Full run over labelled sessions, returned as the JSON report.
    #[pyo3(signature = (daily_rows, sessions, pretty = true))]
    fn run(
        &self,
        daily_rows: Vec<RawRow>,
        sessions: Vec<(String, Vec<RawRow>)>,
        pretty: bool,
    ) -> PyResult<String> {
        let output = self.inner.run(daily_rows, sessions).map_err(to_py_err)?;
        output.report.to_json(pretty).map_err(to_py_err)
    }
}

// ============================================================================
// Module Definition
// ============================================================================

/// Volume Crossover - Rust crossover detection for Python.
#[pymodule]
fn volume_crossover(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<CrossoverResult>()?;
    m.add_class::<SessionWindow>()?;

    // Engine classes
    m.add_class::<PyCrossoverEngine>()?;

    // Functions
    m.add_function(wrap_pyfunction!(parse_timestamp, m)?)?;

    Ok(())
}

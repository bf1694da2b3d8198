//! Crossover engine.
//!
//! Combines the session filter and detector and runs them over every
//! instrument of a session.

use crate::{detector::CrossoverDetector, session::SessionFilter};
use crossover_core::{
    BaselineMap, Config, CrossoverResult, Diagnostic, DiagnosticSink, Error, InstrumentSeries,
    IntradayBatch, Result,
};
use crossover_ingestion::group_by_instrument;
use rayon::prelude::*;
use std::sync::Arc;

/// How per-instrument work is scheduled.
enum Executor {
    Sequential,
    GlobalPool,
    Pool(rayon::ThreadPool),
}

/// Feature computation engine for crossover detection.
pub struct CrossoverEngine {
    /// Session filter.
    session: SessionFilter,
    /// Rolling window detector.
    detector: CrossoverDetector,
    /// Diagnostic receiver.
    sink: Arc<dyn DiagnosticSink>,
    /// Emit per-window trace diagnostics.
    trace_scan: bool,
    executor: Executor,
}

impl CrossoverEngine {
    /// Create a new engine from configuration.
    pub fn new(config: &Config, sink: Arc<dyn DiagnosticSink>) -> Result<Self> {
        config.validate()?;

        let executor = match config.engine.workers {
            0 => Executor::GlobalPool,
            1 => Executor::Sequential,
            n => Executor::Pool(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| Error::config(format!("failed to build worker pool: {e}")))?,
            ),
        };

        Ok(Self {
            session: SessionFilter::from_config(&config.session)?,
            detector: CrossoverDetector::new(&config.window)?,
            trace_scan: config.engine.trace_scan && sink.wants_trace(),
            sink,
            executor,
        })
    }

    /// Group a session batch and run detection over every instrument in it.
    pub fn run_batch(&self, batch: IntradayBatch, baselines: &BaselineMap) -> Vec<CrossoverResult> {
        let series = group_by_instrument(batch);
        self.run_series(&series, baselines)
    }

    /// Run detection over grouped series.
    ///
    /// Returns exactly one result per series, in the same order.
    pub fn run_series(
        &self,
        series: &[InstrumentSeries],
        baselines: &BaselineMap,
    ) -> Vec<CrossoverResult> {
        let results: Vec<CrossoverResult> = match &self.executor {
            Executor::Sequential => series.iter().map(|s| self.evaluate(s, baselines)).collect(),
            Executor::GlobalPool => series.par_iter().map(|s| self.evaluate(s, baselines)).collect(),
            Executor::Pool(pool) => pool.install(|| {
                series.par_iter().map(|s| self.evaluate(s, baselines)).collect()
            }),
        };

        let found = results.iter().filter(|r| r.is_found()).count();
        tracing::debug!(instruments = results.len(), crossings = found, "session evaluated");
        results
    }

    /// Evaluate one instrument.
    pub fn evaluate(&self, series: &InstrumentSeries, baselines: &BaselineMap) -> CrossoverResult {
        let instrument_id = series.instrument_id.as_str();

        let in_session = self.session.filter(&series.ticks);
        if in_session.is_empty() {
            self.sink.record(Diagnostic::EmptySessionData {
                instrument_id: instrument_id.to_string(),
                dropped: series.len(),
            });
            return CrossoverResult::not_found(instrument_id);
        }

        let Some(baseline) = baselines.get(instrument_id) else {
            self.sink.record(Diagnostic::MissingBaseline {
                instrument_id: instrument_id.to_string(),
            });
            return CrossoverResult::not_found(instrument_id);
        };

        let crossing = if self.trace_scan {
            self.detector.detect_with(&in_session, Some(baseline), |tick, rolling_volume| {
                self.sink.record(Diagnostic::WindowEvaluated {
                    instrument_id: instrument_id.to_string(),
                    timestamp: tick.timestamp,
                    rolling_volume,
                });
            })
        } else {
            self.detector.detect(&in_session, Some(baseline))
        };

        match crossing {
            Some(c) => {
                tracing::trace!(
                    instrument = instrument_id,
                    timestamp = %c.timestamp,
                    rolling_volume = c.rolling_volume,
                    baseline,
                    "crossover"
                );
                CrossoverResult::found(instrument_id, c.timestamp)
            }
            None => CrossoverResult::not_found(instrument_id),
        }
    }
}

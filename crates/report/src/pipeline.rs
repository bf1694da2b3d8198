//! End-to-end crossover run.
//!
//! Reads daily history, computes baselines, then evaluates each labelled
//! intraday session. Nothing is returned unless every source read cleanly.

use crate::report::SessionReport;
use crossover_core::{BaselineMap, Config, CrossoverResult, DiagnosticSink, Result};
use crossover_features::{BaselineCalculator, CrossoverEngine};
use crossover_ingestion::{NormalizeStats, RecordNormalizer, RowSource};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Counters for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Session label.
    pub label: String,
    /// Intraday rows read.
    pub rows_read: usize,
    /// Intraday rows dropped.
    pub rows_rejected: usize,
    /// Instruments present in the session.
    pub instruments: usize,
    /// Instruments with a crossing.
    pub crossings: usize,
}

/// Counters for a full run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Daily rows read.
    pub daily_rows_read: usize,
    /// Daily rows dropped.
    pub daily_rows_rejected: usize,
    /// Instruments with a baseline.
    pub baseline_instruments: usize,
    /// Per-session counters, in run order.
    pub sessions: Vec<SessionSummary>,
}

impl RunSummary {
    /// Total crossings across sessions.
    pub fn total_crossings(&self) -> usize {
        self.sessions.iter().map(|s| s.crossings).sum()
    }

    /// Total rows dropped across daily and intraday inputs.
    pub fn total_rejected(&self) -> usize {
        self.daily_rows_rejected + self.sessions.iter().map(|s| s.rows_rejected).sum::<usize>()
    }
}

/// Output of a run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Baselines used.
    pub baselines: BaselineMap,
    /// Results by session.
    pub report: SessionReport,
    /// Counters.
    pub summary: RunSummary,
}

/// Crossover pipeline.
pub struct Pipeline {
    config: Config,
    sink: Arc<dyn DiagnosticSink>,
    calculator: BaselineCalculator,
    engine: CrossoverEngine,
}

impl Pipeline {
    /// Create a pipeline. Fails on invalid configuration.
    pub fn new(config: Config, sink: Arc<dyn DiagnosticSink>) -> Result<Self> {
        let engine = CrossoverEngine::new(&config, sink.clone())?;
        let calculator = BaselineCalculator::new(&config.baseline);
        Ok(Self {
            config,
            sink,
            calculator,
            engine,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read daily history and compute baselines.
    pub fn baselines<D: RowSource>(&self, daily: &mut D) -> Result<(BaselineMap, NormalizeStats)> {
        let started = Instant::now();
        let rows = daily.read_rows()?;
        tracing::info!(
            source = %daily.describe(),
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded daily history"
        );

        let started = Instant::now();
        let normalizer = RecordNormalizer::new(&self.config.columns, self.sink.as_ref());
        let (records, stats) = normalizer.daily_records(&rows);
        let baselines = self.calculator.compute(&records)?;
        tracing::info!(
            instruments = baselines.len(),
            rejected = stats.rows_rejected,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "computed baselines"
        );

        Ok((baselines, stats))
    }

    /// Evaluate one intraday session against precomputed baselines.
    pub fn session<R: RowSource>(
        &self,
        label: &str,
        source: &mut R,
        baselines: &BaselineMap,
    ) -> Result<(Vec<CrossoverResult>, SessionSummary)> {
        let started = Instant::now();
        let rows = source.read_rows()?;
        tracing::info!(
            session = label,
            source = %source.describe(),
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded intraday data"
        );

        let started = Instant::now();
        let normalizer = RecordNormalizer::new(&self.config.columns, self.sink.as_ref());
        let (batch, stats) = normalizer.intraday_ticks(&rows);
        let results = self.engine.run_batch(batch, baselines);

        let summary = SessionSummary {
            label: label.to_string(),
            rows_read: stats.rows_read,
            rows_rejected: stats.rows_rejected,
            instruments: results.len(),
            crossings: results.iter().filter(|r| r.is_found()).count(),
        };
        tracing::info!(
            session = label,
            instruments = summary.instruments,
            crossings = summary.crossings,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "processed intraday data"
        );

        Ok((results, summary))
    }

    /// Run every session.
    pub fn run<D, I, L, R>(&self, mut daily: D, sessions: I) -> Result<RunOutput>
    where
        D: RowSource,
        I: IntoIterator<Item = (L, R)>,
        L: Into<String>,
        R: RowSource,
    {
        let (baselines, daily_stats) = self.baselines(&mut daily)?;

        let mut report = SessionReport::new();
        let mut summary = RunSummary {
            daily_rows_read: daily_stats.rows_read,
            daily_rows_rejected: daily_stats.rows_rejected,
            baseline_instruments: baselines.len(),
            sessions: Vec::new(),
        };

        for (label, mut source) in sessions {
            let label: String = label.into();
            let (results, session_summary) = self.session(&label, &mut source, &baselines)?;
            report.insert(label, results);
            summary.sessions.push(session_summary);
        }

        Ok(RunOutput {
            baselines,
            report,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossover_core::{CollectingSink, Error, RawRow};

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn daily(name: &str, date: &str, volume: &str) -> RawRow {
        row(&[("Stock Name", name), ("Date", date), ("Volume", volume)])
    }

    fn intraday(name: &str, time: &str, qty: &str) -> RawRow {
        row(&[
            ("Stock Name", name),
            ("Date", "19-04-2024"),
            ("Time", time),
            ("Last Traded Quantity", qty),
        ])
    }

    struct FailingSource;

    impl RowSource for FailingSource {
        fn read_rows(&mut self) -> Result<Vec<RawRow>> {
            Err(Error::upstream("connection reset"))
        }
    }

    fn pipeline(sink: Arc<CollectingSink>) -> Pipeline {
        let mut config = Config::default();
        config.engine.workers = 1;
        Pipeline::new(config, sink).unwrap()
    }

    #[test]
    fn test_run_summary_counts() {
        let sink = Arc::new(CollectingSink::new());
        let output = pipeline(sink.clone())
            .run(
                vec![
                    daily("A", "2024-04-01", "100"),
                    daily("A", "2024-04-02", "200"),
                    daily("A", "garbage", "999"),
                    daily("A", "2024-04-03", "300"),
                ],
                vec![(
                    "2024-04-19",
                    vec![
                        intraday("A", "09:20:00", "50"),
                        intraday("A", "09:30:00", "60"),
                        intraday("A", "09:40:00", "100"),
                        intraday("A", "bad", "1"),
                    ],
                )],
            )
            .unwrap();

        assert_eq!(output.baselines.get("A"), Some(200.0));
        assert_eq!(output.summary.daily_rows_read, 4);
        assert_eq!(output.summary.daily_rows_rejected, 1);
        assert_eq!(output.summary.sessions[0].rows_rejected, 1);
        assert_eq!(output.summary.total_crossings(), 1);
        assert_eq!(output.summary.total_rejected(), 2);
        assert_eq!(sink.dropped_rows(), 2);
    }

    #[test]
    fn test_instrument_with_unparseable_rows_still_reported() {
        let sink = Arc::new(CollectingSink::new());
        let pipeline = pipeline(sink.clone());
        let (baselines, _) = pipeline
            .baselines(&mut vec![daily("A", "2024-04-01", "100"), daily("D", "2024-04-01", "100")])
            .unwrap();

        let (results, summary) = pipeline
            .session(
                "s",
                &mut vec![intraday("A", "09:20:00", "500"), intraday("D", "9h20", "500")],
                &baselines,
            )
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].instrument_id, "A");
        assert!(results[0].is_found());
        assert_eq!(results[1], CrossoverResult::not_found("D"));
        assert_eq!(summary.instruments, 2);
        assert_eq!(summary.rows_rejected, 1);
        assert_eq!(sink.dropped_rows(), 1);
    }

    #[test]
    fn test_no_daily_history_is_fatal() {
        let sink = Arc::new(CollectingSink::new());
        let err = pipeline(sink)
            .run(Vec::<RawRow>::new(), Vec::<(String, Vec<RawRow>)>::new())
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientData(_)));
    }

    #[test]
    fn test_upstream_failure_aborts() {
        let sink = Arc::new(CollectingSink::new());
        let err = pipeline(sink)
            .run(
                vec![daily("A", "2024-04-01", "100")],
                vec![("s", FailingSource)],
            )
            .unwrap_err();
        assert!(err.is_upstream());
    }
}

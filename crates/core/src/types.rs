//! Core data types for the volume-crossover system.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Timestamp type used throughout the pipeline.
pub type Timestamp = DateTime<Utc>;

/// A raw input row: column name to unparsed string value.
pub type RawRow = HashMap<String, String>;

/// One day of traded volume for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Instrument identifier (name or symbol).
    pub instrument_id: String,
    /// Calendar date of the session.
    pub trade_date: NaiveDate,
    /// Total traded volume for the day.
    pub volume: u64,
}

/// A single intraday trade print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntradayTick {
    /// Instrument identifier.
    pub instrument_id: String,
    /// Trade time (UTC).
    pub timestamp: Timestamp,
    /// Quantity traded at this print.
    pub traded_quantity: u64,
}

/// Normalized ticks of one intraday session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntradayBatch {
    /// Every instrument named in the input, in first-seen order. Includes
    /// instruments whose rows were all rejected.
    pub instruments: IndexSet<String>,
    /// Ticks that normalized cleanly, in input order.
    pub ticks: Vec<IntradayTick>,
}

impl From<Vec<IntradayTick>> for IntradayBatch {
    fn from(ticks: Vec<IntradayTick>) -> Self {
        let instruments = ticks.iter().map(|t| t.instrument_id.clone()).collect();
        Self { instruments, ticks }
    }
}

/// All ticks for one instrument, sorted by timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentSeries {
    /// Instrument identifier.
    pub instrument_id: String,
    /// Ticks in non-decreasing timestamp order.
    pub ticks: Vec<IntradayTick>,
}

impl InstrumentSeries {
    /// Number of ticks.
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// Whether the series holds no ticks.
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

/// Average daily volume by instrument.
///
/// Instruments with no daily history have no entry; a lookup for them
/// returns `None`, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaselineMap {
    averages: BTreeMap<String, f64>,
}

impl BaselineMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the baseline for an instrument.
    pub fn insert(&mut self, instrument_id: impl Into<String>, average: f64) {
        self.averages.insert(instrument_id.into(), average);
    }

    /// Look up the baseline for an instrument.
    #[inline]
    pub fn get(&self, instrument_id: &str) -> Option<f64> {
        self.averages.get(instrument_id).copied()
    }

    /// Number of instruments with a baseline.
    pub fn len(&self) -> usize {
        self.averages.len()
    }

    /// Whether no baselines are present.
    pub fn is_empty(&self) -> bool {
        self.averages.is_empty()
    }

    /// Iterate in instrument order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.averages.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for BaselineMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            averages: iter.into_iter().collect(),
        }
    }
}

/// Outcome of crossover detection for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossoverResult {
    /// Instrument identifier.
    pub instrument_id: String,
    /// First tick at which rolling volume exceeded the baseline, if any.
    pub crossing_timestamp: Option<Timestamp>,
}

impl CrossoverResult {
    /// A result with a crossing.
    pub fn found(instrument_id: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            crossing_timestamp: Some(timestamp),
        }
    }

    /// A result with no crossing.
    pub fn not_found(instrument_id: impl Into<String>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            crossing_timestamp: None,
        }
    }

    /// Whether a crossing was recorded.
    pub fn is_found(&self) -> bool {
        self.crossing_timestamp.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_baseline_unknown_is_none() {
        let mut map = BaselineMap::new();
        map.insert("A", 200.0);
        assert_eq!(map.get("A"), Some(200.0));
        assert_eq!(map.get("C"), None);
    }

    #[test]
    fn test_baseline_iter_sorted() {
        let map: BaselineMap = vec![("ZED".to_string(), 1.0), ("ABC".to_string(), 2.0)]
            .into_iter()
            .collect();
        let ids: Vec<&str> = map.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["ABC", "ZED"]);
    }

    #[test]
    fn test_baseline_serializes_as_object() {
        let mut map = BaselineMap::new();
        map.insert("A", 200.0);
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"A":200.0}"#);
    }

    #[test]
    fn test_series_len() {
        let ts = Utc.with_ymd_and_hms(2024, 4, 19, 9, 15, 0).unwrap();
        let series = InstrumentSeries {
            instrument_id: "A".to_string(),
            ticks: vec![
                IntradayTick { instrument_id: "A".to_string(), timestamp: ts, traded_quantity: 5 },
                IntradayTick { instrument_id: "A".to_string(), timestamp: ts, traded_quantity: 7 },
            ],
        };
        assert_eq!(series.len(), 2);
        assert!(!series.is_empty());
    }

    #[test]
    fn test_batch_from_ticks_keeps_first_seen_order() {
        let ts = Utc.with_ymd_and_hms(2024, 4, 19, 9, 15, 0).unwrap();
        let tick = |id: &str| IntradayTick {
            instrument_id: id.to_string(),
            timestamp: ts,
            traded_quantity: 1,
        };
        let batch = IntradayBatch::from(vec![tick("Z"), tick("A"), tick("Z")]);
        assert_eq!(batch.instruments.iter().collect::<Vec<_>>(), vec!["Z", "A"]);
        assert_eq!(batch.ticks.len(), 3);
    }

    #[test]
    fn test_result_constructors() {
        let ts = Utc.with_ymd_and_hms(2024, 4, 19, 10, 0, 0).unwrap();
        assert!(CrossoverResult::found("A", ts).is_found());
        assert!(!CrossoverResult::not_found("B").is_found());
    }
}

//! Session report.
//!
//! Maps a session label to the ordered crossover results for that session.
//! Timestamps render as `YYYY-MM-DD HH:MM:SS` without a zone suffix, and a
//! missing crossing renders as `null`.

use crossover_core::{CrossoverResult, Result, Timestamp};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Output timestamp layout.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a timestamp for the report.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// One serialized result line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// Instrument identifier.
    pub instrument_id: String,
    /// Rendered crossing time, or `None` when not found.
    pub timestamp: Option<String>,
}

impl From<&CrossoverResult> for ReportEntry {
    fn from(result: &CrossoverResult) -> Self {
        Self {
            instrument_id: result.instrument_id.clone(),
            timestamp: result.crossing_timestamp.as_ref().map(format_timestamp),
        }
    }
}

/// Results for every session of a run, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionReport {
    #[serde(serialize_with = "serialize_sessions")]
    sessions: IndexMap<String, Vec<CrossoverResult>>,
}

fn serialize_sessions<S: Serializer>(
    sessions: &IndexMap<String, Vec<CrossoverResult>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(sessions.iter().map(|(label, results)| {
        let entries: Vec<ReportEntry> = results.iter().map(ReportEntry::from).collect();
        (label, entries)
    }))
}

impl SessionReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session. A repeated label replaces the earlier results in place.
    pub fn insert(&mut self, label: impl Into<String>, results: Vec<CrossoverResult>) {
        self.sessions.insert(label.into(), results);
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the report holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Serialize to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn ts() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 4, 19, 9, 40, 5).unwrap()
    }

    #[test]
    fn test_format_strips_zone_and_fraction() {
        assert_eq!(format_timestamp(&ts()), "2024-04-19 09:40:05");
        let fractional = ts() + TimeDelta::milliseconds(750);
        assert_eq!(format_timestamp(&fractional), "2024-04-19 09:40:05");
    }

    #[test]
    fn test_json_shape_and_order() {
        let mut report = SessionReport::new();
        report.insert("2024-04-22", vec![CrossoverResult::not_found("B")]);
        report.insert(
            "2024-04-19",
            vec![CrossoverResult::found("A", ts()), CrossoverResult::not_found("C")],
        );

        let json = report.to_json(false).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"2024-04-22":[{"instrument_id":"B","timestamp":null}],"#,
                r#""2024-04-19":[{"instrument_id":"A","timestamp":"2024-04-19 09:40:05"},"#,
                r#"{"instrument_id":"C","timestamp":null}]}"#
            )
        );
    }

    #[test]
    fn test_insert_replaces_same_label() {
        let mut report = SessionReport::new();
        report.insert("s", vec![CrossoverResult::not_found("A")]);
        report.insert("t", vec![]);
        report.insert("s", vec![CrossoverResult::found("A", ts())]);

        assert_eq!(report.len(), 2);
        let labels: Vec<&str> = report.sessions.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["s", "t"]);
        assert!(report.sessions["s"][0].is_found());
    }

    #[test]
    fn test_empty_report() {
        let report = SessionReport::new();
        assert!(report.is_empty());
        assert_eq!(report.to_json(true).unwrap(), "{}");
    }
}

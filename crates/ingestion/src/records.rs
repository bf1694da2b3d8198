//! Conversion of raw rows into typed records.
//!
//! Every row is handled on its own: a bad row is reported to the
//! diagnostic sink and skipped, never aborting the batch.

use crate::timestamp::{normalize, parse_date};
use crossover_core::{
    ColumnConfig, DailyRecord, Diagnostic, DiagnosticSink, IntradayBatch, IntradayTick, RawRow,
    RowKind,
};

/// Counters from one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Rows seen.
    pub rows_read: usize,
    /// Rows converted into records.
    pub rows_kept: usize,
    /// Rows dropped with a diagnostic.
    pub rows_rejected: usize,
}

impl NormalizeStats {
    fn keep(&mut self) {
        self.rows_read += 1;
        self.rows_kept += 1;
    }

    fn reject(&mut self) {
        self.rows_read += 1;
        self.rows_rejected += 1;
    }
}

/// Row normalizer bound to a column layout and a diagnostic sink.
pub struct RecordNormalizer<'a> {
    columns: &'a ColumnConfig,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> RecordNormalizer<'a> {
    /// Create a normalizer.
    pub fn new(columns: &'a ColumnConfig, sink: &'a dyn DiagnosticSink) -> Self {
        Self { columns, sink }
    }

    /// Convert daily history rows. Rows without a valid date or volume are dropped.
    pub fn daily_records(&self, rows: &[RawRow]) -> (Vec<DailyRecord>, NormalizeStats) {
        let mut stats = NormalizeStats::default();
        let mut records = Vec::with_capacity(rows.len());

        for (idx, row) in rows.iter().enumerate() {
            match self.daily_record(idx, row) {
                Some(record) => {
                    stats.keep();
                    records.push(record);
                }
                None => stats.reject(),
            }
        }

        tracing::debug!(
            rows = stats.rows_read,
            kept = stats.rows_kept,
            rejected = stats.rows_rejected,
            "normalized daily rows"
        );
        (records, stats)
    }

    /// Convert intraday rows. Rows without a date, time or quantity are dropped.
    ///
    /// The instrument of a dropped row is still listed in the batch, so it
    /// gets a result even when none of its rows survive.
    pub fn intraday_ticks(&self, rows: &[RawRow]) -> (IntradayBatch, NormalizeStats) {
        let mut stats = NormalizeStats::default();
        let mut batch = IntradayBatch {
            ticks: Vec::with_capacity(rows.len()),
            ..IntradayBatch::default()
        };

        for (idx, row) in rows.iter().enumerate() {
            if let Some(id) = self.instrument_of(row) {
                if !batch.instruments.contains(id) {
                    batch.instruments.insert(id.to_string());
                }
            }
            match self.intraday_tick(idx, row) {
                Some(tick) => {
                    stats.keep();
                    batch.ticks.push(tick);
                }
                None => stats.reject(),
            }
        }

        tracing::debug!(
            rows = stats.rows_read,
            kept = stats.rows_kept,
            rejected = stats.rows_rejected,
            "normalized intraday rows"
        );
        (batch, stats)
    }

    fn instrument_of<'r>(&self, row: &'r RawRow) -> Option<&'r str> {
        row.get(&self.columns.instrument)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn daily_record(&self, row_idx: usize, row: &RawRow) -> Option<DailyRecord> {
        let kind = RowKind::Daily;
        let instrument_id = self.required(kind, row_idx, row, &self.columns.instrument)?;
        let raw_date = self.required(kind, row_idx, row, &self.columns.date)?;
        let raw_volume = self.required(kind, row_idx, row, &self.columns.volume)?;

        let trade_date = match parse_date(raw_date) {
            Ok(date) => date,
            Err(err) => {
                self.sink.record(Diagnostic::MalformedTimestamp {
                    row_kind: kind,
                    row: row_idx,
                    value: raw_date.to_string(),
                    reason: err.to_string(),
                });
                return None;
            }
        };
        let volume = self.quantity(kind, row_idx, raw_volume)?;

        Some(DailyRecord {
            instrument_id: instrument_id.to_string(),
            trade_date,
            volume,
        })
    }

    fn intraday_tick(&self, row_idx: usize, row: &RawRow) -> Option<IntradayTick> {
        let kind = RowKind::Intraday;
        let instrument_id = self.required(kind, row_idx, row, &self.columns.instrument)?;
        let raw_date = self.required(kind, row_idx, row, &self.columns.date)?;
        let raw_time = row.get(&self.columns.time).map(String::as_str);
        let raw_quantity = self.required(kind, row_idx, row, &self.columns.quantity)?;

        let timestamp = match normalize(raw_date, raw_time) {
            Ok(Some(ts)) => ts,
            Ok(None) => {
                self.sink.record(Diagnostic::MissingTimestamp {
                    row_kind: kind,
                    row: row_idx,
                });
                return None;
            }
            Err(err) => {
                self.sink.record(Diagnostic::MalformedTimestamp {
                    row_kind: kind,
                    row: row_idx,
                    value: format!("{} {}", raw_date, raw_time.unwrap_or_default()),
                    reason: err.to_string(),
                });
                return None;
            }
        };
        let traded_quantity = self.quantity(kind, row_idx, raw_quantity)?;

        Some(IntradayTick {
            instrument_id: instrument_id.to_string(),
            timestamp,
            traded_quantity,
        })
    }

    /// Fetch a non-blank trimmed field.
    fn required<'r>(
        &self,
        kind: RowKind,
        row_idx: usize,
        row: &'r RawRow,
        column: &str,
    ) -> Option<&'r str> {
        match row.get(column).map(|v| v.trim()) {
            Some(value) if !value.is_empty() => Some(value),
            _ => {
                self.sink.record(Diagnostic::MissingField {
                    row_kind: kind,
                    row: row_idx,
                    column: column.to_string(),
                });
                None
            }
        }
    }

    fn quantity(&self, kind: RowKind, row_idx: usize, raw: &str) -> Option<u64> {
        match raw.parse::<u64>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.sink.record(Diagnostic::MalformedQuantity {
                    row_kind: kind,
                    row: row_idx,
                    value: raw.to_string(),
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use crossover_core::CollectingSink;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn daily(name: &str, date: &str, volume: &str) -> RawRow {
        row(&[("Stock Name", name), ("Date", date), ("Volume", volume)])
    }

    fn intraday(name: &str, date: &str, time: &str, qty: &str) -> RawRow {
        row(&[
            ("Stock Name", name),
            ("Date", date),
            ("Time", time),
            ("Last Traded Quantity", qty),
        ])
    }

    #[test]
    fn test_daily_records_parse() {
        let columns = ColumnConfig::default();
        let sink = CollectingSink::new();
        let normalizer = RecordNormalizer::new(&columns, &sink);

        let (records, stats) = normalizer.daily_records(&[
            daily("A", "2024-04-01", "100"),
            daily("A", "02-04-2024", " 200 "),
        ]);

        assert_eq!(stats, NormalizeStats { rows_read: 2, rows_kept: 2, rows_rejected: 0 });
        assert_eq!(records[0].trade_date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(records[1].volume, 200);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn test_malformed_daily_date_dropped() {
        let columns = ColumnConfig::default();
        let sink = CollectingSink::new();
        let normalizer = RecordNormalizer::new(&columns, &sink);

        let (records, stats) = normalizer.daily_records(&[
            daily("A", "not-a-date", "100"),
            daily("A", "2024-04-02", "300"),
        ]);

        assert_eq!(records.len(), 1);
        assert_eq!(stats.rows_rejected, 1);
        assert!(matches!(
            sink.diagnostics()[0],
            Diagnostic::MalformedTimestamp { row_kind: RowKind::Daily, row: 0, .. }
        ));
    }

    #[test]
    fn test_bad_volume_and_missing_column() {
        let columns = ColumnConfig::default();
        let sink = CollectingSink::new();
        let normalizer = RecordNormalizer::new(&columns, &sink);

        let (records, _) = normalizer.daily_records(&[
            daily("A", "2024-04-01", "-5"),
            daily("A", "2024-04-01", "1.5"),
            row(&[("Stock Name", "A"), ("Date", "2024-04-01")]),
            daily("", "2024-04-01", "10"),
        ]);

        assert!(records.is_empty());
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 4);
        assert!(matches!(diags[0], Diagnostic::MalformedQuantity { .. }));
        assert!(matches!(diags[1], Diagnostic::MalformedQuantity { .. }));
        assert!(matches!(&diags[2], Diagnostic::MissingField { column, .. } if column == "Volume"));
        assert!(matches!(&diags[3], Diagnostic::MissingField { column, .. } if column == "Stock Name"));
    }

    #[test]
    fn test_intraday_ticks_parse() {
        let columns = ColumnConfig::default();
        let sink = CollectingSink::new();
        let normalizer = RecordNormalizer::new(&columns, &sink);

        let (batch, stats) = normalizer.intraday_ticks(&[
            intraday("A", "19-04-2024", "09:15:00", "50"),
            intraday("B", "22/04/24", "10:00:05", "7"),
        ]);
        let ticks = batch.ticks;

        assert_eq!(stats.rows_kept, 2);
        assert_eq!(ticks[0].timestamp, Utc.with_ymd_and_hms(2024, 4, 19, 9, 15, 0).unwrap());
        assert_eq!(ticks[1].timestamp, Utc.with_ymd_and_hms(2024, 4, 22, 10, 0, 5).unwrap());
        assert_eq!(ticks[1].traded_quantity, 7);
    }

    #[test]
    fn test_intraday_missing_time_dropped() {
        let columns = ColumnConfig::default();
        let sink = CollectingSink::new();
        let normalizer = RecordNormalizer::new(&columns, &sink);

        let (batch, stats) = normalizer.intraday_ticks(&[
            row(&[("Stock Name", "A"), ("Date", "19-04-2024"), ("Last Traded Quantity", "5")]),
            intraday("A", "19-04-2024", "", "5"),
            intraday("A", "31-04-2024", "09:30:00", "5"),
        ]);

        assert!(batch.ticks.is_empty());
        assert_eq!(stats.rows_rejected, 3);
        let diags = sink.diagnostics();
        assert!(matches!(diags[0], Diagnostic::MissingTimestamp { row: 0, .. }));
        assert!(matches!(diags[1], Diagnostic::MissingTimestamp { row: 1, .. }));
        assert!(matches!(diags[2], Diagnostic::MalformedTimestamp { row: 2, .. }));
    }

    #[test]
    fn test_rejected_rows_keep_their_instrument() {
        let columns = ColumnConfig::default();
        let sink = CollectingSink::new();
        let normalizer = RecordNormalizer::new(&columns, &sink);

        let (batch, stats) = normalizer.intraday_ticks(&[
            intraday("D", "19-04-2024", "9h20", "500"),
            intraday("A", "19-04-2024", "09:20:00", "500"),
            intraday("E", "19-04-2024", "09:21:00", "x"),
            intraday(" ", "19-04-2024", "09:22:00", "1"),
            intraday("D", "19-04-2024", "09:23:00", ""),
        ]);

        assert_eq!(stats.rows_rejected, 4);
        assert_eq!(batch.ticks.len(), 1);
        assert_eq!(batch.instruments.iter().collect::<Vec<_>>(), vec!["D", "A", "E"]);
    }

    #[test]
    fn test_custom_columns() {
        let columns = ColumnConfig {
            instrument: "symbol".to_string(),
            volume: "vol".to_string(),
            ..ColumnConfig::default()
        };
        let sink = CollectingSink::new();
        let normalizer = RecordNormalizer::new(&columns, &sink);

        let (records, _) =
            normalizer.daily_records(&[row(&[("symbol", "X"), ("Date", "2024-01-02"), ("vol", "9")])]);
        assert_eq!(records[0].instrument_id, "X");
        assert_eq!(records[0].volume, 9);
    }
}

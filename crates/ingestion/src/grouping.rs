//! Grouping of ticks into per-instrument series.

use crossover_core::{InstrumentSeries, IntradayBatch, IntradayTick};
use indexmap::IndexMap;

/// Split a batch into per-instrument series.
///
/// Every instrument listed in the batch gets a series, in first-seen order,
/// even when it has no ticks. Each series is sorted by timestamp with a
/// stable sort, so prints sharing a timestamp keep their input order.
pub fn group_by_instrument(batch: IntradayBatch) -> Vec<InstrumentSeries> {
    let mut grouped: IndexMap<String, Vec<IntradayTick>> = batch
        .instruments
        .into_iter()
        .map(|id| (id, Vec::new()))
        .collect();

    for tick in batch.ticks {
        grouped.entry(tick.instrument_id.clone()).or_default().push(tick);
    }

    grouped
        .into_iter()
        .map(|(instrument_id, mut ticks)| {
            ticks.sort_by_key(|t| t.timestamp);
            InstrumentSeries { instrument_id, ticks }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tick(name: &str, minute: u32, qty: u64) -> IntradayTick {
        IntradayTick {
            instrument_id: name.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 4, 19, 10, minute, 0).unwrap(),
            traded_quantity: qty,
        }
    }

    #[test]
    fn test_first_seen_order() {
        let series = group_by_instrument(IntradayBatch::from(vec![
            tick("ZED", 1, 1),
            tick("ABC", 2, 1),
            tick("ZED", 3, 1),
        ]));
        let ids: Vec<&str> = series.iter().map(|s| s.instrument_id.as_str()).collect();
        assert_eq!(ids, vec!["ZED", "ABC"]);
        assert_eq!(series[0].len(), 2);
    }

    #[test]
    fn test_sorted_and_stable() {
        let series = group_by_instrument(IntradayBatch::from(vec![
            tick("A", 5, 1),
            tick("A", 2, 2),
            tick("A", 5, 3),
            tick("A", 1, 4),
        ]));
        let qty: Vec<u64> = series[0].ticks.iter().map(|t| t.traded_quantity).collect();
        assert_eq!(qty, vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_instrument(IntradayBatch::default()).is_empty());
    }

    #[test]
    fn test_instruments_without_ticks_get_empty_series() {
        let batch = IntradayBatch {
            instruments: ["D", "A"].into_iter().map(String::from).collect(),
            ticks: vec![tick("A", 1, 5)],
        };

        let series = group_by_instrument(batch);
        let ids: Vec<&str> = series.iter().map(|s| s.instrument_id.as_str()).collect();
        assert_eq!(ids, vec!["D", "A"]);
        assert!(series[0].is_empty());
        assert_eq!(series[1].len(), 1);
    }
}

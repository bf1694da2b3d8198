//! Average daily volume per instrument.

use crossover_core::{BaselineConfig, BaselineMap, DailyRecord, Error, Result};
use std::collections::BTreeMap;

/// Baseline calculator.
///
/// The baseline is the arithmetic mean of daily volume over the history the
/// caller supplies. With `lookback_days` set, only the most recent N records
/// per instrument are averaged.
pub struct BaselineCalculator {
    lookback_days: Option<usize>,
}

impl BaselineCalculator {
    /// Create a calculator from configuration.
    pub fn new(config: &BaselineConfig) -> Self {
        Self {
            lookback_days: config.lookback_days,
        }
    }

    /// Compute baselines for every instrument present in `records`.
    ///
    /// Returns [`Error::InsufficientData`] if there are no records at all.
    pub fn compute(&self, records: &[DailyRecord]) -> Result<BaselineMap> {
        if records.is_empty() {
            return Err(Error::insufficient_data("no usable daily volume records"));
        }

        let mut grouped: BTreeMap<&str, Vec<&DailyRecord>> = BTreeMap::new();
        for record in records {
            grouped.entry(record.instrument_id.as_str()).or_default().push(record);
        }

        let map: BaselineMap = grouped
            .into_iter()
            .map(|(instrument, history)| {
                let average = self.average(history);
                (instrument.to_string(), average)
            })
            .collect();

        tracing::debug!(
            instruments = map.len(),
            records = records.len(),
            lookback_days = ?self.lookback_days,
            "computed baselines"
        );
        Ok(map)
    }

    /// Mean volume of one instrument's history. `history` is never empty.
    fn average(&self, mut history: Vec<&DailyRecord>) -> f64 {
        if let Some(n) = self.lookback_days {
            // Ties on date break on volume so the result ignores input order.
            history.sort_by_key(|r| (r.trade_date, r.volume));
            let skip = history.len().saturating_sub(n);
            history.drain(..skip);
        }

        // Integer sum keeps the mean independent of summation order.
        let total: u128 = history.iter().map(|r| u128::from(r.volume)).sum();
        total as f64 / history.len() as f64
    }
}

impl Default for BaselineCalculator {
    fn default() -> Self {
        Self::new(&BaselineConfig::default())
    }
}

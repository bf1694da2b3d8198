//! Trading session filter.

use chrono::NaiveTime;
use crossover_core::{Error, IntradayTick, Result, SessionConfig, Timestamp};

/// Time-of-day window with inclusive bounds, evaluated in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionFilter {
    start: NaiveTime,
    end: NaiveTime,
}

impl SessionFilter {
    /// Create a filter. Fails if `start` is after `end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if start > end {
            return Err(Error::config(format!(
                "session start {start} is after session end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Create a filter from configuration.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        Self::new(config.start, config.end)
    }

    /// Session open.
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// Session close.
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether the instant's time of day lies inside the window.
    #[inline]
    pub fn contains(&self, ts: &Timestamp) -> bool {
        // Fractional seconds past the close count as outside.
        let time = ts.time();
        self.start <= time && time <= self.end
    }

    /// Keep the ticks inside the window, preserving order.
    pub fn filter<'a>(&self, ticks: &'a [IntradayTick]) -> Vec<&'a IntradayTick> {
        ticks.iter().filter(|t| self.contains(&t.timestamp)).collect()
    }
}

impl Default for SessionFilter {
    fn default() -> Self {
        let config = SessionConfig::default();
        Self {
            start: config.start,
            end: config.end,
        }
    }
}

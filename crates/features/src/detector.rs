//! Rolling-volume crossover detection.
//!
//! For each tick `i` the rolling volume is the quantity traded by ticks
//! `0..=i` whose timestamp lies within one window length of `timestamp[i]`.
//! A prefix-sum array plus a forward-only left pointer gives every rolling
//! volume in O(n) total.

use chrono::TimeDelta;
use crossover_core::{IntradayTick, Result, Timestamp, WindowBound, WindowConfig};
use std::borrow::Borrow;

/// The first tick at which rolling volume exceeded the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    /// Index into the series passed to the detector.
    pub index: usize,
    /// Timestamp of the crossing tick.
    pub timestamp: Timestamp,
    /// Rolling volume at the crossing tick.
    pub rolling_volume: u64,
}

/// Rolling crossover detector.
#[derive(Debug, Clone, Copy)]
pub struct CrossoverDetector {
    length: TimeDelta,
    bound: WindowBound,
}

impl CrossoverDetector {
    /// Create a detector from window configuration.
    ///
    /// Fails on a zero-length window, where a tick could fall outside its own
    /// exclusive window.
    pub fn new(config: &WindowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: &WindowConfig) -> Self {
        Self {
            length: config.length(),
            bound: config.lower_bound,
        }
    }

    /// Whether a tick at `ts` falls inside the window ending at `current`.
    #[inline]
    fn in_window(&self, ts: Timestamp, current: Timestamp) -> bool {
        let edge = current - self.length;
        match self.bound {
            WindowBound::Inclusive => ts >= edge,
            WindowBound::Exclusive => ts > edge,
        }
    }

    /// Cumulative quantity: `prefix[k]` is the sum of the first `k` ticks.
    fn prefix_sums<T: Borrow<IntradayTick>>(ticks: &[T]) -> Vec<u64> {
        let mut prefix = Vec::with_capacity(ticks.len() + 1);
        let mut running = 0u64;
        prefix.push(running);
        for tick in ticks {
            running = running.saturating_add(tick.borrow().traded_quantity);
            prefix.push(running);
        }
        prefix
    }

    /// Rolling volume at every tick.
    pub fn rolling_volumes<T: Borrow<IntradayTick>>(&self, ticks: &[T]) -> Vec<u64> {
        let mut volumes = Vec::with_capacity(ticks.len());
        self.scan(ticks, |_, _, volume| {
            volumes.push(volume);
            false
        });
        volumes
    }

    /// First crossing of `baseline`, or `None`.
    ///
    /// An unknown baseline or an empty series never crosses. The comparison
    /// is strict: a rolling volume equal to the baseline does not count.
    pub fn detect<T: Borrow<IntradayTick>>(
        &self,
        ticks: &[T],
        baseline: Option<f64>,
    ) -> Option<Crossing> {
        self.detect_with(ticks, baseline, |_, _| {})
    }

    /// Like [`detect`](Self::detect), calling `observer` with each evaluated
    /// tick and its rolling volume up to and including the crossing.
    pub fn detect_with<T, F>(
        &self,
        ticks: &[T],
        baseline: Option<f64>,
        mut observer: F,
    ) -> Option<Crossing>
    where
        T: Borrow<IntradayTick>,
        F: FnMut(&IntradayTick, u64),
    {
        let baseline = baseline?;
        let mut crossing = None;

        self.scan(ticks, |index, tick, volume| {
            observer(tick, volume);
            if volume as f64 > baseline {
                crossing = Some(Crossing {
                    index,
                    timestamp: tick.timestamp,
                    rolling_volume: volume,
                });
                true
            } else {
                false
            }
        });

        crossing
    }

    /// Walk the series, handing each tick's rolling volume to `visit` until it
    /// returns `true`.
    fn scan<T, F>(&self, ticks: &[T], mut visit: F)
    where
        T: Borrow<IntradayTick>,
        F: FnMut(usize, &IntradayTick, u64) -> bool,
    {
        if ticks.is_empty() {
            return;
        }

        let prefix = Self::prefix_sums(ticks);
        let mut start = 0usize;

        for (i, tick) in ticks.iter().enumerate() {
            let tick = tick.borrow();
            // Timestamps are non-decreasing, so the left edge never moves back.
            // Tick i itself is always inside its own window, so start <= i.
            while !self.in_window(ticks[start].borrow().timestamp, tick.timestamp) {
                start += 1;
            }
            let volume = prefix[i + 1] - prefix[start];
            if visit(i, tick, volume) {
                return;
            }
        }
    }
}

impl Default for CrossoverDetector {
    fn default() -> Self {
        Self::from_valid(&WindowConfig::default())
    }
}

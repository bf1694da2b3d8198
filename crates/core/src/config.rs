//! Configuration structures for the volume-crossover system.

use crate::error::{Error, Result};
use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for a crossover run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input column names.
    pub columns: ColumnConfig,
    /// Trading session window.
    pub session: SessionConfig,
    /// Rolling window configuration.
    pub window: WindowConfig,
    /// Baseline configuration.
    pub baseline: BaselineConfig,
    /// Engine execution configuration.
    pub engine: EngineConfig,
}

impl Config {
    /// Parse a configuration from JSON. Missing sections fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.columns.validate()?;
        self.session.validate()?;
        self.window.validate()?;
        self.baseline.validate()?;
        Ok(())
    }
}

/// Column names used to pull fields out of raw rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Instrument identifier column.
    pub instrument: String,
    /// Date column (both daily and intraday files).
    pub date: String,
    /// Time column (intraday files only).
    pub time: String,
    /// Daily volume column.
    pub volume: String,
    /// Intraday traded quantity column.
    pub quantity: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            instrument: "Stock Name".to_string(),
            date: "Date".to_string(),
            time: "Time".to_string(),
            volume: "Volume".to_string(),
            quantity: "Last Traded Quantity".to_string(),
        }
    }
}

impl ColumnConfig {
    fn validate(&self) -> Result<()> {
        let names = [
            ("instrument", &self.instrument),
            ("date", &self.date),
            ("time", &self.time),
            ("volume", &self.volume),
            ("quantity", &self.quantity),
        ];
        for (field, name) in names {
            if name.trim().is_empty() {
                return Err(Error::config(format!("column name for {field} is empty")));
            }
        }
        Ok(())
    }
}

/// Trading session time-of-day window. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session open.
    pub start: NaiveTime,
    /// Session close.
    pub end: NaiveTime,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl SessionConfig {
    fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::config(format!(
                "session start {} is after session end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

/// How the left edge of the rolling window treats a tick exactly one window
/// length before the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowBound {
    /// `[t - window, t]`: the edge tick is counted.
    #[default]
    Inclusive,
    /// `(t - window, t]`: the edge tick is dropped.
    Exclusive,
}

/// Rolling window configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window length in minutes.
    pub minutes: u32,
    /// Left edge semantics.
    pub lower_bound: WindowBound,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            minutes: 60,
            lower_bound: WindowBound::Inclusive,
        }
    }
}

impl WindowConfig {
    /// Window length as a duration.
    pub fn length(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.minutes))
    }

    /// Reject a zero-length window.
    pub fn validate(&self) -> Result<()> {
        if self.minutes == 0 {
            return Err(Error::config("window length must be at least one minute"));
        }
        Ok(())
    }
}

/// Baseline configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Keep only the most recent N daily records per instrument.
    /// `None` averages over all supplied history.
    pub lookback_days: Option<usize>,
}

impl BaselineConfig {
    fn validate(&self) -> Result<()> {
        if self.lookback_days == Some(0) {
            return Err(Error::config("lookback_days must be positive when set"));
        }
        Ok(())
    }
}

/// Engine execution configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of parallel workers (0 = rayon global pool, 1 = sequential).
    pub workers: usize,
    /// Emit a diagnostic for every evaluated window.
    pub trace_scan: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.minutes, 60);
        assert_eq!(config.window.lower_bound, WindowBound::Inclusive);
        assert_eq!(config.session.start, NaiveTime::from_hms_opt(9, 15, 0).unwrap());
        assert_eq!(config.session.end, NaiveTime::from_hms_opt(15, 30, 0).unwrap());
        assert_eq!(config.columns.quantity, "Last Traded Quantity");
        assert!(config.baseline.lookback_days.is_none());
        assert_eq!(config.engine.workers, 0);
        assert!(!config.engine.trace_scan);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json_str(
            r#"{"session": {"start": "10:00:00"}, "window": {"lower_bound": "exclusive"}}"#,
        )
        .unwrap();
        assert_eq!(config.session.start, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(config.session.end, NaiveTime::from_hms_opt(15, 30, 0).unwrap());
        assert_eq!(config.window.lower_bound, WindowBound::Exclusive);
        assert_eq!(config.window.minutes, 60);
    }

    #[test]
    fn test_rejects_inverted_session() {
        let err = Config::from_json_str(r#"{"session": {"start": "16:00:00", "end": "09:00:00"}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_zero_window_and_lookback() {
        assert!(Config::from_json_str(r#"{"window": {"minutes": 0}}"#).is_err());
        assert!(Config::from_json_str(r#"{"baseline": {"lookback_days": 0}}"#).is_err());
        assert!(Config::from_json_str(r#"{"columns": {"volume": " "}}"#).is_err());
    }

    #[test]
    fn test_window_length() {
        let window = WindowConfig { minutes: 90, ..Default::default() };
        assert_eq!(window.length(), TimeDelta::minutes(90));
    }
}

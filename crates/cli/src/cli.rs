//! CLI argument definitions.
//!
//! # Examples
//!
//! ```bash
//! volume-crossover \
//!     --daily data/SampleDayData.csv \
//!     --intraday "19th April 2024=data/19thAprilSampleData.csv" \
//!     --intraday "22nd April 2024=data/22ndAprilSampleData.csv" \
//!     --output output/results.json
//! ```

use chrono::NaiveTime;
use clap::Parser;
use std::path::PathBuf;

/// Find the first time each instrument's rolling volume exceeds its average daily volume.
#[derive(Debug, Parser)]
#[command(name = "volume-crossover", author, version, about)]
pub struct Cli {
    /// Daily volume history CSV.
    #[arg(long)]
    pub daily: PathBuf,

    /// Intraday session as LABEL=PATH. Repeat for several sessions; order is kept.
    #[arg(long = "intraday", value_parser = parse_session, required = true)]
    pub sessions: Vec<SessionArg>,

    /// Output JSON report path.
    #[arg(long, short)]
    pub output: PathBuf,

    /// JSON configuration file. Flags below override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Session open (HH:MM:SS, UTC).
    #[arg(long, value_parser = parse_time)]
    pub session_start: Option<NaiveTime>,

    /// Session close (HH:MM:SS, UTC).
    #[arg(long, value_parser = parse_time)]
    pub session_end: Option<NaiveTime>,

    /// Rolling window length in minutes.
    #[arg(long)]
    pub window_minutes: Option<u32>,

    /// Drop ticks exactly one window length back instead of counting them.
    #[arg(long, default_value_t = false)]
    pub exclusive_edge: bool,

    /// Average only the most recent N daily records per instrument.
    #[arg(long)]
    pub lookback_days: Option<usize>,

    /// Worker threads (0 = all cores, 1 = sequential).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Default log level when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Write compact JSON instead of pretty-printed.
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

/// A labelled intraday input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionArg {
    pub label: String,
    pub path: PathBuf,
}

fn parse_session(raw: &str) -> Result<SessionArg, String> {
    let (label, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=PATH, got {raw:?}"))?;
    let label = label.trim();
    if label.is_empty() || path.trim().is_empty() {
        return Err(format!("expected LABEL=PATH, got {raw:?}"));
    }
    Ok(SessionArg {
        label: label.to_string(),
        path: PathBuf::from(path.trim()),
    })
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|e| format!("invalid time {raw:?}: {e}"))
}

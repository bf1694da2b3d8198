mod cli;

use anyhow::Context;
use clap::Parser;
use crossover_core::{Config, TracingSink, WindowBound};
use crossover_ingestion::CsvRowSource;
use crossover_report::{write_report, Pipeline};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the optional config file with command-line overrides.
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(start) = cli.session_start {
        config.session.start = start;
    }
    if let Some(end) = cli.session_end {
        config.session.end = end;
    }
    if let Some(minutes) = cli.window_minutes {
        config.window.minutes = minutes;
    }
    if cli.exclusive_edge {
        config.window.lower_bound = WindowBound::Exclusive;
    }
    if cli.lookback_days.is_some() {
        config.baseline.lookback_days = cli.lookback_days;
    }
    if let Some(workers) = cli.workers {
        config.engine.workers = workers;
    }

    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let started = Instant::now();
    let config = build_config(cli)?;
    let sink = Arc::new(TracingSink::new(config.engine.trace_scan));
    let pipeline = Pipeline::new(config, sink)?;

    let daily = CsvRowSource::from_path(&cli.daily)?;
    let sessions = cli
        .sessions
        .iter()
        .map(|s| Ok((s.label.clone(), CsvRowSource::from_path(&s.path)?)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let output = pipeline.run(daily, sessions).context("crossover run failed")?;

    let save_started = Instant::now();
    write_report(&output.report, &cli.output, !cli.compact)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    tracing::info!(
        path = %cli.output.display(),
        elapsed_ms = save_started.elapsed().as_millis() as u64,
        "saved results"
    );

    tracing::info!(
        sessions = output.summary.sessions.len(),
        crossings = output.summary.total_crossings(),
        rejected_rows = output.summary.total_rejected(),
        total_ms = started.elapsed().as_millis() as u64,
        "run complete"
    );
    println!("Results saved to {}", cli.output.display());
    Ok(())
}

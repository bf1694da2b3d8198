//! Report persistence.

use crate::report::SessionReport;
use crossover_core::{Error, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write the report as JSON.
///
/// The file is written to a temporary sibling and renamed over `path`, so a
/// reader never observes a partially written report.
pub fn write_report(report: &SessionReport, path: impl AsRef<Path>, pretty: bool) -> Result<()> {
    let path = path.as_ref();
    let json = report.to_json(pretty)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!(
        path = %path.display(),
        sessions = report.len(),
        bytes = json.len() + 1,
        "report written"
    );
    Ok(())
}

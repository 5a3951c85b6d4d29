//! Final report persistence

use delver_core::DelverResult;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the final report to its well-known output location.
///
/// A write failure is an inconvenience, not a run failure: the caller still
/// holds the report in memory and is expected to log and continue.
pub struct ReportSink {
    path: PathBuf,
}

impl ReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the report as UTF-8 text
    pub fn write(&self, content: &str) -> DelverResult<()> {
        std::fs::write(&self.path, content)?;
        info!(path = %self.path.display(), "Final report saved");
        Ok(())
    }
}

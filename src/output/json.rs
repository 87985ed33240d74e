//! JSON file output handler

use crate::output::traits::{CrawlSummary, OutputHandler, OutputResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the crawl summary as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct JsonOutputHandler {
    path: PathBuf,
}

impl JsonOutputHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputHandler for JsonOutputHandler {
    /// Writes the summary, creating missing parent directories
    fn write_summary(&self, summary: &CrawlSummary) -> OutputResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(summary)?;
        fs::write(&self.path, json)?;

        tracing::info!(
            "Wrote {} records to {}",
            summary.count,
            self.path.display()
        );
        Ok(())
    }
}

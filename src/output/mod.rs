//! Output module for persisting and reporting crawl results
//!
//! This module handles:
//! - Building the summary document of a finished crawl
//! - Writing it as JSON for downstream consumers
//! - Printing per-type and per-region statistics

mod json;
pub mod stats;
mod traits;

pub use json::JsonOutputHandler;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{CrawlSummary, OutputError, OutputHandler, OutputResult};

use crate::crawler::CrawlReport;
use std::path::Path;

/// Writes a finished crawl to `path` as a JSON summary
///
/// # Arguments
///
/// * `report` - The finished crawl
/// * `config_hash` - Hash of the configuration file, if known
/// * `path` - Destination file; parent directories are created
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The summary that was written
/// * `Err(OutputError)` - Failed to serialize or write
pub fn write_json_summary(
    report: &CrawlReport,
    config_hash: Option<String>,
    path: &Path,
) -> OutputResult<CrawlSummary> {
    let summary = CrawlSummary::from_report(report, config_hash);
    JsonOutputHandler::new(path).write_summary(&summary)?;
    Ok(summary)
}

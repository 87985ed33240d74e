//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and the
//! summary document they persist.

use crate::crawler::{CrawlReport, StopReason};
use crate::item::ItemRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// The document written at the end of a crawl
///
/// Consumed as a batch by downstream feed generators, which read the
/// `products` array.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub scraped_at: DateTime<Utc>,
    pub count: usize,
    pub pages_visited: u32,
    pub items_skipped: u32,
    pub links_discovered: usize,
    pub stop_reason: StopReason,
    /// SHA-256 of the configuration file the crawl ran with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,
    pub products: Vec<ItemRecord>,
}

impl CrawlSummary {
    /// Builds a summary stamped with the current time
    pub fn from_report(report: &CrawlReport, config_hash: Option<String>) -> Self {
        Self::at(report, config_hash, Utc::now())
    }

    pub fn at(
        report: &CrawlReport,
        config_hash: Option<String>,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        Self {
            scraped_at,
            count: report.records.len(),
            pages_visited: report.pages_visited,
            items_skipped: report.items_skipped,
            links_discovered: report.links_discovered,
            stop_reason: report.stop_reason.clone(),
            config_hash,
            products: report.records.clone(),
        }
    }

    /// Share of extraction attempts that produced a record, in percent
    pub fn success_rate(&self) -> f64 {
        let attempted = self.count + self.items_skipped as usize;
        if attempted == 0 {
            return 0.0;
        }
        (self.count as f64 / attempted as f64) * 100.0
    }
}

/// Trait for crawl output handlers
pub trait OutputHandler {
    /// Persists a finished crawl's summary
    fn write_summary(&self, summary: &CrawlSummary) -> OutputResult<()>;
}

use crate::item::ItemRecord;
use serde::Serialize;
use std::fmt;

/// Why a crawl ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum StopReason {
    /// The configured number of records was produced
    MaxItems,
    /// A discovery round produced no previously unseen links
    Stalled,
    /// An external stop signal was received
    Cancelled,
    /// A later listing page could not be fetched or interpreted
    PageFetchFailed(String),
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxItems => "max_items",
            Self::Stalled => "stalled",
            Self::Cancelled => "cancelled",
            Self::PageFetchFailed(_) => "page_fetch_failed",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageFetchFailed(detail) => write!(f, "page fetch failed: {}", detail),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Result of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Extracted records in discovery order
    pub records: Vec<ItemRecord>,
    pub pages_visited: u32,
    pub items_skipped: u32,
    pub links_discovered: usize,
    pub stop_reason: StopReason,
}

impl CrawlReport {
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// True when the crawl ended before exhausting the listing for a reason
    /// other than reaching its cap
    pub fn is_partial(&self) -> bool {
        matches!(
            self.stop_reason,
            StopReason::Cancelled | StopReason::PageFetchFailed(_)
        )
    }
}

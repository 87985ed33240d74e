//! Phase definitions for the crawl state machine

use std::fmt;

/// The coordinator's current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// Requesting listing pages and collecting new item links
    Discovering,

    /// Fetching detail pages for pending item links
    Extracting,

    // ===== Terminal Phases =====
    /// Crawl ended normally (cap, stall, cancellation, or page failure)
    Done,

    /// Bootstrap failed; no output
    Failed,
}

impl CrawlPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the transition `self -> next` is part of the state machine
    ///
    /// Failed is only reachable from the first discovery round; once a page
    /// has been processed every stop ends in Done.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (Self::Discovering, Self::Extracting)
            | (Self::Discovering, Self::Discovering)
            | (Self::Discovering, Self::Done)
            | (Self::Discovering, Self::Failed)
            | (Self::Extracting, Self::Discovering)
            | (Self::Extracting, Self::Done) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovering => "discovering",
            Self::Extracting => "extracting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! State module for tracking crawl progress
//!
//! All mutable crawl state lives in an explicit [`CrawlState`] owned by the
//! coordinator, so every crawl starts from fresh state.
//!
//! # Components
//!
//! - `SessionState`: Holds the live continuation token of the listing session
//! - `LinkDeduplicator`: Remembers every item identifier seen during the crawl
//! - `CrawlPhase`: The coordinator's state machine
//! - `CrawlState`: Aggregate of the above plus pending links and results

mod crawl_state;
mod dedup;
mod phase;
mod session;

// Re-export main types
pub use crawl_state::CrawlState;
pub use dedup::LinkDeduplicator;
pub use phase::CrawlPhase;
pub use session::{ContinuationToken, SessionState};

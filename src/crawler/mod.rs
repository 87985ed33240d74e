//! Crawler module for listing pagination and item extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP transport with bounded retry logic
//! - Listing pagination over a rotating continuation token
//! - Link scanning and item page parsing
//! - Request pacing
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod pager;
mod parser;
mod report;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator};
pub use extractor::ItemExtractor;
pub use fetcher::{
    build_http_client, is_retryable_status, FetchError, FetchResponse, RetryPolicy, Transport,
};
pub use pager::{page_form, partial_update_headers, DiscoveredPage, PageDiscoverer};
pub use parser::{
    extract_initial_token, extract_item_links, extract_rotated_token, find_price,
    is_partial_response, parse_item_page, parse_price, TOKEN_FIELD,
};
pub use report::{CrawlReport, StopReason};
pub use scheduler::Pacer;

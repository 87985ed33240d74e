//! Catalog-Crawler: a polite crawler for stateful, paginated catalog listings
//!
//! This crate enumerates every item exposed by a server-side listing widget that
//! paginates through a rotating continuation token, deduplicates item links across
//! pages, and extracts a structured record from each item's detail page.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod item;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

pub use crawler::FetchError;

/// Main error type for Catalog-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The first listing page could not be fetched or carried no continuation token
    #[error("Bootstrap failed for {url}: {reason}")]
    Bootstrap { url: String, reason: String },

    /// A pagination round failed after retries
    #[error("Page fetch failed at offset {offset}: {source}")]
    PageFetch {
        offset: u32,
        #[source]
        source: FetchError,
    },

    /// A single item's detail page failed after retries
    #[error("Item fetch failed for {url}: {source}")]
    ItemFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Could not interpret response from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid item pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Invalid item URL pattern: {0}")]
    Pattern(String),
}

/// Result type alias for Catalog-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, CrawlReport, StopReason};
pub use item::{ItemId, ItemLink, ItemRecord, ItemType};
pub use state::{CrawlPhase, CrawlState};

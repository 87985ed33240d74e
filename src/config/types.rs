use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure for Catalog-Crawler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Ordered override of the region keyword table; empty means built-in table
    #[serde(default)]
    pub region: Vec<RegionEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of item records to produce
    #[serde(rename = "max-items", default = "default_max_items")]
    pub max_items: u32,

    /// Rows per listing page; must match the server's page contract
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Additional attempts after the first failure
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Minimum interval between item detail requests (milliseconds)
    #[serde(
        rename = "inter-request-delay-ms",
        default = "default_inter_request_delay_ms"
    )]
    pub inter_request_delay_ms: u64,

    /// Pause before each pagination request (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Item detail fetches allowed in flight at once
    #[serde(
        rename = "max-concurrent-items",
        default = "default_max_concurrent_items"
    )]
    pub max_concurrent_items: u32,

    /// Prices at or below this value are treated as unrelated numbers
    #[serde(rename = "price-floor", default = "default_price_floor")]
    pub price_floor: f64,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_delay_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            page_size: default_page_size(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            inter_request_delay_ms: default_inter_request_delay_ms(),
            page_delay_ms: default_page_delay_ms(),
            max_concurrent_items: default_max_concurrent_items(),
            price_floor: default_price_floor(),
        }
    }
}

/// Origin site and listing widget configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host of the origin, e.g. "https://www.estropical.com"
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Path of the listing page, used for the initial GET and every partial update
    #[serde(rename = "listing-path", default = "default_listing_path")]
    pub listing_path: String,

    /// Site-relative item URL pattern; capture group 1 is the item identifier
    #[serde(rename = "item-pattern", default = "default_item_pattern")]
    pub item_pattern: String,

    /// HTML id of the form enclosing the listing widget
    #[serde(rename = "form-id", default = "default_form_id")]
    pub form_id: String,

    /// Client id of the paginated data view component
    #[serde(rename = "component-id", default = "default_component_id")]
    pub component_id: String,

    /// Extra form fields sent with every page request (search and filter inputs)
    #[serde(default = "default_filters")]
    pub filters: BTreeMap<String, String>,
}

impl SiteConfig {
    /// Absolute URL of the listing page
    pub fn listing_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.listing_path
        )
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listing_path: default_listing_path(),
            item_pattern: default_item_pattern(),
            form_id: default_form_id(),
            component_id: default_component_id(),
            filters: default_filters(),
        }
    }
}

/// Request identification headers
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub value: String,

    /// Accept-Language header sent with every request
    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON file receiving the crawled records
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

/// One row of the region keyword table
#[derive(Debug, Clone, Deserialize)]
pub struct RegionEntry {
    /// Lowercase keyword searched for in the item slug and title
    pub keyword: String,

    /// Region assigned when the keyword matches
    pub region: String,
}

fn default_max_items() -> u32 {
    500
}

fn default_page_size() -> u32 {
    12
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_inter_request_delay_ms() -> u64 {
    1_000
}

fn default_page_delay_ms() -> u64 {
    500
}

fn default_max_concurrent_items() -> u32 {
    1
}

fn default_price_floor() -> f64 {
    50.0
}

fn default_base_url() -> String {
    "https://www.estropical.com".to_string()
}

fn default_listing_path() -> String {
    "/en/moreideas".to_string()
}

fn default_item_pattern() -> String {
    r#"/(?:en|es)/idea/(\d+)/[^"'\s]*"#.to_string()
}

fn default_form_id() -> String {
    "form".to_string()
}

fn default_component_id() -> String {
    "form:ideasDataView".to_string()
}

fn default_filters() -> BTreeMap<String, String> {
    [
        "form:selectSecondaryCategory",
        "form:inputTextSearchIdea",
        "form:addDestination_input",
        "form:addDestination_hinput",
    ]
    .into_iter()
    .map(|field| (field.to_string(), String::new()))
    .collect()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_output_path() -> String {
    ".tmp/products_raw.json".to_string()
}

use crate::config::types::{Config, CrawlerConfig, OutputConfig, RegionEntry, SiteConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    validate_regions(&config.region)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_items < 1 {
        return Err(ConfigError::Validation(
            "max_items must be >= 1".to_string(),
        ));
    }

    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            config.page_size
        )));
    }

    if config.request_timeout_ms < 1_000 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 1000ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.max_concurrent_items < 1 || config.max_concurrent_items > 16 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_items must be between 1 and 16, got {}",
            config.max_concurrent_items
        )));
    }

    if !config.price_floor.is_finite() || config.price_floor < 0.0 {
        return Err(ConfigError::Validation(format!(
            "price_floor must be a non-negative number, got {}",
            config.price_floor
        )));
    }

    Ok(())
}

/// Validates the origin site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "https" && base.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if !config.listing_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "listing_path must start with '/', got '{}'",
            config.listing_path
        )));
    }

    validate_item_pattern(&config.item_pattern)?;

    if config.form_id.is_empty() || config.component_id.is_empty() {
        return Err(ConfigError::Validation(
            "form_id and component_id cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that the item pattern compiles and captures an identifier
fn validate_item_pattern(pattern: &str) -> Result<(), ConfigError> {
    if !pattern.starts_with('/') {
        return Err(ConfigError::InvalidPattern(format!(
            "'{}' must match a site-relative path starting with '/'",
            pattern
        )));
    }

    let regex =
        Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;

    if regex.captures_len() < 2 {
        return Err(ConfigError::InvalidPattern(format!(
            "'{}' needs a capture group for the item identifier",
            pattern
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates region keyword table entries
fn validate_regions(entries: &[RegionEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        if entry.keyword.trim().is_empty() || entry.region.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "region entries need a keyword and a region, got '{}' -> '{}'",
                entry.keyword, entry.region
            )));
        }
    }
    Ok(())
}

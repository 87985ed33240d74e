//! URL handling module for Catalog-Crawler
//!
//! This module recognizes canonical item detail URLs, extracts the item
//! identifier embedded in them, and resolves site-relative links against the
//! origin.

use crate::config::SiteConfig;
use crate::item::{ItemId, ItemLink};
use crate::{UrlError, UrlResult};
use regex::Regex;
use url::Url;

/// Recognizer for the canonical item detail URL shape
///
/// The pattern is matched against the site-relative path of a link and must
/// contain one capture group holding the item identifier. Links may be written
/// either relative to the site (`/en/idea/101/slug`) or absolute on the
/// configured origin (`https://host/en/idea/101/slug`); links to any other host
/// are ignored.
#[derive(Debug, Clone)]
pub struct ItemUrlPattern {
    base: String,
    path_re: Regex,
}

impl ItemUrlPattern {
    /// Builds a pattern for the given origin and site-relative item regex
    ///
    /// # Example
    ///
    /// ```
    /// use catalog_crawler::url::ItemUrlPattern;
    ///
    /// let pattern = ItemUrlPattern::new("https://example.com", r"/idea/(\d+)/").unwrap();
    /// let link = pattern.match_href("/idea/42/sunny-beach").unwrap();
    /// assert_eq!(link.id.as_str(), "42");
    /// assert_eq!(link.url, "https://example.com/idea/42/sunny-beach");
    /// ```
    pub fn new(base_url: &str, pattern: &str) -> UrlResult<Self> {
        let parsed = Url::parse(base_url)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(UrlError::InvalidScheme(parsed.scheme().to_string()));
        }

        let path_re = Regex::new(&format!("^(?:{})", pattern))
            .map_err(|e| UrlError::Pattern(e.to_string()))?;
        if path_re.captures_len() < 2 {
            return Err(UrlError::Pattern(format!(
                "'{}' has no identifier capture group",
                pattern
            )));
        }

        Ok(Self {
            base: base_url.trim_end_matches('/').to_string(),
            path_re,
        })
    }

    /// Builds the pattern described by a site configuration
    pub fn from_site(site: &SiteConfig) -> UrlResult<Self> {
        Self::new(&site.base_url, &site.item_pattern)
    }

    /// The origin that relative links are resolved against
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Matches an href against the item URL shape
    ///
    /// Returns the identifier and absolute URL, or None when the href is not
    /// an item link on this origin.
    pub fn match_href(&self, href: &str) -> Option<ItemLink> {
        let href = href.trim();

        let (path, absolute) = if let Some(rest) = href.strip_prefix(self.base.as_str()) {
            if !rest.starts_with('/') {
                return None;
            }
            (rest, href.to_string())
        } else if href.starts_with('/') && !href.starts_with("//") {
            (href, format!("{}{}", self.base, href))
        } else {
            return None;
        };

        let id = self.path_re.captures(path)?.get(1)?.as_str();
        if id.is_empty() {
            return None;
        }

        Some(ItemLink::new(ItemId::new(id), absolute))
    }

    /// Extracts the item identifier from a URL, if it has the item shape
    pub fn id_of(&self, url: &str) -> Option<ItemId> {
        self.match_href(url).map(|link| link.id)
    }
}

/// Returns the last non-empty path segment of a URL
///
/// # Example
///
/// ```
/// use catalog_crawler::url::slug_of;
///
/// assert_eq!(slug_of("https://example.com/idea/7/cancun-week/"), "cancun-week");
/// ```
pub fn slug_of(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

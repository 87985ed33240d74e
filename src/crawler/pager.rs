//! Listing pagination
//!
//! The listing widget renders its first page as a full HTML document. Every
//! later page is requested as a form-encoded partial update of the widget,
//! which must carry the continuation token the server handed out last.

use crate::config::SiteConfig;
use crate::crawler::fetcher::{FetchResponse, Transport};
use crate::crawler::parser::{
    extract_initial_token, extract_item_links, extract_rotated_token, is_partial_response,
    TOKEN_FIELD,
};
use crate::item::ItemLink;
use crate::state::ContinuationToken;
use crate::url::ItemUrlPattern;
use crate::CrawlError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ORIGIN, REFERER};

/// One page of listing results
#[derive(Debug, Clone)]
pub struct DiscoveredPage {
    pub offset: u32,
    /// Item links in page order, unique by identifier within the page
    pub links: Vec<ItemLink>,
    /// Token issued with this response, if any
    pub token: Option<ContinuationToken>,
}

/// Fetches listing pages and extracts their item links
#[derive(Debug, Clone)]
pub struct PageDiscoverer {
    transport: Transport,
    site: SiteConfig,
    pattern: ItemUrlPattern,
    page_size: u32,
}

impl PageDiscoverer {
    pub fn new(
        transport: Transport,
        site: SiteConfig,
        pattern: ItemUrlPattern,
        page_size: u32,
    ) -> Self {
        Self {
            transport,
            site,
            pattern,
            page_size,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetches the page starting at row `offset`
    ///
    /// Offset 0 is a plain GET of the listing. Any other offset is a partial
    /// update request and requires `token`.
    ///
    /// # Errors
    ///
    /// * `CrawlError::PageFetch` - the request failed after retries
    /// * `CrawlError::Parse` - a partial update came back without its envelope,
    ///   or no token was available to request it
    pub async fn discover_page(
        &self,
        offset: u32,
        token: Option<&ContinuationToken>,
    ) -> Result<DiscoveredPage, CrawlError> {
        let listing_url = self.site.listing_url();

        if offset == 0 {
            tracing::debug!("GET listing page {}", listing_url);
            let response = self.fetch_initial(&listing_url).await?;
            return Ok(DiscoveredPage {
                offset,
                links: extract_item_links(&response.body, &self.pattern),
                token: extract_initial_token(&response.body),
            });
        }

        let token = token.ok_or_else(|| CrawlError::Parse {
            url: listing_url.clone(),
            message: format!("no continuation token for offset {}", offset),
        })?;

        let form = page_form(&self.site, offset, self.page_size, token);
        let headers = partial_update_headers(&self.site);

        tracing::debug!(offset, token = ?token, "POST listing page {}", listing_url);
        let response = self
            .transport
            .post_form(&listing_url, &form, &headers)
            .await
            .map_err(|source| CrawlError::PageFetch { offset, source })?;

        if !is_partial_response(&response.body) {
            return Err(CrawlError::Parse {
                url: listing_url,
                message: format!(
                    "offset {} response is not a partial update ({} bytes)",
                    offset,
                    response.body.len()
                ),
            });
        }

        Ok(DiscoveredPage {
            offset,
            links: extract_item_links(&response.body, &self.pattern),
            token: extract_rotated_token(&response.body),
        })
    }

    async fn fetch_initial(&self, url: &str) -> Result<FetchResponse, CrawlError> {
        self.transport
            .get(url)
            .await
            .map_err(|source| CrawlError::PageFetch { offset: 0, source })
    }
}

/// Form fields of a partial update request for one page
///
/// Configured filter fields come first, followed by the widget's fixed
/// pagination fields and the continuation token.
pub fn page_form(
    site: &SiteConfig,
    offset: u32,
    page_size: u32,
    token: &ContinuationToken,
) -> Vec<(String, String)> {
    let form = site.form_id.as_str();
    let component = site.component_id.as_str();

    let mut fields: Vec<(String, String)> = site
        .filters
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let fixed = [
        (format!("{}_SUBMIT", form), "1".to_string()),
        ("javax.faces.partial.ajax".to_string(), "true".to_string()),
        ("javax.faces.source".to_string(), component.to_string()),
        ("javax.faces.partial.execute".to_string(), "@all".to_string()),
        ("javax.faces.partial.render".to_string(), component.to_string()),
        ("javax.faces.behavior.event".to_string(), "page".to_string()),
        ("javax.faces.partial.event".to_string(), "page".to_string()),
        (format!("{}_pagination", component), "true".to_string()),
        (format!("{}_first", component), offset.to_string()),
        (format!("{}_rows", component), page_size.to_string()),
        (form.to_string(), form.to_string()),
        (TOKEN_FIELD.to_string(), token.as_str().to_string()),
    ];
    fields.extend(fixed);

    fields
}

/// Headers that mark a request as an in-page partial update
pub fn partial_update_headers(site: &SiteConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    headers.insert(
        HeaderName::from_static("faces-request"),
        HeaderValue::from_static("partial/ajax"),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/xml, text/xml, */*; q=0.01"),
    );
    if let Ok(value) = HeaderValue::from_str(&site.listing_url()) {
        headers.insert(REFERER, value);
    }
    if let Ok(value) = HeaderValue::from_str(site.base_url.trim_end_matches('/')) {
        headers.insert(ORIGIN, value);
    }
    headers
}

//! Listing and item page parsing
//!
//! This module handles parsing response bodies to extract:
//! - Item links from full listing pages and partial-update responses
//! - The continuation token, from the initial page form or a partial update
//! - Item fields (title, description, image, price) from detail pages
//!
//! Partial-update responses wrap their HTML in XML CDATA sections that an
//! HTML parser does not see into, so link and token scanning works on the raw
//! body text. Item pages are parsed as HTML documents.

use crate::classify::Classifier;
use crate::item::{ItemLink, ItemRecord};
use crate::state::ContinuationToken;
use crate::url::ItemUrlPattern;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Name of the hidden form field carrying the continuation token
pub const TOKEN_FIELD: &str = "javax.faces.ViewState";

/// Longest title kept on a record, in characters
pub const MAX_TITLE_CHARS: usize = 150;

/// Longest description kept on a record, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).expect("valid regex"));

static ROTATED_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"id="[^"]*javax\.faces\.ViewState[^"]*"><!\[CDATA\[([^\]]+)\]\]>"#)
        .expect("valid regex")
});

static PRICE_LEAD_IN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[Dd]esde\s*US\$|[Dd]esde\s*\$|[Ff]rom\s*US\$").expect("valid regex")
});

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\$US]+\s*([0-9][0-9,\.]+)").expect("valid regex"));

/// Scans a listing body for item links
///
/// Links are returned in document order, de-duplicated by item identifier
/// within this body. Relative links are resolved against the pattern's origin.
///
/// # Example
///
/// ```
/// use catalog_crawler::crawler::extract_item_links;
/// use catalog_crawler::url::ItemUrlPattern;
///
/// let pattern = ItemUrlPattern::new("https://example.com", r"/idea/(\d+)/[^\s]*").unwrap();
/// let body = r#"<a href="/idea/1/a">A</a><a href="/idea/1/a">again</a><a href="/idea/2/b">B</a>"#;
/// let ids: Vec<_> = extract_item_links(body, &pattern)
///     .into_iter()
///     .map(|link| link.id.to_string())
///     .collect();
/// assert_eq!(ids, vec!["1", "2"]);
/// ```
pub fn extract_item_links(body: &str, pattern: &ItemUrlPattern) -> Vec<ItemLink> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for captures in HREF_RE.captures_iter(body) {
        let Some(href) = captures.get(1) else {
            continue;
        };
        if let Some(link) = pattern.match_href(href.as_str()) {
            if seen.insert(link.id.clone()) {
                links.push(link);
            }
        }
    }

    links
}

/// Reads the continuation token from the hidden input of a full listing page
pub fn extract_initial_token(html: &str) -> Option<ContinuationToken> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!(r#"input[name="{}"]"#, TOKEN_FIELD)).ok()?;

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("value"))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(ContinuationToken::new)
}

/// Reads a rotated continuation token from a partial-update response
pub fn extract_rotated_token(body: &str) -> Option<ContinuationToken> {
    ROTATED_TOKEN_RE
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim())
        .filter(|value| !value.is_empty())
        .map(ContinuationToken::new)
}

/// Whether a body carries the partial-update response envelope
pub fn is_partial_response(body: &str) -> bool {
    body.contains("<partial-response")
}

/// Parses a currency-prefixed number such as `US$ 1,299.00`
///
/// Thousands separators are stripped. Returns None when no number follows a
/// currency marker.
pub fn parse_price(text: &str) -> Option<f64> {
    let captures = PRICE_RE.captures(text)?;
    captures.get(1)?.as_str().replace(',', "").parse().ok()
}

/// Finds the advertised price on an item page
///
/// Only text nodes with a price lead-in ("Desde US$", "From US$", ...) are
/// considered. The first parsed value strictly above `floor` wins; smaller
/// numbers are usually unrelated (nights, passengers).
pub fn find_price(document: &Html, floor: f64) -> Option<f64> {
    document
        .root_element()
        .descendants()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .filter(|text| PRICE_LEAD_IN_RE.is_match(text))
        .filter_map(parse_price)
        .find(|price| *price > floor)
}

/// Reads `og:{name}` metadata, falling back to a plain `name` meta tag
fn meta_content(document: &Html, name: &str) -> Option<String> {
    let selectors = [
        format!(r#"meta[property="og:{}"]"#, name),
        format!(r#"meta[name="{}"]"#, name),
    ];

    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|selector| {
            document
                .select(&selector)
                .filter_map(|element| element.value().attr("content"))
                .map(str::trim)
                .find(|content| !content.is_empty())
                .map(String::from)
        })
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Builds a record from an item detail page
///
/// Title, description and image come from Open Graph metadata. The page
/// `<title>` stands in for a missing title and the title stands in for a
/// missing description. Region and type come from the link slug and title.
pub fn parse_item_page(
    html: &str,
    link: &ItemLink,
    classifier: &Classifier,
    price_floor: f64,
) -> ItemRecord {
    let document = Html::parse_document(html);

    let title = meta_content(&document, "title")
        .or_else(|| extract_title(&document))
        .unwrap_or_default();
    let description = meta_content(&document, "description");
    let image_link = meta_content(&document, "image");
    let price = find_price(&document, price_floor);

    let slug = link.slug().to_string();
    let classification = classifier.classify(&slug, &title);

    let title = truncate_chars(&title, MAX_TITLE_CHARS);
    let description = match description {
        Some(description) => truncate_chars(&description, MAX_DESCRIPTION_CHARS),
        None => title.clone(),
    };

    ItemRecord {
        id: link.id.clone(),
        item_type: classification.item_type,
        title,
        description,
        link: link.url.clone(),
        image_link,
        price,
        region: classification.region,
        slug,
    }
}

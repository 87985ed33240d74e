use crate::classify::Classifier;
use crate::crawler::fetcher::Transport;
use crate::crawler::parser::parse_item_page;
use crate::item::{ItemLink, ItemRecord};
use crate::CrawlError;

/// Fetches item detail pages and turns them into records
#[derive(Debug, Clone)]
pub struct ItemExtractor {
    transport: Transport,
    classifier: Classifier,
    price_floor: f64,
}

impl ItemExtractor {
    pub fn new(transport: Transport, classifier: Classifier, price_floor: f64) -> Self {
        Self {
            transport,
            classifier,
            price_floor,
        }
    }

    /// Fetches and parses one item
    ///
    /// # Errors
    ///
    /// * `CrawlError::ItemFetch` - the detail page failed after retries
    pub async fn try_extract(&self, link: &ItemLink) -> Result<ItemRecord, CrawlError> {
        let response = self
            .transport
            .get(&link.url)
            .await
            .map_err(|source| CrawlError::ItemFetch {
                url: link.url.clone(),
                source,
            })?;

        if response.attempts > 1 {
            tracing::debug!("Item {} fetched after {} attempts", link.id, response.attempts);
        }

        Ok(parse_item_page(
            &response.body,
            link,
            &self.classifier,
            self.price_floor,
        ))
    }

    /// Fetches one item, logging and discarding any failure
    pub async fn extract(&self, link: &ItemLink) -> Option<ItemRecord> {
        match self.try_extract(link).await {
            Ok(record) => {
                tracing::debug!(
                    id = %record.id,
                    item_type = %record.item_type,
                    region = %record.region,
                    "Extracted {}",
                    record.title
                );
                Some(record)
            }
            Err(e) => {
                tracing::warn!("Skipping item {}: {}", link.id, e);
                None
            }
        }
    }
}

//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Bootstrapping the listing session from the first page
//! - Alternating between discovery rounds and item extraction
//! - Pacing item requests and pausing between pages
//! - Handling cancellation and the stop conditions
//! - Producing the final report

use crate::classify::Classifier;
use crate::config::Config;
use crate::crawler::extractor::ItemExtractor;
use crate::crawler::fetcher::Transport;
use crate::crawler::pager::{DiscoveredPage, PageDiscoverer};
use crate::crawler::report::{CrawlReport, StopReason};
use crate::crawler::scheduler::Pacer;
use crate::state::{CrawlPhase, CrawlState};
use crate::url::ItemUrlPattern;
use crate::CrawlError;
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Main crawler coordinator structure
#[derive(Debug)]
pub struct Coordinator {
    discoverer: PageDiscoverer,
    extractor: ItemExtractor,
    pacer: Pacer,
    listing_url: String,
    max_items: usize,
    max_concurrent_items: usize,
    page_delay: Duration,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - The HTTP client or item URL pattern could not be built
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let transport = Transport::new(&config.crawler, &config.user_agent)?;
        let pattern = ItemUrlPattern::from_site(&config.site)?;
        let classifier = Classifier::from_config(&config);

        let listing_url = config.site.listing_url();
        let discoverer = PageDiscoverer::new(
            transport.clone(),
            config.site,
            pattern,
            config.crawler.page_size,
        );
        let extractor = ItemExtractor::new(transport, classifier, config.crawler.price_floor);

        Ok(Self {
            discoverer,
            extractor,
            pacer: Pacer::new(config.crawler.inter_request_delay()),
            listing_url,
            max_items: config.crawler.max_items as usize,
            max_concurrent_items: config.crawler.max_concurrent_items.max(1) as usize,
            page_delay: config.crawler.page_delay(),
            cancel: CancellationToken::new(),
        })
    }

    /// Replaces the stop signal, e.g. with one shared with a signal handler
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that stops the crawl when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the main crawl loop
    ///
    /// The loop alternates between two phases:
    /// 1. Discovering: fetch the next listing page and queue its unseen links
    /// 2. Extracting: fetch queued items in discovery order, at the paced rate
    ///
    /// The crawl ends with partial or complete results when enough records are
    /// produced, a page yields nothing new, the stop signal fires, or a later
    /// page cannot be fetched. Only a failed first page is an error.
    pub async fn run(&self) -> Result<CrawlReport, CrawlError> {
        let mut state = CrawlState::new();
        let start_time = Instant::now();

        tracing::info!(
            max_items = self.max_items,
            concurrency = self.max_concurrent_items,
            "Starting crawl of {}",
            self.listing_url
        );

        if self.cancel.is_cancelled() {
            return state.finish(StopReason::Cancelled);
        }

        let first = match self.discoverer.discover_page(0, None).await {
            Ok(page) => page,
            Err(e) => return self.fail_bootstrap(&mut state, e.to_string()),
        };
        let Some(token) = first.token.clone() else {
            let reason = "no continuation token on listing page".to_string();
            return self.fail_bootstrap(&mut state, reason);
        };
        state.bootstrap(token);

        if let Some(reason) = self.accept_page(&mut state, first)? {
            return self.finish(state, reason, start_time);
        }

        loop {
            if let Some(reason) = self.extract_pending(&mut state, start_time).await {
                return self.finish(state, reason, start_time);
            }

            if !self.pause_between_pages().await {
                return self.finish(state, StopReason::Cancelled, start_time);
            }

            state.enter(CrawlPhase::Discovering)?;
            let offset = state.pages_visited() * self.discoverer.page_size();

            let result = self
                .discoverer
                .discover_page(offset, state.current_token())
                .await;
            let page = match result {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Ending discovery at offset {}: {}", offset, e);
                    let reason = StopReason::PageFetchFailed(e.to_string());
                    return self.finish(state, reason, start_time);
                }
            };

            if page.token.is_none() {
                tracing::warn!(
                    offset,
                    "Listing response carried no rotated token; keeping the previous one"
                );
            }
            state.observe_token(page.token.clone());

            if let Some(reason) = self.accept_page(&mut state, page)? {
                return self.finish(state, reason, start_time);
            }
        }
    }

    fn fail_bootstrap(
        &self,
        state: &mut CrawlState,
        reason: String,
    ) -> Result<CrawlReport, CrawlError> {
        tracing::error!("Bootstrap failed for {}: {}", self.listing_url, reason);
        state.enter(CrawlPhase::Failed)?;
        Err(CrawlError::Bootstrap {
            url: self.listing_url.clone(),
            reason,
        })
    }

    /// Records a fetched page and queues its links
    ///
    /// Returns a stop reason when the page contributed no unseen links.
    fn accept_page(
        &self,
        state: &mut CrawlState,
        page: DiscoveredPage,
    ) -> Result<Option<StopReason>, CrawlError> {
        state.record_page();
        let found = page.links.len();
        let accepted = state.accept_links(page.links);

        tracing::info!(
            "Page {} (offset {}): {} links, {} new, {} total",
            state.pages_visited(),
            page.offset,
            found,
            accepted,
            state.discovered().len()
        );

        if accepted == 0 {
            tracing::info!("No new items at offset {}, listing exhausted", page.offset);
            return Ok(Some(StopReason::Stalled));
        }

        state.enter(CrawlPhase::Extracting)?;
        Ok(None)
    }

    /// Extracts every pending link in discovery order
    ///
    /// At most `max_concurrent_items` fetches are in flight; results are
    /// consumed in queue order, so records keep discovery order. Returns a
    /// stop reason when the item cap is reached or the stop signal fires.
    async fn extract_pending(
        &self,
        state: &mut CrawlState,
        start_time: Instant,
    ) -> Option<StopReason> {
        let extractor = &self.extractor;
        let pacer = &self.pacer;

        let batch = state.take_pending();
        let mut results = std::pin::pin!(stream::iter(batch)
            .map(move |link| async move {
                pacer.ready().await;
                extractor.extract(&link).await
            })
            .buffered(self.max_concurrent_items));

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Some(StopReason::Cancelled),
                next = results.next() => next,
            };

            match next {
                Some(Some(record)) => state.push_record(record),
                Some(None) => state.record_skip(),
                None => return None,
            }

            let processed = state.record_count() + state.items_skipped() as usize;
            if processed % 10 == 0 {
                let elapsed = start_time.elapsed();
                let rate = processed as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
                tracing::info!(
                    "Progress: {} records, {} skipped, {} pages, {:.2} items/sec",
                    state.record_count(),
                    state.items_skipped(),
                    state.pages_visited(),
                    rate
                );
            }

            if state.record_count() >= self.max_items {
                tracing::info!("Reached {} records", self.max_items);
                return Some(StopReason::MaxItems);
            }
        }
    }

    /// Waits out the page delay; returns false if the stop signal fired
    async fn pause_between_pages(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        if self.page_delay.is_zero() {
            return true;
        }

        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.page_delay) => true,
        }
    }

    fn finish(
        &self,
        state: CrawlState,
        reason: StopReason,
        start_time: Instant,
    ) -> Result<CrawlReport, CrawlError> {
        let report = state.finish(reason)?;
        tracing::info!(
            "Crawl completed ({}): {} records, {} skipped, {} pages in {:?}",
            report.stop_reason,
            report.count(),
            report.items_skipped,
            report.pages_visited,
            start_time.elapsed()
        );
        Ok(report)
    }
}

/// Runs a complete crawl with a fresh coordinator
///
/// # Example
///
/// ```no_run
/// use catalog_crawler::config::load_config;
/// use catalog_crawler::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_crawl(config).await?;
/// println!("{} records", report.count());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, CrawlError> {
    Coordinator::new(config)?.run().await
}

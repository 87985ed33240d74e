use crate::crawler::{CrawlReport, StopReason};
use crate::item::{ItemLink, ItemRecord};
use crate::state::{ContinuationToken, CrawlPhase, LinkDeduplicator, SessionState};
use crate::CrawlError;
use std::collections::VecDeque;

/// Everything one crawl invocation accumulates
///
/// Owned by the coordinator and discarded (or handed to an output writer as a
/// [`CrawlReport`]) when the crawl ends.
#[derive(Debug)]
pub struct CrawlState {
    phase: CrawlPhase,
    session: Option<SessionState>,
    seen: LinkDeduplicator,
    /// Every accepted link, in discovery order
    discovered: Vec<ItemLink>,
    pending: VecDeque<ItemLink>,
    records: Vec<ItemRecord>,
    pages_visited: u32,
    items_skipped: u32,
}

impl CrawlState {
    pub fn new() -> Self {
        Self {
            phase: CrawlPhase::Discovering,
            session: None,
            seen: LinkDeduplicator::new(),
            discovered: Vec::new(),
            pending: VecDeque::new(),
            records: Vec::new(),
            pages_visited: 0,
            items_skipped: 0,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Moves the state machine to `next`
    pub fn enter(&mut self, next: CrawlPhase) -> Result<(), CrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Starts the listing session with the token from the first page
    pub fn bootstrap(&mut self, token: ContinuationToken) {
        self.session = Some(SessionState::new(token));
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    /// The token to forward with the next page request
    pub fn current_token(&self) -> Option<&ContinuationToken> {
        self.session.as_ref().map(SessionState::current)
    }

    /// Applies a rotated token from a page response; absent keeps the old one
    ///
    /// Only [`bootstrap`](Self::bootstrap) starts a session, so a token seen
    /// before bootstrap is ignored.
    pub fn observe_token(&mut self, token: Option<ContinuationToken>) -> bool {
        match self.session.as_mut() {
            Some(session) => session.observe(token),
            None => false,
        }
    }

    /// Passes a page's links through the deduplicator
    ///
    /// Accepted links are queued for extraction. Returns the number of links
    /// that were new to this crawl.
    pub fn accept_links(&mut self, links: impl IntoIterator<Item = ItemLink>) -> usize {
        let mut accepted = 0;
        for link in links {
            if self.seen.mark_seen(&link.id) {
                tracing::debug!("Queued item {} ({})", link.id, link.url);
                self.discovered.push(link.clone());
                self.pending.push_back(link);
                accepted += 1;
            }
        }
        accepted
    }

    /// Removes and returns all pending links in discovery order
    pub fn take_pending(&mut self) -> Vec<ItemLink> {
        self.pending.drain(..).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn record_page(&mut self) {
        self.pages_visited += 1;
    }

    pub fn pages_visited(&self) -> u32 {
        self.pages_visited
    }

    pub fn push_record(&mut self, record: ItemRecord) {
        self.records.push(record);
    }

    pub fn record_skip(&mut self) {
        self.items_skipped += 1;
    }

    pub fn records(&self) -> &[ItemRecord] {
        &self.records
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn items_skipped(&self) -> u32 {
        self.items_skipped
    }

    pub fn discovered(&self) -> &[ItemLink] {
        &self.discovered
    }

    /// Ends the crawl and hands the results over as a report
    pub fn finish(mut self, stop_reason: StopReason) -> Result<CrawlReport, CrawlError> {
        self.enter(CrawlPhase::Done)?;
        Ok(CrawlReport {
            records: self.records,
            pages_visited: self.pages_visited,
            items_skipped: self.items_skipped,
            links_discovered: self.discovered.len(),
            stop_reason,
        })
    }
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::new()
    }
}

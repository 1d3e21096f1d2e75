//! Paginated listing crawl
//!
//! Walks a category's listing pages one at a time, collecting seller cards
//! until enough distinct sellers have been seen or the paginator runs out.
//! The deduplicated result is merged into the durable store before it is
//! returned.

use crate::config::ListingConfig;
use crate::crawler::dedup::CrawlAccumulator;
use crate::crawler::document::{CardFields, CardScheme, Document};
use crate::crawler::fetcher::{fetch_html, Fetcher};
use crate::crawler::records::ListingRecord;
use crate::state::{StopReason, WalkPhase, WalkState};
use crate::storage::{merge_new, ListingStore, MergeOutcome};
use crate::url::{expand_seed_url, normalize_url};
use crate::{ConfigError, SweepError, UrlError};
use std::collections::HashSet;
use url::Url;

/// Outcome of one pagination walk
#[derive(Debug, Clone)]
pub struct ListingWalk {
    /// First listing per seller, in the order sellers were met
    pub records: Vec<ListingRecord>,
    pub stop: StopReason,
    /// Pages read, including the one that stopped the walk
    pub pages: usize,
    /// Cards seen, with or without a seller
    pub raw_cards: usize,
    pub cards_with_seller: usize,
    pub merge: MergeOutcome,
}

/// Crawler for a category's paginated listing pages
#[derive(Debug, Clone)]
pub struct ListingCrawler {
    seed_template: String,
    scheme: CardScheme,
}

impl ListingCrawler {
    pub fn new(config: &ListingConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            seed_template: config.seed_url.clone(),
            scheme: CardScheme::compile(&config.selectors)?,
        })
    }

    /// Walks the listing pages for `category`
    ///
    /// The walk stops once at least `limit` distinct sellers are collected;
    /// the page that crosses the threshold contributes all of its cards, so
    /// the result can be larger than `limit`. A page that fails to fetch
    /// ends the walk but keeps what earlier pages produced.
    ///
    /// # Returns
    ///
    /// * `Ok(ListingWalk)` - The walk finished and its sellers were merged
    /// * `Err(SweepError)` - Bad seed URL, or the store could not be merged
    pub async fn crawl<F: Fetcher + ?Sized>(
        &self,
        fetcher: &F,
        store: &mut dyn ListingStore,
        category: &str,
        limit: usize,
    ) -> Result<ListingWalk, SweepError> {
        let seed = expand_seed_url(&self.seed_template, category)?;
        tracing::info!(
            "Walking listings for category '{}' until {} unique sellers",
            category,
            limit
        );

        let mut state = WalkState::new();
        let mut accumulator: CrawlAccumulator<ListingRecord> = CrawlAccumulator::new();
        let mut visited = HashSet::new();
        let mut raw_cards = 0;
        let mut current = seed.to_string();
        visited.insert(page_key(&current));

        let stop = loop {
            tracing::info!("Scraping page: {}", current);
            let body = match fetch_html(fetcher, &current).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!("Ending walk early: {}", e);
                    state.advance(WalkPhase::Done)?;
                    break StopReason::FetchFailed {
                        url: current,
                        error: e.to_string(),
                    };
                }
            };

            state.advance(WalkPhase::Extracting)?;
            let page_url = Url::parse(&current).map_err(|e| UrlError::Parse(e.to_string()))?;
            let (cards, next) = self.read_page(&body, &page_url);
            raw_cards += cards.len();

            let mut new_sellers = 0;
            for record in cards.into_iter().filter_map(ListingRecord::from_card) {
                if accumulator.push(record) {
                    new_sellers += 1;
                }
            }
            tracing::debug!(
                "Page {} added {} new sellers ({} unique so far)",
                state.pages(),
                new_sellers,
                accumulator.unique_len()
            );

            state.advance(WalkPhase::Deciding)?;
            if accumulator.unique_len() >= limit {
                state.advance(WalkPhase::Done)?;
                break StopReason::LimitReached {
                    unique_sellers: accumulator.unique_len(),
                };
            }

            match next {
                None => {
                    state.advance(WalkPhase::Done)?;
                    break StopReason::Exhausted;
                }
                Some(next_url) if !visited.insert(page_key(&next_url)) => {
                    tracing::warn!("Next page {} was already walked", next_url);
                    state.advance(WalkPhase::Done)?;
                    break StopReason::Cycle { url: next_url };
                }
                Some(next_url) => {
                    state.advance(WalkPhase::Fetching)?;
                    current = next_url;
                }
            }
        };

        let records = accumulator.unique_records();
        tracing::info!(
            "Walk stopped after {} pages ({}): {} cards, {} with seller, {} unique sellers",
            state.pages(),
            stop,
            raw_cards,
            accumulator.len(),
            records.len()
        );

        let merge = merge_new(store, &records)?;

        Ok(ListingWalk {
            records,
            stop,
            pages: state.pages(),
            raw_cards,
            cards_with_seller: accumulator.len(),
            merge,
        })
    }

    /// Reads the cards and the next-page link of one page
    fn read_page(&self, body: &str, page_url: &Url) -> (Vec<CardFields>, Option<String>) {
        let document = Document::parse(body, page_url);
        let cards = document.cards(&self.scheme).collect();
        (cards, document.next_page(&self.scheme))
    }
}

/// Identity of a page for cycle detection
fn page_key(url: &str) -> String {
    normalize_url(url)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| url.to_string())
}

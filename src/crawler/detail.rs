//! Detail fan-out crawl
//!
//! Reads the merchant's listing page, fetches every linked detail page
//! concurrently, and keeps the products sold by third-party sellers.
//!
//! Only the listing page fetch can fail the crawl. Each detail page is
//! attempted regardless of how its siblings fare; a failed detail fetch
//! just shrinks the result.

use crate::config::DetailConfig;
use crate::crawler::document::{DetailScheme, Document};
use crate::crawler::fetcher::{fetch_html, Fetcher};
use crate::crawler::price::PriceRule;
use crate::crawler::records::ProductRecord;
use crate::url::same_page;
use crate::{ConfigError, FetchError};
use futures::stream::{self, StreamExt};
use url::Url;

/// What became of one detail link
#[derive(Debug)]
enum ItemOutcome {
    Collected(ProductRecord),
    /// Sold by the merchant itself
    Excluded,
    Failed,
}

/// Per-run counters, logged when the crawl completes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetailCrawlStats {
    pub links: usize,
    pub collected: usize,
    pub excluded: usize,
    pub failed: usize,
}

/// Crawler for one merchant listing page and its detail pages
#[derive(Debug, Clone)]
pub struct DetailCrawler {
    merchant_url: Url,
    scheme: DetailScheme,
    price_rule: PriceRule,
    max_concurrent: Option<usize>,
}

impl DetailCrawler {
    /// Creates a crawler from the detail configuration
    pub fn new(config: &DetailConfig) -> Result<Self, ConfigError> {
        let merchant_url = Url::parse(&config.merchant_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid merchant-url '{}': {}", config.merchant_url, e))
        })?;

        Ok(Self {
            merchant_url,
            scheme: DetailScheme::compile(&config.selectors)?,
            price_rule: config.price_rule,
            max_concurrent: config.max_concurrent,
        })
    }

    pub fn merchant_url(&self) -> &Url {
        &self.merchant_url
    }

    /// Runs the crawl
    ///
    /// # Returns
    ///
    /// * `Ok((products, stats))` - Third-party products in completion order
    /// * `Err(FetchError)` - The merchant listing page could not be fetched
    pub async fn crawl<F: Fetcher + ?Sized>(
        &self,
        fetcher: &F,
    ) -> Result<(Vec<ProductRecord>, DetailCrawlStats), FetchError> {
        tracing::info!("Scraping page: {}", self.merchant_url);

        let body = fetch_html(fetcher, self.merchant_url.as_str()).await?;
        let links = self.detail_links(&body);

        let mut stats = DetailCrawlStats {
            links: links.len(),
            ..DetailCrawlStats::default()
        };
        tracing::info!("Found {} detail links on {}", links.len(), self.merchant_url);

        if links.is_empty() {
            return Ok((Vec::new(), stats));
        }

        let slots = self.max_concurrent.unwrap_or(links.len()).max(1);
        let outcomes: Vec<ItemOutcome> = stream::iter(links)
            .map(|link| self.crawl_item(fetcher, link))
            .buffer_unordered(slots)
            .collect()
            .await;

        let mut products = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Collected(product) => {
                    stats.collected += 1;
                    products.push(product);
                }
                ItemOutcome::Excluded => stats.excluded += 1,
                ItemOutcome::Failed => stats.failed += 1,
            }
        }

        tracing::info!(
            "Total products found: {} ({} links, {} sold by merchant, {} failed)",
            stats.collected,
            stats.links,
            stats.excluded,
            stats.failed
        );

        Ok((products, stats))
    }

    fn detail_links(&self, body: &str) -> Vec<String> {
        Document::parse(body, &self.merchant_url).product_links(&self.scheme)
    }

    /// Fetches and reads one detail page; never fails the crawl
    async fn crawl_item<F: Fetcher + ?Sized>(&self, fetcher: &F, link: String) -> ItemOutcome {
        let body = match fetch_html(fetcher, &link).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Skipping item due to fetch failure: {}", e);
                return ItemOutcome::Failed;
            }
        };

        self.read_item(&body, link)
    }

    fn read_item(&self, body: &str, link: String) -> ItemOutcome {
        let page_url = match Url::parse(&link) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping item with unparseable link {}: {}", link, e);
                return ItemOutcome::Failed;
            }
        };

        let fields = Document::parse(body, &page_url).detail_fields(&self.scheme);

        let sold_by_merchant = fields
            .seller_link
            .as_deref()
            .is_some_and(|seller| same_page(seller, self.merchant_url.as_str()));
        if sold_by_merchant {
            tracing::debug!("Excluding merchant-sold item {}", link);
            return ItemOutcome::Excluded;
        }

        ItemOutcome::Collected(ProductRecord {
            name: fields.name,
            price: self.price_rule.normalize(&fields.price_text),
            source_link: link,
        })
    }
}

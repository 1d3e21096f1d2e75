//! Crawl coordinator - selects and runs a crawl topology
//!
//! This module wires the configured collaborators together and runs one of
//! the two crawls:
//! - Detail fan-out over the merchant listing, ending in a report
//! - Paginated category walk, ending in a merge into the durable store
//!
//! Results are returned to the caller untransformed.

use crate::config::{Config, NotifyConfig};
use crate::crawler::detail::DetailCrawler;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::listing::ListingCrawler;
use crate::crawler::records::{ListingRecord, ProductRecord};
use crate::notify::{build_notifier, Notifier};
use crate::storage::{open_store, ListingStore};
use crate::SweepError;
use serde::Serialize;

/// Which crawl to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlMode {
    /// Fan out over the merchant listing's detail pages
    Detail,

    /// Walk a category's listing pages
    Listing {
        category: String,
        /// Unique-seller threshold; the configured default when None
        limit: Option<usize>,
    },
}

impl CrawlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detail => "detail",
            Self::Listing { .. } => "listing",
        }
    }
}

/// Records produced by a crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CrawlResult {
    Products(Vec<ProductRecord>),
    Listings(Vec<ListingRecord>),
}

impl CrawlResult {
    /// The empty result of the given mode
    pub fn empty(mode: &CrawlMode) -> Self {
        match mode {
            CrawlMode::Detail => Self::Products(Vec::new()),
            CrawlMode::Listing { .. } => Self::Listings(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Products(products) => products.len(),
            Self::Listings(listings) => listings.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Main crawl coordinator
///
/// Owns the fetcher, the durable store and the optional notifier for the
/// lifetime of the process, so repeated runs (see
/// [`run_scheduled`](crate::crawler::run_scheduled)) share them.
pub struct Coordinator<F: Fetcher> {
    fetcher: F,
    store: Box<dyn ListingStore>,
    notifier: Option<Box<dyn Notifier>>,
    notify: NotifyConfig,
    default_limit: usize,
    detail: DetailCrawler,
    listing: ListingCrawler,
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a coordinator from explicit collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `fetcher` - Fetch capability shared by both crawls
    /// * `store` - Durable seller set for the listing crawl
    /// * `notifier` - Report sink for the detail crawl, if any
    pub fn new(
        config: &Config,
        fetcher: F,
        store: Box<dyn ListingStore>,
        notifier: Option<Box<dyn Notifier>>,
    ) -> Result<Self, SweepError> {
        Ok(Self {
            fetcher,
            store,
            notifier,
            notify: config.notify.clone(),
            default_limit: config.listing.default_limit,
            detail: DetailCrawler::new(&config.detail)?,
            listing: ListingCrawler::new(&config.listing)?,
        })
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn store(&self) -> &dyn ListingStore {
        self.store.as_ref()
    }

    /// Runs one crawl
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - The crawl's records
    /// * `Err(SweepError)` - A listing page or the store failed
    pub async fn run(&mut self, mode: &CrawlMode) -> Result<CrawlResult, SweepError> {
        tracing::info!("Starting {} crawl", mode.as_str());

        match mode {
            CrawlMode::Detail => {
                let (products, _stats) = self.detail.crawl(&self.fetcher).await?;
                self.report(&products).await;
                Ok(CrawlResult::Products(products))
            }
            CrawlMode::Listing { category, limit } => {
                let limit = limit.unwrap_or(self.default_limit);
                let walk = self
                    .listing
                    .crawl(&self.fetcher, self.store.as_mut(), category, limit)
                    .await?;
                Ok(CrawlResult::Listings(walk.records))
            }
        }
    }

    /// Runs one crawl, turning any failure into a logged empty result
    pub async fn run_or_empty(&mut self, mode: &CrawlMode) -> CrawlResult {
        match self.run(mode).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("{} crawl failed: {}", mode.as_str(), e);
                CrawlResult::empty(mode)
            }
        }
    }

    /// Sends the detail crawl's products when there are any and a recipient is set
    async fn report(&self, products: &[ProductRecord]) {
        if products.is_empty() {
            return;
        }
        let (Some(notifier), Some(recipient)) = (&self.notifier, &self.notify.recipient) else {
            return;
        };

        match notifier.notify(recipient, &self.notify.subject, products).await {
            Ok(()) => tracing::info!("Sent report of {} products to {}", products.len(), recipient),
            Err(e) => tracing::error!("Failed to send report to {}: {}", recipient, e),
        }
    }
}

impl Coordinator<HttpFetcher> {
    /// Builds the production coordinator: reqwest fetcher, configured store
    /// backend, and the configured notifier when a recipient is set
    pub fn from_config(config: &Config) -> Result<Self, SweepError> {
        let fetcher = HttpFetcher::from_config(&config.fetcher)?;
        if fetcher.is_proxied() {
            tracing::info!("Routing requests through the fetching service");
        }

        let store = open_store(&config.store)?;
        tracing::debug!("Using store {}", store.describe());

        let notifier = match config.notify.recipient {
            Some(_) => Some(build_notifier(&config.notify)?),
            None => None,
        };

        Self::new(config, fetcher, store, notifier)
    }
}

/// Runs a single crawl with production collaborators
///
/// # Example
///
/// ```no_run
/// use seller_sweep::config::load_config;
/// use seller_sweep::crawler::{run_crawl, CrawlMode};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let listings = run_crawl(&config, CrawlMode::Listing {
///     category: "fones".to_string(),
///     limit: Some(20),
/// })
/// .await?;
/// println!("{} sellers", listings.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, mode: CrawlMode) -> Result<CrawlResult, SweepError> {
    let mut coordinator = Coordinator::from_config(config)?;
    coordinator.run(&mode).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        CardSelectors, DetailConfig, DetailSelectors, FetcherConfig, ListingConfig, ScheduleConfig,
        StoreBackend, StoreConfig,
    };
    use crate::crawler::fetcher::FetchedPage;
    use crate::crawler::price::PriceRule;
    use crate::notify::NotifyResult;
    use crate::storage::MemoryStore;
    use crate::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const MERCHANT: &str = "https://shop.example.com/merchant";

    struct CannedFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl Fetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            match self.pages.get(url) {
                Some(body) => Ok(FetchedPage {
                    status_code: 200,
                    body: body.clone(),
                }),
                None => Err(FetchError::Transport {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                }),
            }
        }
    }

    /// Records every report it is asked to send
    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<(String, String, usize)>>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(
            &self,
            recipient: &str,
            subject: &str,
            products: &[ProductRecord],
        ) -> NotifyResult<()> {
            if self.fail {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "relay down").into());
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipient.to_string(), subject.to_string(), products.len()));
            Ok(())
        }
    }

    fn test_config(recipient: Option<&str>) -> Config {
        Config {
            fetcher: FetcherConfig::default(),
            detail: DetailConfig {
                merchant_url: MERCHANT.to_string(),
                price_rule: PriceRule::DecimalText,
                max_concurrent: None,
                selectors: DetailSelectors::default(),
            },
            listing: ListingConfig {
                seed_url: "https://lista.example.com/{category}".to_string(),
                default_limit: 1,
                selectors: CardSelectors::default(),
            },
            store: StoreConfig {
                backend: StoreBackend::Delimited,
                path: "./unused.csv".to_string(),
            },
            notify: NotifyConfig {
                recipient: recipient.map(str::to_string),
                ..NotifyConfig::default()
            },
            schedule: ScheduleConfig::default(),
        }
    }

    fn merchant_pages() -> HashMap<String, String> {
        let mut pages = HashMap::new();
        pages.insert(
            MERCHANT.to_string(),
            r#"<div class="c-product-card"><div class="c-product-card__title"><a href="/p/1">x</a></div></div>"#
                .to_string(),
        );
        pages.insert(
            "https://shop.example.com/p/1".to_string(),
            r#"<h1 class="c-product__name">Lamp</h1><span class="c-price h-price--xx-large h-price">12,5 lei</span>"#
                .to_string(),
        );
        pages
    }

    fn listing_pages() -> HashMap<String, String> {
        let mut pages = HashMap::new();
        pages.insert(
            "https://lista.example.com/fones".to_string(),
            r#"<li class="ui-search-layout__item"><a class="poly-component__title" href="/p/9">Fone</a>
               <span class="poly-component__seller">Loja</span>
               <div class="poly-price__current">R$ 10</div></li>"#
                .to_string(),
        );
        pages
    }

    fn coordinator(
        pages: HashMap<String, String>,
        recipient: Option<&str>,
        notifier: Option<RecordingNotifier>,
    ) -> Coordinator<CannedFetcher> {
        Coordinator::new(
            &test_config(recipient),
            CannedFetcher { pages },
            Box::new(MemoryStore::new()),
            notifier.map(|n| Box::new(n) as Box<dyn Notifier>),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_detail_mode_reports_products() {
        let notifier = RecordingNotifier::default();
        let mut coordinator =
            coordinator(merchant_pages(), Some("ops@example.com"), Some(notifier.clone()));

        let result = coordinator.run(&CrawlMode::Detail).await.unwrap();

        let CrawlResult::Products(products) = result else {
            panic!("expected products");
        };
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price.as_str(), "12.50 lei");
        assert_eq!(
            notifier.sent.lock().unwrap().clone(),
            vec![("ops@example.com".to_string(), "Scraping Results".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_no_report_without_recipient() {
        let notifier = RecordingNotifier::default();
        let mut coordinator = coordinator(merchant_pages(), None, Some(notifier.clone()));

        coordinator.run(&CrawlMode::Detail).await.unwrap();

        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_report_failure_keeps_result() {
        let notifier = RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        };
        let mut coordinator = coordinator(merchant_pages(), Some("ops@example.com"), Some(notifier));

        let result = coordinator.run(&CrawlMode::Detail).await.unwrap();
        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_listing_mode_uses_default_limit_and_store() {
        let mut coordinator = coordinator(listing_pages(), None, None);

        let mode = CrawlMode::Listing {
            category: "fones".to_string(),
            limit: None,
        };
        let result = coordinator.run(&mode).await.unwrap();

        assert_eq!(result.len(), 1);
        assert!(coordinator.store().known_sellers().unwrap().contains("Loja"));
    }

    #[tokio::test]
    async fn test_run_or_empty_swallows_listing_page_failure() {
        let mut coordinator = coordinator(HashMap::new(), None, None);

        let result = coordinator.run_or_empty(&CrawlMode::Detail).await;

        assert_eq!(result, CrawlResult::Products(Vec::new()));
        assert!(coordinator.run(&CrawlMode::Detail).await.is_err());
    }

    #[test]
    fn test_results_serialize_as_plain_arrays() {
        let result = CrawlResult::Listings(vec![ListingRecord {
            title: "Fone".to_string(),
            price: "R$ 10".to_string(),
            seller: "Loja".to_string(),
            link: None,
        }]);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"[{"title":"Fone","price":"R$ 10","seller":"Loja","link":null}]"#
        );
    }
}

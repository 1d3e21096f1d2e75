//! Crawler module for listing and detail page harvesting
//!
//! This module contains the core crawling logic, including:
//! - Page fetching behind the `Fetcher` capability
//! - HTML field extraction with configurable selector schemes
//! - Price normalization and seller deduplication
//! - The detail fan-out and paginated listing crawls
//! - Overall crawl coordination and periodic scheduling

mod coordinator;
mod dedup;
mod detail;
mod document;
mod fetcher;
mod listing;
mod price;
mod records;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlMode, CrawlResult};
pub use dedup::{first_per_seller, CrawlAccumulator};
pub use detail::{DetailCrawlStats, DetailCrawler};
pub use document::{CardFields, CardScheme, DetailFields, DetailScheme, Document};
pub use fetcher::{build_http_client, fetch_html, FetchedPage, Fetcher, HttpFetcher};
pub use listing::{ListingCrawler, ListingWalk};
pub use price::{NormalizedPrice, PriceRule, PRICE_UNAVAILABLE};
pub use records::{ListingRecord, ProductRecord, SellerKeyed};
pub use scheduler::{run_scheduled, schedule_interval};

//! Seller-Sweep: a merchant listing harvester
//!
//! This crate crawls e-commerce listing pages, extracts product and seller
//! listings, deduplicates them by seller, and persists newly seen sellers
//! incrementally across runs.

pub mod config;
pub mod crawler;
pub mod notify;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Seller-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Notification error: {0}")]
    Notify(#[from] notify::NotifyError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Invalid walk transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::WalkPhase,
        to: state::WalkPhase,
    },
}

/// Page fetch failures
///
/// A non-200 status and a transport failure are the same category for every
/// caller; the variants only exist so logs can say which one happened.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } => url,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector for {field}: {selector}")]
    InvalidSelector { field: String, selector: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Seed template has no {{category}} placeholder: {0}")]
    MissingPlaceholder(String),
}

/// Result type alias for Seller-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    CrawlMode, CrawlResult, Coordinator, Fetcher, FetchedPage, HttpFetcher, ListingRecord,
    ProductRecord,
};
pub use state::{StopReason, WalkPhase};

//! Configuration module for Seller-Sweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use seller_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sweep.toml")).unwrap();
//! println!("Merchant page: {}", config.detail.merchant_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CardSelectors, Config, DetailConfig, DetailSelectors, FetcherConfig, ListingConfig,
    NotifyConfig, NotifyTransport, ProxyConfig, ScheduleConfig, SmtpConfig, StoreBackend,
    StoreConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

//! Page fetch capability
//!
//! This module defines the one fetch operation the crawlers need and the
//! reqwest adapter used in production, including:
//! - Building the HTTP client once from configuration
//! - Optionally routing every request through a fetching-service proxy
//! - Classifying transport failures and non-200 statuses
//!
//! Retry and backoff belong here, never in the crawl logic; none is applied
//! today.

use crate::config::{FetcherConfig, ProxyConfig};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// A fetched page: the HTTP status and the response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status_code: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_ok(&self) -> bool {
        self.status_code == StatusCode::OK.as_u16()
    }
}

/// Fetches a URL
///
/// Implementations report transport failures as errors and return every
/// HTTP response, whatever its status, as a [`FetchedPage`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Fetches a page and treats any status other than 200 as a failure
pub async fn fetch_html<F: Fetcher + ?Sized>(fetcher: &F, url: &str) -> Result<String, FetchError> {
    let page = fetcher.fetch(url).await?;
    if !page.is_ok() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: page.status_code,
        });
    }
    Ok(page.body)
}

/// Proxy endpoint with its API key already resolved
#[derive(Debug, Clone)]
struct ResolvedProxy {
    endpoint: Url,
    api_key: String,
}

impl ResolvedProxy {
    /// Reads the API key from the environment variable the config names
    fn resolve(config: &ProxyConfig) -> Result<Self, FetchError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| FetchError::Transport {
            url: config.endpoint.clone(),
            message: format!("invalid proxy endpoint: {}", e),
        })?;
        let api_key = std::env::var(&config.api_key_env).map_err(|_| FetchError::Transport {
            url: config.endpoint.clone(),
            message: format!("environment variable {} is not set", config.api_key_env),
        })?;
        Ok(Self { endpoint, api_key })
    }

    /// The proxy request URL for a target page
    fn request_url(&self, target: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("url", target);
        url
    }
}

/// reqwest-backed fetcher, built once at startup and shared by reference
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    proxy: Option<ResolvedProxy>,
}

impl HttpFetcher {
    /// Builds the fetcher from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(HttpFetcher)` - Client built and proxy key resolved
    /// * `Err(FetchError)` - Client could not be built or the proxy key is missing
    pub fn from_config(config: &FetcherConfig) -> Result<Self, FetchError> {
        let client = build_http_client(config).map_err(|e| FetchError::Transport {
            url: String::new(),
            message: format!("failed to build HTTP client: {}", e),
        })?;

        let proxy = match &config.proxy {
            Some(proxy) => Some(ResolvedProxy::resolve(proxy)?),
            None => None,
        };

        Ok(Self { client, proxy })
    }

    pub fn is_proxied(&self) -> bool {
        self.proxy.is_some()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let request_url = match &self.proxy {
            Some(proxy) => proxy.request_url(url).to_string(),
            None => url.to_string(),
        };

        let response = self
            .client
            .get(&request_url)
            .send()
            .await
            .map_err(|e| classify_transport_error(url, &e))?;

        let status_code = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(url, &e))?;

        tracing::debug!("Fetched {} (HTTP {}, {} bytes)", url, status_code, body.len());

        Ok(FetchedPage { status_code, body })
    }
}

/// Builds an HTTP client with the configured user agent and timeouts
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Maps a reqwest error onto a transport failure with a readable message
fn classify_transport_error(url: &str, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        "connection refused".to_string()
    } else {
        error.to_string()
    };

    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}

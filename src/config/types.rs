use crate::crawler::PriceRule;
use serde::Deserialize;

/// Main configuration structure for Seller-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    pub detail: DetailConfig,
    pub listing: ListingConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Optional third-party fetching service every request is routed through
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            proxy: None,
        }
    }
}

/// Fetching-service proxy settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProxyConfig {
    /// Service endpoint, e.g. `https://api.scraperapi.com/`
    pub endpoint: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Detail fan-out crawl configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DetailConfig {
    /// Merchant listing page; also the seller link of first-party items
    pub merchant_url: String,

    /// How detail-page prices are normalized
    #[serde(default)]
    pub price_rule: PriceRule,

    /// Cap on in-flight detail fetches (absent means one slot per link)
    #[serde(default)]
    pub max_concurrent: Option<usize>,

    #[serde(default)]
    pub selectors: DetailSelectors,
}

/// CSS selectors used on the merchant listing page and its detail pages
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DetailSelectors {
    pub product_link: String,
    pub name: String,
    pub price_new: String,
    pub price_regular: String,
    pub seller_link: String,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            product_link: ".c-product-card .c-product-card__title a".to_string(),
            name: ".c-product__name".to_string(),
            price_new: ".c-price.h-price--xx-large.h-price--new".to_string(),
            price_regular: ".c-price.h-price--xx-large.h-price".to_string(),
            seller_link: ".c-product__seller-info a".to_string(),
        }
    }
}

/// Paginated listing crawl configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ListingConfig {
    /// Seed URL template containing a `{category}` placeholder
    pub seed_url: String,

    /// Unique-seller threshold used when the caller gives none
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    #[serde(default)]
    pub selectors: CardSelectors,
}

/// CSS selectors for listing cards and the paginator
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CardSelectors {
    pub card: String,
    pub seller: String,
    pub title: String,
    pub price: String,
    pub link: String,
    pub next_page: String,
    /// Label the next-page control must carry (text, `title` or `aria-label`)
    pub next_page_label: Option<String>,
}

impl Default for CardSelectors {
    fn default() -> Self {
        Self {
            card: ".ui-search-layout__item".to_string(),
            seller: ".poly-component__seller".to_string(),
            title: ".poly-component__title".to_string(),
            price: ".poly-price__current".to_string(),
            link: "a".to_string(),
            next_page: ".andes-pagination__button--next a".to_string(),
            next_page_label: Some("Seguinte".to_string()),
        }
    }
}

/// Which backend holds the durable seller set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    /// `;`-separated text file
    #[default]
    Delimited,
    /// Embedded SQLite database
    Sqlite,
}

/// Durable store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Path to the store file
    pub path: String,
}

/// How reports leave the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotifyTransport {
    /// Write `.eml` files into `outbox-dir` for a local relay
    #[default]
    Outbox,
    /// Deliver over SMTP using `[notify.smtp]`
    Smtp,
}

/// Report notification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NotifyConfig {
    /// Recipient address; no report is sent when absent
    #[serde(default)]
    pub recipient: Option<String>,

    #[serde(default = "default_subject")]
    pub subject: String,

    /// `From` mailbox, e.g. `Seller Sweep <sweep@example.com>`
    #[serde(default = "default_sender")]
    pub sender: String,

    #[serde(default)]
    pub transport: NotifyTransport,

    /// Directory the rendered messages are dropped into
    #[serde(default = "default_outbox_dir")]
    pub outbox_dir: String,

    /// Required when `transport = "smtp"`
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            recipient: None,
            subject: default_subject(),
            sender: default_sender(),
            transport: NotifyTransport::default(),
            outbox_dir: default_outbox_dir(),
            smtp: None,
        }
    }
}

/// SMTP relay settings
///
/// Credentials are read from the environment when the notifier is built,
/// never from the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SmtpConfig {
    /// Relay host, e.g. `smtp.gmail.com`
    pub host: String,

    /// Port override; implicit TLS on 465 when absent
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default = "default_username_env")]
    pub username_env: String,

    #[serde(default = "default_password_env")]
    pub password_env: String,
}

/// Periodic detail-crawl trigger
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScheduleConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_user_agent() -> String {
    format!("seller-sweep/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_api_key_env() -> String {
    "SCRAPER_API_KEY".to_string()
}

fn default_limit() -> usize {
    50
}

fn default_subject() -> String {
    "Scraping Results".to_string()
}

fn default_sender() -> String {
    "Seller Sweep <seller-sweep@localhost.localdomain>".to_string()
}

fn default_username_env() -> String {
    "EMAIL_USER".to_string()
}

fn default_password_env() -> String {
    "EMAIL_PWD".to_string()
}

fn default_outbox_dir() -> String {
    "./outbox".to_string()
}

fn default_interval_secs() -> u64 {
    3600
}

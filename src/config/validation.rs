use crate::config::types::{
    CardSelectors, Config, DetailConfig, DetailSelectors, FetcherConfig, ListingConfig,
    NotifyConfig, NotifyTransport, ScheduleConfig, StoreConfig,
};
use crate::ConfigError;
use lettre::message::Mailbox;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_detail_config(&config.detail)?;
    validate_listing_config(&config.listing)?;
    validate_store_config(&config.store)?;
    validate_notify_config(&config.notify)?;
    validate_schedule_config(&config.schedule)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be between 1 and timeout-secs ({}), got {}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    if let Some(proxy) = &config.proxy {
        validate_http_url("fetcher.proxy.endpoint", &proxy.endpoint)?;
        if proxy.api_key_env.trim().is_empty() {
            return Err(ConfigError::Validation(
                "fetcher.proxy.api-key-env cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates detail crawl configuration
fn validate_detail_config(config: &DetailConfig) -> Result<(), ConfigError> {
    validate_http_url("detail.merchant-url", &config.merchant_url)?;

    if config.max_concurrent == Some(0) {
        return Err(ConfigError::Validation(
            "detail.max-concurrent must be >= 1 when set".to_string(),
        ));
    }

    validate_detail_selectors(&config.selectors)
}

fn validate_detail_selectors(selectors: &DetailSelectors) -> Result<(), ConfigError> {
    validate_selector("detail.selectors.product-link", &selectors.product_link)?;
    validate_selector("detail.selectors.name", &selectors.name)?;
    validate_selector("detail.selectors.price-new", &selectors.price_new)?;
    validate_selector("detail.selectors.price-regular", &selectors.price_regular)?;
    validate_selector("detail.selectors.seller-link", &selectors.seller_link)?;
    Ok(())
}

/// Validates listing crawl configuration
fn validate_listing_config(config: &ListingConfig) -> Result<(), ConfigError> {
    if !config.seed_url.contains("{category}") {
        return Err(ConfigError::Validation(format!(
            "listing.seed-url must contain a {{category}} placeholder, got '{}'",
            config.seed_url
        )));
    }

    // The template must still be a valid URL once a category is substituted
    validate_http_url(
        "listing.seed-url",
        &config.seed_url.replace("{category}", "category"),
    )?;

    if config.default_limit < 1 {
        return Err(ConfigError::Validation(
            "listing.default-limit must be >= 1".to_string(),
        ));
    }

    validate_card_selectors(&config.selectors)
}

fn validate_card_selectors(selectors: &CardSelectors) -> Result<(), ConfigError> {
    validate_selector("listing.selectors.card", &selectors.card)?;
    validate_selector("listing.selectors.seller", &selectors.seller)?;
    validate_selector("listing.selectors.title", &selectors.title)?;
    validate_selector("listing.selectors.price", &selectors.price)?;
    validate_selector("listing.selectors.link", &selectors.link)?;
    validate_selector("listing.selectors.next-page", &selectors.next_page)?;

    if let Some(label) = &selectors.next_page_label {
        if label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "listing.selectors.next-page-label cannot be blank".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "store.path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates notification configuration
fn validate_notify_config(config: &NotifyConfig) -> Result<(), ConfigError> {
    if let Some(recipient) = &config.recipient {
        validate_email(recipient)?;
    }

    if config.sender.parse::<Mailbox>().is_err() {
        return Err(ConfigError::Validation(format!(
            "Invalid notify.sender mailbox: '{}'",
            config.sender
        )));
    }

    match config.transport {
        NotifyTransport::Outbox => {
            if config.outbox_dir.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "notify.outbox-dir cannot be empty".to_string(),
                ));
            }
        }
        NotifyTransport::Smtp => {
            let smtp = config.smtp.as_ref().ok_or_else(|| {
                ConfigError::Validation(
                    "notify.transport = \"smtp\" requires a [notify.smtp] section".to_string(),
                )
            })?;
            if smtp.host.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "notify.smtp.host cannot be empty".to_string(),
                ));
            }
            if smtp.port == Some(0) {
                return Err(ConfigError::Validation(
                    "notify.smtp.port must be > 0".to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// Validates schedule configuration
fn validate_schedule_config(config: &ScheduleConfig) -> Result<(), ConfigError> {
    if config.enabled && config.interval_secs < 60 {
        return Err(ConfigError::Validation(format!(
            "schedule.interval-secs must be >= 60, got {}",
            config.interval_secs
        )));
    }
    Ok(())
}

/// Checks that a CSS selector compiles
fn validate_selector(field: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() || Selector::parse(selector).is_err() {
        return Err(ConfigError::InvalidSelector {
            field: field.to_string(),
            selector: selector.to_string(),
        });
    }
    Ok(())
}

/// Checks that a value is an absolute HTTP(S) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field, value
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "notify.recipient cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

//! Notification module for crawl reports
//!
//! This module handles:
//! - The `Notifier` capability the detail crawl reports through
//! - Rendering a product report as an HTML table and wrapping it in a message
//! - Delivering over SMTP, or dropping messages into a mail-pickup outbox

mod html;
mod message;
mod outbox;
mod smtp;

pub use html::{escape_html, render_report_html};
pub use message::build_report_message;
pub use outbox::OutboxNotifier;
pub use smtp::SmtpNotifier;

use crate::config::{NotifyConfig, NotifyTransport};
use crate::crawler::ProductRecord;
use async_trait::async_trait;
use lettre::message::Mailbox;
use thiserror::Error;

/// Errors that can occur while sending a report
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Outbox error: {0}")]
    Outbox(#[from] lettre::transport::file::Error),

    #[error("Credential variable {0} is not set")]
    MissingCredential(String),

    #[error("notify.transport is smtp but [notify.smtp] is missing")]
    MissingSmtpConfig,
}

/// Result type for notification operations
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Sends a report of products to a recipient
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        recipient: &str,
        subject: &str,
        products: &[ProductRecord],
    ) -> NotifyResult<()>;
}

/// Builds the notifier the configuration selects
pub fn build_notifier(config: &NotifyConfig) -> NotifyResult<Box<dyn Notifier>> {
    let sender: Mailbox = config.sender.parse()?;

    match config.transport {
        NotifyTransport::Outbox => Ok(Box::new(OutboxNotifier::new(&config.outbox_dir, sender))),
        NotifyTransport::Smtp => {
            let smtp = config.smtp.as_ref().ok_or(NotifyError::MissingSmtpConfig)?;
            Ok(Box::new(SmtpNotifier::from_config(smtp, sender)?))
        }
    }
}

//! SMTP notifier
//!
//! Delivers reports through an authenticated relay such as Gmail. The relay
//! connection uses implicit TLS; a port override is honored as given.

use crate::config::SmtpConfig;
use crate::crawler::ProductRecord;
use crate::notify::message::build_report_message;
use crate::notify::{Notifier, NotifyError, NotifyResult};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

/// Notifier that sends reports over SMTP
pub struct SmtpNotifier {
    host: String,
    sender: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    /// Builds the relay transport, reading credentials from the environment
    ///
    /// # Returns
    ///
    /// * `Ok(SmtpNotifier)` - Transport configured; no connection is made yet
    /// * `Err(NotifyError)` - A credential variable is unset, or the host is unusable
    pub fn from_config(config: &SmtpConfig, sender: Mailbox) -> NotifyResult<Self> {
        let username = read_credential(&config.username_env)?;
        let password = read_credential(&config.password_env)?;
        Self::with_credentials(config, sender, Credentials::new(username, password))
    }

    pub fn with_credentials(
        config: &SmtpConfig,
        sender: Mailbox,
        credentials: Credentials,
    ) -> NotifyResult<Self> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?.credentials(credentials);
        if let Some(port) = config.port {
            builder = builder.port(port);
        }

        Ok(Self {
            host: config.host.clone(),
            sender,
            transport: builder.build(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

fn read_credential(var: &str) -> NotifyResult<String> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(NotifyError::MissingCredential(var.to_string())),
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(
        &self,
        recipient: &str,
        subject: &str,
        products: &[ProductRecord],
    ) -> NotifyResult<()> {
        let message = build_report_message(&self.sender, recipient, subject, products)?;
        let response = self.transport.send(message).await?;

        tracing::info!(
            "Relay {} accepted report of {} products for {} ({})",
            self.host,
            products.len(),
            recipient,
            response.code()
        );
        Ok(())
    }
}

//! Outbox notifier
//!
//! Writes each report as a complete `.eml` message into a pickup directory;
//! a local mail relay delivers and removes them.

use crate::crawler::ProductRecord;
use crate::notify::message::build_report_message;
use crate::notify::{Notifier, NotifyResult};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::{AsyncFileTransport, AsyncTransport, Tokio1Executor};
use std::path::{Path, PathBuf};

/// Notifier that drops rendered reports into an outbox directory
pub struct OutboxNotifier {
    outbox_dir: PathBuf,
    sender: Mailbox,
    transport: AsyncFileTransport<Tokio1Executor>,
}

impl OutboxNotifier {
    pub fn new(outbox_dir: impl Into<PathBuf>, sender: Mailbox) -> Self {
        let outbox_dir = outbox_dir.into();
        Self {
            transport: AsyncFileTransport::new(&outbox_dir),
            outbox_dir,
            sender,
        }
    }

    pub fn outbox_dir(&self) -> &Path {
        &self.outbox_dir
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn notify(
        &self,
        recipient: &str,
        subject: &str,
        products: &[ProductRecord],
    ) -> NotifyResult<()> {
        let message = build_report_message(&self.sender, recipient, subject, products)?;

        tokio::fs::create_dir_all(&self.outbox_dir).await?;
        let id = self.transport.send(message).await?;

        tracing::info!(
            "Queued report of {} products for {} as {}/{}.eml",
            products.len(),
            recipient,
            self.outbox_dir.display(),
            id
        );
        Ok(())
    }
}

//! Report message assembly
//!
//! Header encoding (RFC 2047 for non-ASCII subjects), `Date` and
//! `Message-ID` are left to lettre's builder.

use crate::crawler::ProductRecord;
use crate::notify::html::render_report_html;
use crate::notify::NotifyResult;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::Message;

/// Builds the HTML report message for `recipient`
///
/// # Returns
///
/// * `Ok(Message)` - Ready to hand to any lettre transport
/// * `Err(NotifyError)` - The recipient is not a valid mailbox
pub fn build_report_message(
    sender: &Mailbox,
    recipient: &str,
    subject: &str,
    products: &[ProductRecord],
) -> NotifyResult<Message> {
    let to: Mailbox = recipient.trim().parse()?;

    let message = Message::builder()
        .from(sender.clone())
        .to(to)
        .subject(subject)
        .message_id(None)
        .date_now()
        .header(ContentType::TEXT_HTML)
        .body(render_report_html(products))?;

    Ok(message)
}

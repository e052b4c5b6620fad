//! Mail delivery capability

use async_trait::async_trait;

use super::{DeliveryReceipt, MailerError, Message};

/// Something that can deliver a [`Message`]
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Sends a message
    ///
    /// # Arguments
    /// * `message` - The [`Message`] to deliver. It is not retained after
    ///   the call returns.
    ///
    /// # Returns
    /// A [`DeliveryReceipt`] if the relay accepted the message, otherwise
    /// the [`MailerError`] describing the first failure.
    async fn send_message(&self, message: Message) -> Result<DeliveryReceipt, MailerError>;
}

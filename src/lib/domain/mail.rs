//! Outbound email model

mod attachment;
mod errors;
mod headers;
mod mailer;
mod message;
mod receipt;

pub use attachment::{
    Attachment, CONTENT_TYPE_OCTET_STREAM, HDR_CONTENT_DISPOSITION, HDR_CONTENT_ID,
    HDR_CONTENT_TRANSFER_ENCODING, HDR_CONTENT_TYPE,
};
pub use errors::{AttachmentError, EncodeError, MailerError, TransportError};
pub use headers::Headers;
pub use mailer::Mailer;
pub use message::Message;
pub use receipt::{DeliveryReceipt, RecipientMessage};

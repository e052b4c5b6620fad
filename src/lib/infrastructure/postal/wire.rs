//! Postal API request and response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::mail::{DeliveryReceipt, MailerError};

/// Envelope statuses Postal uses to refuse a message with HTTP 200
const REJECTED_STATUSES: [&str; 2] = ["error", "parameter-error"];

/// Body of `POST /api/v1/send/raw`
#[derive(Debug, Serialize)]
pub(super) struct SendRawRequest<'a> {
    /// The envelope sender
    #[serde(rename = "mail_from")]
    pub from: &'a str,

    /// The envelope recipients
    #[serde(rename = "rcpt_to")]
    pub to: &'a [String],

    /// The raw document, base64 without padding
    pub data: String,

    /// Whether the message is a bounce
    pub bounce: bool,
}

/// Envelope around every Postal API response
#[derive(Debug, Deserialize)]
pub(super) struct ApiResponse {
    pub status: String,

    #[serde(default)]
    pub time: f64,

    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct ApiFailure {
    #[serde(default)]
    code: String,

    #[serde(default)]
    message: String,
}

impl ApiResponse {
    /// Converts the envelope into a receipt, or the relay's refusal
    pub(super) fn into_receipt(self) -> Result<DeliveryReceipt, MailerError> {
        if REJECTED_STATUSES.contains(&self.status.as_str()) {
            let failure: ApiFailure =
                serde_json::from_value(self.data).map_err(MailerError::Decoding)?;

            return Err(MailerError::Rejected {
                status: self.status,
                code: failure.code,
                message: failure.message,
            });
        }

        serde_json::from_value(self.data).map_err(MailerError::Decoding)
    }
}

//! Delivery receipt returned by the relay

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The relay's identifiers for one recipient's copy of a message
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecipientMessage {
    /// The numeric message id
    pub id: i64,

    /// The opaque message token
    pub token: String,
}

/// Result of a successful delivery
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeliveryReceipt {
    /// The message id assigned by the relay
    pub message_id: String,

    /// Per-recipient identifiers, keyed by recipient address
    #[serde(default)]
    pub messages: HashMap<String, RecipientMessage>,
}

//! Mail errors

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur when attaching content to a message
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// The attachment file could not be opened
    #[error("could not open attachment file {path}")]
    FileNotFound {
        /// The path that was requested
        path: PathBuf,

        /// The underlying error
        #[source]
        source: io::Error,
    },

    /// The attachment content could not be read
    #[error("could not read attachment content")]
    Io(#[from] io::Error),
}

/// Errors that can occur while turning a message into a raw document
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The message has no `From` address
    #[error("message has no sender address")]
    MissingFrom,

    /// An address could not be parsed
    #[error("invalid {field} address \"{address}\"")]
    InvalidAddress {
        /// The header the address belongs to
        field: &'static str,

        /// The offending address
        address: String,

        /// The underlying error
        #[source]
        source: lettre::address::AddressError,
    },

    /// A header name contains characters not allowed by RFC 2822
    #[error("invalid header name \"{0}\"")]
    InvalidHeaderName(String),

    /// A header value contains a line break that is not a fold, or raw
    /// non-ASCII text
    #[error("header {0} contains a bare line break or non-ASCII text")]
    InvalidHeaderValue(String),

    /// The document could not be written
    #[error("could not write the message document")]
    Write(#[source] io::Error),
}

/// Errors raised by an HTTP transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete before the transport's deadline
    #[error("request timed out")]
    Timeout(#[source] anyhow::Error),

    /// No connection could be established
    #[error("could not connect to the server")]
    Connect(#[source] anyhow::Error),

    /// The request could not be sent
    #[error("could not send the request")]
    Request(#[source] anyhow::Error),

    /// The response body could not be read
    #[error("could not read the response body")]
    Body(#[source] anyhow::Error),
}

/// Errors that can occur when sending a message
#[derive(Debug, Error)]
pub enum MailerError {
    /// The message could not be converted to an RFC 2822 document
    #[error("error converting email to rfc 2822 message")]
    Encoding(#[from] EncodeError),

    /// The request body could not be serialised
    #[error("error marshalling request to json")]
    Serialization(#[source] serde_json::Error),

    /// The HTTP exchange failed
    #[error("error sending request to postal")]
    Transport(#[from] TransportError),

    /// The relay answered with a status other than 200 OK
    #[error("error sending message to postal, status code: {status}, error: {body}")]
    Relay {
        /// The HTTP status code
        status: u16,

        /// The raw response body
        body: String,
    },

    /// The relay accepted the request but refused the message
    #[error("postal rejected the message ({status}): {code}: {message}")]
    Rejected {
        /// The envelope status, `error` or `parameter-error`
        status: String,

        /// The relay's error code
        code: String,

        /// The relay's error message
        message: String,
    },

    /// The success response body could not be parsed
    #[error("error unmarshalling json from postal response")]
    Decoding(#[source] serde_json::Error),
}

//! RFC 2822 document encoder
//!
//! Maps a [`Message`] onto a `mail-builder` document and serialises it.
//! The MIME tree depends on which parts are present:
//!
//! ```text
//! multipart/mixed                  (only with standalone attachments)
//! ├── multipart/alternative        (only with both bodies)
//! │   ├── text/plain
//! │   └── multipart/related        (only with HTML-related attachments)
//! │       ├── text/html
//! │       └── inline attachments
//! └── standalone attachments
//! ```

use chrono::Utc;
use lettre::message::Mailbox;
use mail_builder::{
    headers::{
        address::Address, date::Date, message_id::MessageId, raw::Raw, text::Text, HeaderType,
    },
    mime::MimePart,
    MessageBuilder,
};
use tracing::debug;
use uuid::Uuid;

use crate::domain::mail::{
    Attachment, EncodeError, Message, HDR_CONTENT_TRANSFER_ENCODING, HDR_CONTENT_TYPE,
};

/// Headers generated from the message fields, in the order they are written
const ENVELOPE_HEADERS: [&str; 9] = [
    "From",
    "Sender",
    "Reply-To",
    "To",
    "Cc",
    "Subject",
    "Date",
    "Message-ID",
    "MIME-Version",
];

/// Headers describing the MIME structure, always generated
const STRUCTURE_HEADERS: [&str; 2] = [HDR_CONTENT_TYPE, HDR_CONTENT_TRANSFER_ENCODING];

/// Encodes `message` as an RFC 2822 document
///
/// # Errors
/// Returns an [`EncodeError`] if the sender is missing, an address cannot
/// be parsed, or a header would break the document structure.
pub fn encode(message: &Message) -> Result<Vec<u8>, EncodeError> {
    if message.from.trim().is_empty() {
        return Err(EncodeError::MissingFrom);
    }

    let from = parse_mailbox("From", &message.from)?;
    let sender = message
        .sender
        .as_deref()
        .filter(|sender| !sender.trim().is_empty())
        .map(|sender| parse_mailbox("Sender", sender))
        .transpose()?;
    let reply_to = parse_mailboxes("Reply-To", &message.reply_to)?;
    let to = parse_mailboxes("To", &message.to)?;
    let cc = parse_mailboxes("Cc", &message.cc)?;
    parse_mailboxes("Bcc", &message.bcc)?;

    if message.subject.contains(['\r', '\n']) {
        return Err(EncodeError::InvalidHeaderValue("Subject".to_string()));
    }

    validate_headers(message.headers.iter())?;
    for attachment in message.attachments() {
        validate_headers(attachment.headers.iter())?;
    }

    let generated: [(&str, Option<HeaderType<'_>>); 9] = [
        ("From", Some(address(&from).into())),
        ("Sender", sender.as_ref().map(|sender| address(sender).into())),
        ("Reply-To", address_list(&reply_to)),
        ("To", address_list(&to)),
        ("Cc", address_list(&cc)),
        ("Subject", Some(Text::new(message.subject.as_str()).into())),
        ("Date", Some(Date::new(Utc::now().timestamp()).into())),
        ("Message-ID", Some(MessageId::new(message_id(&from)).into())),
        ("MIME-Version", Some(Raw::new("1.0").into())),
    ];

    let mut builder = MessageBuilder::new();

    for (name, value) in generated {
        if message.headers.contains(name) {
            for value in message.headers.get_all(name) {
                builder = builder.header(name, Raw::new(value));
            }
        } else if let Some(value) = value {
            builder = builder.header(name, value);
        }
    }

    for (name, value) in message.headers.iter() {
        if is_one_of(name, &STRUCTURE_HEADERS) {
            debug!(name, "ignoring structure header set on message");
            continue;
        }

        if !is_one_of(name, &ENVELOPE_HEADERS) {
            builder = builder.header(name, Raw::new(value));
        }
    }

    builder
        .body(structure(message))
        .write_to_vec()
        .map_err(EncodeError::Write)
}

fn structure(message: &Message) -> MimePart<'_> {
    let plain = message
        .plain_body
        .as_deref()
        .map(|body| MimePart::new("text/plain", body));

    let (inline, standalone): (Vec<&Attachment>, Vec<&Attachment>) = message
        .attachments()
        .iter()
        .partition(|attachment| attachment.html_related && message.html_body.is_some());

    let html = message.html_body.as_deref().map(|body| {
        let html = MimePart::new("text/html", body);

        if inline.is_empty() {
            html
        } else {
            let mut parts = vec![html];
            parts.extend(inline.iter().copied().map(attachment_part));

            MimePart::new("multipart/related", parts)
        }
    });

    let body = match (plain, html) {
        (Some(plain), Some(html)) => {
            Some(MimePart::new("multipart/alternative", vec![plain, html]))
        }
        (plain, html) => plain.or(html),
    };

    if standalone.is_empty() {
        return body.unwrap_or_else(|| MimePart::new("text/plain", ""));
    }

    let mut parts: Vec<MimePart<'_>> = body.into_iter().collect();
    parts.extend(standalone.into_iter().map(attachment_part));

    MimePart::new("multipart/mixed", parts)
}

/// Builds the part for `attachment`, carrying over its headers.
///
/// The builder writes the content type and picks the transfer encoding
/// itself; every other header is copied verbatim.
fn attachment_part(attachment: &Attachment) -> MimePart<'_> {
    let mut part = MimePart::new(attachment.content_type(), attachment.content.as_slice());

    for (name, value) in attachment.headers.iter() {
        if !is_one_of(name, &STRUCTURE_HEADERS) {
            part = part.header(name, Raw::new(value));
        }
    }

    part
}

fn message_id(from: &Mailbox) -> String {
    format!("{}@{}", Uuid::now_v7().simple(), from.email.domain())
}

fn address(mailbox: &Mailbox) -> Address<'static> {
    Address::new_address(mailbox.name.clone(), mailbox.email.to_string())
}

fn address_list(mailboxes: &[Mailbox]) -> Option<HeaderType<'static>> {
    if mailboxes.is_empty() {
        return None;
    }

    Some(Address::new_list(mailboxes.iter().map(address).collect()).into())
}

fn parse_mailbox(field: &'static str, address: &str) -> Result<Mailbox, EncodeError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| EncodeError::InvalidAddress {
            field,
            address: address.to_string(),
            source,
        })
}

fn parse_mailboxes(
    field: &'static str,
    addresses: &[String],
) -> Result<Vec<Mailbox>, EncodeError> {
    addresses
        .iter()
        .map(|address| parse_mailbox(field, address))
        .collect()
}

fn is_one_of(name: &str, names: &[&str]) -> bool {
    names.iter().any(|known| known.eq_ignore_ascii_case(name))
}

/// Rejects header names outside RFC 2822's printable range and values that
/// are not plain ASCII or contain a line break that is not a fold.
fn validate_headers<'a>(
    headers: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<(), EncodeError> {
    for (name, value) in headers {
        let valid_name = !name.is_empty()
            && name
                .bytes()
                .all(|byte| byte.is_ascii_graphic() && byte != b':');

        if !valid_name {
            return Err(EncodeError::InvalidHeaderName(name.to_string()));
        }

        if !value.is_ascii() || !is_folded_correctly(value) {
            return Err(EncodeError::InvalidHeaderValue(name.to_string()));
        }
    }

    Ok(())
}

/// Line breaks in a header value are only allowed as CRLF followed by
/// whitespace.
fn is_folded_correctly(value: &str) -> bool {
    let bytes = value.as_bytes();

    bytes.iter().enumerate().all(|(index, byte)| match byte {
        b'\r' => {
            bytes.get(index + 1) == Some(&b'\n')
                && matches!(bytes.get(index + 2), Some(b' ' | b'\t'))
        }
        b'\n' => index > 0 && bytes[index - 1] == b'\r',
        _ => true,
    })
}

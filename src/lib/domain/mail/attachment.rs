//! Email attachment

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};

use super::Headers;

/// `Content-Type` header name
pub const HDR_CONTENT_TYPE: &str = "Content-Type";

/// `Content-Transfer-Encoding` header name
pub const HDR_CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";

/// `Content-Disposition` header name
pub const HDR_CONTENT_DISPOSITION: &str = "Content-Disposition";

/// `Content-ID` header name
pub const HDR_CONTENT_ID: &str = "Content-ID";

/// Content type used when none is known
pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

const CONTENT_ENCODING_BASE64: &str = "base64";

/// RFC 2231 `attribute-char`s, left as they are in an extended parameter
const ATTRIBUTE_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Bytes that may not appear between the brackets of a `Content-ID`
const CONTENT_ID: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>');

/// A file embedded in a message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// The file name, used for the disposition and the default content id
    pub filename: String,

    /// The MIME headers written for this part
    pub headers: Headers,

    /// The raw file content
    pub content: Vec<u8>,

    /// Whether the attachment is referenced from the HTML body (e.g. an
    /// inline image) rather than offered as a download
    pub html_related: bool,
}

impl Attachment {
    /// Creates an attachment with the default part headers.
    ///
    /// An empty `content_type` falls back to `application/octet-stream`.
    pub(crate) fn new(filename: &str, content_type: &str, content: Vec<u8>) -> Self {
        let content_type = if content_type.is_empty() {
            CONTENT_TYPE_OCTET_STREAM
        } else {
            content_type
        };

        let mut headers = Headers::new();
        headers.set(HDR_CONTENT_TYPE, content_type);
        headers.set(HDR_CONTENT_DISPOSITION, disposition(filename));
        headers.set(
            HDR_CONTENT_ID,
            format!("<{}>", utf8_percent_encode(filename, CONTENT_ID)),
        );
        headers.set(HDR_CONTENT_TRANSFER_ENCODING, CONTENT_ENCODING_BASE64);

        Self {
            filename: filename.to_string(),
            headers,
            content,
            html_related: false,
        }
    }

    /// The attachment's content type
    pub fn content_type(&self) -> &str {
        self.headers
            .get(HDR_CONTENT_TYPE)
            .unwrap_or(CONTENT_TYPE_OCTET_STREAM)
    }
}

/// `attachment` disposition naming `filename`.
///
/// ASCII names go in a quoted `filename` parameter, anything else in an
/// RFC 2231 `filename*` parameter.
fn disposition(filename: &str) -> String {
    if filename.is_ascii() {
        let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");

        format!("attachment;\r\n filename=\"{escaped}\"")
    } else {
        format!(
            "attachment;\r\n filename*=UTF-8''{}",
            utf8_percent_encode(filename, ATTRIBUTE_CHAR)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headers() {
        let attachment = Attachment::new("report.pdf", "application/pdf", b"%PDF".to_vec());

        assert_eq!(attachment.headers.get(HDR_CONTENT_TYPE), Some("application/pdf"));
        assert_eq!(
            attachment.headers.get(HDR_CONTENT_DISPOSITION),
            Some("attachment;\r\n filename=\"report.pdf\"")
        );
        assert_eq!(attachment.headers.get(HDR_CONTENT_ID), Some("<report.pdf>"));
        assert_eq!(
            attachment.headers.get(HDR_CONTENT_TRANSFER_ENCODING),
            Some("base64")
        );
        assert!(!attachment.html_related);
    }

    #[test]
    fn test_quotes_in_filename_are_escaped() {
        let attachment = Attachment::new("my \"best\" file.txt", "text/plain", Vec::new());

        assert_eq!(
            attachment.headers.get(HDR_CONTENT_DISPOSITION),
            Some("attachment;\r\n filename=\"my \\\"best\\\" file.txt\"")
        );
        assert_eq!(
            attachment.headers.get(HDR_CONTENT_ID),
            Some("<my%20%22best%22%20file.txt>")
        );
    }

    #[test]
    fn test_non_ascii_filename_uses_extended_parameter() {
        let attachment = Attachment::new("résumé.pdf", "application/pdf", Vec::new());

        assert_eq!(
            attachment.headers.get(HDR_CONTENT_DISPOSITION),
            Some("attachment;\r\n filename*=UTF-8''r%C3%A9sum%C3%A9.pdf")
        );
        assert_eq!(
            attachment.headers.get(HDR_CONTENT_ID),
            Some("<r%C3%A9sum%C3%A9.pdf>")
        );
    }

    #[test]
    fn test_empty_content_type_falls_back_to_octet_stream() {
        let attachment = Attachment::new("blob", "", vec![0, 1, 2]);

        assert_eq!(attachment.content_type(), CONTENT_TYPE_OCTET_STREAM);
    }
}

//! Email message

use std::{fs::File, io::Read, path::Path};

use tracing::debug;

use super::{Attachment, AttachmentError, Headers};

/// An outbound email
///
/// Envelope fields and bodies are set directly; attachments can only be
/// added through [`Message::attach`] and [`Message::attach_file`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    /// The author's address
    pub from: String,

    /// The address sending on behalf of `from`, if different
    pub sender: Option<String>,

    /// Primary recipients
    pub to: Vec<String>,

    /// Carbon-copy recipients
    pub cc: Vec<String>,

    /// Blind carbon-copy recipients
    pub bcc: Vec<String>,

    /// Addresses replies should go to
    pub reply_to: Vec<String>,

    /// The subject line
    pub subject: String,

    /// The plain text body
    pub plain_body: Option<String>,

    /// The HTML body
    pub html_body: Option<String>,

    /// Additional message headers
    pub headers: Headers,

    attachments: Vec<Attachment>,
}

impl Message {
    /// Creates an empty message
    pub fn new() -> Self {
        Self::default()
    }

    /// The attachments, in the order they were added
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Reads `content` to the end and attaches it as `filename`.
    ///
    /// # Arguments
    /// * `content` - The attachment data.
    /// * `filename` - The name used for the disposition and content id.
    /// * `content_type` - The MIME type, `application/octet-stream` if empty.
    /// * `headers` - Extra part headers, added alongside the defaults.
    ///
    /// # Returns
    /// The stored [`Attachment`], so the caller can e.g. mark it as
    /// HTML-related. Nothing is attached if reading fails.
    pub fn attach<R: Read>(
        &mut self,
        mut content: R,
        filename: &str,
        content_type: &str,
        headers: Option<&Headers>,
    ) -> Result<&mut Attachment, AttachmentError> {
        let mut buffer = Vec::new();
        content.read_to_end(&mut buffer)?;

        let mut attachment = Attachment::new(filename, content_type, buffer);

        if let Some(headers) = headers {
            attachment.headers.extend(headers);
        }

        debug!(filename, size = attachment.content.len(), "attached content");

        self.attachments.push(attachment);

        let index = self.attachments.len() - 1;
        Ok(&mut self.attachments[index])
    }

    /// Attaches the file at `path`.
    ///
    /// The content type is guessed from the extension and the attachment is
    /// named after the final path component.
    pub fn attach_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<&mut Attachment, AttachmentError> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|source| AttachmentError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        let content_type = mime_guess::from_path(path).first_raw().unwrap_or_default();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.attach(file, &filename, content_type, None)
    }
}

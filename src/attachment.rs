//! Email attachments in the two shapes the message layer produces.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::MailError;

/// Attachment content, either text or raw bytes.
///
/// Text content is encoded from its UTF-8 bytes; binary content is encoded
/// as-is. Both resolve to base64 text in the outgoing payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentContent {
    Text(String),
    Binary(Vec<u8>),
}

impl AttachmentContent {
    fn to_base64(&self) -> String {
        let engine = base64::engine::general_purpose::STANDARD;
        match self {
            Self::Text(text) => engine.encode(text.as_bytes()),
            Self::Binary(bytes) => engine.encode(bytes),
        }
    }
}

/// A structured MIME part: filename and payload are both optional on the
/// wire-side representation this mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimePart {
    /// Filename, if the part declares one.
    pub filename: Option<String>,
    /// Full MIME content type (e.g., "application/pdf").
    pub content_type: String,
    /// Part payload. A part without a payload is malformed input.
    pub payload: Option<AttachmentContent>,
}

/// An email attachment.
///
/// Messages carry attachments in one of two shapes: a structured MIME part,
/// or a plain (filename, content, mimetype) triple. Both resolve to the same
/// payload entry: filename, base64 content, and content type.
///
/// # Examples
///
/// ```
/// use mailbridge::Attachment;
///
/// // Content type guessed from the filename extension.
/// let report = Attachment::from_bytes("report.pdf", b"PDF content".to_vec());
///
/// // Explicit content type for text attachments.
/// let notes = Attachment::from_text("notes.txt", "hello", "text/plain");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attachment {
    /// A structured MIME part.
    Part(MimePart),
    /// A (filename, content, mimetype) triple.
    Raw {
        filename: String,
        content: AttachmentContent,
        mimetype: String,
    },
}

impl Attachment {
    /// Create a raw attachment from bytes, guessing the content type from
    /// the filename extension.
    pub fn from_bytes(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let mimetype = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string();

        Self::Raw {
            filename,
            content: AttachmentContent::Binary(data),
            mimetype,
        }
    }

    /// Create a raw text attachment with an explicit content type.
    pub fn from_text(
        filename: impl Into<String>,
        text: impl Into<String>,
        mimetype: impl Into<String>,
    ) -> Self {
        Self::Raw {
            filename: filename.into(),
            content: AttachmentContent::Text(text.into()),
            mimetype: mimetype.into(),
        }
    }

    /// The attachment filename, if one is set.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Part(part) => part.filename.as_deref(),
            Self::Raw { filename, .. } => Some(filename),
        }
    }

    /// The full MIME content type.
    pub fn content_type(&self) -> &str {
        match self {
            Self::Part(part) => &part.content_type,
            Self::Raw { mimetype, .. } => mimetype,
        }
    }

    /// Resolve the attachment content as base64 text.
    ///
    /// # Errors
    ///
    /// `AttachmentMissingContent` if a structured part carries no payload.
    pub fn base64_content(&self) -> Result<String, MailError> {
        match self {
            Self::Part(part) => {
                let content = part.payload.as_ref().ok_or_else(|| {
                    MailError::AttachmentMissingContent(
                        part.filename.clone().unwrap_or_default(),
                    )
                })?;
                Ok(content.to_base64())
            }
            Self::Raw { content, .. } => Ok(content.to_base64()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_guesses_mime() {
        let pdf = Attachment::from_bytes("doc.pdf", vec![]);
        assert_eq!(pdf.content_type(), "application/pdf");

        let png = Attachment::from_bytes("image.png", vec![]);
        assert_eq!(png.content_type(), "image/png");

        let unknown = Attachment::from_bytes("file.unknown_ext_12345", vec![]);
        assert_eq!(unknown.content_type(), "application/octet-stream");
    }

    #[test]
    fn test_base64_text() {
        let attachment = Attachment::from_text("test.txt", "Hello", "text/plain");
        assert_eq!(attachment.base64_content().unwrap(), "SGVsbG8=");
    }

    #[test]
    fn test_base64_binary() {
        let attachment = Attachment::from_bytes("test.bin", vec![0xff, 0x00, 0x7f]);
        let encoded = attachment.base64_content().unwrap();
        let engine = base64::engine::general_purpose::STANDARD;
        assert_eq!(engine.decode(&encoded).unwrap(), vec![0xff, 0x00, 0x7f]);
    }

    #[test]
    fn test_part_round_trip() {
        let part = Attachment::Part(MimePart {
            filename: Some("inline.txt".to_string()),
            content_type: "text/plain".to_string(),
            payload: Some(AttachmentContent::Text("café".to_string())),
        });
        let engine = base64::engine::general_purpose::STANDARD;
        let decoded = engine.decode(part.base64_content().unwrap()).unwrap();
        assert_eq!(decoded, "café".as_bytes());
    }

    #[test]
    fn test_part_without_payload_is_error() {
        let part = Attachment::Part(MimePart {
            filename: Some("broken.bin".to_string()),
            content_type: "application/octet-stream".to_string(),
            payload: None,
        });
        let err = part.base64_content().unwrap_err();
        assert!(matches!(
            err,
            MailError::AttachmentMissingContent(name) if name == "broken.bin"
        ));
    }

    #[test]
    fn test_part_without_filename() {
        let part = Attachment::Part(MimePart {
            filename: None,
            content_type: "image/png".to_string(),
            payload: Some(AttachmentContent::Binary(vec![1, 2, 3])),
        });
        assert_eq!(part.filename(), None);
        assert!(part.base64_content().is_ok());
    }
}

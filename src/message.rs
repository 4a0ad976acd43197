//! Message struct with builder pattern.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::address::Address;
use crate::attachment::Attachment;

/// MIME subtype of the primary body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentSubtype {
    /// `body` is plain text.
    #[default]
    Plain,
    /// `body` is HTML. Only consulted when no alternatives are present.
    Html,
}

/// A secondary rendering of the body carried alongside the primary one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    /// Alternative content.
    pub content: String,
    /// Full MIME type of the alternative (e.g., "text/html").
    pub mime_type: String,
}

/// An outbound email message.
///
/// Use the builder pattern to construct messages:
///
/// ```
/// use mailbridge::Message;
///
/// let message = Message::new()
///     .from("sender@example.com")
///     .to("recipient@example.com")
///     .subject("Hello!")
///     .body("Plain text content");
/// ```
///
/// ## Fields
///
/// - `from` - Sender, display name optional
/// - `to`, `cc`, `bcc` - Bare recipient addresses, order preserved
/// - `subject`, `body`, `content_subtype`, `alternatives` - Content
/// - `extra_headers` - Custom headers ("Reply-To" is special-cased)
/// - `reply_to` - Fallback reply-to addresses
/// - `attachments` - File attachments
/// - `categories`, `template_id`, `substitutions` - SendGrid extensions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    /// Sender address.
    pub from: Address,
    /// Primary recipients.
    pub to: Vec<String>,
    /// Carbon copy recipients.
    pub cc: Vec<String>,
    /// Blind carbon copy recipients.
    pub bcc: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Primary body.
    pub body: String,
    /// Whether `body` is plain text or HTML.
    pub content_subtype: ContentSubtype,
    /// Alternative renderings of the body, in order.
    pub alternatives: Vec<Alternative>,
    /// Custom email headers. A key matching "reply-to" case-insensitively
    /// sets the payload reply-to instead of becoming a header.
    pub extra_headers: HashMap<String, String>,
    /// Reply-to addresses, used only if no reply-to header was supplied.
    pub reply_to: Vec<String>,
    /// File attachments.
    pub attachments: Vec<Attachment>,
    /// SendGrid category tags, order preserved. Empty means none.
    pub categories: Vec<String>,
    /// SendGrid template identifier.
    pub template_id: Option<String>,
    /// Template substitutions, applied only when `template_id` is set.
    /// Iteration order is unspecified.
    pub substitutions: HashMap<String, String>,
}

impl Message {
    /// Create a new empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sender address.
    ///
    /// Accepts `"email@example.com"` or `("Name", "email@example.com")`.
    pub fn from(mut self, addr: impl Into<Address>) -> Self {
        self.from = addr.into();
        self
    }

    /// Add a recipient. Can be called multiple times.
    pub fn to(mut self, addr: impl Into<String>) -> Self {
        self.to.push(addr.into());
        self
    }

    /// Add a CC recipient.
    pub fn cc(mut self, addr: impl Into<String>) -> Self {
        self.cc.push(addr.into());
        self
    }

    /// Add a BCC recipient.
    pub fn bcc(mut self, addr: impl Into<String>) -> Self {
        self.bcc.push(addr.into());
        self
    }

    /// Add a reply-to fallback address.
    pub fn reply_to(mut self, addr: impl Into<String>) -> Self {
        self.reply_to.push(addr.into());
        self
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set a plain-text body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self.content_subtype = ContentSubtype::Plain;
        self
    }

    /// Set an HTML body (no plain-text rendering).
    pub fn html_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self.content_subtype = ContentSubtype::Html;
        self
    }

    /// Attach an alternative rendering of the body.
    pub fn alternative(
        mut self,
        content: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        self.alternatives.push(Alternative {
            content: content.into(),
            mime_type: mime_type.into(),
        });
        self
    }

    /// Add a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    /// Add an attachment.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Add a SendGrid category tag.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Set the SendGrid template identifier.
    pub fn template_id(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    /// Add a template substitution.
    pub fn substitution(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.substitutions.insert(key.into(), value.into());
        self
    }

    /// Get all recipients (to + cc + bcc).
    pub fn all_recipients(&self) -> Vec<&str> {
        self.to
            .iter()
            .chain(self.cc.iter())
            .chain(self.bcc.iter())
            .map(String::as_str)
            .collect()
    }

    /// Check if the message has any attachments.
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

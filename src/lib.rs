//! # Mailbridge
//!
//! Deliver a web application's outbound email through the SendGrid v3 HTTP
//! API instead of SMTP.
//!
//! The crate is one adapter: a [`Message`] is translated into the request
//! shape SendGrid expects ([`build_payload`]) and delivered with one HTTP
//! POST per message ([`SendGridBackend::send_messages`]).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mailbridge::{Message, SendGridBackend};
//!
//! let backend = SendGridBackend::new("SG.xxxxx")?;
//!
//! let message = Message::new()
//!     .from(("My App", "noreply@example.com"))
//!     .to("user@example.com")
//!     .subject("Welcome!")
//!     .body("Hello");
//!
//! let sent = backend.send_messages(&[message]).await?;
//! assert_eq!(sent, 1);
//! ```
//!
//! Or configure from the environment:
//!
//! ```bash
//! SENDGRID_API_KEY=SG.xxxxx
//! ```
//!
//! ```rust,ignore
//! let backend = mailbridge::SendGridBackend::from_env()?;
//! ```
//!
//! ## Error behavior
//!
//! - A missing or empty API key fails at construction, before any message
//!   is processed.
//! - A malformed attachment (structured part with no payload) aborts the
//!   batch.
//! - A delivery error (non-2xx) aborts the remaining batch, unless
//!   [`SendGridBackend::fail_silently`] is set, in which case the message is
//!   skipped and iteration continues.

/// The version of the mailbridge crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod address;
mod attachment;
mod backend;
mod client;
mod error;
mod message;
mod payload;

pub use address::Address;
pub use attachment::{Attachment, AttachmentContent, MimePart};
pub use backend::SendGridBackend;
pub use client::{DeliveryDriver, SendGridClient};
pub use error::MailError;
pub use message::{Alternative, ContentSubtype, Message};
pub use payload::{
    build_payload, AttachmentPayload, ContentBlock, EmailRef, MailPayload, Personalization,
};

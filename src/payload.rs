//! SendGrid v3 wire types and the message-to-payload translator.
//!
//! [`build_payload`] is a deterministic, side-effect-free conversion of one
//! [`Message`] into the request body for `POST /v3/mail/send`. A payload is
//! built fresh per message in a single pass and handed to the delivery
//! driver; nothing is cached or reused.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::MailError;
use crate::message::{ContentSubtype, Message};

/// The `POST /v3/mail/send` request body.
///
/// Schema-optional fields are `Option` with `skip_serializing_if` so they
/// are absent from the JSON rather than null.
#[derive(Debug, Clone, Serialize)]
pub struct MailPayload {
    pub personalizations: Vec<Personalization>,
    pub from: EmailRef,
    pub subject: String,
    pub content: Vec<ContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<AttachmentPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<EmailRef>,
}

/// Recipients, per-block subject, and substitutions for one send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personalization {
    pub to: Vec<EmailRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<EmailRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Vec<EmailRef>>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitutions: Option<HashMap<String, String>>,
}

/// An address as SendGrid expects it. A missing display name is an absent
/// field, never an empty string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRef {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EmailRef {
    fn bare(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }
}

/// One content block: MIME type plus text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

impl ContentBlock {
    fn plain(value: impl Into<String>) -> Self {
        Self {
            content_type: "text/plain".to_string(),
            value: value.into(),
        }
    }

    fn html(value: impl Into<String>) -> Self {
        Self {
            content_type: "text/html".to_string(),
            value: value.into(),
        }
    }
}

/// One attachment entry: filename, base64 content, and MIME type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentPayload {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Translate one message into a SendGrid payload.
///
/// Content invariant: a text/plain block is always present and always first.
/// HTML handling, in priority order:
///
/// 1. Non-empty `alternatives`: one text/html block appended per alternative
///    whose MIME type is "text/html", all matches, input order.
/// 2. Otherwise an HTML `content_subtype` replaces the content list with a
///    single-space text/plain padding block followed by the body as
///    text/html (SendGrid rejects an empty content value, so the padding
///    keeps the required block non-empty).
/// 3. Otherwise no HTML block.
///
/// # Errors
///
/// `AttachmentMissingContent` if a structured MIME part has no payload.
pub fn build_payload(message: &Message) -> Result<MailPayload, MailError> {
    let from = EmailRef {
        email: message.from.email.clone(),
        name: message.from.display_name().map(str::to_string),
    };

    let mut personalization = Personalization {
        to: message.to.iter().map(EmailRef::bare).collect(),
        cc: if message.cc.is_empty() {
            None
        } else {
            Some(message.cc.iter().map(EmailRef::bare).collect())
        },
        bcc: if message.bcc.is_empty() {
            None
        } else {
            Some(message.bcc.iter().map(EmailRef::bare).collect())
        },
        subject: message.subject.clone(),
        substitutions: None,
    };

    let mut content = vec![ContentBlock::plain(&message.body)];
    if !message.alternatives.is_empty() {
        for alt in &message.alternatives {
            if alt.mime_type == "text/html" {
                content.push(ContentBlock::html(&alt.content));
            }
        }
    } else if message.content_subtype == ContentSubtype::Html {
        content = vec![ContentBlock::plain(" "), ContentBlock::html(&message.body)];
    }

    let categories = if message.categories.is_empty() {
        None
    } else {
        Some(message.categories.clone())
    };

    let template_id = message.template_id.clone();
    if template_id.is_some() && !message.substitutions.is_empty() {
        personalization.substitutions = Some(message.substitutions.clone());
    }

    let mut headers = HashMap::new();
    let mut reply_to = None;
    for (key, value) in &message.extra_headers {
        if key.eq_ignore_ascii_case("reply-to") {
            reply_to = Some(EmailRef::bare(value));
        } else {
            headers.insert(key.clone(), value.clone());
        }
    }
    if reply_to.is_none() {
        if let Some(first) = message.reply_to.first() {
            reply_to = Some(EmailRef::bare(first));
        }
    }

    let attachments = if message.attachments.is_empty() {
        None
    } else {
        Some(
            message
                .attachments
                .iter()
                .map(|attachment| {
                    Ok(AttachmentPayload {
                        content: attachment.base64_content()?,
                        filename: attachment.filename().map(str::to_string),
                        content_type: attachment.content_type().to_string(),
                    })
                })
                .collect::<Result<Vec<_>, MailError>>()?,
        )
    };

    Ok(MailPayload {
        personalizations: vec![personalization],
        from,
        subject: message.subject.clone(),
        content,
        attachments,
        headers: if headers.is_empty() {
            None
        } else {
            Some(headers)
        },
        template_id,
        categories,
        reply_to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::{Attachment, AttachmentContent, MimePart};
    use base64::Engine;

    fn base_message() -> Message {
        Message::new()
            .from("tony.stark@example.com")
            .to("steve.rogers@example.com")
            .subject("Hello, Avengers!")
            .body("Hello")
    }

    #[test]
    fn recipients_preserve_order_and_duplicates() {
        let message = base_message()
            .to("bruce.banner@example.com")
            .to("steve.rogers@example.com")
            .cc("wasp.avengers@example.com")
            .bcc("thor.odinson@example.com");

        let payload = build_payload(&message).unwrap();
        let p = &payload.personalizations[0];
        let to: Vec<&str> = p.to.iter().map(|e| e.email.as_str()).collect();
        assert_eq!(
            to,
            vec![
                "steve.rogers@example.com",
                "bruce.banner@example.com",
                "steve.rogers@example.com"
            ]
        );
        assert_eq!(p.cc.as_ref().unwrap().len(), 1);
        assert_eq!(p.bcc.as_ref().unwrap().len(), 1);
        assert_eq!(p.subject, "Hello, Avengers!");
    }

    #[test]
    fn empty_cc_and_bcc_are_absent() {
        let payload = build_payload(&base_message()).unwrap();
        let p = &payload.personalizations[0];
        assert!(p.cc.is_none());
        assert!(p.bcc.is_none());
    }

    #[test]
    fn empty_display_name_is_omitted() {
        let message = base_message().from(("", "tony.stark@example.com"));
        let payload = build_payload(&message).unwrap();
        assert_eq!(payload.from.email, "tony.stark@example.com");
        assert!(payload.from.name.is_none());
    }

    #[test]
    fn display_name_is_carried() {
        let message = base_message().from(("T Stark", "tony.stark@example.com"));
        let payload = build_payload(&message).unwrap();
        assert_eq!(payload.from.name.as_deref(), Some("T Stark"));
    }

    #[test]
    fn plain_body_yields_single_content_block() {
        let payload = build_payload(&base_message()).unwrap();
        assert_eq!(payload.content.len(), 1);
        assert_eq!(payload.content[0].content_type, "text/plain");
        assert_eq!(payload.content[0].value, "Hello");
    }

    #[test]
    fn html_only_body_gets_padding_block() {
        let message = base_message().html_body("<h1>Hello</h1>");
        let payload = build_payload(&message).unwrap();

        assert_eq!(payload.content.len(), 2);
        assert_eq!(payload.content[0].content_type, "text/plain");
        assert_eq!(payload.content[0].value, " ");
        assert_eq!(payload.content[1].content_type, "text/html");
        assert_eq!(payload.content[1].value, "<h1>Hello</h1>");
    }

    #[test]
    fn html_alternative_follows_plain_body() {
        let message = base_message().alternative("<h1>Hello</h1>", "text/html");
        let payload = build_payload(&message).unwrap();

        assert_eq!(payload.content.len(), 2);
        assert_eq!(payload.content[0].value, "Hello");
        assert_eq!(payload.content[1].content_type, "text/html");
        assert_eq!(payload.content[1].value, "<h1>Hello</h1>");
    }

    #[test]
    fn all_html_alternatives_are_added() {
        let message = base_message()
            .alternative("<h1>One</h1>", "text/html")
            .alternative("calendar data", "text/calendar")
            .alternative("<h1>Two</h1>", "text/html");
        let payload = build_payload(&message).unwrap();

        let html: Vec<&str> = payload
            .content
            .iter()
            .filter(|c| c.content_type == "text/html")
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(html, vec!["<h1>One</h1>", "<h1>Two</h1>"]);
        assert_eq!(payload.content.len(), 3);
    }

    #[test]
    fn alternatives_take_priority_over_html_subtype() {
        // With alternatives present the body stays in the plain block even
        // if the subtype claims HTML.
        let mut message = base_message().alternative("<h1>Alt</h1>", "text/html");
        message.content_subtype = ContentSubtype::Html;
        let payload = build_payload(&message).unwrap();

        assert_eq!(payload.content[0].content_type, "text/plain");
        assert_eq!(payload.content[0].value, "Hello");
    }

    #[test]
    fn categories_preserve_order() {
        let message = base_message().category("welcome").category("user");
        let payload = build_payload(&message).unwrap();
        assert_eq!(
            payload.categories,
            Some(vec!["welcome".to_string(), "user".to_string()])
        );
    }

    #[test]
    fn no_categories_is_absent() {
        let payload = build_payload(&base_message()).unwrap();
        assert!(payload.categories.is_none());
    }

    #[test]
    fn substitutions_require_template_id() {
        let message = base_message().substitution("-name-", "Steve");
        let payload = build_payload(&message).unwrap();
        assert!(payload.personalizations[0].substitutions.is_none());

        let message = base_message()
            .template_id("d-12345")
            .substitution("-name-", "Steve");
        let payload = build_payload(&message).unwrap();
        assert_eq!(payload.template_id.as_deref(), Some("d-12345"));
        assert_eq!(
            payload.personalizations[0]
                .substitutions
                .as_ref()
                .unwrap()
                .get("-name-")
                .map(String::as_str),
            Some("Steve")
        );
    }

    #[test]
    fn reply_to_header_sets_field_not_header() {
        let message = base_message()
            .header("Reply-To", "replies@example.com")
            .header("X-Custom", "value");
        let payload = build_payload(&message).unwrap();

        assert_eq!(
            payload.reply_to.as_ref().unwrap().email,
            "replies@example.com"
        );
        let headers = payload.headers.unwrap();
        assert!(!headers.contains_key("Reply-To"));
        assert_eq!(headers.get("X-Custom"), Some(&"value".to_string()));
    }

    #[test]
    fn reply_to_header_is_case_insensitive() {
        let message = base_message().header("REPLY-TO", "replies@example.com");
        let payload = build_payload(&message).unwrap();
        assert_eq!(
            payload.reply_to.as_ref().unwrap().email,
            "replies@example.com"
        );
        assert!(payload.headers.is_none());
    }

    #[test]
    fn reply_to_attribute_is_fallback_only() {
        let message = base_message().reply_to("ops@example.com");
        let payload = build_payload(&message).unwrap();
        assert_eq!(payload.reply_to.as_ref().unwrap().email, "ops@example.com");

        // Header wins over the attribute.
        let message = base_message()
            .reply_to("ops@example.com")
            .header("reply-to", "header@example.com");
        let payload = build_payload(&message).unwrap();
        assert_eq!(
            payload.reply_to.as_ref().unwrap().email,
            "header@example.com"
        );
    }

    #[test]
    fn attachments_round_trip_base64() {
        let message = base_message()
            .attachment(Attachment::from_text("notes.txt", "héllo", "text/plain"))
            .attachment(Attachment::from_bytes("data.bin", vec![0xde, 0xad, 0xbe]))
            .attachment(Attachment::Part(MimePart {
                filename: Some("inline.png".to_string()),
                content_type: "image/png".to_string(),
                payload: Some(AttachmentContent::Binary(vec![0x89, 0x50])),
            }));
        let payload = build_payload(&message).unwrap();

        let attachments = payload.attachments.unwrap();
        assert_eq!(attachments.len(), 3);

        let engine = base64::engine::general_purpose::STANDARD;
        assert_eq!(
            engine.decode(&attachments[0].content).unwrap(),
            "héllo".as_bytes()
        );
        assert_eq!(
            engine.decode(&attachments[1].content).unwrap(),
            vec![0xde, 0xad, 0xbe]
        );
        assert_eq!(
            engine.decode(&attachments[2].content).unwrap(),
            vec![0x89, 0x50]
        );
        assert_eq!(attachments[0].filename.as_deref(), Some("notes.txt"));
        assert_eq!(attachments[1].content_type, "application/octet-stream");
        assert_eq!(attachments[2].content_type, "image/png");
    }

    #[test]
    fn contentless_part_aborts_translation() {
        let message = base_message().attachment(Attachment::Part(MimePart {
            filename: Some("broken.bin".to_string()),
            content_type: "application/octet-stream".to_string(),
            payload: None,
        }));

        let err = build_payload(&message).unwrap_err();
        assert!(matches!(err, MailError::AttachmentMissingContent(_)));
    }

    #[test]
    fn serialized_payload_omits_absent_fields() {
        let payload = build_payload(&base_message()).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        let object = json.as_object().unwrap();
        assert!(!object.contains_key("attachments"));
        assert!(!object.contains_key("headers"));
        assert!(!object.contains_key("template_id"));
        assert!(!object.contains_key("categories"));
        assert!(!object.contains_key("reply_to"));
        assert!(!json["from"].as_object().unwrap().contains_key("name"));
    }
}

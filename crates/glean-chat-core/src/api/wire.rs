//! Wire types for the chat endpoint.
//!
//! A response body is one or more newline-separated JSON objects, each
//! optionally carrying a `messages` array of [`ChatMessage`]. These types are
//! transient: they are folded into store messages and discarded.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Author {
    User,
    Assistant,
    GleanAi,
}

/// One author-attributed batch of fragments as received from the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub author: Author,
    #[serde(default)]
    pub fragments: Vec<Fragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_step_complete: Option<bool>,
}

impl ChatMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            author: Author::User,
            fragments: vec![Fragment::text(text)],
            message_id: None,
            message_type: None,
            step_id: None,
            workflow_id: None,
            is_step_complete: None,
        }
    }
}

/// One unit of server-produced content within a protocol message. A fragment
/// may carry none of its fields, in which case it contributes no text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_results: Option<Vec<StructuredResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_suggestion: Option<QuerySuggestion>,
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StructuredResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuerySuggestion {
    pub query: String,
    pub datasource: String,
}

/// Outbound body for `POST /rest/api/v1/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub stream: bool,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn from_user_text(text: impl Into<String>) -> Self {
        Self {
            stream: true,
            messages: vec![ChatMessage::user_text(text)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Author::GleanAi).unwrap(), "\"GLEAN_AI\"");
        assert_eq!(serde_json::to_string(&Author::User).unwrap(), "\"USER\"");
        let parsed: Author = serde_json::from_str("\"ASSISTANT\"").unwrap();
        assert_eq!(parsed, Author::Assistant);
    }

    #[test]
    fn chat_request_body_shape() {
        let request = ChatRequest::from_user_text("hello");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "stream": true,
                "messages": [{
                    "author": "USER",
                    "fragments": [{"text": "hello"}]
                }]
            })
        );
    }

    #[test]
    fn message_tolerates_unknown_and_missing_fields() {
        let raw = r#"{"author":"GLEAN_AI","fragments":[{"text":"hi"}],"messageType":"UPDATE","somethingNew":1}"#;
        let message: ChatMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(message.author, Author::GleanAi);
        assert_eq!(message.message_type.as_deref(), Some("UPDATE"));
        assert_eq!(message.fragments.len(), 1);

        let bare: ChatMessage = serde_json::from_str(r#"{"author":"USER"}"#).unwrap();
        assert!(bare.fragments.is_empty());
    }
}

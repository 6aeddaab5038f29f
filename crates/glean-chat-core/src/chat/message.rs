//! Conversation message types.
//!
//! A [`Message`] is a store entity: created only through
//! [`MessageStore::add`], mutated only through [`MessageStore::update`].
//! Insertion order is the canonical display order and never changes.
//!
//! [`MessageStore::add`]: crate::chat::MessageStore::add
//! [`MessageStore::update`]: crate::chat::MessageStore::update

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use strum_macros::Display;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Delivery state of a conversation entry. Terminal once resolved; a message
/// with no status has no tracked delivery state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageStatus {
    Sending,
    Sent,
    Error,
}

/// Provenance of a conversation entry: a real backend reply, a mock/test
/// reply, or a locally generated system notice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageSource {
    Glean,
    Other,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MessageSource>,
}

impl Message {
    /// Epoch millis at creation time.
    pub(crate) fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    pub(crate) fn generate_id() -> String {
        format!("msg_{}", Uuid::now_v7())
    }
}

/// Fields supplied by the caller when creating a message; id and timestamp
/// are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
    pub status: Option<MessageStatus>,
    pub source: Option<MessageSource>,
}

impl NewMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            status: None,
            source: None,
        }
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source(mut self, source: MessageSource) -> Self {
        self.source = Some(source);
        self
    }
}

/// Partial update merged into an existing message; `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct MessageUpdate {
    pub content: Option<String>,
    pub status: Option<MessageStatus>,
    pub source: Option<MessageSource>,
}

impl MessageUpdate {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn status(status: MessageStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub(crate) fn apply(&self, message: &mut Message) {
        if let Some(content) = &self.content {
            message.content.clone_from(content);
        }
        if let Some(status) = self.status {
            message.status = Some(status);
        }
        if let Some(source) = self.source {
            message.source = Some(source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_merges_only_provided_fields() {
        let mut message = Message {
            id: Message::generate_id(),
            role: Role::User,
            content: "hello".to_string(),
            timestamp: Message::current_timestamp(),
            status: Some(MessageStatus::Sending),
            source: Some(MessageSource::Glean),
        };

        MessageUpdate::status(MessageStatus::Sent).apply(&mut message);
        assert_eq!(message.status, Some(MessageStatus::Sent));
        assert_eq!(message.content, "hello");
        assert_eq!(message.source, Some(MessageSource::Glean));
    }

    #[test]
    fn ids_carry_message_prefix() {
        assert!(Message::generate_id().starts_with("msg_"));
    }
}

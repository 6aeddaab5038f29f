//! Orchestration of one user turn.

use std::sync::Arc;

use tracing::debug;

use crate::api::{ChatClient, ChatMessage, Fragment};

use super::message::{MessageSource, MessageStatus, MessageUpdate, NewMessage, Role};
use super::store::MessageStore;

/// Shown when a transport failure carries no message text.
const GENERIC_SEND_FAILURE: &str = "An error occurred while sending the message";

/// Drives one user turn: appends the outgoing message, streams the reply
/// into a single assistant message, and resolves delivery status.
pub struct ChatController {
    client: ChatClient,
    store: Arc<MessageStore>,
}

impl ChatController {
    pub fn new(client: ChatClient, store: Arc<MessageStore>) -> Self {
        Self { client, store }
    }

    /// Send one message. Empty (after trimming) text is a silent no-op.
    ///
    /// Overlapping calls are allowed: the accumulation state lives in the
    /// per-call sink, so concurrent sends build independent assistant
    /// messages.
    pub async fn send(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let user_message = self.store.add(
            NewMessage::new(Role::User, text)
                .with_status(MessageStatus::Sending)
                .with_source(MessageSource::Glean),
        );

        let mut assistant_id: Option<String> = None;
        let mut accumulated = String::new();
        let store = Arc::clone(&self.store);
        let mut sink = |message: &ChatMessage| {
            for fragment in &message.fragments {
                let Some(text) = fragment_text(fragment) else {
                    continue;
                };
                match &assistant_id {
                    Some(id) => {
                        accumulated.push('\n');
                        accumulated.push_str(&text);
                        store.update(id, &MessageUpdate::content(accumulated.clone()));
                    }
                    None => {
                        accumulated = text;
                        let created = store.add(
                            NewMessage::new(Role::Assistant, accumulated.clone())
                                .with_status(MessageStatus::Sending)
                                .with_source(MessageSource::Glean),
                        );
                        assistant_id = Some(created.id);
                    }
                }
            }
        };

        let response = self.client.send_chat(text, Some(&mut sink)).await;

        if let Some(error) = &response.error {
            debug!(target: "chat", %error, status = response.status, "send failed");
            self.store
                .update(&user_message.id, &MessageUpdate::status(MessageStatus::Error));
            let description = if error.trim().is_empty() {
                GENERIC_SEND_FAILURE
            } else {
                error.as_str()
            };
            self.store.add(
                NewMessage::new(Role::System, format!("Error: {description}"))
                    .with_source(MessageSource::System),
            );
        } else {
            self.store
                .update(&user_message.id, &MessageUpdate::status(MessageStatus::Sent));
        }

        // No further content arrives once the call has returned.
        if let Some(id) = assistant_id {
            self.store
                .update(&id, &MessageUpdate::status(MessageStatus::Sent));
        }
    }
}

/// Map a fragment to renderable text: `text` as-is, structured results as
/// the comma-joined non-empty document titles, a query suggestion as its
/// query. Returns `None` when the fragment contributes nothing.
pub(crate) fn fragment_text(fragment: &Fragment) -> Option<String> {
    if let Some(text) = &fragment.text {
        return Some(text.clone());
    }
    if let Some(results) = &fragment.structured_results {
        let titles: Vec<&str> = results
            .iter()
            .filter_map(|result| result.document.as_ref())
            .filter_map(|document| document.title.as_deref())
            .filter(|title| !title.is_empty())
            .collect();
        if titles.is_empty() {
            return None;
        }
        return Some(titles.join(", "));
    }
    if let Some(suggestion) = &fragment.query_suggestion {
        return Some(suggestion.query.clone());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Document, QuerySuggestion, StructuredResult};
    use rstest::rstest;

    fn titled(title: Option<&str>) -> StructuredResult {
        StructuredResult {
            document: Some(Document {
                title: title.map(str::to_string),
                id: None,
                url: None,
            }),
        }
    }

    #[test]
    fn text_fragment_maps_as_is() {
        assert_eq!(fragment_text(&Fragment::text("hello")), Some("hello".to_string()));
    }

    #[test]
    fn structured_results_join_titles_and_drop_untitled() {
        let fragment = Fragment {
            structured_results: Some(vec![
                titled(Some("First")),
                titled(None),
                StructuredResult { document: None },
                titled(Some("Second")),
            ]),
            ..Fragment::default()
        };
        assert_eq!(fragment_text(&fragment), Some("First, Second".to_string()));
    }

    #[test]
    fn structured_results_with_no_titles_contribute_nothing() {
        let fragment = Fragment {
            structured_results: Some(vec![titled(None), titled(Some(""))]),
            ..Fragment::default()
        };
        assert_eq!(fragment_text(&fragment), None);
    }

    #[test]
    fn query_suggestion_maps_to_its_query() {
        let fragment = Fragment {
            query_suggestion: Some(QuerySuggestion {
                query: "expense policy".to_string(),
                datasource: "confluence".to_string(),
            }),
            ..Fragment::default()
        };
        assert_eq!(fragment_text(&fragment), Some("expense policy".to_string()));
    }

    #[rstest]
    #[case(Fragment::default())]
    #[case(Fragment { structured_results: Some(vec![]), ..Fragment::default() })]
    fn empty_fragments_contribute_nothing(#[case] fragment: Fragment) {
        assert_eq!(fragment_text(&fragment), None);
    }
}

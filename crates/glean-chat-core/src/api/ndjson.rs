//! Newline-delimited JSON body parsing.
//!
//! Each line is decoded independently; a malformed line is skipped and never
//! affects its siblings. Messages are delivered to the sink in line order,
//! then array order within a line.

use serde::Deserialize;
use tracing::warn;

use crate::api::wire::ChatMessage;

#[derive(Debug, Deserialize)]
struct StreamLine {
    #[serde(default)]
    messages: Option<Vec<ChatMessage>>,
}

/// Outcome of decoding a single line.
#[derive(Debug)]
pub(crate) enum LineOutcome {
    /// Valid JSON with a `messages` array.
    Messages(Vec<ChatMessage>),
    /// Valid JSON without a `messages` array; nothing to deliver.
    NoMessages,
    /// Not valid JSON; skipped.
    Skipped { reason: String },
}

pub(crate) fn parse_line(line: &str) -> LineOutcome {
    match serde_json::from_str::<StreamLine>(line) {
        Ok(StreamLine {
            messages: Some(messages),
        }) => LineOutcome::Messages(messages),
        Ok(StreamLine { messages: None }) => LineOutcome::NoMessages,
        Err(err) => LineOutcome::Skipped {
            reason: err.to_string(),
        },
    }
}

/// Parse a full response body, delivering every message to `sink` exactly
/// once. Blank lines are discarded; skipped lines are logged.
pub(crate) fn parse_body(body: &str, sink: &mut dyn FnMut(ChatMessage)) {
    for line in body.lines().filter(|line| !line.trim().is_empty()) {
        match parse_line(line) {
            LineOutcome::Messages(messages) => {
                for message in messages {
                    sink(message);
                }
            }
            LineOutcome::NoMessages => {}
            LineOutcome::Skipped { reason } => {
                warn!(target: "api", %reason, line, "failed to parse response line, skipping");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::wire::Author;

    fn collect(body: &str) -> Vec<ChatMessage> {
        let mut seen = Vec::new();
        parse_body(body, &mut |message| seen.push(message));
        seen
    }

    #[test]
    fn delivers_messages_in_line_then_array_order() {
        let body = concat!(
            r#"{"messages":[{"author":"USER","fragments":[{"text":"a"}]},{"author":"GLEAN_AI","fragments":[{"text":"b"}]}]}"#,
            "\n",
            r#"{"messages":[{"author":"GLEAN_AI","fragments":[{"text":"c"}]}]}"#,
            "\n",
        );
        let seen = collect(body);
        let texts: Vec<_> = seen
            .iter()
            .map(|m| m.fragments[0].text.clone().unwrap())
            .collect();
        assert_eq!(texts, ["a", "b", "c"]);
        assert_eq!(seen[0].author, Author::User);
    }

    #[test]
    fn blank_lines_are_discarded() {
        let body = "\n\n  \n{\"messages\":[{\"author\":\"USER\",\"fragments\":[]}]}\n\n";
        assert_eq!(collect(body).len(), 1);
    }

    #[test]
    fn malformed_line_is_skipped_without_affecting_siblings() {
        let body = concat!(
            "this is not json\n",
            r#"{"messages":[{"author":"GLEAN_AI","fragments":[{"text":"ok"}]}]}"#,
            "\n",
            "{\"broken\n",
        );
        let seen = collect(body);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].fragments[0].text.as_deref(), Some("ok"));
    }

    #[test]
    fn valid_json_without_messages_field_delivers_nothing() {
        assert!(collect("{\"trackingToken\":\"abc\"}\n").is_empty());
        assert!(matches!(
            parse_line("{\"trackingToken\":\"abc\"}"),
            LineOutcome::NoMessages
        ));
    }

    #[test]
    fn line_outcomes_are_tagged() {
        assert!(matches!(
            parse_line(r#"{"messages":[]}"#),
            LineOutcome::Messages(ref m) if m.is_empty()
        ));
        assert!(matches!(parse_line("nope"), LineOutcome::Skipped { .. }));
    }
}

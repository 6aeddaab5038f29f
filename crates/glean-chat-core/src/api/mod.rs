//! HTTP transport for the chat backend.
//!
//! [`ChatClient`] performs one request/response exchange, parses the body as
//! newline-delimited JSON and emits every parsed [`ChatMessage`] to an
//! optional sink in arrival order. All failure modes surface through the
//! returned [`ApiResponse`]; nothing escapes the client as an `Err` or panic.
//!
//! The endpoint is named a streaming call, but only the response *format* is
//! streamed: the client reads the entire body before parsing, so the sink
//! fires in a burst once the response has arrived.

pub mod error;
mod ndjson;
pub mod wire;

use std::sync::Arc;

use reqwest::{Method, header};
use tracing::debug;

use crate::config::CredentialStore;

pub use error::ApiError;
pub use wire::{Author, ChatMessage, ChatRequest, Document, Fragment, QuerySuggestion, StructuredResult};

/// Uniform transport outcome. `error` and `data` are never both populated;
/// `status` is the HTTP status, or 0 for a network-level failure with no
/// response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub status: u16,
}

impl<T> ApiResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn failure(err: &ApiError) -> Self {
        Self {
            data: None,
            error: Some(err.to_string()),
            status: err.status(),
        }
    }
}

/// Options for a single request. Defaults to GET with no body.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn post(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
        }
    }
}

/// Per-message sink invoked as parsed protocol messages are delivered.
pub type StreamSink<'a> = &'a mut dyn FnMut(&ChatMessage);

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    credentials: Arc<dyn CredentialStore>,
}

impl ChatClient {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
        }
    }

    /// Send one chat turn. Body shape:
    /// `{"stream": true, "messages": [{"author": "USER", "fragments": [{"text": ...}]}]}`.
    pub async fn send_chat(
        &self,
        text: &str,
        on_stream_message: Option<StreamSink<'_>>,
    ) -> ApiResponse<ChatMessage> {
        let request = ChatRequest::from_user_text(text);
        let body = serde_json::to_value(&request).expect("chat request serializes");
        self.call("/chat", RequestOptions::post(body), on_stream_message)
            .await
    }

    /// Issue a request against the configured backend and fold the
    /// newline-delimited response into protocol messages.
    ///
    /// The bearer token is attached only when one is available; its absence
    /// does not block the call. `data` carries the last delivered message,
    /// or `None` when zero messages were parsed.
    pub async fn call(
        &self,
        endpoint: &str,
        options: RequestOptions,
        on_stream_message: Option<StreamSink<'_>>,
    ) -> ApiResponse<ChatMessage> {
        let url = format!("{}/rest/api/v1{}", self.credentials.backend_url(), endpoint);
        debug!(target: "api", %url, method = %options.method, "sending request");

        let mut request = self.http.request(options.method.clone(), &url);
        if let Some(token) = self.credentials.token() {
            request = request.bearer_auth(token);
        }
        request = request.header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                debug!(target: "api", error = %err, "request failed to complete");
                return ApiResponse::failure(&ApiError::Network(err));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                debug!(target: "api", error = %err, "failed to read response body");
                return ApiResponse::failure(&ApiError::Network(err));
            }
        };

        if !status.is_success() {
            debug!(target: "api", status = status.as_u16(), "request rejected");
            return ApiResponse::failure(&ApiError::Http {
                status: status.as_u16(),
            });
        }

        let mut on_stream_message = on_stream_message;
        let mut last = None;
        ndjson::parse_body(&body, &mut |message| {
            if let Some(sink) = on_stream_message.as_deref_mut() {
                sink(&message);
            }
            last = Some(message);
        });
        debug!(target: "api", status = status.as_u16(), delivered = last.is_some(), "request complete");

        ApiResponse {
            data: last,
            error: None,
            status: status.as_u16(),
        }
    }
}

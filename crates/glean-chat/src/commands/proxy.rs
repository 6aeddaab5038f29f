//! Development proxy.
//!
//! Forwards every request to the configured backend and adds permissive
//! CORS headers, so the browser-hosted widget can talk to the backend from
//! another origin during development. Preflight requests are answered
//! directly.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{error, info};

use crate::error::Error;

#[derive(Clone)]
struct ProxyState {
    client: reqwest::Client,
    target: String,
}

pub async fn run(port: u16, target: String) -> Result<(), Error> {
    let state = ProxyState {
        client: reqwest::Client::new(),
        target,
    };
    let app = Router::new().fallback(forward).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!(
        "proxy listening on http://{} forwarding to {}",
        listener.local_addr()?,
        state.target
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers
}

async fn forward(State(state): State<ProxyState>, request: Request<Body>) -> Response {
    if request.method() == Method::OPTIONS {
        return (StatusCode::OK, cors_headers()).into_response();
    }

    let method = request.method().clone();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map_or("/", |pq| pq.as_str())
        .to_string();
    let url = format!("{}{}", state.target, path_and_query);

    let mut upstream = state.client.request(
        reqwest::Method::from_bytes(method.as_str().as_bytes())
            .unwrap_or(reqwest::Method::GET),
        &url,
    );
    for name in [header::AUTHORIZATION, header::CONTENT_TYPE] {
        if let Some(value) = request.headers().get(&name)
            && let Ok(value) = value.to_str()
        {
            upstream = upstream.header(name.as_str(), value);
        }
    }

    let body = match axum::body::to_bytes(request.into_body(), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!("failed to read request body: {err}");
            return proxy_error();
        }
    };
    if !body.is_empty() {
        upstream = upstream.body(body);
    }

    let response = match upstream.send().await {
        Ok(response) => response,
        Err(err) => {
            error!("proxy error: {err}");
            return proxy_error();
        }
    };

    let status =
        StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut headers = cors_headers();
    if let Some(content_type) = response.headers().get(reqwest::header::CONTENT_TYPE)
        && let Ok(value) = HeaderValue::from_bytes(content_type.as_bytes())
    {
        headers.insert(header::CONTENT_TYPE, value);
    }

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!("failed to read upstream body: {err}");
            return proxy_error();
        }
    };

    (status, headers, Bytes::from(bytes)).into_response()
}

fn proxy_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        cors_headers(),
        "Proxy error occurred",
    )
        .into_response()
}

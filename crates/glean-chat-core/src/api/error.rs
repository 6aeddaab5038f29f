use thiserror::Error;

/// Transport-internal failure taxonomy. Never crosses the [`ChatClient`]
/// boundary: every variant is folded into an [`ApiResponse`] before return.
///
/// [`ChatClient`]: crate::api::ChatClient
/// [`ApiResponse`]: crate::api::ApiResponse
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not complete or the body could not be read.
    /// Reported with status 0.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server responded outside the success range.
    #[error("API request failed with status {status}")]
    Http { status: u16 },
}

impl ApiError {
    /// HTTP status to report in the result, 0 for network-level failures
    /// with no response.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Network(_) => 0,
            ApiError::Http { status } => *status,
        }
    }
}

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the remote resource client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status. Domain rejections
    /// (duplicate author name, unknown circle) arrive this way too,
    /// distinguished only by the body text.
    #[error("api error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    /// The request never completed: DNS, TLS, connection, or a body that
    /// failed to decode.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Rejected client-side before any remote call was made.
    #[error("{0}")]
    Validation(String),
}

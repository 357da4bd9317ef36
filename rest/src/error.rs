use thiserror::Error;

/// Errors surfaced by the REST layer. Kept distinct from the crate-wide
/// `core::error::CoreError` taxonomy so `rest` has no dependency on
/// `core`; the conversion happens at the `core` boundary.
#[derive(Debug, Error)]
pub enum RestError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to decode json response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("discord oauth endpoint returned {status}: {body}")]
    UpstreamAuthError { status: u16, body: String },

    #[error("discord api returned {status}: {body}")]
    UpstreamHttpError { status: u16, body: String },

    #[error("rate limited, retry after {retry_after_secs:.3}s")]
    RateLimited { retry_after_secs: f64 },

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

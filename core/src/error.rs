use thiserror::Error;

/// Internal error taxonomy the core distinguishes, independent of however
/// a transport maps it onto wire status codes.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid state token")]
    InvalidState,

    #[error("state token expired")]
    ExpiredState,

    #[error("session expired")]
    SessionExpired,

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("upstream auth error: {0}")]
    UpstreamAuthError(String),

    #[error("upstream http error: {0}")]
    UpstreamHttpError(String),

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: f64 },

    #[error("gateway protocol error: {0}")]
    GatewayProtocolError(String),

    #[error("store error: {0}")]
    StoreError(String),

    #[error("canceled")]
    Canceled,

    #[error("internal error: {0}")]
    Internal(String),

    /// Surfaced when gateway support is disabled by configuration and a
    /// caller asks for a streaming subscription anyway; the wire mapping
    /// below carries it as its own status rather than folding it into
    /// `Internal`.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = core::result::Result<T, CoreError>;

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => CoreError::NotFound("row not found".into()),
            other => CoreError::StoreError(other.to_string()),
        }
    }
}

impl From<rest::RestError> for CoreError {
    fn from(err: rest::RestError) -> Self {
        match err {
            rest::RestError::UpstreamAuthError { status, body } => {
                CoreError::UpstreamAuthError(format!("{status}: {body}"))
            }
            rest::RestError::UpstreamHttpError { status, body } => {
                CoreError::UpstreamHttpError(format!("{status}: {body}"))
            }
            rest::RestError::RateLimited { retry_after_secs } => {
                CoreError::RateLimited { retry_after_secs }
            }
            other => CoreError::Internal(other.to_string()),
        }
    }
}

impl From<gateway::GatewayError> for CoreError {
    fn from(err: gateway::GatewayError) -> Self {
        CoreError::GatewayProtocolError(err.to_string())
    }
}

/// Errors the core surfaces at the `gateway::GatewayStore`/`GatewayAuth`
/// boundary get folded back into `gateway::GatewayError` there; this is
/// the inverse direction, used when core code calls into those traits'
/// concrete implementations directly.
impl From<CoreError> for gateway::GatewayError {
    fn from(err: CoreError) -> Self {
        gateway::GatewayError::Store(err.to_string())
    }
}

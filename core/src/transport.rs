use tonic::Status;

use crate::error::CoreError;

/// Maps the internal error taxonomy onto gRPC status codes, the obvious
/// target given `StreamMessages`'s server-streaming shape. No
/// `.proto`-derived service code is generated or vendored here; this
/// repository only supplies the conversion an external transport would
/// consult at the boundary.
///
/// Per §7's propagation policy, wrapper text from lower layers (driver
/// errors, upstream response bodies, protocol detail) never reaches the
/// wire message — only the handful of variants whose string is itself a
/// short, caller-safe reason (a `PermissionDenied`/`NotFound` target, a
/// rate-limit wait) are passed through verbatim. Everything else collapses
/// to a fixed, generic message; the detailed error is for server logs.
impl From<CoreError> for Status {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(msg) => Status::invalid_argument(msg),
            CoreError::NotFound(msg) => Status::not_found(msg),
            CoreError::AlreadyExists(msg) => Status::already_exists(msg),
            CoreError::InvalidState | CoreError::ExpiredState => {
                Status::invalid_argument("invalid state")
            }
            CoreError::SessionExpired | CoreError::Unauthenticated => {
                Status::unauthenticated("unauthenticated")
            }
            CoreError::PermissionDenied(msg) => Status::permission_denied(msg),
            CoreError::EncryptionFailed | CoreError::DecryptionFailed => {
                Status::internal("internal error")
            }
            CoreError::UpstreamAuthError(_) | CoreError::UpstreamHttpError(_) => {
                Status::internal("upstream request failed")
            }
            CoreError::RateLimited { retry_after_secs } => {
                Status::resource_exhausted(format!("rate limited, retry after {retry_after_secs}s"))
            }
            CoreError::GatewayProtocolError(_) => Status::internal("internal error"),
            CoreError::StoreError(_) => Status::internal("internal error"),
            CoreError::Canceled => Status::cancelled("canceled"),
            CoreError::Internal(_) => Status::internal("internal error"),
            CoreError::Unavailable(_) => Status::unavailable("unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_unauthenticated_kinds() {
        let status: Status = CoreError::Unauthenticated.into();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
    }

    #[test]
    fn maps_permission_denied() {
        let status: Status = CoreError::PermissionDenied("no access".into()).into();
        assert_eq!(status.code(), tonic::Code::PermissionDenied);
    }

    #[test]
    fn maps_unavailable_for_disabled_gateway() {
        let status: Status = CoreError::Unavailable("websocket support is disabled".into()).into();
        assert_eq!(status.code(), tonic::Code::Unavailable);
    }

    #[test]
    fn store_error_detail_never_reaches_the_wire_message() {
        let status: Status =
            CoreError::StoreError("duplicate key value violates unique constraint \"users_pkey\"".into())
                .into();
        assert_eq!(status.code(), tonic::Code::Internal);
        assert!(!status.message().contains("users_pkey"));
    }

    #[test]
    fn permission_denied_reason_is_preserved() {
        let status: Status =
            CoreError::PermissionDenied("no access to channel 42".into()).into();
        assert_eq!(status.message(), "no access to channel 42");
    }
}

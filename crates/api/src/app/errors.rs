//! The one place where a denial becomes an HTTP response.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use baro_auth::{Denial, ErrorKind};

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::NotAMember
        | ErrorKind::InsufficientRole
        | ErrorKind::InsufficientPermission
        | ErrorKind::RoleMissing
        | ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::InvalidRole | ErrorKind::ConfigError | ErrorKind::UpstreamLookupFailure => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Map a pipeline denial to a response.
///
/// With `strict` set, a `ConfigError` panics so ordering mistakes are caught
/// in development instead of being served as 500s.
pub fn denial_to_response(denial: Denial, strict: bool) -> axum::response::Response {
    if denial.kind == ErrorKind::ConfigError && strict {
        panic!("guard pipeline misconfigured: {}", denial.message);
    }
    if denial.kind.is_server_fault() {
        tracing::error!(kind = %denial.kind, message = %denial.message, "authorization failed on server side");
    }

    json_error(status_for(denial.kind), denial.kind.as_str(), denial.message)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

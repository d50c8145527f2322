use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use iam_identity::IdentityError;

/// Wraps [`iam_core::Error`] so it can be returned directly from a handler;
/// the conversion to the §6 failure envelope lives on [`iam_core::ErrorResponse`],
/// this just bridges that into axum.
pub struct ApiError(pub iam_core::Error);

impl From<iam_core::Error> for ApiError {
    fn from(err: iam_core::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = iam_core::ErrorResponse::from(&self.0);
        let status = StatusCode::from_u16(body.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

/// `iam_identity::IdentityError` has no `From<IdentityError> for iam_core::Error`
/// (only `From<&IdentityError> for iam_core::ErrorKind`, which can't carry a
/// message): the pipeline's auth stage needs the richer `Error` variant, so
/// it reconstructs one from the kind plus the error's own `Display`.
pub fn identity_error_to_core(err: IdentityError) -> iam_core::Error {
    let message = err.to_string();
    match iam_core::ErrorKind::from(&err) {
        iam_core::ErrorKind::Conflict => iam_core::Error::Conflict(message),
        iam_core::ErrorKind::NotFound => iam_core::Error::NotFound(message),
        iam_core::ErrorKind::Unauthenticated => iam_core::Error::Unauthenticated,
        iam_core::ErrorKind::Validation => iam_core::Error::Validation(message),
        iam_core::ErrorKind::Dependency => iam_core::Error::Dependency(message),
        // The remaining kinds are never produced by `IdentityError`.
        _ => iam_core::Error::Internal(message),
    }
}

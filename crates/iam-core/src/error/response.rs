use serde::Serialize;

use super::{Error, ErrorKind};

/// Failure envelope for §6: `{ success:false, error, details? }`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    #[serde(skip)]
    pub status_code: u16,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: kind.status_code(),
            error: ErrorBody {
                kind,
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        // Never surface the raw Display of a database error: it can leak
        // internal identifiers or schema detail (spec §7 "never leak").
        let message = match err {
            Error::Database(_) => "an internal error occurred".to_string(),
            other => other.to_string(),
        };
        ErrorResponse::new(err.kind(), message)
    }
}

impl From<Error> for ErrorResponse {
    fn from(err: Error) -> Self {
        ErrorResponse::from(&err)
    }
}

//! Error taxonomy for the identity core.
//!
//! Every service returns a typed [`Error`] carrying a stable [`ErrorKind`].
//! The request pipeline (apps/server) maps kinds to HTTP status codes; this
//! crate owns the mapping so every collaborator agrees on it.

pub mod response;

pub use response::ErrorResponse;

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// Stable, serializable identifier for an error category (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    NotFound,
    Conflict,
    Validation,
    InvitationState,
    EmailMismatch,
    LastAdminRemoval,
    Dependency,
    Internal,
}

impl ErrorKind {
    /// HTTP status code this kind maps to, per spec §7.
    pub fn status_code(self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Validation => 400,
            Self::InvitationState => 400,
            Self::EmailMismatch => 400,
            Self::LastAdminRemoval => 400,
            Self::Dependency => 502,
            Self::Internal => 500,
        }
    }

    /// Whether a job-runtime consumer may retry an operation that failed
    /// with this kind (spec §7 propagation policy).
    pub fn is_retriable(self) -> bool {
        matches!(self, Self::Dependency | Self::Internal)
    }
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invitation is not pending: {0}")]
    InvitationState(String),

    #[error("authenticated email does not match invitation")]
    EmailMismatch,

    #[error("operation would remove the last admin of the tenant")]
    LastAdminRemoval,

    #[error("dependency unavailable: {0}")]
    Dependency(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvitationState(_) => ErrorKind::InvitationState,
            Self::EmailMismatch => ErrorKind::EmailMismatch,
            Self::LastAdminRemoval => ErrorKind::LastAdminRemoval,
            Self::Dependency(_) => ErrorKind::Dependency,
            Self::Internal(_) => ErrorKind::Internal,
            // A raw DbErr means the caller never got to classify the
            // failure; surface it as an opaque 5xx rather than leaking it.
            Self::Database(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_maps_to_spec_status_codes() {
        assert_eq!(ErrorKind::Unauthenticated.status_code(), 401);
        assert_eq!(ErrorKind::Forbidden.status_code(), 403);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
        assert_eq!(ErrorKind::Validation.status_code(), 400);
        assert_eq!(ErrorKind::Dependency.status_code(), 502);
        assert_eq!(ErrorKind::Internal.status_code(), 500);
    }

    #[test]
    fn only_dependency_and_internal_are_retriable() {
        assert!(ErrorKind::Dependency.is_retriable());
        assert!(ErrorKind::Internal.is_retriable());
        assert!(!ErrorKind::Conflict.is_retriable());
        assert!(!ErrorKind::Validation.is_retriable());
        assert!(!ErrorKind::LastAdminRemoval.is_retriable());
    }

    #[test]
    fn last_admin_removal_is_a_400() {
        let err = Error::LastAdminRemoval;
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.kind(), ErrorKind::LastAdminRemoval);
    }
}

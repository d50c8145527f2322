use thiserror::Error;

/// Kind-coded, non-retrying failure model for every adapter operation
/// (spec §4.1). Retries are the caller's responsibility.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("no account found for this email")]
    NotFound,

    #[error("request carries no valid session")]
    Unauthenticated,

    #[error("identity provider rejected the request: {0}")]
    Rejected(String),

    #[error("identity provider is unreachable: {0}")]
    Unavailable(String),
}

impl From<&IdentityError> for iam_core::ErrorKind {
    fn from(err: &IdentityError) -> Self {
        match err {
            IdentityError::EmailTaken => iam_core::ErrorKind::Conflict,
            IdentityError::NotFound => iam_core::ErrorKind::NotFound,
            IdentityError::Unauthenticated => iam_core::ErrorKind::Unauthenticated,
            IdentityError::Rejected(_) => iam_core::ErrorKind::Validation,
            IdentityError::Unavailable(_) => iam_core::ErrorKind::Dependency,
        }
    }
}

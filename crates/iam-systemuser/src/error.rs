use thiserror::Error;

use iam_identity::IdentityError;

#[derive(Debug, Error)]
pub enum SystemUserError {
    #[error("system user not found")]
    NotFound,

    #[error("identity provider rejected the request: {0}")]
    Identity(#[from] IdentityError),

    #[error("system user store is unavailable: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<SystemUserError> for iam_core::Error {
    fn from(err: SystemUserError) -> Self {
        match err {
            SystemUserError::NotFound => iam_core::Error::NotFound("system user".into()),
            SystemUserError::Identity(err) => iam_core::Error::Dependency(err.to_string()),
            SystemUserError::Database(err) => iam_core::Error::Database(err),
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TenantError {
    #[error("tenant not found")]
    NotFound,

    #[error("slug already in use")]
    SlugTaken,

    #[error("invalid tenant name: must be 3-255 characters")]
    InvalidName,

    #[error("invalid slug: must match [a-z0-9-]+, 3-255 characters")]
    InvalidSlug,

    #[error("illegal tenant status transition: {0}")]
    IllegalTransition(String),

    #[error("tenant store is unavailable: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<TenantError> for iam_core::Error {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::NotFound => iam_core::Error::NotFound("tenant".into()),
            TenantError::SlugTaken => iam_core::Error::Conflict("slug already in use".into()),
            TenantError::InvalidName => iam_core::Error::Validation("invalid tenant name".into()),
            TenantError::InvalidSlug => iam_core::Error::Validation("invalid slug".into()),
            TenantError::IllegalTransition(msg) => iam_core::Error::Conflict(msg),
            TenantError::Database(err) => iam_core::Error::Database(err),
        }
    }
}

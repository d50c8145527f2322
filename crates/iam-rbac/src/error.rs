use thiserror::Error;

#[derive(Debug, Error)]
pub enum RbacError {
    #[error("permission store is unavailable: {0}")]
    Unavailable(String),
}

impl From<RbacError> for iam_core::Error {
    fn from(err: RbacError) -> Self {
        match err {
            RbacError::Unavailable(msg) => iam_core::Error::Dependency(msg),
        }
    }
}

impl From<sea_orm::DbErr> for RbacError {
    fn from(err: sea_orm::DbErr) -> Self {
        RbacError::Unavailable(err.to_string())
    }
}

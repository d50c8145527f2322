use thiserror::Error;

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("member already exists for this tenant and user")]
    Duplicate,

    #[error("member not found")]
    NotFound,

    #[error("operation would remove the last admin of the tenant")]
    LastAdminRemoval,

    #[error("membership store is unavailable: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<MembershipError> for iam_core::Error {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::Duplicate => iam_core::Error::Conflict("member already exists".into()),
            MembershipError::NotFound => iam_core::Error::NotFound("member".into()),
            MembershipError::LastAdminRemoval => iam_core::Error::LastAdminRemoval,
            MembershipError::Database(err) => iam_core::Error::Database(err),
        }
    }
}

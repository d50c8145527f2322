use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvitationError {
    #[error("invitation not found")]
    NotFound,

    #[error("an active invitation already exists for this tenant and email")]
    Duplicate,

    #[error("authenticated email does not match invitation")]
    EmailMismatch,

    #[error("invitation was already accepted")]
    AlreadyAccepted,

    #[error("invitation is not pending: {0}")]
    NotPending(String),

    #[error("invitation store is unavailable: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<InvitationError> for iam_core::Error {
    fn from(err: InvitationError) -> Self {
        match err {
            InvitationError::NotFound => iam_core::Error::NotFound("invitation".into()),
            InvitationError::Duplicate => {
                iam_core::Error::Conflict("active invitation already exists".into())
            }
            InvitationError::EmailMismatch => iam_core::Error::EmailMismatch,
            InvitationError::AlreadyAccepted => {
                iam_core::Error::InvitationState("already accepted".into())
            }
            InvitationError::NotPending(state) => iam_core::Error::InvitationState(state),
            InvitationError::Database(err) => iam_core::Error::Database(err),
        }
    }
}

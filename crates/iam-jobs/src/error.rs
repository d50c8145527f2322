use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job not found")]
    NotFound,

    #[error("job payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("job store is unavailable: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<JobError> for iam_core::Error {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound => iam_core::Error::NotFound("job".into()),
            JobError::Payload(msg) => iam_core::Error::Internal(msg.to_string()),
            JobError::Database(err) => iam_core::Error::Database(err),
        }
    }
}

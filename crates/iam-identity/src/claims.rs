use uuid::Uuid;

/// What the pipeline (C9) learns from a successfully authenticated request.
/// Carries at minimum the user id, per spec §4.1; system callers additionally
/// get `is_system_user`/`service_name` populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    pub user_id: Uuid,
    pub email: String,
    pub is_system_user: bool,
    pub service_name: Option<String>,
}

impl IdentityClaims {
    pub fn human(user_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            is_system_user: false,
            service_name: None,
        }
    }

    pub fn system(user_id: Uuid, email: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            is_system_user: true,
            service_name: Some(service_name.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Cookie,
    Header,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub token: String,
    pub mode: SessionMode,
}

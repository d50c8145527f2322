use async_trait::async_trait;
use uuid::Uuid;

use crate::claims::{IdentityClaims, SessionHandle, SessionMode};
use crate::error::IdentityError;

/// Opaque facade over an external identity service (spec §4.1). The core
/// never speaks the provider's wire format; substituting any conformant
/// provider must be possible without touching a caller.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up_email_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Uuid, IdentityError>;

    async fn lookup_by_email(&self, email: &str) -> Result<Uuid, IdentityError>;

    async fn issue_session(
        &self,
        user_id: Uuid,
        mode: SessionMode,
    ) -> Result<SessionHandle, IdentityError>;

    async fn authenticate_request(
        &self,
        bearer_token: Option<&str>,
        cookie: Option<&str>,
    ) -> Result<IdentityClaims, IdentityError>;

    async fn revoke_all_sessions(&self, user_id: Uuid) -> Result<(), IdentityError>;

    /// Replaces `user_id`'s stored credential in-place (spec §4.7
    /// `RegeneratePassword`/`RotateWithGracePeriod`). Does not itself revoke
    /// sessions — callers that need that do it as a separate step.
    async fn reset_password(&self, user_id: Uuid, new_password: &str) -> Result<(), IdentityError>;

    fn generate_machine_password(&self) -> String;
}

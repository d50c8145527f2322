use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::claims::{IdentityClaims, SessionHandle, SessionMode};
use crate::error::IdentityError;
use crate::password::{generate_machine_password, hash_password, verify_password};
use crate::provider::IdentityProvider;

struct UserRecord {
    email: String,
    password_hash: String,
}

/// Deterministic in-process stand-in for an external identity service.
/// This is the shipped default (spec §4.1/§9): no network calls, no
/// external dependency to stand up, suitable for both single-node
/// deployments and tests.
#[derive(Default)]
pub struct MemoryIdentityProvider {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    email_index: RwLock<HashMap<String, Uuid>>,
    sessions: RwLock<HashMap<String, IdentityClaims>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize_email(email: &str) -> String {
        email.trim().to_ascii_lowercase()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_up_email_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Uuid, IdentityError> {
        let normalized = Self::normalize_email(email);

        let mut email_index = self.email_index.write().unwrap();
        if email_index.contains_key(&normalized) {
            return Err(IdentityError::EmailTaken);
        }

        let password_hash = hash_password(password)
            .map_err(|e| IdentityError::Rejected(e.to_string()))?;

        let user_id = iam_core::generate_id();
        self.users.write().unwrap().insert(
            user_id,
            UserRecord {
                email: normalized.clone(),
                password_hash,
            },
        );
        email_index.insert(normalized, user_id);

        Ok(user_id)
    }

    async fn lookup_by_email(&self, email: &str) -> Result<Uuid, IdentityError> {
        let normalized = Self::normalize_email(email);
        self.email_index
            .read()
            .unwrap()
            .get(&normalized)
            .copied()
            .ok_or(IdentityError::NotFound)
    }

    async fn issue_session(
        &self,
        user_id: Uuid,
        mode: SessionMode,
    ) -> Result<SessionHandle, IdentityError> {
        let users = self.users.read().unwrap();
        let record = users.get(&user_id).ok_or(IdentityError::NotFound)?;
        let claims = IdentityClaims::human(user_id, record.email.clone());
        drop(users);

        let token = generate_machine_password();
        self.sessions
            .write()
            .unwrap()
            .insert(token.clone(), claims);

        Ok(SessionHandle { token, mode })
    }

    async fn authenticate_request(
        &self,
        bearer_token: Option<&str>,
        cookie: Option<&str>,
    ) -> Result<IdentityClaims, IdentityError> {
        let token = bearer_token.or(cookie).ok_or(IdentityError::Unauthenticated)?;
        self.sessions
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(IdentityError::Unauthenticated)
    }

    async fn revoke_all_sessions(&self, user_id: Uuid) -> Result<(), IdentityError> {
        self.sessions
            .write()
            .unwrap()
            .retain(|_, claims| claims.user_id != user_id);
        Ok(())
    }

    async fn reset_password(&self, user_id: Uuid, new_password: &str) -> Result<(), IdentityError> {
        let mut users = self.users.write().unwrap();
        let record = users.get_mut(&user_id).ok_or(IdentityError::NotFound)?;
        record.password_hash =
            hash_password(new_password).map_err(|e| IdentityError::Rejected(e.to_string()))?;
        Ok(())
    }

    fn generate_machine_password(&self) -> String {
        generate_machine_password()
    }
}

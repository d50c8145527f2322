use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};
use uuid::Uuid;

use iam_core::{generate_id, guard_transition};
use iam_membership::tenant_member::{self, MemberStatus};

use crate::collaborators::InvitationEmailEnqueuer;
use crate::entities::invitation::{self, InvitationStatus};
use crate::error::InvitationError;
use crate::token::{generate_invite_token, hash_token};

/// Invitation lifecycle (spec §4.6).
#[derive(Clone)]
pub struct InvitationService {
    db: DatabaseConnection,
    ttl_hours: i64,
    base_url: String,
    email_enqueuer: Arc<dyn InvitationEmailEnqueuer>,
}

impl InvitationService {
    pub fn new(
        db: DatabaseConnection,
        ttl_hours: i64,
        base_url: String,
        email_enqueuer: Arc<dyn InvitationEmailEnqueuer>,
    ) -> Self {
        Self {
            db,
            ttl_hours,
            base_url,
            email_enqueuer,
        }
    }

    fn acceptance_url(&self, token: &str) -> String {
        format!("{}/{token}", self.base_url.trim_end_matches('/'))
    }

    /// Mints a token and enqueues the acceptance email; rejects a second
    /// active invitation for the same `(tenant, email)`.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        email: &str,
        role_id: Uuid,
        inviter: Uuid,
    ) -> Result<(invitation::Model, String), InvitationError> {
        let email = email.to_lowercase();
        let now = Utc::now().fixed_offset();

        let duplicate = invitation::Entity::find()
            .filter(invitation::Column::TenantId.eq(tenant_id))
            .filter(invitation::Column::Email.eq(email.clone()))
            .filter(invitation::Column::Status.eq(InvitationStatus::Pending))
            .filter(invitation::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await?;
        if duplicate.is_some() {
            return Err(InvitationError::Duplicate);
        }

        let (plaintext, token_hash) = generate_invite_token();
        let expires_at = now + Duration::hours(self.ttl_hours);

        let model = invitation::ActiveModel {
            id: ActiveValue::Set(generate_id()),
            tenant_id: ActiveValue::Set(tenant_id),
            email: ActiveValue::Set(email),
            role_id: ActiveValue::Set(role_id),
            invited_by: ActiveValue::Set(inviter),
            token_hash: ActiveValue::Set(token_hash),
            status: ActiveValue::Set(InvitationStatus::Pending),
            expires_at: ActiveValue::Set(expires_at),
            accepted_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.db)
        .await?;

        self.email_enqueuer
            .enqueue_invitation_email(model.id, self.acceptance_url(&plaintext))
            .await?;

        Ok((model, plaintext))
    }

    /// Looks up an invitation by its plaintext token. A pending-but-expired
    /// row is lazily transitioned to `expired` before being returned.
    pub async fn get_by_token(&self, token: &str) -> Result<invitation::Model, InvitationError> {
        let hash = hash_token(token);
        let found = invitation::Entity::find()
            .filter(invitation::Column::TokenHash.eq(hash))
            .one(&self.db)
            .await?
            .ok_or(InvitationError::NotFound)?;

        if found.status == InvitationStatus::Pending && Utc::now().fixed_offset() > found.expires_at {
            return Ok(self.expire(found).await?);
        }
        Ok(found)
    }

    /// Fetches an invitation by id, for collaborators (iam-jobs' email task)
    /// that already hold the id and need the current row rather than a
    /// token-based lookup.
    pub async fn get(&self, id: Uuid) -> Result<invitation::Model, InvitationError> {
        invitation::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvitationError::NotFound)
    }

    async fn expire(&self, model: invitation::Model) -> Result<invitation::Model, InvitationError> {
        let mut active: invitation::ActiveModel = model.into();
        active.status = ActiveValue::Set(InvitationStatus::Expired);
        active.updated_at = ActiveValue::Set(Utc::now().fixed_offset());
        Ok(active.update(&self.db).await?)
    }

    /// Accepts an invitation, creating the member row in the same
    /// transaction (spec §4.6). Re-accepting an already-accepted token is
    /// idempotent and fails with `AlreadyAccepted`, not a generic conflict.
    pub async fn accept(
        &self,
        token: &str,
        authenticated_user_id: Uuid,
        authenticated_email: &str,
    ) -> Result<tenant_member::Model, InvitationError> {
        let hash = hash_token(token);
        let txn = self.db.begin().await?;

        let found = invitation::Entity::find()
            .filter(invitation::Column::TokenHash.eq(hash))
            .one(&txn)
            .await?
            .ok_or(InvitationError::NotFound)?;

        if found.status == InvitationStatus::Accepted {
            return Err(InvitationError::AlreadyAccepted);
        }

        let now = Utc::now().fixed_offset();
        if found.status == InvitationStatus::Pending && now > found.expires_at {
            let mut active: invitation::ActiveModel = found.into();
            active.status = ActiveValue::Set(InvitationStatus::Expired);
            active.updated_at = ActiveValue::Set(now);
            active.update(&txn).await?;
            return Err(InvitationError::NotPending("expired".into()));
        }
        if found.status != InvitationStatus::Pending {
            return Err(InvitationError::NotPending(format!("{:?}", found.status).to_lowercase()));
        }
        if found.email != authenticated_email.to_lowercase() {
            return Err(InvitationError::EmailMismatch);
        }

        let (tenant_id, role_id, invited_by) = (found.tenant_id, found.role_id, found.invited_by);

        let mut active: invitation::ActiveModel = found.into();
        active.status = ActiveValue::Set(InvitationStatus::Accepted);
        active.accepted_at = ActiveValue::Set(Some(now));
        active.updated_at = ActiveValue::Set(now);
        active.update(&txn).await?;

        let member = iam_membership::repository::insert_member(
            &txn,
            tenant_id,
            authenticated_user_id,
            role_id,
            MemberStatus::Active,
            Some(invited_by),
        )
        .await?;

        txn.commit().await?;
        Ok(member)
    }

    /// Accepts every currently-pending, non-expired invitation addressed to
    /// `email`, each in its own transaction (spec §4.6). Invitations that
    /// fail (e.g. the member row already exists) are skipped rather than
    /// aborting the whole batch.
    pub async fn auto_accept_pending(
        &self,
        email: &str,
        user_id: Uuid,
    ) -> Result<Vec<tenant_member::Model>, InvitationError> {
        let email = email.to_lowercase();
        let now = Utc::now().fixed_offset();

        let pending = invitation::Entity::find()
            .filter(invitation::Column::Email.eq(email.clone()))
            .filter(invitation::Column::Status.eq(InvitationStatus::Pending))
            .filter(invitation::Column::ExpiresAt.gt(now))
            .all(&self.db)
            .await?;

        let mut accepted = Vec::new();
        for invitation in pending {
            if let Ok(member) = self.accept_by_hash(&invitation.token_hash, user_id, &email).await {
                accepted.push(member);
            }
        }
        Ok(accepted)
    }

    /// Shared by `auto_accept_pending`, which already has the stored hash
    /// and shouldn't re-derive it from a plaintext token it never had.
    async fn accept_by_hash(
        &self,
        token_hash: &str,
        authenticated_user_id: Uuid,
        authenticated_email: &str,
    ) -> Result<tenant_member::Model, InvitationError> {
        let txn = self.db.begin().await?;

        let found = invitation::Entity::find()
            .filter(invitation::Column::TokenHash.eq(token_hash))
            .one(&txn)
            .await?
            .ok_or(InvitationError::NotFound)?;

        if found.status != InvitationStatus::Pending {
            return Err(InvitationError::NotPending(format!("{:?}", found.status).to_lowercase()));
        }
        if found.email != authenticated_email.to_lowercase() {
            return Err(InvitationError::EmailMismatch);
        }

        let now = Utc::now().fixed_offset();
        let (tenant_id, role_id, invited_by) = (found.tenant_id, found.role_id, found.invited_by);

        let mut active: invitation::ActiveModel = found.into();
        active.status = ActiveValue::Set(InvitationStatus::Accepted);
        active.accepted_at = ActiveValue::Set(Some(now));
        active.updated_at = ActiveValue::Set(now);
        active.update(&txn).await?;

        let member = iam_membership::repository::insert_member(
            &txn,
            tenant_id,
            authenticated_user_id,
            role_id,
            MemberStatus::Active,
            Some(invited_by),
        )
        .await?;

        txn.commit().await?;
        Ok(member)
    }

    pub async fn cancel(&self, id: Uuid) -> Result<invitation::Model, InvitationError> {
        let found = invitation::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvitationError::NotFound)?;

        guard_transition(found.status, InvitationStatus::Cancelled)
            .map_err(|err| InvitationError::NotPending(err.to_string()))?;

        let mut active: invitation::ActiveModel = found.into();
        active.status = ActiveValue::Set(InvitationStatus::Cancelled);
        active.updated_at = ActiveValue::Set(Utc::now().fixed_offset());
        Ok(active.update(&self.db).await?)
    }

    /// Idempotent housekeeping op for the job runtime: flips every
    /// pending-but-expired row to `expired` in bulk, returning the count.
    pub async fn sweep_expired(&self) -> Result<u64, InvitationError> {
        let now = Utc::now().fixed_offset();
        let expired = invitation::Entity::find()
            .filter(invitation::Column::Status.eq(InvitationStatus::Pending))
            .filter(invitation::Column::ExpiresAt.lte(now))
            .all(&self.db)
            .await?;

        let count = expired.len() as u64;
        for invitation in expired {
            let mut active: invitation::ActiveModel = invitation.into();
            active.status = ActiveValue::Set(InvitationStatus::Expired);
            active.updated_at = ActiveValue::Set(now);
            active.update(&self.db).await?;
        }
        Ok(count)
    }
}

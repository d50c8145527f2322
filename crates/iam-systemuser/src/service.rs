use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use iam_core::generate_id;
use iam_identity::IdentityProvider;

use crate::entities::system_user::{self, Model};
use crate::error::SystemUserError;

/// Pure predicate reused by the request pipeline's system-user gate (spec
/// §4.9 stage 2): never consults the identity provider, only this row.
pub fn is_authenticatable(is_active: bool, expires_at: Option<chrono::DateTime<chrono::FixedOffset>>) -> bool {
    is_active && expires_at.map_or(true, |exp| exp > Utc::now())
}

#[derive(Clone)]
pub struct SystemUserService {
    db: DatabaseConnection,
    identity: Arc<dyn IdentityProvider>,
}

impl SystemUserService {
    pub fn new(db: DatabaseConnection, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { db, identity }
    }

    fn synthetic_email(name: &str) -> String {
        format!("{name}@system.internal")
    }

    /// Creates the identity-provider account then the domain row. Returns
    /// the generated password exactly once — it is never stored (spec §4.7).
    pub async fn create(
        &self,
        name: &str,
        application_name: Option<String>,
        service_type: &str,
        description: Option<String>,
        created_by: Uuid,
    ) -> Result<(Model, String), SystemUserError> {
        let application_name = application_name.unwrap_or_else(|| name.to_string());
        let synthetic_email = Self::synthetic_email(name);
        let password = self.identity.generate_machine_password();
        let user_id = self
            .identity
            .sign_up_email_password(&synthetic_email, &password)
            .await?;

        let now = Utc::now().fixed_offset();
        let model = system_user::ActiveModel {
            id: ActiveValue::Set(generate_id()),
            user_id: ActiveValue::Set(user_id),
            name: ActiveValue::Set(name.to_string()),
            application_name: ActiveValue::Set(application_name),
            synthetic_email: ActiveValue::Set(synthetic_email),
            service_type: ActiveValue::Set(service_type.to_string()),
            description: ActiveValue::Set(description),
            is_primary: ActiveValue::Set(true),
            is_active: ActiveValue::Set(true),
            expires_at: ActiveValue::Set(None),
            metadata: ActiveValue::Set(json!({})),
            created_by: ActiveValue::Set(created_by),
            last_used_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.db)
        .await?;

        Ok((model, password))
    }

    async fn find(&self, id: Uuid) -> Result<Model, SystemUserError> {
        system_user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(SystemUserError::NotFound)
    }

    /// Generates a new credential in the identity provider and revokes every
    /// existing session; the domain row is unchanged.
    pub async fn regenerate_password(&self, id: Uuid) -> Result<String, SystemUserError> {
        let row = self.find(id).await?;
        let new_password = self.identity.generate_machine_password();
        self.identity.reset_password(row.user_id, &new_password).await?;
        self.identity.revoke_all_sessions(row.user_id).await?;
        Ok(new_password)
    }

    /// Demotes the current row to secondary (still valid for `grace_days`)
    /// and creates a brand-new primary credential under the same
    /// `application_name` (spec §4.7). The two rows never overlap as
    /// `is_primary=true, is_active=true` at the same instant: the identity
    /// account for the new credential is created before the transaction
    /// that flips the old row and inserts the new one, so the DB-visible
    /// swap is atomic even though the identity-provider call is not.
    pub async fn rotate_with_grace_period(
        &self,
        id: Uuid,
        grace_days: i64,
    ) -> Result<(Model, String), SystemUserError> {
        let old = self.find(id).await?;

        let suffix = &generate_id().simple().to_string()[..8];
        let new_email = format!("{}-{suffix}@system.internal", old.application_name);
        let new_password = self.identity.generate_machine_password();
        let new_user_id = self
            .identity
            .sign_up_email_password(&new_email, &new_password)
            .await?;

        let txn = self.db.begin().await?;
        let now = Utc::now().fixed_offset();

        let mut demoted: system_user::ActiveModel = old.clone().into();
        demoted.is_primary = ActiveValue::Set(false);
        demoted.expires_at = ActiveValue::Set(Some(now + Duration::days(grace_days)));
        demoted.updated_at = ActiveValue::Set(now);
        demoted.update(&txn).await?;

        let created = system_user::ActiveModel {
            id: ActiveValue::Set(generate_id()),
            user_id: ActiveValue::Set(new_user_id),
            name: ActiveValue::Set(old.name.clone()),
            application_name: ActiveValue::Set(old.application_name.clone()),
            synthetic_email: ActiveValue::Set(new_email),
            service_type: ActiveValue::Set(old.service_type.clone()),
            description: ActiveValue::Set(old.description.clone()),
            is_primary: ActiveValue::Set(true),
            is_active: ActiveValue::Set(true),
            expires_at: ActiveValue::Set(None),
            metadata: ActiveValue::Set(json!({})),
            created_by: ActiveValue::Set(old.created_by),
            last_used_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok((created, new_password))
    }

    /// Deactivates every non-primary row for `application_name` and revokes
    /// their sessions. Returns the count deactivated.
    pub async fn revoke_non_primary(&self, application_name: &str) -> Result<u64, SystemUserError> {
        let rows = system_user::Entity::find()
            .filter(system_user::Column::ApplicationName.eq(application_name))
            .filter(system_user::Column::IsPrimary.eq(false))
            .filter(system_user::Column::IsActive.eq(true))
            .all(&self.db)
            .await?;

        let count = rows.len() as u64;
        for row in rows {
            self.identity.revoke_all_sessions(row.user_id).await?;
            let mut active: system_user::ActiveModel = row.into();
            active.is_active = ActiveValue::Set(false);
            active.updated_at = ActiveValue::Set(Utc::now().fixed_offset());
            active.update(&self.db).await?;
        }
        Ok(count)
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<Model, SystemUserError> {
        let row = self.find(id).await?;
        self.identity.revoke_all_sessions(row.user_id).await?;

        let mut active: system_user::ActiveModel = row.into();
        active.is_active = ActiveValue::Set(false);
        active.updated_at = ActiveValue::Set(Utc::now().fixed_offset());
        Ok(active.update(&self.db).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Model, SystemUserError> {
        self.find(id).await
    }

    /// Looks up the system-user row by identity-provider account id — what
    /// the request pipeline's system-user gate (spec §4.9 stage 2) has on
    /// hand from `IdentityClaims::user_id`, not this row's own primary key.
    pub async fn get_by_user_id(&self, user_id: Uuid) -> Result<Model, SystemUserError> {
        system_user::Entity::find()
            .filter(system_user::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(SystemUserError::NotFound)
    }

    /// Stamps `last_used_at` on a successful authentication acceptance check
    /// (spec §3, §4.9 stage 2). Never fails the request it's called from;
    /// callers log and move on if this errors.
    pub async fn record_usage(&self, user_id: Uuid) -> Result<(), SystemUserError> {
        let row = self.get_by_user_id(user_id).await?;
        let mut active: system_user::ActiveModel = row.into();
        active.last_used_at = ActiveValue::Set(Some(Utc::now().fixed_offset()));
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn list_by_application(&self, application_name: &str) -> Result<Vec<Model>, SystemUserError> {
        Ok(system_user::Entity::find()
            .filter(system_user::Column::ApplicationName.eq(application_name))
            .all(&self.db)
            .await?)
    }

    pub async fn count_active_primary(&self, application_name: &str) -> Result<u64, SystemUserError> {
        Ok(system_user::Entity::find()
            .filter(system_user::Column::ApplicationName.eq(application_name))
            .filter(system_user::Column::IsPrimary.eq(true))
            .filter(system_user::Column::IsActive.eq(true))
            .count(&self.db)
            .await?)
    }
}

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use uuid::Uuid;

use iam_systemuser::is_authenticatable;

use crate::error::{identity_error_to_core, ApiError};
use crate::state::AppState;

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::to_string)
}

fn cookie_header(parts: &Parts) -> Option<String> {
    parts.headers.get(COOKIE)?.to_str().ok().map(str::to_string)
}

/// Stages 1-2 of the request pipeline (spec §4.9): authenticate against the
/// identity provider, then — for service accounts only — gate on the
/// system-user row's `is_active`/`expires_at`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub email: String,
    pub is_system_user: bool,
    pub service_name: Option<String>,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let bearer = bearer_token(parts);
        let cookie = cookie_header(parts);

        let claims = state
            .identity
            .authenticate_request(bearer.as_deref(), cookie.as_deref())
            .await
            .map_err(identity_error_to_core)?;

        if claims.is_system_user {
            let row = state
                .systemuser_service
                .get_by_user_id(claims.user_id)
                .await
                .map_err(iam_core::Error::from)?;
            if !is_authenticatable(row.is_active, row.expires_at) {
                return Err(iam_core::Error::Unauthenticated.into());
            }

            if let Err(err) = state.systemuser_service.record_usage(claims.user_id).await {
                tracing::warn!(%err, user_id = %claims.user_id, "failed to stamp system-user last_used_at");
            }
        }

        Ok(CurrentUser {
            user_id: claims.user_id,
            email: claims.email,
            is_system_user: claims.is_system_user,
            service_name: claims.service_name,
        })
    }
}

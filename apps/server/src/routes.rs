use axum::extract::{Json, Path, Query, State};
use axum::routing::{get, patch, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use iam_core::{DomainEvent, PageRequest};
use iam_rbac::Permission;
use iam_tenant::TenantInput;

use crate::error::ApiError;
use crate::extractors::{check_permission, CurrentTenant, CurrentUser, RequirePermission, RequirePlatformAdmin, TenantUpdate};
use crate::state::AppState;

fn ok(data: impl Serialize) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

#[derive(Debug, Deserialize)]
struct CreateTenantBody {
    name: String,
    slug: String,
}

/// `POST /api/v1/tenants` — authenticated only (spec §6).
async fn create_tenant(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateTenantBody>,
) -> Result<Json<Value>, ApiError> {
    let tenant = state
        .tenant_service
        .create_self_serve(
            TenantInput {
                name: body.name,
                slug: body.slug,
            },
            user.user_id,
        )
        .await?;

    state.event_bus.publish(tenant.id, Some(user.user_id), DomainEvent::TenantCreated { tenant_id: tenant.id });

    Ok(ok(tenant))
}

#[derive(Debug, Deserialize)]
struct ListTenantsQuery {
    page: Option<u64>,
    page_size: Option<u64>,
}

/// `GET /api/v1/tenants` — authenticated; scoped to the caller's own
/// memberships (spec §6).
async fn list_tenants(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListTenantsQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = PageRequest::new(query.page.unwrap_or(1), query.page_size.unwrap_or(20));
    let tenants = state.tenant_service.list_by_user(user.user_id, page).await?;
    Ok(ok(tenants))
}

/// `GET /api/v1/tenants/:tenant_id` — member of `:tenant_id` OR platform
/// admin (spec §6); no specific permission triple is required.
async fn get_tenant(State(state): State<AppState>, tenant: CurrentTenant) -> Result<Json<Value>, ApiError> {
    let found = state.tenant_service.get(tenant.tenant_id).await?;
    Ok(ok(found))
}

#[derive(Debug, Deserialize)]
struct UpdateTenantBody {
    name: Option<String>,
}

/// `PATCH /api/v1/tenants/:tenant_id` — requires `tenant-api:tenant:update`
/// (spec §6).
async fn update_tenant(
    State(state): State<AppState>,
    permission: RequirePermission<TenantUpdate>,
    Json(body): Json<UpdateTenantBody>,
) -> Result<Json<Value>, ApiError> {
    let updated = state
        .tenant_service
        .update(permission.tenant.tenant_id, body.name)
        .await?;
    Ok(ok(updated))
}

/// `GET /api/v1/invitations/:token` — public (spec §6): a prospective
/// member has no session yet.
async fn get_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let invitation = state.invitation_service.get_by_token(&token).await?;
    Ok(ok(invitation))
}

/// `POST /api/v1/invitations/:token/accept` — authenticated (spec §6).
async fn accept_invitation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(token): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let member = state.invitation_service.accept(&token, user.user_id, &user.email).await?;
    state.event_bus.publish(
        member.tenant_id,
        Some(user.user_id),
        DomainEvent::InvitationAccepted {
            tenant_id: member.tenant_id,
            invitation_id: member.id,
        },
    );
    Ok(ok(member))
}

#[derive(Debug, Deserialize)]
struct AuthorizeBody {
    tenant_id: Uuid,
    service: String,
    entity: String,
    action: String,
}

#[derive(Debug, Serialize)]
struct AuthorizeResponse {
    allowed: bool,
}

/// `POST /api/v1/authorize` — authenticated; delegates straight to C3's
/// `Authorize` (spec §6, §4.3).
async fn authorize_endpoint(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<AuthorizeBody>,
) -> Result<Json<Value>, ApiError> {
    let permission = Permission::new(body.service, body.entity, body.action);
    let allowed = check_permission(&state, user.user_id, body.tenant_id, &permission).await?;
    Ok(ok(AuthorizeResponse { allowed }))
}

/// `GET /platform/system-users/:id` — platform admin only (spec §6).
async fn get_system_user(
    State(state): State<AppState>,
    _admin: RequirePlatformAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let found = state.systemuser_service.get(id).await?;
    Ok(ok(found))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/tenants", get(list_tenants).post(create_tenant))
        .route("/api/v1/tenants/{tenant_id}", get(get_tenant).patch(update_tenant))
        .route("/api/v1/invitations/{token}", get(get_invitation))
        .route("/api/v1/invitations/{token}/accept", post(accept_invitation))
        .route("/api/v1/authorize", post(authorize_endpoint))
        .route("/platform/system-users/{id}", get(get_system_user))
        .with_state(state)
}

mod support;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use iam_identity::IdentityClaims;
use iam_server::routes;

use support::build_test_app;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn unauthenticated_request_is_rejected() {
    let app = build_test_app().await;
    let router = routes::router(app.state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/tenants")
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "Acme", "slug": "acme"}).to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_user_can_create_a_tenant_and_becomes_its_admin() {
    let app = build_test_app().await;
    let user_id = Uuid::new_v4();
    app.identity
        .register("user-token", IdentityClaims::human(user_id, "owner@example.com"));
    let router = routes::router(app.state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/tenants")
        .header("authorization", "Bearer user-token")
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "Acme", "slug": "acme"}).to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["slug"], "acme");
}

#[tokio::test]
async fn list_tenants_is_scoped_to_the_callers_memberships() {
    let app = build_test_app().await;
    let owner_id = Uuid::new_v4();
    app.identity
        .register("owner-token", IdentityClaims::human(owner_id, "owner@example.com"));

    app.state
        .tenant_service
        .create_self_serve(
            iam_tenant::TenantInput {
                name: "Acme".into(),
                slug: "acme".into(),
            },
            owner_id,
        )
        .await
        .unwrap();

    let outsider_id = Uuid::new_v4();
    app.identity
        .register("outsider-token", IdentityClaims::human(outsider_id, "outsider@example.com"));

    let router = routes::router(app.state);
    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/tenants")
        .header("authorization", "Bearer outsider-token")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_count"], 0);
}

#[tokio::test]
async fn non_member_is_forbidden_from_reading_a_tenant() {
    let app = build_test_app().await;
    let owner_id = Uuid::new_v4();
    app.identity
        .register("owner-token", IdentityClaims::human(owner_id, "owner@example.com"));

    let tenant = app
        .state
        .tenant_service
        .create_self_serve(
            iam_tenant::TenantInput {
                name: "Acme".into(),
                slug: "acme".into(),
            },
            owner_id,
        )
        .await
        .unwrap();

    let outsider_id = Uuid::new_v4();
    app.identity
        .register("outsider-token", IdentityClaims::human(outsider_id, "outsider@example.com"));

    let router = routes::router(app.state);
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/v1/tenants/{}", tenant.id))
        .header("authorization", "Bearer outsider-token")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn member_without_update_permission_is_forbidden_from_updating_a_tenant() {
    let app = build_test_app().await;
    let owner_id = Uuid::new_v4();
    app.identity
        .register("owner-token", IdentityClaims::human(owner_id, "owner@example.com"));

    let tenant = app
        .state
        .tenant_service
        .create_self_serve(
            iam_tenant::TenantInput {
                name: "Acme".into(),
                slug: "acme".into(),
            },
            owner_id,
        )
        .await
        .unwrap();

    let viewer_id = Uuid::new_v4();
    app.identity
        .register("viewer-token", IdentityClaims::human(viewer_id, "viewer@example.com"));

    let viewer_role_id = iam_rbac::entities::role::Entity::find()
        .filter(iam_rbac::entities::role::Column::Name.eq("Viewer"))
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap()
        .id;
    app.state
        .membership_service
        .add_member(tenant.id, viewer_id, viewer_role_id, Some(owner_id))
        .await
        .unwrap();

    let router = routes::router(app.state);
    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/api/v1/tenants/{}", tenant.id))
        .header("authorization", "Bearer viewer-token")
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "New Name"}).to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_member_can_update_their_tenant() {
    let app = build_test_app().await;
    let owner_id = Uuid::new_v4();
    app.identity
        .register("owner-token", IdentityClaims::human(owner_id, "owner@example.com"));

    let tenant = app
        .state
        .tenant_service
        .create_self_serve(
            iam_tenant::TenantInput {
                name: "Acme".into(),
                slug: "acme".into(),
            },
            owner_id,
        )
        .await
        .unwrap();

    let router = routes::router(app.state);
    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/api/v1/tenants/{}", tenant.id))
        .header("authorization", "Bearer owner-token")
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "New Name"}).to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "New Name");
}

#[tokio::test]
async fn inactive_system_user_is_unauthenticated_even_with_a_valid_session() {
    let app = build_test_app().await;
    let user_id = Uuid::new_v4();

    app.identity
        .register("svc-token", IdentityClaims::system(user_id, "billing-service@system.internal", "billing-service"));

    let router = routes::router(app.state);
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/tenants")
        .header("authorization", "Bearer svc-token")
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "Acme", "slug": "acme"}).to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    // No system_user row exists for this identity-provider user_id, so the
    // pipeline's stage-2 gate rejects it the same way a deactivated one
    // would (`SystemUserService::get_by_user_id` returns `NotFound`).
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

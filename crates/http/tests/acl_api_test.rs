//! Route-level tests over in-memory fixtures.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use warden_core::ObjectKind;
use warden_core::testing::{
    MemoryDirectory, MemoryGrantStore, group_summary, identity, object, user_summary,
};
use warden_http::{AppState, HeaderIdentityProvider, USER_ID_HEADER, build_router};

/// One organization with an owned query, a second user, a group with u3 in
/// it, an admin, and an outsider in another organization.
fn test_app() -> Router {
    let directory = Arc::new(MemoryDirectory::new());

    let mut owner = identity("u1", "org1");
    owner.group_ids = vec![];
    directory.add_identity(owner);
    directory.add_identity(identity("u2", "org1"));
    let mut member = identity("u3", "org1");
    member.group_ids = vec!["g1".to_string()];
    directory.add_identity(member);
    let mut admin = identity("admin", "org1");
    admin.is_admin = true;
    directory.add_identity(admin);
    directory.add_identity(identity("outsider", "org2"));

    let mut q1 = object(ObjectKind::Queries, "q1", "org1");
    q1.owner_id = Some("u1".to_string());
    directory.add_object(q1);

    directory.add_grantee("org1", user_summary("u1"));
    directory.add_grantee("org1", user_summary("u2"));
    directory.add_grantee("org1", group_summary("g1"));

    let state = AppState::new(
        Arc::new(MemoryGrantStore::new()),
        directory.clone(),
        Arc::new(HeaderIdentityProvider::new(directory)),
    );
    let (router, _api) = build_router(state);
    router
}

fn get(uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(USER_ID_HEADER, user)
        .body(Body::empty())
        .unwrap()
}

fn with_body(method: &str, uri: &str, user: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, user)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn owner_grants_then_grantee_check_is_true() {
    let app = test_app();

    let grant = json!({"access_type": "modify", "grantee_type": "users", "grantee_id": "u2"});
    let response = app
        .clone()
        .oneshot(with_body("POST", "/api/queries/q1/acl", "u1", grant))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["access_type"], "modify");
    assert_eq!(body["grantee"]["id"], "u2");

    let response = app
        .clone()
        .oneshot(get("/api/queries/q1/acl/modify", "u2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["response"], json!(true));

    // u1 never granted anything to itself.
    let response = app
        .oneshot(get("/api/queries/q1/acl/modify", "u1"))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["response"], json!(false));
}

#[tokio::test]
async fn listing_groups_grantees_by_access_type() {
    let app = test_app();

    for (access, grantee_type, grantee_id) in [
        ("modify", "users", "u2"),
        ("view", "users", "u2"),
        ("view", "groups", "g1"),
    ] {
        let body = json!({"access_type": access, "grantee_type": grantee_type, "grantee_id": grantee_id});
        let response = app
            .clone()
            .oneshot(with_body("POST", "/api/queries/q1/acl", "u1", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(get("/api/queries/q1/acl", "u1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["modify"].as_array().unwrap().len(), 1);
    assert_eq!(body["view"].as_array().unwrap().len(), 2);
    assert_eq!(body["modify"][0]["id"], "u2");
    assert_eq!(body["view"][1]["type"], "groups");
}

#[tokio::test]
async fn granting_twice_returns_the_same_grant_id() {
    let app = test_app();
    let grant = json!({"access_type": "view", "grantee_type": "users", "grantee_id": "u2"});

    let first = json_body(
        app.clone()
            .oneshot(with_body("POST", "/api/queries/q1/acl", "u1", grant.clone()))
            .await
            .unwrap(),
    )
    .await;
    let second = json_body(
        app.clone()
            .oneshot(with_body("POST", "/api/queries/q1/acl", "u1", grant))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(first["id"], second["id"]);

    // And revoking afterwards removes exactly one row.
    let revoke = json!({"access_type": "view", "grantee_type": "users", "grantee_id": "u2"});
    let response = app
        .oneshot(with_body("DELETE", "/api/queries/q1/acl", "u1", revoke))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["deleted"], json!(1));
}

#[tokio::test]
async fn non_owner_cannot_mutate_but_admin_can() {
    let app = test_app();
    let grant = json!({"access_type": "view", "grantee_type": "users", "grantee_id": "u2"});

    let response = app
        .clone()
        .oneshot(with_body("POST", "/api/queries/q1/acl", "u2", grant.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(with_body("POST", "/api/queries/q1/acl", "admin", grant))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn revoke_without_access_type_removes_all_and_reports_count() {
    let app = test_app();

    for access in ["view", "modify"] {
        let body = json!({"access_type": access, "grantee_type": "users", "grantee_id": "u2"});
        app.clone()
            .oneshot(with_body("POST", "/api/queries/q1/acl", "u1", body))
            .await
            .unwrap();
    }

    let revoke = json!({"grantee_type": "users", "grantee_id": "u2"});
    let response = app
        .clone()
        .oneshot(with_body("DELETE", "/api/queries/q1/acl", "u1", revoke.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["deleted"], json!(2));

    // Nothing left: zero deletions is still a success.
    let response = app
        .oneshot(with_body("DELETE", "/api/queries/q1/acl", "u1", revoke))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["deleted"], json!(0));
}

#[tokio::test]
async fn check_fans_out_over_group_membership() {
    let app = test_app();

    let grant = json!({"access_type": "view", "grantee_type": "groups", "grantee_id": "g1"});
    app.clone()
        .oneshot(with_body("POST", "/api/queries/q1/acl", "u1", grant))
        .await
        .unwrap();

    // u3 holds no direct grant but is in g1.
    let response = app
        .clone()
        .oneshot(get("/api/queries/q1/acl/view", "u3"))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["response"], json!(true));

    // u2 is in no group.
    let response = app
        .oneshot(get("/api/queries/q1/acl/view", "u2"))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["response"], json!(false));
}

#[tokio::test]
async fn unknown_types_and_access_types_are_client_errors() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(get("/api/alerts/q1/acl", "u1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let grant = json!({"access_type": "execute", "grantee_type": "users", "grantee_id": "u2"});
    let response = app
        .clone()
        .oneshot(with_body("POST", "/api/queries/q1/acl", "u1", grant))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let grant = json!({"access_type": "view", "grantee_type": "users", "grantee_id": "ghost"});
    let response = app
        .oneshot(with_body("POST", "/api/queries/q1/acl", "u1", grant))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cross_organization_callers_see_not_found() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(get("/api/queries/q1/acl", "outsider"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let grant = json!({"access_type": "view", "grantee_type": "users", "grantee_id": "u2"});
    let response = app
        .oneshot(with_body("POST", "/api/queries/q1/acl", "outsider", grant))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn requests_without_identity_are_unauthorized() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/queries/q1/acl").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Health skips identity establishment.
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "warden-http");
}

//! End-to-end authentication and authorization tests.
//!
//! Tests cover:
//! - Login, /auth/me, and the refresh/logout lifecycle
//! - Role-based permission gating on the planning endpoints
//! - Error envelope codes for missing/invalid credentials and tokens

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp, MANAGER_PASSWORD, TEAM_PASSWORD};
use serde_json::json;

// ==================== Login and identity ====================

#[tokio::test]
async fn login_issues_tokens_and_me_reports_the_grant_set() {
    let app = TestApp::new().await;
    let token = app.login("manager", MANAGER_PASSWORD).await;

    let response = app
        .request(Method::GET, "/auth/me", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Test manager");
    assert_eq!(body["data"]["roles"], json!(["manager"]));
    let permissions = body["data"]["permissions"]
        .as_array()
        .expect("permissions array");
    assert!(permissions.contains(&json!("settings:write")));
    assert!(!permissions.contains(&json!("users:manage")));
}

#[tokio::test]
async fn wrong_password_and_unknown_user_fail_identically() {
    let app = TestApp::new().await;

    for credentials in [
        json!({ "username": "manager", "password": "not-the-password" }),
        json!({ "username": "nobody", "password": MANAGER_PASSWORD }),
    ] {
        let response = app
            .request(Method::POST, "/auth/login", Some(credentials), None)
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "INVALID_CREDENTIALS");
    }
}

#[tokio::test]
async fn refresh_rotates_the_pair_and_logout_revokes_it() {
    let app = TestApp::new().await;
    let (_access, refresh) = app.login_pair("manager", MANAGER_PASSWORD).await;

    // Refresh yields a working new pair.
    let response = app
        .request(
            Method::POST,
            "/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let new_access = body["data"]["access_token"].as_str().expect("new access");
    let new_refresh = body["data"]["refresh_token"]
        .as_str()
        .expect("new refresh")
        .to_string();

    let me = app
        .request(Method::GET, "/auth/me", None, Some(new_access))
        .await;
    assert_eq!(me.status(), StatusCode::OK);

    // Logout revokes the outstanding refresh token.
    let logout = app
        .request(Method::POST, "/auth/logout", None, Some(new_access))
        .await;
    assert_eq!(logout.status(), StatusCode::OK);

    let reuse = app
        .request(
            Method::POST,
            "/auth/refresh",
            Some(json!({ "refresh_token": new_refresh })),
            None,
        )
        .await;
    assert_eq!(reuse.status(), StatusCode::UNAUTHORIZED);
}

// ==================== Permission gating ====================

#[tokio::test]
async fn protected_endpoints_reject_missing_and_garbage_tokens() {
    let app = TestApp::new().await;

    let missing = app.request(Method::GET, "/api/v1/sales", None, None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(missing).await;
    assert_eq!(body["error"], "MISSING_AUTH");

    let garbage = app
        .request(Method::GET, "/api/v1/sales", None, Some("not-a-jwt"))
        .await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn team_role_reads_boards_but_cannot_touch_settings() {
    let app = TestApp::new().await;
    let token = app.login("team", TEAM_PASSWORD).await;

    let board = app
        .request(Method::GET, "/api/v1/allocations/thaw", None, Some(&token))
        .await;
    assert_eq!(board.status(), StatusCode::OK);

    let read_settings = app
        .request(Method::GET, "/api/v1/sales", None, Some(&token))
        .await;
    assert_eq!(read_settings.status(), StatusCode::FORBIDDEN);

    let write_settings = app
        .request(
            Method::PUT,
            "/api/v1/sales",
            Some(json!([{ "day": "monday", "amount": "4000" }])),
            Some(&token),
        )
        .await;
    assert_eq!(write_settings.status(), StatusCode::FORBIDDEN);
    let body = body_json(write_settings).await;
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn manager_role_holds_settings_and_truck_but_admin_only_audits() {
    let app = TestApp::new().await;
    let token = app.login("manager", MANAGER_PASSWORD).await;

    let write = app
        .request(
            Method::PUT,
            "/api/v1/upt",
            Some(json!({ "product_name": "Nugget", "utp": "90" })),
            Some(&token),
        )
        .await;
    assert_eq!(write.status(), StatusCode::OK);

    let truck = app
        .request(Method::GET, "/api/v1/truck-items", None, Some(&token))
        .await;
    assert_eq!(truck.status(), StatusCode::OK);
}

// ==================== Route aliases ====================

#[tokio::test]
async fn bare_paths_answer_alongside_the_api_v1_prefix() {
    let app = TestApp::new().await;
    let token = app.login("manager", MANAGER_PASSWORD).await;

    for uri in ["/api/v1/sales", "/sales"] {
        let response = app.request(Method::GET, uri, None, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    }

    let status = app.request(Method::GET, "/api/v1/status", None, None).await;
    assert_eq!(status.status(), StatusCode::OK);
    let body = body_json(status).await;
    assert_eq!(body["service"], "backhouse-api");
}

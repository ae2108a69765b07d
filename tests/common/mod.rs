#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use backhouse_api::{
    api_v1_routes,
    auth::{self, auth_routes, user, AuthConfig, AuthService},
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    health::health_routes,
    AppState,
};

pub const ADMIN_PASSWORD: &str = "admin-pw-123!";
pub const MANAGER_PASSWORD: &str = "manager-pw-123!";
pub const TEAM_PASSWORD: &str = "team-pw-123!";

const TEST_JWT_SECRET: &str =
    "integration-test-secret-key-that-is-comfortably-longer-than-sixty-four-characters";

/// Harness that stands up the full application router over a throwaway
/// SQLite file, with one seeded account per store role.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: tempfile::TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test database");
        let db_path = db_dir.path().join("backhouse_test.db");
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let mut cfg = AppConfig::new(
            database_url,
            TEST_JWT_SECRET.to_string(),
            3600,
            86_400,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 2;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("connect test database");
        db::run_migrations(&pool)
            .await
            .expect("run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx, Vec::new()));

        let auth_service = Arc::new(AuthService::new(
            AuthConfig::from_app_config(&cfg),
            db_arc.clone(),
        ));
        seed_store_users(db_arc.as_ref()).await;

        let services = AppServices::new(db_arc.clone(), event_sender.clone(), auth_service.clone());
        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            auth_service,
            services,
        };

        // Same route topology the server builds: prefixed API, bare-path
        // aliases, auth, health. Layers (CORS, tracing, timeouts) are
        // orthogonal to what these tests assert.
        let router = Router::new()
            .merge(health_routes())
            .nest("/api/v1", api_v1_routes(state.clone()))
            .merge(api_v1_routes(state.clone()))
            .nest("/auth", auth_routes(state.clone()))
            .with_state(state.clone());

        Self {
            router,
            state,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    /// Log in and return the access token for the account.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let (access, _refresh) = self.login_pair(username, password).await;
        access
    }

    /// Log in and return both halves of the issued token pair.
    pub async fn login_pair(&self, username: &str, password: &str) -> (String, String) {
        let response = self
            .request(
                Method::POST,
                "/auth/login",
                Some(serde_json::json!({ "username": username, "password": password })),
                None,
            )
            .await;
        assert_eq!(
            response.status(),
            axum::http::StatusCode::OK,
            "login failed for {username}"
        );
        let body = body_json(response).await;
        let access = body["data"]["access_token"]
            .as_str()
            .expect("access token in login response")
            .to_string();
        let refresh = body["data"]["refresh_token"]
            .as_str()
            .expect("refresh token in login response")
            .to_string();
        (access, refresh)
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {tok}"));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Collect a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body is valid json")
}

/// One account per fixed store role, password hashing included.
async fn seed_store_users(db: &sea_orm::DatabaseConnection) {
    let accounts = [
        ("admin", auth::ROLE_ADMIN, ADMIN_PASSWORD),
        ("manager", auth::ROLE_MANAGER, MANAGER_PASSWORD),
        ("team", auth::ROLE_TEAM, TEAM_PASSWORD),
    ];

    let now = Utc::now();
    for (username, role, password) in accounts {
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            display_name: Set(format!("Test {username}")),
            password_hash: Set(AuthService::hash_password(password).expect("hash test password")),
            role: Set(role.to_string()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("seed test user");
    }
}

//! Authentication and authorization for the store API.
//!
//! JWT bearer tokens (HS256) with a refresh-token pair, argon2 password
//! hashes, and a fixed role model (admin / manager / team) resolved into
//! permission claims at token mint time. Refresh token jtis are stored
//! hashed; revocation works per token and per user.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::{DefaultBodyLimit, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::ErrorResponse;
use crate::events::Event;
use crate::{ApiResponse, AppState};

// Entity modules
pub mod refresh_token;
pub mod user;

// Feature modules
mod permissions;

// Re-exports
pub use permissions::*;

/// Claim structure for JWT tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,              // Subject (user ID)
    pub name: Option<String>,     // Display name, absent on refresh tokens
    pub roles: Vec<String>,       // Role names (single store role today)
    pub permissions: Vec<String>, // Resolved permission grants
    pub jti: String,              // JWT ID (unique identifier for this token)
    pub iat: i64,                 // Issued at time
    pub exp: i64,                 // Expiration time
    pub nbf: i64,                 // Not valid before time
    pub iss: String,              // Issuer
    pub aud: String,              // Audience
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub token_id: String,
}

impl AuthUser {
    /// Check if the user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check if the user has a specific permission
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Check if the user is an admin
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            roles: claims.roles,
            permissions: claims.permissions,
            token_id: claims.jti,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
    pub refresh_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        access_token_expiration: Duration,
        refresh_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            access_token_expiration,
            refresh_token_expiration,
        }
    }

    /// Build auth settings from the application configuration.
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            jwt_audience: config.auth_audience.clone(),
            jwt_issuer: config.auth_issuer.clone(),
            access_token_expiration: Duration::from_secs(config.jwt_expiration as u64),
            refresh_token_expiration: Duration::from_secs(config.refresh_token_expiration as u64),
        }
    }
}

/// Authentication service that handles credentials, token issuance and
/// validation against the users / refresh_tokens tables.
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DbPool>,
    blacklisted_tokens: Arc<RwLock<Vec<BlacklistedToken>>>,
}

/// Token blacklist entry
#[derive(Clone, Debug)]
struct BlacklistedToken {
    jti: String,
    expiry: DateTime<Utc>,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(config: AuthConfig, db: Arc<DbPool>) -> Self {
        Self {
            config,
            db,
            blacklisted_tokens: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Hash a password with argon2id and a fresh salt.
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::InternalError(format!("password hashing failed: {}", e)))
    }

    /// Verify a candidate password against a stored argon2 hash.
    /// An unparseable stored hash counts as a mismatch.
    pub fn verify_password(password: &str, password_hash: &str) -> bool {
        PasswordHash::new(password_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Check a username/password pair against the users table.
    ///
    /// Unknown usernames, wrong passwords and deactivated accounts all
    /// surface as the same `InvalidCredentials` error.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<user::Model, AuthError> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        let Some(account) = found else {
            debug!(username, "login rejected: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !account.active || !Self::verify_password(password, &account.password_hash) {
            debug!(username, "login rejected: inactive or bad password");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Generate an access/refresh token pair for a user
    pub async fn generate_token(&self, account: &user::Model) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;
        let refresh_exp = now
            + ChronoDuration::from_std(self.config.refresh_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        // Generate unique token IDs
        let access_jti = Uuid::new_v4().to_string();
        let refresh_jti = Uuid::new_v4().to_string();

        let roles = vec![account.role.clone()];
        let grants = role_permissions(&account.role);

        // Create access token claims
        let access_claims = Claims {
            sub: account.id.to_string(),
            name: Some(account.display_name.clone()),
            roles: roles.clone(),
            permissions: grants,
            jti: access_jti,
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        // Create refresh token claims (with minimal data)
        let refresh_claims = Claims {
            sub: account.id.to_string(),
            name: None,
            roles: vec![],
            permissions: vec![],
            jti: refresh_jti.clone(),
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        // Generate the tokens
        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &access_claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        let refresh_token = encode(
            &Header::new(Algorithm::HS256),
            &refresh_claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        // Store the refresh token jti (hashed) so it can be rotated and revoked
        self.store_refresh_token(account.id, &refresh_jti, refresh_exp)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
            refresh_expires_in: self.config.refresh_token_expiration.as_secs() as i64,
        })
    }

    /// Validate a JWT token and extract the claims
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);
        validation.validate_nbf = true;

        // Decode and validate the token
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        // Check if the token is blacklisted
        if self.is_token_blacklisted(&claims.jti).await {
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }

    /// Refresh an access token using a refresh token. The presented
    /// refresh token is consumed; a new pair is issued.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        // Validate the refresh token
        let claims = self.validate_token(refresh_token).await?;

        // Get the user ID from the claims
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        // Check if the refresh token is still live in the database
        let refresh_token_live = self.verify_refresh_token(user_id, &claims.jti).await?;
        if !refresh_token_live {
            return Err(AuthError::InvalidToken);
        }

        // Get the user; a deactivated account cannot rotate tokens
        let account = self.get_user(user_id).await?;
        if !account.active {
            return Err(AuthError::RevokedToken);
        }

        // Generate new tokens
        let new_tokens = self.generate_token(&account).await?;

        // Invalidate the old refresh token
        self.revoke_refresh_token(user_id, &claims.jti).await?;

        Ok(new_tokens)
    }

    /// Revoke a token (add it to the blacklist). If the token was a
    /// refresh token its database row is revoked as well.
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        // Validate the token first
        let claims = self.validate_token(token).await?;

        // Add the token to the blacklist
        let expiry = Utc::now() + ChronoDuration::seconds(claims.exp - Utc::now().timestamp());
        let blacklisted_token = BlacklistedToken {
            jti: claims.jti.clone(),
            expiry,
        };

        // Add to the in-memory blacklist
        let mut blacklist = self.blacklisted_tokens.write().await;
        blacklist.push(blacklisted_token);

        // Clean up expired tokens in the blacklist
        self.clean_blacklist(&mut blacklist);
        drop(blacklist);

        // Access jtis are never stored, so this is a no-op for them
        if let Ok(user_id) = Uuid::parse_str(&claims.sub) {
            self.revoke_refresh_token(user_id, &claims.jti).await?;
        }

        Ok(())
    }

    /// Revoke every live refresh token belonging to a user. Returns the
    /// number of tokens revoked.
    pub async fn revoke_all_refresh_tokens(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let result = refresh_token::Entity::update_many()
            .col_expr(refresh_token::Column::Revoked, Expr::value(true))
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::Revoked.eq(false))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Delete refresh token rows that are expired or already revoked.
    /// Returns the number of rows removed.
    pub async fn purge_expired_refresh_tokens(&self) -> Result<u64, AuthError> {
        let result = refresh_token::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(refresh_token::Column::ExpiresAt.lt(Utc::now()))
                    .add(refresh_token::Column::Revoked.eq(true)),
            )
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Check if a token is blacklisted
    async fn is_token_blacklisted(&self, token_id: &str) -> bool {
        let blacklist = self.blacklisted_tokens.read().await;
        blacklist.iter().any(|t| t.jti == token_id)
    }

    /// Clean up expired tokens from the blacklist
    fn clean_blacklist(&self, blacklist: &mut Vec<BlacklistedToken>) {
        let now = Utc::now();
        blacklist.retain(|t| t.expiry > now);
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: Uuid) -> Result<user::Model, AuthError> {
        user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::UserNotFound)
    }

    /// Store a refresh token jti as a SHA-256 digest
    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token_id: &str,
        expiry: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let record = refresh_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            jti_hash: Set(Self::hash_jti(token_id)),
            created_at: Set(Utc::now()),
            expires_at: Set(expiry),
            revoked: Set(false),
        };
        record
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    /// Verify a refresh token jti is stored, unrevoked and unexpired
    async fn verify_refresh_token(&self, user_id: Uuid, token_id: &str) -> Result<bool, AuthError> {
        let stored = refresh_token::Entity::find()
            .filter(refresh_token::Column::JtiHash.eq(Self::hash_jti(token_id)))
            .filter(refresh_token::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(stored.map_or(false, |row| !row.revoked && row.expires_at > Utc::now()))
    }

    /// Revoke a single refresh token by jti
    async fn revoke_refresh_token(&self, user_id: Uuid, token_id: &str) -> Result<(), AuthError> {
        refresh_token::Entity::update_many()
            .col_expr(refresh_token::Column::Revoked, Expr::value(true))
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::JtiHash.eq(Self::hash_jti(token_id)))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn hash_jti(token_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token_id.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Token pair response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
}

/// Login credentials
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Claims echo returned by `GET /auth/me`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    pub user_id: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message): (StatusCode, &str, String) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "MISSING_AUTH",
                "Authentication required".to_string(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            Self::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "MISSING_TOKEN",
                "No authentication token provided".to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid authentication token".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            Self::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_REVOKED",
                "Authentication token has been revoked".to_string(),
            ),
            Self::TokenCreation(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TOKEN_CREATION_FAILED",
                msg.clone(),
            ),
            Self::UserNotFound => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            Self::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Insufficient permissions".to_string(),
            ),
            Self::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", msg.clone())
            }
            Self::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            crate::metrics::BOARD_METRICS.auth_failures_total.inc();
        }

        let body = ErrorResponse::new(error_code, error_message);
        (status, Json(body)).into_response()
    }
}

/// Pull a bearer token out of the Authorization header, if present.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Extract authentication info from request headers
async fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    let Some(token) = bearer_token(headers) else {
        return Err(AuthError::MissingAuth);
    };

    let claims = auth_service.validate_token(token).await?;
    Ok(AuthUser::from(claims))
}

/// Authentication middleware that validates bearer tokens and stores the
/// resulting `AuthUser` in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let headers = request.headers().clone();

    match extract_auth_from_headers(&headers, &state.auth_service).await {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Permission middleware to check if a user has the required permission.
/// Admins pass every check.
pub async fn permission_middleware(
    State(required_permission): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AuthError::MissingAuth)?;

    if auth_user.is_admin() || auth_user.has_permission(&required_permission) {
        return Ok(next.run(request).await);
    }

    warn!(
        user_id = %auth_user.user_id,
        permission = %required_permission,
        "request rejected: missing permission"
    );
    Err(AuthError::InsufficientPermissions)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self, state: AppState) -> Self;
    fn with_permission(self, permission: &str, state: AppState) -> Self;
}

impl AuthRouterExt for Router<AppState> {
    fn with_auth(self, state: AppState) -> Self {
        self.layer(middleware::from_fn_with_state(state, auth_middleware))
    }

    fn with_permission(self, permission: &str, state: AppState) -> Self {
        self.layer(middleware::from_fn_with_state(
            permission.to_string(),
            permission_middleware,
        ))
        .with_auth(state)
    }
}

/// Authentication routes
pub fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(logout_handler))
        .route("/me", get(me_handler))
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_token_handler))
        .merge(protected)
        .layer(DefaultBodyLimit::max(1024 * 64)) // 64KB limit
}

/// Login handler
#[utoipa::path(
    post,
    path = "/auth/login",
    summary = "Sign in with username and password",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = ApiResponse<TokenPair>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
    ),
    tag = "Auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(credentials): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AuthError> {
    let account = state
        .auth_service
        .authenticate(&credentials.username, &credentials.password)
        .await?;

    let tokens = state.auth_service.generate_token(&account).await?;

    info!(username = %account.username, role = %account.role, "user logged in");
    state
        .event_sender
        .send_or_log(Event::UserLoggedIn {
            user_id: account.id,
        })
        .await;

    Ok(Json(ApiResponse::success(tokens)))
}

/// Refresh token handler
#[utoipa::path(
    post,
    path = "/auth/refresh",
    summary = "Rotate a refresh token into a new token pair",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair issued", body = ApiResponse<TokenPair>),
        (status = 401, description = "Refresh token invalid, expired or revoked", body = crate::errors::ErrorResponse),
    ),
    tag = "Auth"
)]
pub async fn refresh_token_handler(
    State(state): State<AppState>,
    Json(refresh_request): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AuthError> {
    let tokens = state
        .auth_service
        .refresh_token(&refresh_request.refresh_token)
        .await?;

    Ok(Json(ApiResponse::success(tokens)))
}

/// Logout handler: blacklists the presented access token and revokes all
/// of the caller's refresh tokens.
#[utoipa::path(
    post,
    path = "/auth/logout",
    summary = "Sign out and revoke refresh tokens",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Auth"
)]
pub async fn logout_handler(
    State(state): State<AppState>,
    auth_user: AuthUser,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<serde_json::Value>>, AuthError> {
    let Some(token) = bearer_token(&headers) else {
        return Err(AuthError::MissingToken);
    };

    state.auth_service.revoke_token(token).await?;

    let user_id = Uuid::parse_str(&auth_user.user_id).map_err(|_| AuthError::InvalidToken)?;
    let revoked = state
        .auth_service
        .revoke_all_refresh_tokens(user_id)
        .await?;

    info!(user_id = %auth_user.user_id, revoked, "user logged out");
    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Successfully logged out",
        "refresh_tokens_revoked": revoked,
    }))))
}

/// Current-user handler: echoes the validated claims.
#[utoipa::path(
    get,
    path = "/auth/me",
    summary = "Describe the signed-in user",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<CurrentUser>),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Auth"
)]
pub async fn me_handler(auth_user: AuthUser) -> Json<ApiResponse<CurrentUser>> {
    Json(ApiResponse::success(CurrentUser {
        user_id: auth_user.user_id,
        name: auth_user.name,
        roles: auth_user.roles,
        permissions: auth_user.permissions,
    }))
}

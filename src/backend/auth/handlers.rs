/**
 * Authentication Handlers
 *
 * HTTP handlers for user registration and login, plus the bearer-token
 * middleware protecting the document API.
 *
 * # Security
 *
 * - Passwords are hashed with bcrypt (DEFAULT_COST) and never returned.
 * - Invalid login credentials always answer 401 without saying which part
 *   was wrong.
 * - Tokens expire after 24 hours.
 */

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{Json, Response},
};
use bcrypt::{hash, verify, DEFAULT_COST};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::backend::auth::sessions::{create_token, verify_token, Claims};
use crate::backend::auth::users::{create_user, get_user_by_email};
use crate::backend::error::ApiError;

/// Sign up request
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// User's chosen username
    pub username: String,
    /// User's email address
    pub email: String,
    /// User's password (hashed before storage)
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// User's email address
    pub email: String,
    /// User's password
    pub password: String,
}

/// Auth response for signup and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// JWT token for authentication
    pub token: String,
    /// User's unique ID
    pub user_id: String,
    /// User's username
    pub username: String,
}

/// Handle `POST /api/auth/signup`
pub async fn signup(
    State(pool): State<Option<PgPool>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let pool = pool.ok_or(ApiError::Unavailable("user database"))?;

    if request.username.is_empty() || request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("username, email and password are required"));
    }
    if !request.email.contains('@') {
        return Err(ApiError::bad_request("invalid email address"));
    }
    if request.password.len() < 8 {
        return Err(ApiError::bad_request("password must be at least 8 characters"));
    }

    if get_user_by_email(&pool, &request.email)
        .await
        .map_err(|e| storage(e, "user lookup"))?
        .is_some()
    {
        return Err(ApiError::handler(
            StatusCode::CONFLICT,
            "a user with this email already exists",
        ));
    }

    let password_hash = hash(&request.password, DEFAULT_COST)
        .map_err(|e| internal(format!("password hashing failed: {}", e)))?;

    let user = create_user(&pool, request.username, request.email, password_hash)
        .await
        .map_err(|e| storage(e, "user creation"))?;

    let token = create_token(user.id, user.username.clone())
        .map_err(|e| internal(format!("token generation failed: {}", e)))?;

    tracing::info!("[Auth] user {} registered", user.username);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user_id: user.id.to_string(),
            username: user.username,
        }),
    ))
}

/// Handle `POST /api/auth/login`
pub async fn login(
    State(pool): State<Option<PgPool>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let pool = pool.ok_or(ApiError::Unavailable("user database"))?;

    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }

    let user = get_user_by_email(&pool, &request.email)
        .await
        .map_err(|e| storage(e, "user lookup"))?
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    let password_ok = verify(&request.password, &user.password_hash)
        .map_err(|e| internal(format!("password verification failed: {}", e)))?;
    if !password_ok {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let token = create_token(user.id, user.username.clone())
        .map_err(|e| internal(format!("token generation failed: {}", e)))?;

    tracing::info!("[Auth] user {} logged in", user.username);

    Ok(Json(AuthResponse {
        token,
        user_id: user.id.to_string(),
        username: user.username,
    }))
}

/// Current-user response for `GET /api/auth/me`
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// User's unique ID
    pub user_id: String,
    /// User's username
    pub username: String,
}

/// Handle `GET /api/auth/me`
pub async fn me(request: Request) -> Result<Json<MeResponse>, ApiError> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| ApiError::unauthorized("not authenticated"))?;

    Ok(Json(MeResponse {
        user_id: claims.sub.clone(),
        username: claims.username.clone(),
    }))
}

/// Bearer-token middleware for the document API
///
/// Extracts and verifies the `Authorization: Bearer <jwt>` header and
/// attaches the claims to request extensions. Returns 401 when the token
/// is missing or invalid.
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("expected a bearer token"))?;

    let claims = verify_token(token).map_err(|err| {
        tracing::warn!("[Auth] token rejected: {}", err);
        ApiError::unauthorized("invalid or expired token")
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn storage(err: sqlx::Error, what: &str) -> ApiError {
    tracing::error!("[Auth] {} failed: {}", what, err);
    internal(format!("{} failed", what))
}

fn internal(message: String) -> ApiError {
    ApiError::handler(StatusCode::INTERNAL_SERVER_ERROR, message)
}

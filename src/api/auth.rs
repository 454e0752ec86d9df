//! Auth endpoint handlers: register, login, refresh, logout

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{clear_refresh_cookie, refresh_token_from_headers, set_refresh_cookie};
use crate::auth::password;
use crate::db::users::{self, Role};
use crate::error::{Error, Result};

use super::server::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "MCName")]
    pub mc_name: String,
    #[serde(rename = "DCName")]
    pub dc_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Minimal user projection returned on login
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub role: Role,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn require_field(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} must not be empty", name)));
    }
    Ok(())
}

/// POST /api/auth/register
///
/// Creates the user with the default role; no tokens are issued, the user
/// logs in separately. The email pre-check and the store's unique
/// constraint both map to the same conflict response, so a registration
/// race loses cleanly.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    require_field(&req.mc_name, "MCName")?;
    require_field(&req.dc_name, "DCName")?;
    require_field(&req.email, "email")?;
    require_field(&req.password, "password")?;

    if users::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(Error::EmailInUse);
    }

    // bcrypt is CPU-bound; keep it off the async workers
    let plaintext = req.password.clone();
    let digest = tokio::task::spawn_blocking(move || password::hash(&plaintext))
        .await
        .map_err(|e| Error::Other(e.to_string()))??;

    let user_id = users::insert(&state.db, &req.mc_name, &req.dc_name, &req.email, &digest)
        .await
        .map_err(|e| match e {
            Error::Database(db) if users::is_unique_violation(&db) => Error::EmailInUse,
            other => other,
        })?;

    tracing::info!(user_id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id,
        }),
    ))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password return the identical 401 so the
/// response never reveals which check failed.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let user = users::find_by_email(&state.db, &req.email)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    let plaintext = req.password;
    let digest = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || password::verify(&plaintext, &digest))
        .await
        .map_err(|e| Error::Other(e.to_string()))??;

    if !valid {
        return Err(Error::InvalidCredentials);
    }

    let access_token = state.tokens.issue_access(user.id, user.role)?;
    let refresh_token = state.tokens.issue_refresh(user.id)?;
    let cookie = set_refresh_cookie(&refresh_token, state.config.environment.is_production());

    tracing::debug!(user_id = user.id, "login successful");

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            access_token,
            user: UserInfo {
                id: user.id,
                role: user.role,
                email: user.email,
            },
        }),
    ))
}

/// GET /api/auth/refresh
///
/// Reads the refresh token from the cookie only, never from the body or a
/// header. The role claim of the new access token comes fresh from the
/// store, not from the old token. The refresh token itself is not rotated.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>> {
    let token = refresh_token_from_headers(&headers)
        .ok_or(Error::Unauthenticated("Refresh Token not found"))?;

    let claims = state.tokens.verify_refresh(&token)?;

    let user = users::find_by_id(&state.db, claims.id)
        .await?
        .ok_or(Error::Forbidden("User not found"))?;

    let access_token = state.tokens.issue_access(user.id, user.role)?;

    Ok(Json(RefreshResponse { access_token }))
}

/// POST /api/auth/logout
///
/// Idempotent: no token validation, the cookie is cleared unconditionally.
/// There is no server-side revocation list to update.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = clear_refresh_cookie(state.config.environment.is_production());

    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

//! Authentication middleware

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::AppState;
use crate::auth::jwt::{AccessClaims, TokenIssuer};
use crate::db::Role;
use crate::error::{Error, Result};

/// Pull the bearer token out of the Authorization header and verify it.
///
/// The status split is part of the public contract: a missing or
/// unparseable header is 401, a present-but-invalid token is 403.
fn authenticate(tokens: &TokenIssuer, headers: &HeaderMap) -> Result<AccessClaims> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(Error::Unauthenticated("Access token missing"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::Unauthenticated("Access token missing"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or(Error::Unauthenticated("Access token missing"))?;

    tokens.verify_access(token)
}

/// Middleware requiring a valid access token. On success the decoded claims
/// are attached to the request for downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let claims = authenticate(&state.tokens, req.headers())?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Middleware requiring the admin role. Must run after [`require_auth`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response> {
    let claims = req
        .extensions()
        .get::<AccessClaims>()
        .ok_or(Error::Unauthenticated("Access token missing"))?;

    if claims.role != Role::Admin {
        return Err(Error::Forbidden("Admin privileges required"));
    }

    Ok(next.run(req).await)
}

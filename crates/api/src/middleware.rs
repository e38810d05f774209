use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use stockpile_auth::TokenCodec;
use stockpile_infra::InventoryStore;

use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<dyn TokenCodec>,
    pub store: Arc<dyn InventoryStore>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let claims = state
        .codec
        .decode(token, Utc::now())
        .map_err(|_e| StatusCode::UNAUTHORIZED)?;

    // Re-read the account so role changes and deactivation apply immediately;
    // the claims only prove who the caller is.
    let user = state
        .store
        .user_by_id(claims.sub)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !user.is_active {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut()
        .insert(CurrentUser::new(user.id, user.email, user.role));

    Ok(next.run(req).await)
}

/// Gate for `/admin` routes; runs after `auth_middleware`.
pub async fn require_admin(
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let current = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !current.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}

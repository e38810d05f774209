use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;

use stockpile_auth::{Registration, Role, hash_password, verify_password};
use stockpile_core::UserId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let role: Role = match body.role.as_deref().unwrap_or("staff").parse() {
        Ok(role) => role,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let registration = Registration {
        name: body.name,
        email: body.email,
        password: body.password,
        role,
    };
    if let Err(e) = registration.validate() {
        return errors::domain_error_to_response(e);
    }

    let password_hash = match hash_password(&registration.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("password hashing failed: {e}");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "hash_error",
                "failed to hash password",
            );
        }
    };

    let user = match registration.into_user(UserId::new(), password_hash, Utc::now()) {
        Ok(user) => user,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let user = match services.store().create_user(user).await {
        Ok(user) => user,
        Err(e) => return errors::store_error_to_response(e),
    };

    // No token yet: the account cannot authenticate until an admin approves it.
    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "registration received; awaiting admin approval",
            "user": dto::user_to_json(&user),
        })),
    )
        .into_response()
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "email and password are required",
        );
    }

    let user = match services.store().user_by_email(&body.email).await {
        Ok(user) => user,
        Err(e) => return errors::store_error_to_response(e),
    };

    // One indistinguishable error for unknown email and bad password.
    let Some(user) = user else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid credentials",
        );
    };
    if !verify_password(&body.password, &user.password_hash) {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid credentials",
        );
    }

    if !user.is_active {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "pending_approval",
            "account is pending approval from an admin",
        );
    }

    let token = match services.issue_token(&user) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("token issuance failed: {e}");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_error",
                "failed to issue token",
            );
        }
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "login successful",
            "token": token,
            "user": dto::user_to_json(&user),
        })),
    )
        .into_response()
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::put,
};
use chrono::Utc;

use stockpile_auth::{hash_password, validate_new_password, verify_password};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/update", put(update_profile))
        .route("/change-password", put(change_password))
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<dto::UpdateProfileRequest>,
) -> axum::response::Response {
    if body.name.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "name cannot be empty",
        );
    }

    let user = match services.store().user_by_id(current.user_id()).await {
        Ok(Some(user)) => user,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    let mut user = user;
    user.name = body.name;
    user.updated_at = Utc::now();

    let user = match services.store().update_user(user).await {
        Ok(user) => user,
        Err(e) => return errors::store_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "profile updated successfully",
            "user": dto::user_to_json(&user),
        })),
    )
        .into_response()
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<dto::ChangePasswordRequest>,
) -> axum::response::Response {
    if body.current_password.is_empty() || body.new_password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "current and new passwords are required",
        );
    }
    if let Err(e) = validate_new_password(&body.new_password) {
        return errors::domain_error_to_response(e);
    }

    let user = match services.store().user_by_id(current.user_id()).await {
        Ok(Some(user)) => user,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if !verify_password(&body.current_password, &user.password_hash) {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "incorrect current password",
        );
    }

    let password_hash = match hash_password(&body.new_password) {
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

    let mut user = user;
    user.password_hash = password_hash;
    user.updated_at = Utc::now();

    if let Err(e) = services.store().update_user(user).await {
        return errors::store_error_to_response(e);
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "password changed successfully" })),
    )
        .into_response()
}

//! Admin-only endpoints: user administration and the activity log.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, put},
};
use chrono::Utc;

use stockpile_audit::{ActivityAction, EntityKind};
use stockpile_auth::{Approval, Role};
use stockpile_core::{PageParams, UserId};

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/pending", get(pending_users))
        .route("/users/:id/approve", put(approve_user))
        .route("/users/:id", delete(delete_user))
        .route("/logs", get(activity_logs))
        .layer(axum::middleware::from_fn(crate::middleware::require_admin))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().list_users().await {
        Ok(users) => {
            let users: Vec<_> = users.iter().map(dto::user_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "users": users }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn pending_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().list_pending_users().await {
        Ok(users) => {
            let users: Vec<_> = users.iter().map(dto::user_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "users": users }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn approve_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<dto::ApproveUserRequest>,
) -> axum::response::Response {
    let id: UserId = match parse_id(&id, "user") {
        Ok(id) => id,
        Err(res) => return res,
    };

    let mut user = match services.store().user_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if services.is_master_admin(&user.email) {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "cannot modify the master admin account",
        );
    }

    let role: Option<Role> = match &body.role {
        Some(raw) => match raw.parse() {
            Ok(role) => Some(role),
            Err(e) => return errors::domain_error_to_response(e),
        },
        None => None,
    };

    Approval {
        is_active: body.is_active,
        role,
    }
    .apply(&mut user, Utc::now());

    let user = match services.store().update_user(user).await {
        Ok(user) => user,
        Err(e) => return errors::store_error_to_response(e),
    };

    services
        .log_activity(
            current.user_id(),
            ActivityAction::Approve,
            EntityKind::User,
            *user.id.as_uuid(),
            format!(
                "Set {} active={} role={}",
                user.email, user.is_active, user.role
            ),
        )
        .await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "user updated successfully",
            "user": dto::user_to_json(&user),
        })),
    )
        .into_response()
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match parse_id(&id, "user") {
        Ok(id) => id,
        Err(res) => return res,
    };

    let user = match services.store().user_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if services.is_master_admin(&user.email) {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "cannot delete the master admin account",
        );
    }

    if let Err(e) = services.store().delete_user(id).await {
        return errors::store_error_to_response(e);
    }

    services
        .log_activity(
            current.user_id(),
            ActivityAction::Delete,
            EntityKind::User,
            *user.id.as_uuid(),
            format!("Deleted user: {}", user.email),
        )
        .await;

    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "user deleted successfully" })),
    )
        .into_response()
}

pub async fn activity_logs(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    let page = PageParams::new(query.page.unwrap_or(1), query.limit.unwrap_or(10));

    match services.store().list_activities(page).await {
        Ok(page) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "logs": page.items,
                "pagination": {
                    "page": page.page,
                    "limit": page.limit,
                    "total": page.total,
                    "total_pages": page.total_pages(),
                },
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

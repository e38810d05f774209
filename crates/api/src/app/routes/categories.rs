use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockpile_catalog::NewCategory;
use stockpile_core::CategoryId;

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:id", axum::routing::put(update_category).delete(delete_category))
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().list_categories().await {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CategoryRequest>,
) -> axum::response::Response {
    let category = NewCategory {
        name: body.name,
        description: body.description,
    };
    let category = match category.into_category(CategoryId::new()) {
        Ok(category) => category,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().create_category(category).await {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::CategoryRequest>,
) -> axum::response::Response {
    let id: CategoryId = match parse_id(&id, "category") {
        Ok(id) => id,
        Err(res) => return res,
    };

    let replacement = NewCategory {
        name: body.name,
        description: body.description,
    };
    let category = match replacement.into_category(id) {
        Ok(category) => category,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().update_category(category).await {
        Ok(category) => (StatusCode::OK, Json(category)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CategoryId = match parse_id(&id, "category") {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.store().delete_category(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "category deleted successfully" })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

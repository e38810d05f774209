use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use stockpile_catalog::{NewSupplier, SupplierPatch};
use stockpile_core::SupplierId;

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route(
            "/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
}

pub async fn list_suppliers(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().list_suppliers().await {
        Ok(suppliers) => (
            StatusCode::OK,
            Json(serde_json::json!({ "suppliers": suppliers })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SupplierId = match parse_id(&id, "supplier") {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.store().supplier_by_id(id).await {
        Ok(Some(supplier)) => (
            StatusCode::OK,
            Json(serde_json::json!({ "supplier": supplier })),
        )
            .into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "supplier not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateSupplierRequest>,
) -> axum::response::Response {
    let supplier = NewSupplier {
        name: body.name,
        contact_name: body.contact_name,
        phone: body.phone,
        email: body.email,
        address: body.address,
    };
    let supplier = match supplier.into_supplier(SupplierId::new(), Utc::now()) {
        Ok(supplier) => supplier,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().create_supplier(supplier).await {
        Ok(supplier) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "supplier created successfully",
                "supplier": supplier,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateSupplierRequest>,
) -> axum::response::Response {
    let id: SupplierId = match parse_id(&id, "supplier") {
        Ok(id) => id,
        Err(res) => return res,
    };

    let mut supplier = match services.store().supplier_by_id(id).await {
        Ok(Some(supplier)) => supplier,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "supplier not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    let patch = SupplierPatch {
        name: body.name,
        contact_name: body.contact_name,
        phone: body.phone,
        email: body.email,
        address: body.address,
    };
    if let Err(e) = patch.apply(&mut supplier, Utc::now()) {
        return errors::domain_error_to_response(e);
    }

    match services.store().update_supplier(supplier).await {
        Ok(supplier) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "supplier updated successfully",
                "supplier": supplier,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SupplierId = match parse_id(&id, "supplier") {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.store().delete_supplier(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "supplier deleted successfully" })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

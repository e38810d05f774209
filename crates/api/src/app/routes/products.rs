use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use stockpile_audit::{ActivityAction, EntityKind};
use stockpile_catalog::{NewProduct, Product, ProductPatch};
use stockpile_core::{CategoryId, PageParams, ProductId, SupplierId};
use stockpile_infra::ProductFilter;

use crate::app::routes::{common::parse_id, stock};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/low-stock", get(low_stock))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/stock", post(stock::update_stock))
        .route("/:id/history", get(stock::history))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListProductsQuery>,
) -> axum::response::Response {
    let category_id = match &query.category_id {
        Some(raw) => match parse_id::<CategoryId>(raw, "category") {
            Ok(id) => Some(id),
            Err(res) => return res,
        },
        None => None,
    };

    let page = PageParams::new(query.page.unwrap_or(1), query.limit.unwrap_or(10));
    let filter = ProductFilter {
        search: query.search,
        category_id,
    };

    match services.store().list_products(filter, page).await {
        Ok(page) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "products": page.items,
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

pub async fn low_stock(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().list_low_stock().await {
        Ok(products) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "count": products.len(),
                "products": products,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match parse_id(&id, "product") {
        Ok(id) => id,
        Err(res) => return res,
    };

    let product = match services.store().product_by_id(id).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    // Directory lookups for the detail view.
    let supplier = match services.store().supplier_by_id(product.supplier_id).await {
        Ok(supplier) => supplier,
        Err(e) => return errors::store_error_to_response(e),
    };
    let category = match product.category_id {
        Some(category_id) => match services.store().category_by_id(category_id).await {
            Ok(category) => category,
            Err(e) => return errors::store_error_to_response(e),
        },
        None => None,
    };

    let mut body = serde_json::json!({ "product": product });
    body["product"]["supplier"] = serde_json::json!(supplier);
    body["product"]["category"] = serde_json::json!(category);

    (StatusCode::OK, Json(body)).into_response()
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let supplier_id: SupplierId = match parse_id(&body.supplier_id, "supplier") {
        Ok(id) => id,
        Err(res) => return res,
    };
    let category_id = match &body.category_id {
        Some(raw) => match parse_id::<CategoryId>(raw, "category") {
            Ok(id) => Some(id),
            Err(res) => return res,
        },
        None => None,
    };

    match services.store().supplier_by_id(supplier_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "supplier not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    }
    if let Some(category_id) = category_id {
        match services.store().category_by_id(category_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return errors::json_error(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    "category not found",
                );
            }
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    let new_product = NewProduct {
        sku: body.sku,
        name: body.name,
        description: body.description,
        price_cents: body.price_cents,
        initial_stock: body.stock,
        min_stock: body.min_stock,
        image_url: body.image_url,
        supplier_id,
        category_id,
    };
    let product = match new_product.into_product(ProductId::new(), Utc::now()) {
        Ok(product) => product,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let product = match services.store().create_product(product).await {
        Ok(product) => product,
        Err(e) => return errors::store_error_to_response(e),
    };

    services
        .log_activity(
            current.user_id(),
            ActivityAction::Create,
            EntityKind::Product,
            *product.id.as_uuid(),
            format!("Created product: {} ({})", product.name, product.sku),
        )
        .await;

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "product created successfully",
            "product": product,
        })),
    )
        .into_response()
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    let id: ProductId = match parse_id(&id, "product") {
        Ok(id) => id,
        Err(res) => return res,
    };

    let mut product = match services.store().product_by_id(id).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    let supplier_id = match &body.supplier_id {
        Some(raw) => match parse_id::<SupplierId>(raw, "supplier") {
            Ok(id) => Some(id),
            Err(res) => return res,
        },
        None => None,
    };
    let category_id = match &body.category_id {
        Some(raw) => match parse_id::<CategoryId>(raw, "category") {
            Ok(id) => Some(id),
            Err(res) => return res,
        },
        None => None,
    };

    // Referential checks only for the fields actually changing.
    if let Some(supplier_id) = supplier_id {
        match services.store().supplier_by_id(supplier_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return errors::json_error(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    "supplier not found",
                );
            }
            Err(e) => return errors::store_error_to_response(e),
        }
    }
    if let Some(category_id) = category_id {
        match services.store().category_by_id(category_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return errors::json_error(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    "category not found",
                );
            }
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    let patch = ProductPatch {
        sku: body.sku,
        name: body.name,
        description: body.description,
        price_cents: body.price_cents,
        min_stock: body.min_stock,
        image_url: body.image_url,
        supplier_id,
        category_id,
    };
    if let Err(e) = patch.apply(&mut product, Utc::now()) {
        return errors::domain_error_to_response(e);
    }

    let product = match services.store().update_product(product).await {
        Ok(product) => product,
        Err(e) => return errors::store_error_to_response(e),
    };

    services
        .log_activity(
            current.user_id(),
            ActivityAction::Update,
            EntityKind::Product,
            *product.id.as_uuid(),
            format!("Updated product: {} ({})", product.name, product.sku),
        )
        .await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "product updated successfully",
            "product": product,
        })),
    )
        .into_response()
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match parse_id(&id, "product") {
        Ok(id) => id,
        Err(res) => return res,
    };

    let product: Product = match services.store().product_by_id(id).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(e) = services.store().delete_product(id).await {
        return errors::store_error_to_response(e);
    }

    services
        .log_activity(
            current.user_id(),
            ActivityAction::Delete,
            EntityKind::Product,
            *product.id.as_uuid(),
            format!("Deleted product: {} ({})", product.name, product.sku),
        )
        .await;

    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "product deleted successfully" })),
    )
        .into_response()
}

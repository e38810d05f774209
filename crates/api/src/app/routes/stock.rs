//! Stock ledger endpoints: apply a movement, read the history.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use stockpile_audit::{ActivityAction, EntityKind};
use stockpile_core::ProductId;
use stockpile_ledger::{Direction, MovementRequest};

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub async fn update_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<dto::StockUpdateRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match parse_id(&id, "product") {
        Ok(id) => id,
        Err(res) => return res,
    };

    let direction: Direction = match body.direction.parse() {
        Ok(direction) => direction,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let request = MovementRequest {
        direction,
        quantity: body.quantity,
        note: body.note.unwrap_or_default(),
    };

    let (product, movement) = match services.store().apply_movement(product_id, request).await {
        Ok(applied) => applied,
        Err(e) => return errors::store_error_to_response(e),
    };

    let action = match direction {
        Direction::In => ActivityAction::StockIn,
        Direction::Out => ActivityAction::StockOut,
    };
    services
        .log_activity(
            current.user_id(),
            action,
            EntityKind::Product,
            *product.id.as_uuid(),
            format!(
                "Stock {}: {} x {} ({} -> {})",
                direction, movement.quantity, product.name, movement.stock_before,
                movement.stock_after,
            ),
        )
        .await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "stock updated successfully",
            "stock_before": movement.stock_before,
            "stock_after": movement.stock_after,
            "product": product,
            "movement": movement,
        })),
    )
        .into_response()
}

pub async fn history(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match parse_id(&id, "product") {
        Ok(id) => id,
        Err(res) => return res,
    };

    let history = match services.store().movement_history(product_id).await {
        Ok(history) => history,
        Err(e) => return errors::store_error_to_response(e),
    };

    // The product exists (history would have been NotFound otherwise); fetch
    // it for the summary header.
    let product = match services.store().product_by_id(product_id).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "product": {
                "id": product.id.to_string(),
                "name": product.name,
                "stock": product.stock,
            },
            "history": history,
        })),
    )
        .into_response()
}

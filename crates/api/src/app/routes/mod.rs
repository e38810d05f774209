use axum::{Router, routing::get};

pub mod admin;
pub mod auth;
pub mod categories;
pub mod common;
pub mod products;
pub mod profile;
pub mod stock;
pub mod suppliers;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/suppliers", suppliers::router())
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/profile", profile::router())
        .nest("/admin", admin::router())
}

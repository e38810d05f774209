use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(current): Extension<crate::context::CurrentUser>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": current.user_id().to_string(),
        "email": current.email(),
        "role": current.role(),
    }))
}

use core::str::FromStr;

use axum::http::StatusCode;

use stockpile_core::DomainError;

use crate::app::errors;

/// Parse a path/query identifier, mapping failures to a 400 response.
pub fn parse_id<T>(raw: &str, what: &'static str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            format!("invalid {what} id"),
        )
    })
}

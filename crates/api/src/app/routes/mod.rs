pub mod rooms;
pub mod sales;
pub mod system;

use axum::http::StatusCode;

use innkeep_core::DomainError;

use crate::app::errors;

/// Parse a path id. A malformed id names no resource, so it is answered like an
/// unknown one.
pub(crate) fn parse_id<T>(raw: &str, resource: &'static str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr<Err = DomainError>,
{
    raw.parse().map_err(|e: DomainError| {
        tracing::debug!(error = %e, "unparseable path id");
        errors::json_error(StatusCode::NOT_FOUND, "not_found", format!("{resource} not found"))
    })
}

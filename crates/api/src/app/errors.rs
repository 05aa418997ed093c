use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use innkeep_core::DomainError;
use innkeep_infra::{BookingError, LedgerError, RoomError};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

fn persistence_error(detail: &str) -> axum::response::Response {
    tracing::error!(error = %detail, "persistence failure");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "persistence_error",
        "the data store is unavailable",
    )
}

pub fn validation_error(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) | DomainError::InvalidId(msg) => validation_error(msg),
    }
}

/// Malformed or non-JSON bodies are validation failures.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    validation_error(rejection.body_text())
}

pub fn room_error_to_response(err: RoomError) -> axum::response::Response {
    match err {
        RoomError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "room not found"),
        RoomError::DuplicateTransition(msg) => {
            json_error(StatusCode::BAD_REQUEST, "duplicate_transition", msg)
        }
        RoomError::TransitionNotAllowed(msg) => {
            json_error(StatusCode::CONFLICT, "transition_not_allowed", msg)
        }
        RoomError::Persistence(detail) => persistence_error(&detail),
    }
}

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "sale not found"),
        LedgerError::Persistence(detail) => persistence_error(&detail),
    }
}

pub fn booking_error_to_response(err: BookingError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        BookingError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        BookingError::DuplicateTransition(msg) => {
            json_error(StatusCode::BAD_REQUEST, "duplicate_transition", msg)
        }
        BookingError::TransitionNotAllowed(msg) => {
            json_error(StatusCode::CONFLICT, "transition_not_allowed", msg)
        }
        BookingError::RemoteCallFailure(detail) => {
            tracing::warn!(error = %detail, "room service call failed");
            json_error(StatusCode::BAD_GATEWAY, "remote_call_failed", message)
        }
        BookingError::Timeout(_) => json_error(StatusCode::GATEWAY_TIMEOUT, "remote_timeout", message),
        BookingError::Persistence(detail) => persistence_error(&detail),
        BookingError::PartialFailure { .. } => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "partial_failure", message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use innkeep_core::RoomId;
    use innkeep_rooms::RoomStatus;
    use std::time::Duration;

    #[test]
    fn domain_errors_are_client_errors() {
        for err in [
            DomainError::validation("fields \"date\", \"value\", and \"roomId\" are required"),
            DomainError::invalid_id("RoomId: invalid length"),
        ] {
            assert_eq!(domain_error_to_response(err).status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn room_errors_map_to_distinct_statuses() {
        let cases = [
            (RoomError::NotFound, StatusCode::NOT_FOUND),
            (RoomError::DuplicateTransition("x".into()), StatusCode::BAD_REQUEST),
            (RoomError::TransitionNotAllowed("x".into()), StatusCode::CONFLICT),
            (RoomError::Persistence("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(room_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn booking_errors_map_to_distinct_statuses() {
        let cases = [
            (BookingError::NotFound("room"), StatusCode::NOT_FOUND),
            (BookingError::DuplicateTransition("x".into()), StatusCode::BAD_REQUEST),
            (BookingError::TransitionNotAllowed("x".into()), StatusCode::CONFLICT),
            (BookingError::RemoteCallFailure("x".into()), StatusCode::BAD_GATEWAY),
            (BookingError::Timeout(Duration::from_secs(5)), StatusCode::GATEWAY_TIMEOUT),
            (BookingError::Persistence("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                BookingError::PartialFailure {
                    room_id: RoomId::new(),
                    sale_id: None,
                    room_status: RoomStatus::Reserved,
                    reason: "x".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(booking_error_to_response(err).status(), status);
        }
    }
}

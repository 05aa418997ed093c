use std::sync::Arc;

use axum::{
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};

use innkeep_core::RoomId;
use innkeep_observability::RequestContext;

use crate::app::routes::parse_id;
use crate::app::services::RoomServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/cuartos", get(list_rooms).post(create_room))
        .route("/cuartos/:id", get(get_room))
        .route("/cuartos/:id/reservar", patch(reserve_room))
        .route("/cuartos/:id/pagar", patch(pay_room))
}

pub async fn create_room(
    Extension(services): Extension<Arc<RoomServices>>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<dto::CreateRoomRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let input = match body.validate() {
        Ok(i) => i,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.registry.create(&ctx, input).await {
        Ok(room) => (StatusCode::CREATED, Json(room)).into_response(),
        Err(e) => errors::room_error_to_response(e),
    }
}

pub async fn list_rooms(
    Extension(services): Extension<Arc<RoomServices>>,
) -> axum::response::Response {
    match services.registry.list().await {
        Ok(rooms) => Json(rooms).into_response(),
        Err(e) => errors::room_error_to_response(e),
    }
}

pub async fn get_room(
    Extension(services): Extension<Arc<RoomServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: RoomId = match parse_id(&id, "room") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.registry.get(id).await {
        Ok(room) => Json(room).into_response(),
        Err(e) => errors::room_error_to_response(e),
    }
}

pub async fn reserve_room(
    Extension(services): Extension<Arc<RoomServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: RoomId = match parse_id(&id, "room") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.registry.reserve(&ctx, id).await {
        Ok(room) => Json(room).into_response(),
        Err(e) => errors::room_error_to_response(e),
    }
}

pub async fn pay_room(
    Extension(services): Extension<Arc<RoomServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: RoomId = match parse_id(&id, "room") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.registry.pay(&ctx, id).await {
        Ok(room) => Json(room).into_response(),
        Err(e) => errors::room_error_to_response(e),
    }
}

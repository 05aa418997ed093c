//! HTTP application wiring (Axum routers + service wiring).
//!
//! - `services.rs`: stores, audit sink and room client wiring
//! - `routes/`: HTTP routes + handlers (one file per service)
//! - `dto.rs`: request DTOs validated at the boundary
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use innkeep_observability::OperationEvents;

use crate::middleware::{self, ObserveState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::{RoomServices, SalesServices};

/// Router for the rooms service (`/cuartos`).
pub fn build_rooms_app(services: Arc<RoomServices>, events: Arc<dyn OperationEvents>) -> Router {
    observed(routes::rooms::router(), events)
        .layer(Extension(services))
        .route("/health", get(routes::system::health))
}

/// Router for the sales service (`/sales`).
pub fn build_sales_app(services: Arc<SalesServices>, events: Arc<dyn OperationEvents>) -> Router {
    observed(routes::sales::router(), events)
        .layer(Extension(services))
        .route("/health", get(routes::system::health))
}

fn observed(router: Router, events: Arc<dyn OperationEvents>) -> Router {
    router.route_layer(axum::middleware::from_fn_with_state(
        ObserveState { events },
        middleware::observe_middleware,
    ))
}

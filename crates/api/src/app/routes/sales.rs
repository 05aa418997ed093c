use std::sync::Arc;

use axum::{
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};

use innkeep_core::SaleId;
use innkeep_observability::RequestContext;
use innkeep_sales::Period;

use crate::app::routes::parse_id;
use crate::app::services::SalesServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route(
            "/sales",
            get(list_sales).post(create_sale).delete(delete_all_sales),
        )
        // GET takes a period, DELETE a sale id; both share the one path segment.
        .route("/sales/:id", get(sales_stats).delete(delete_sale))
        .route("/sales/:id/pay", patch(pay_sale))
}

pub async fn create_sale(
    Extension(services): Extension<Arc<SalesServices>>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<dto::CreateSaleRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let input = match body.validate() {
        Ok(i) => i,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.saga.create_booking(&ctx, input).await {
        Ok(sale) => (StatusCode::CREATED, Json(sale)).into_response(),
        Err(e) => errors::booking_error_to_response(e),
    }
}

pub async fn pay_sale(
    Extension(services): Extension<Arc<SalesServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SaleId = match parse_id(&id, "sale") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.saga.pay_sale(&ctx, id).await {
        Ok(sale) => Json(sale).into_response(),
        Err(e) => errors::booking_error_to_response(e),
    }
}

pub async fn list_sales(
    Extension(services): Extension<Arc<SalesServices>>,
) -> axum::response::Response {
    match services.ledger().list().await {
        Ok(sales) => Json(sales).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn sales_stats(
    Extension(services): Extension<Arc<SalesServices>>,
    Path(period): Path<String>,
) -> axum::response::Response {
    let period: Period = match period.parse() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger().stats(period).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn delete_all_sales(
    Extension(services): Extension<Arc<SalesServices>>,
) -> axum::response::Response {
    match services.ledger().delete_all().await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn delete_sale(
    Extension(services): Extension<Arc<SalesServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SaleId = match parse_id(&id, "sale") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.ledger().delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

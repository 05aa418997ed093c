use std::sync::Arc;

use axum::{
    extract::{MatchedPath, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

use innkeep_observability::{CORRELATION_HEADER, Operation, OperationEvents};

use crate::context::request_context;

/// Emitter handed to every request's `RequestContext`.
#[derive(Clone)]
pub struct ObserveState {
    pub events: Arc<dyn OperationEvents>,
}

/// Builds the request's `RequestContext`, emits start/finish events for the matched
/// route through it, and echoes the correlation id on the response.
///
/// Installed with `route_layer` so `MatchedPath` is available.
pub async fn observe_middleware(
    State(state): State<ObserveState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let ctx = request_context(req.headers(), state.events.clone());
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let operation = Operation::new(req.method().as_str(), route);
    let correlation_id = ctx.correlation_id();

    ctx.events().started(correlation_id, &operation);
    req.extensions_mut().insert(ctx.clone());

    let mut response = next.run(req).await;

    ctx.events()
        .finished(correlation_id, &operation, response.status().as_u16());
    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::extract::Extension;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use innkeep_observability::{OperationEvent, RecordingOperationEvents, RequestContext};
    use tower::ServiceExt;

    /// Emits through the context it was handed, as domain code does.
    async fn nested_step(Extension(ctx): Extension<RequestContext>) -> StatusCode {
        ctx.events()
            .started(ctx.correlation_id(), &Operation::new("STEP", "reserve-room"));
        StatusCode::NO_CONTENT
    }

    #[tokio::test]
    async fn handlers_emit_through_the_request_context() {
        let events = Arc::new(RecordingOperationEvents::new());
        let app = Router::new()
            .route("/steps/:id", get(nested_step))
            .route_layer(axum::middleware::from_fn_with_state(
                ObserveState {
                    events: events.clone(),
                },
                observe_middleware,
            ));

        let res = app
            .oneshot(Request::builder().uri("/steps/7").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let recorded = events.events();
        assert_eq!(recorded.len(), 3);
        let ids: Vec<_> = recorded
            .iter()
            .map(|e| match e {
                OperationEvent::Started { correlation_id, .. }
                | OperationEvent::Succeeded { correlation_id, .. }
                | OperationEvent::Failed { correlation_id, .. } => *correlation_id,
            })
            .collect();
        assert!(ids.iter().all(|id| *id == ids[0]));

        match &recorded[0] {
            OperationEvent::Started { operation, .. } => assert_eq!(operation.route, "/steps/:id"),
            other => panic!("expected route start, got {other:?}"),
        }
        match &recorded[1] {
            OperationEvent::Started { operation, .. } => assert_eq!(operation.method, "STEP"),
            other => panic!("expected nested start, got {other:?}"),
        }
        assert!(matches!(recorded[2], OperationEvent::Succeeded { status: 204, .. }));
    }
}

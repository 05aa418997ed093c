use std::sync::Arc;

use axum::http::HeaderMap;
use uuid::Uuid;

use innkeep_observability::{CORRELATION_HEADER, OperationEvents, RequestContext};

/// Correlation id carried by an inbound request, if it is a well-formed UUID.
pub fn inbound_correlation_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(CORRELATION_HEADER)?
        .to_str()
        .ok()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
}

/// Context for one inbound request.
///
/// Reuses the caller's correlation id so one booking can be followed across both
/// services; otherwise starts a new one.
pub fn request_context(headers: &HeaderMap, events: Arc<dyn OperationEvents>) -> RequestContext {
    let correlation_id = inbound_correlation_id(headers).unwrap_or_else(Uuid::now_v7);
    RequestContext::new(correlation_id, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use innkeep_observability::TracingOperationEvents;

    #[test]
    fn inbound_correlation_id_is_reused() {
        let id = Uuid::now_v7();
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());

        let ctx = request_context(&headers, Arc::new(TracingOperationEvents));
        assert_eq!(ctx.correlation_id(), id);
    }

    #[test]
    fn malformed_correlation_id_is_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_HEADER, HeaderValue::from_static("not-a-uuid"));

        assert_eq!(inbound_correlation_id(&headers), None);
        let ctx = request_context(&headers, Arc::new(TracingOperationEvents));
        assert_ne!(ctx.correlation_id(), Uuid::nil());
    }
}

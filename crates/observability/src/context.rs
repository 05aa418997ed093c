use std::sync::Arc;

use uuid::Uuid;

use crate::events::{OperationEvents, TracingOperationEvents};

/// Header used to propagate the correlation id between services.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Context for one unit of work (one inbound request).
///
/// Carries the correlation id used in logs and audit entries, and the emitter that
/// receives operation boundary events. Cheap to clone.
#[derive(Clone)]
pub struct RequestContext {
    correlation_id: Uuid,
    events: Arc<dyn OperationEvents>,
}

impl RequestContext {
    pub fn new(correlation_id: Uuid, events: Arc<dyn OperationEvents>) -> Self {
        Self {
            correlation_id,
            events,
        }
    }

    /// Fresh correlation id, events go to `tracing`.
    pub fn detached() -> Self {
        Self::new(Uuid::now_v7(), Arc::new(TracingOperationEvents))
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn events(&self) -> &dyn OperationEvents {
        self.events.as_ref()
    }
}

impl core::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RequestContext")
            .field("correlation_id", &self.correlation_id)
            .finish_non_exhaustive()
    }
}

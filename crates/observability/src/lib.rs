//! Tracing, logging and per-operation events (shared setup).

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Request-scoped context passed explicitly into every operation.
pub mod context;

/// Start/success/failure events emitted at operation boundaries.
pub mod events;

pub use context::{CORRELATION_HEADER, RequestContext};
pub use events::{
    Operation, OperationEvent, OperationEvents, RecordingOperationEvents, TracingOperationEvents,
};

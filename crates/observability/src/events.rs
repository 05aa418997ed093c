use std::sync::Mutex;

use serde::Serialize;
use uuid::Uuid;

/// Operation boundary: HTTP method + matched route template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub method: String,
    pub route: String,
}

impl Operation {
    pub fn new(method: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            route: route.into(),
        }
    }
}

/// One boundary event, as delivered to a collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationEvent {
    Started {
        correlation_id: Uuid,
        operation: Operation,
    },
    Succeeded {
        correlation_id: Uuid,
        operation: Operation,
        status: u16,
    },
    Failed {
        correlation_id: Uuid,
        operation: Operation,
        status: u16,
    },
}

/// Receiver of operation boundary events (the observability collector seam).
pub trait OperationEvents: Send + Sync {
    fn emit(&self, event: OperationEvent);

    fn started(&self, correlation_id: Uuid, operation: &Operation) {
        self.emit(OperationEvent::Started {
            correlation_id,
            operation: operation.clone(),
        });
    }

    /// Emits `Succeeded` for 1xx-3xx statuses and `Failed` otherwise.
    fn finished(&self, correlation_id: Uuid, operation: &Operation, status: u16) {
        let operation = operation.clone();
        if status < 400 {
            self.emit(OperationEvent::Succeeded {
                correlation_id,
                operation,
                status,
            });
        } else {
            self.emit(OperationEvent::Failed {
                correlation_id,
                operation,
                status,
            });
        }
    }
}

/// Emits boundary events as structured `tracing` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingOperationEvents;

impl OperationEvents for TracingOperationEvents {
    fn emit(&self, event: OperationEvent) {
        match event {
            OperationEvent::Started {
                correlation_id,
                operation,
            } => {
                tracing::debug!(
                    %correlation_id,
                    method = %operation.method,
                    route = %operation.route,
                    "operation started"
                );
            }
            OperationEvent::Succeeded {
                correlation_id,
                operation,
                status,
            } => {
                tracing::info!(
                    %correlation_id,
                    method = %operation.method,
                    route = %operation.route,
                    status,
                    "operation succeeded"
                );
            }
            OperationEvent::Failed {
                correlation_id,
                operation,
                status,
            } => {
                tracing::warn!(
                    %correlation_id,
                    method = %operation.method,
                    route = %operation.route,
                    status,
                    "operation failed"
                );
            }
        }
    }
}

/// Keeps every event in memory (tests/dev).
#[derive(Debug, Default)]
pub struct RecordingOperationEvents {
    inner: Mutex<Vec<OperationEvent>>,
}

impl RecordingOperationEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<OperationEvent> {
        self.inner.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl OperationEvents for RecordingOperationEvents {
    fn emit(&self, event: OperationEvent) {
        if let Ok(mut events) = self.inner.lock() {
            events.push(event);
        }
    }
}

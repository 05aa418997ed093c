//! Append-only audit trail of room transition attempts.
//!
//! Audit writes are best-effort: `AuditRecorder` bounds every write with a timeout and
//! reports failures to the operator log only. A failed audit write never fails or rolls
//! back the business operation that produced it.

pub mod elasticsearch;
pub mod memory;
pub mod tracing_sink;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use innkeep_core::{RoomId, SaleId};
use innkeep_observability::RequestContext;
use innkeep_rooms::{RoomStatus, Transition};

pub use elasticsearch::ElasticsearchAuditSink;
pub use memory::InMemoryAuditSink;
pub use tracing_sink::TracingAuditSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Reservation,
    DuplicatedReservation,
    Payment,
    DuplicatedPayment,
    /// Room reserved remotely but the sale was never recorded.
    OrphanedReservation,
    /// Room paid remotely but the sale was not marked paid.
    OrphanedPayment,
}

impl AuditAction {
    pub fn accepted(transition: Transition) -> Self {
        match transition {
            Transition::Reserve => AuditAction::Reservation,
            Transition::Pay => AuditAction::Payment,
        }
    }

    pub fn duplicated(transition: Transition) -> Self {
        match transition {
            Transition::Reserve => AuditAction::DuplicatedReservation,
            Transition::Pay => AuditAction::DuplicatedPayment,
        }
    }

    pub fn orphaned(transition: Transition) -> Self {
        match transition {
            Transition::Reserve => AuditAction::OrphanedReservation,
            Transition::Pay => AuditAction::OrphanedPayment,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Reservation => "reservation",
            AuditAction::DuplicatedReservation => "duplicated_reservation",
            AuditAction::Payment => "payment",
            AuditAction::DuplicatedPayment => "duplicated_payment",
            AuditAction::OrphanedReservation => "orphaned_reservation",
            AuditAction::OrphanedPayment => "orphaned_payment",
        }
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub action: AuditAction,
    pub room_id: RoomId,
    pub resulting_status: RoomStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<SaleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, room_id: RoomId, resulting_status: RoomStatus) -> Self {
        Self {
            action,
            room_id,
            resulting_status,
            timestamp: Utc::now(),
            sale_id: None,
            correlation_id: None,
        }
    }

    pub fn with_sale(mut self, sale_id: SaleId) -> Self {
        self.sale_id = Some(sale_id);
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),

    #[error("audit sink rejected entry with status {0}")]
    Rejected(u16),

    #[error("audit write timed out after {0:?}")]
    Timeout(Duration),
}

/// Destination of audit entries (search index, log, memory).
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

/// Bounded, fire-and-forget front for an `AuditSink`.
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
    timeout: Duration,
}

impl AuditRecorder {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

    pub fn new(sink: Arc<dyn AuditSink>, timeout: Duration) -> Self {
        Self { sink, timeout }
    }

    /// Stamp `entry` with the request's correlation id and append it.
    ///
    /// Never returns an error: failures and timeouts are logged and dropped.
    pub async fn record(&self, ctx: &RequestContext, mut entry: AuditEntry) {
        entry.correlation_id = Some(ctx.correlation_id());

        let outcome = match tokio::time::timeout(self.timeout, self.sink.append(&entry)).await {
            Ok(result) => result,
            Err(_) => Err(AuditError::Timeout(self.timeout)),
        };

        if let Err(err) = outcome {
            tracing::warn!(
                correlation_id = %ctx.correlation_id(),
                action = entry.action.as_str(),
                room_id = %entry.room_id,
                error = %err,
                "audit write failed"
            );
        }
    }
}

impl core::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuditRecorder")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

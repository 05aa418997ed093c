use async_trait::async_trait;

use super::{AuditEntry, AuditError, AuditSink};

/// Writes each entry as a structured log record under the `audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        tracing::info!(
            target: "audit",
            action = entry.action.as_str(),
            room_id = %entry.room_id,
            resulting_status = %entry.resulting_status,
            timestamp = %entry.timestamp.to_rfc3339(),
            sale_id = ?entry.sale_id,
            correlation_id = ?entry.correlation_id,
            "audit"
        );
        Ok(())
    }
}

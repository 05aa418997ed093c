//! Misbehaving sinks shared by tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{AuditEntry, AuditError, AuditSink};

/// Refuses every entry, counting the attempts.
#[derive(Debug, Default)]
pub(crate) struct BrokenSink {
    attempts: AtomicUsize,
}

impl BrokenSink {
    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuditSink for BrokenSink {
    async fn append(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AuditError::Unavailable("connection refused".into()))
    }
}

/// Never completes a write.
#[derive(Debug, Default)]
pub(crate) struct StuckSink;

#[async_trait]
impl AuditSink for StuckSink {
    async fn append(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
        std::future::pending().await
    }
}

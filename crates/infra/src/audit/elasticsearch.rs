//! Audit sink indexing entries into an Elasticsearch-compatible HTTP endpoint.

use std::time::Duration;

use async_trait::async_trait;

use super::{AuditEntry, AuditError, AuditSink};

/// Index used when none is configured.
pub const DEFAULT_AUDIT_INDEX: &str = "cuartos-logs";

/// `POST {base_url}/{index}/_doc` per entry.
#[derive(Debug, Clone)]
pub struct ElasticsearchAuditSink {
    client: reqwest::Client,
    endpoint: String,
}

impl ElasticsearchAuditSink {
    pub fn new(base_url: &str, index: &str, timeout: Duration) -> Result<Self, AuditError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuditError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/{}/_doc", base_url.trim_end_matches('/'), index),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AuditSink for ElasticsearchAuditSink {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let res = self
            .client
            .post(&self.endpoint)
            .json(entry)
            .send()
            .await
            .map_err(|e| AuditError::Unavailable(e.to_string()))?;

        if res.status().is_success() {
            Ok(())
        } else {
            Err(AuditError::Rejected(res.status().as_u16()))
        }
    }
}

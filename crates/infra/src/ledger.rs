//! Sale ledger: persistence of sales and the statistics derived from them.

use std::sync::Arc;

use thiserror::Error;

use innkeep_core::SaleId;
use innkeep_sales::{NewSale, Period, Sale, SaleStatus, SalesStats, group_by};

use crate::store::{SaleStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("sale not found")]
    NotFound,

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => LedgerError::NotFound,
            other => LedgerError::Persistence(other.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct SaleLedger {
    store: Arc<dyn SaleStore>,
}

impl SaleLedger {
    pub fn new(store: Arc<dyn SaleStore>) -> Self {
        Self { store }
    }

    /// Record a sale with a fresh id; new sales start `Reserved`.
    pub async fn create(&self, input: NewSale) -> Result<Sale, LedgerError> {
        Ok(self.store.insert(Sale::reserved(SaleId::new(), input)).await?)
    }

    pub async fn get(&self, id: SaleId) -> Result<Sale, LedgerError> {
        self.store.get(id).await?.ok_or(LedgerError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<Sale>, LedgerError> {
        Ok(self.store.list().await?)
    }

    pub async fn mark_paid(&self, id: SaleId) -> Result<Sale, LedgerError> {
        self.store
            .set_status(id, SaleStatus::Paid)
            .await?
            .ok_or(LedgerError::NotFound)
    }

    /// Returns the number of removed sales.
    pub async fn delete_all(&self) -> Result<u64, LedgerError> {
        let removed = self.store.delete_all().await?;
        tracing::info!(removed, "sales ledger cleared");
        Ok(removed)
    }

    pub async fn delete(&self, id: SaleId) -> Result<(), LedgerError> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(LedgerError::NotFound)
        }
    }

    /// Totals per period bucket, or the top sales by value for `Period::Max`.
    pub async fn stats(&self, period: Period) -> Result<SalesStats, LedgerError> {
        let sales = self.store.list().await?;
        tracing::debug!(period = period.as_str(), sales = sales.len(), "computing sales stats");
        Ok(group_by(&sales, period))
    }
}

impl core::fmt::Debug for SaleLedger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SaleLedger").finish_non_exhaustive()
    }
}

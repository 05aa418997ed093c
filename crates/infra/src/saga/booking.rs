//! Booking saga: a remote room transition followed by a local sale write.
//!
//! The remote step commits first. Any failure before it commits aborts with nothing
//! written; any local failure after it commits is an orphan, reported as
//! `BookingError::PartialFailure` and marked in the audit trail for reconciliation. A
//! transition the room service accepted but whose answer could not be read counts as
//! committed.
//! There is no compensating call that undoes a committed room transition.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use innkeep_core::{RoomId, SaleId};
use innkeep_observability::RequestContext;
use innkeep_rooms::{Room, RoomStatus, Transition};
use innkeep_sales::{NewSale, Sale};

use crate::audit::{AuditAction, AuditEntry, AuditRecorder};
use crate::client::{RemoteError, RoomServiceClient};
use crate::ledger::{LedgerError, SaleLedger};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BookingError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    DuplicateTransition(String),

    #[error("{0}")]
    TransitionNotAllowed(String),

    #[error("room service call failed")]
    RemoteCallFailure(String),

    #[error("room service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("sale store unavailable")]
    Persistence(String),

    /// The room transition committed but the sale write did not.
    #[error("room is now {room_status} but the sale could not be updated; flagged for reconciliation")]
    PartialFailure {
        room_id: RoomId,
        sale_id: Option<SaleId>,
        room_status: RoomStatus,
        reason: String,
    },
}

pub struct BookingSaga {
    rooms: Arc<dyn RoomServiceClient>,
    ledger: SaleLedger,
    audit: AuditRecorder,
    remote_timeout: Duration,
}

impl BookingSaga {
    pub fn new(
        rooms: Arc<dyn RoomServiceClient>,
        ledger: SaleLedger,
        audit: AuditRecorder,
        remote_timeout: Duration,
    ) -> Self {
        Self {
            rooms,
            ledger,
            audit,
            remote_timeout,
        }
    }

    pub fn ledger(&self) -> &SaleLedger {
        &self.ledger
    }

    /// Reserve the room, then record a `Reserved` sale for it.
    ///
    /// No sale is written unless the reservation succeeded on this call.
    pub async fn create_booking(&self, ctx: &RequestContext, input: NewSale) -> Result<Sale, BookingError> {
        let room_id = input.room_id;
        let room = self.call_room(ctx, room_id, None, Transition::Reserve).await?;

        match self.ledger.create(input).await {
            Ok(sale) => {
                tracing::info!(
                    correlation_id = %ctx.correlation_id(),
                    sale_id = %sale.id,
                    room_id = %room_id,
                    "booking created"
                );
                Ok(sale)
            }
            Err(err) => Err(self
                .orphan(ctx, room.id, room.status, None, Transition::Reserve, err.to_string())
                .await),
        }
    }

    /// Pay the sale's room, then mark the sale `Paid`.
    ///
    /// A failed room call leaves the sale untouched.
    pub async fn pay_sale(&self, ctx: &RequestContext, sale_id: SaleId) -> Result<Sale, BookingError> {
        let sale = self.ledger.get(sale_id).await.map_err(|err| match err {
            LedgerError::NotFound => BookingError::NotFound("sale"),
            LedgerError::Persistence(reason) => BookingError::Persistence(reason),
        })?;

        let room = self
            .call_room(ctx, sale.room_id, Some(sale_id), Transition::Pay)
            .await?;

        match self.ledger.mark_paid(sale_id).await {
            Ok(paid) => {
                tracing::info!(
                    correlation_id = %ctx.correlation_id(),
                    sale_id = %sale_id,
                    room_id = %sale.room_id,
                    "booking paid"
                );
                Ok(paid)
            }
            Err(err) => Err(self
                .orphan(ctx, room.id, room.status, Some(sale_id), Transition::Pay, err.to_string())
                .await),
        }
    }

    /// Run one room transition under the remote timeout.
    ///
    /// A transition the room service accepted without a readable answer counts as
    /// committed: it is marked as an orphan and reported as a partial failure.
    async fn call_room(
        &self,
        ctx: &RequestContext,
        room_id: RoomId,
        sale_id: Option<SaleId>,
        transition: Transition,
    ) -> Result<Room, BookingError> {
        let call = async {
            match transition {
                Transition::Reserve => self.rooms.reserve(ctx, room_id).await,
                Transition::Pay => self.rooms.pay(ctx, room_id).await,
            }
        };

        let result = match tokio::time::timeout(self.remote_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(self.remote_timeout)),
        };

        let err = match result {
            Ok(room) => return Ok(room),
            Err(err) => err,
        };

        if let RemoteError::Unconfirmed(reason) = err {
            return Err(self
                .orphan(ctx, room_id, transition.target(), sale_id, transition, reason)
                .await);
        }

        tracing::info!(
            correlation_id = %ctx.correlation_id(),
            room_id = %room_id,
            error = %err,
            "room transition refused or failed; booking aborted"
        );

        Err(match err {
            RemoteError::NotFound => BookingError::NotFound("room"),
            RemoteError::DuplicateTransition(msg) => BookingError::DuplicateTransition(msg),
            RemoteError::TransitionNotAllowed(msg) => BookingError::TransitionNotAllowed(msg),
            RemoteError::Timeout(after) => BookingError::Timeout(after),
            RemoteError::Failed(reason) | RemoteError::Unconfirmed(reason) => {
                BookingError::RemoteCallFailure(reason)
            }
        })
    }

    async fn orphan(
        &self,
        ctx: &RequestContext,
        room_id: RoomId,
        room_status: RoomStatus,
        sale_id: Option<SaleId>,
        transition: Transition,
        reason: String,
    ) -> BookingError {
        let mut entry = AuditEntry::new(AuditAction::orphaned(transition), room_id, room_status);
        if let Some(id) = sale_id {
            entry = entry.with_sale(id);
        }
        self.audit.record(ctx, entry).await;

        tracing::error!(
            correlation_id = %ctx.correlation_id(),
            room_id = %room_id,
            sale_id = ?sale_id,
            room_status = %room_status,
            error = %reason,
            "room transition committed but sale write did not follow"
        );

        BookingError::PartialFailure {
            room_id,
            sale_id,
            room_status,
            reason,
        }
    }
}

impl core::fmt::Debug for BookingSaga {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BookingSaga")
            .field("remote_timeout", &self.remote_timeout)
            .finish_non_exhaustive()
    }
}

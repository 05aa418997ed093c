//! Room registry: owns rooms and guards their status transitions.

use std::sync::Arc;

use thiserror::Error;

use innkeep_core::{ExpectedVersion, RoomId};
use innkeep_observability::RequestContext;
use innkeep_rooms::{NewRoom, Room, Transition, TransitionPolicy, TransitionRejected};

use crate::audit::{AuditAction, AuditEntry, AuditRecorder};
use crate::store::{RoomStore, StoreError};

/// Upper bound on guard re-evaluations when conditional writes keep losing races.
const MAX_TRANSITION_ATTEMPTS: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room not found")]
    NotFound,

    /// The room is already at (or past) the requested status.
    #[error("{0}")]
    DuplicateTransition(String),

    /// Strict policy only.
    #[error("{0}")]
    TransitionNotAllowed(String),

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl From<StoreError> for RoomError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => RoomError::NotFound,
            other => RoomError::Persistence(other.to_string()),
        }
    }
}

pub struct RoomRegistry {
    store: Arc<dyn RoomStore>,
    audit: AuditRecorder,
    policy: TransitionPolicy,
}

impl RoomRegistry {
    pub fn new(store: Arc<dyn RoomStore>, audit: AuditRecorder, policy: TransitionPolicy) -> Self {
        Self {
            store,
            audit,
            policy,
        }
    }

    /// Administrative creation; new rooms start `Available`.
    pub async fn create(&self, ctx: &RequestContext, input: NewRoom) -> Result<Room, RoomError> {
        let room = self.store.insert(Room::create(RoomId::new(), input)).await?;
        tracing::info!(correlation_id = %ctx.correlation_id(), room_id = %room.id, "room created");
        Ok(room)
    }

    pub async fn list(&self) -> Result<Vec<Room>, RoomError> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: RoomId) -> Result<Room, RoomError> {
        self.store.get(id).await?.ok_or(RoomError::NotFound)
    }

    pub async fn reserve(&self, ctx: &RequestContext, id: RoomId) -> Result<Room, RoomError> {
        self.transition(ctx, id, Transition::Reserve).await
    }

    pub async fn pay(&self, ctx: &RequestContext, id: RoomId) -> Result<Room, RoomError> {
        self.transition(ctx, id, Transition::Pay).await
    }

    /// Read, evaluate the guard, then commit with a version-conditioned write.
    ///
    /// A lost race re-reads and re-evaluates, so a concurrent winner's status is what the
    /// guard sees on the next attempt.
    async fn transition(
        &self,
        ctx: &RequestContext,
        id: RoomId,
        transition: Transition,
    ) -> Result<Room, RoomError> {
        for attempt in 1..=MAX_TRANSITION_ATTEMPTS {
            let current = self.get(id).await?;

            if let Err(rejected) = current.check(transition, self.policy) {
                return Err(self.reject(ctx, &current, transition, rejected).await);
            }

            let next = current.transitioned(transition);
            match self
                .store
                .replace(next, ExpectedVersion::Exact(current.version))
                .await
            {
                Ok(updated) => {
                    self.audit
                        .record(
                            ctx,
                            AuditEntry::new(AuditAction::accepted(transition), id, updated.status),
                        )
                        .await;
                    tracing::info!(
                        correlation_id = %ctx.correlation_id(),
                        room_id = %id,
                        status = %updated.status,
                        "room transitioned"
                    );
                    return Ok(updated);
                }
                Err(StoreError::Concurrency(reason)) => {
                    tracing::debug!(
                        correlation_id = %ctx.correlation_id(),
                        room_id = %id,
                        attempt,
                        %reason,
                        "conditional room update lost a race; re-evaluating guard"
                    );
                }
                Err(other) => return Err(other.into()),
            }
        }

        tracing::warn!(correlation_id = %ctx.correlation_id(), room_id = %id, "room transition gave up under contention");
        Err(RoomError::Persistence(
            "room is being updated concurrently; retry later".to_string(),
        ))
    }

    async fn reject(
        &self,
        ctx: &RequestContext,
        room: &Room,
        transition: Transition,
        rejected: TransitionRejected,
    ) -> RoomError {
        match rejected {
            TransitionRejected::Duplicate { current } => {
                self.audit
                    .record(
                        ctx,
                        AuditEntry::new(AuditAction::duplicated(transition), room.id, current),
                    )
                    .await;
                tracing::info!(
                    correlation_id = %ctx.correlation_id(),
                    room_id = %room.id,
                    status = %current,
                    "duplicate room transition rejected"
                );
                RoomError::DuplicateTransition(rejected.to_string())
            }
            TransitionRejected::NotAllowed { .. } => {
                RoomError::TransitionNotAllowed(rejected.to_string())
            }
        }
    }
}

impl core::fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

//! The contract the sales side uses to drive room transitions.
//!
//! Two implementations: `HttpRoomClient` calls a remote rooms service, `LocalRoomClient`
//! calls an in-process `RoomRegistry` (single-process deployments and tests).

pub mod http;
pub mod local;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use innkeep_core::RoomId;
use innkeep_observability::RequestContext;
use innkeep_rooms::Room;

pub use http::HttpRoomClient;
pub use local::LocalRoomClient;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("room not found")]
    NotFound,

    #[error("{0}")]
    DuplicateTransition(String),

    #[error("{0}")]
    TransitionNotAllowed(String),

    /// Unreachable service or unexpected status.
    #[error("room service call failed: {0}")]
    Failed(String),

    #[error("room service did not answer within {0:?}")]
    Timeout(Duration),

    /// The service accepted the transition but its resulting room could not be read.
    #[error("room transition was accepted but its result could not be read: {0}")]
    Unconfirmed(String),
}

#[async_trait]
pub trait RoomServiceClient: Send + Sync {
    async fn reserve(&self, ctx: &RequestContext, room_id: RoomId) -> Result<Room, RemoteError>;

    async fn pay(&self, ctx: &RequestContext, room_id: RoomId) -> Result<Room, RemoteError>;
}

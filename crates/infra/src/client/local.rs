use std::sync::Arc;

use async_trait::async_trait;

use innkeep_core::RoomId;
use innkeep_observability::RequestContext;
use innkeep_rooms::Room;

use super::{RemoteError, RoomServiceClient};
use crate::rooms::{RoomError, RoomRegistry};

/// In-process client over a shared `RoomRegistry`.
#[derive(Debug, Clone)]
pub struct LocalRoomClient {
    registry: Arc<RoomRegistry>,
}

impl LocalRoomClient {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }
}

impl From<RoomError> for RemoteError {
    fn from(err: RoomError) -> Self {
        match err {
            RoomError::NotFound => RemoteError::NotFound,
            RoomError::DuplicateTransition(msg) => RemoteError::DuplicateTransition(msg),
            RoomError::TransitionNotAllowed(msg) => RemoteError::TransitionNotAllowed(msg),
            other => RemoteError::Failed(other.to_string()),
        }
    }
}

#[async_trait]
impl RoomServiceClient for LocalRoomClient {
    async fn reserve(&self, ctx: &RequestContext, room_id: RoomId) -> Result<Room, RemoteError> {
        Ok(self.registry.reserve(ctx, room_id).await?)
    }

    async fn pay(&self, ctx: &RequestContext, room_id: RoomId) -> Result<Room, RemoteError> {
        Ok(self.registry.pay(ctx, room_id).await?)
    }
}

//! Document store abstractions for rooms and sales.
//!
//! Rooms support a conditional (version-checked) write so status guards can be
//! evaluated and committed atomically with respect to concurrent requests.

pub mod entity_map;
pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use innkeep_core::{ExpectedVersion, RoomId, SaleId};
use innkeep_rooms::Room;
use innkeep_sales::{Sale, SaleStatus};

pub use entity_map::EntityMap;
pub use in_memory::{InMemoryRoomStore, InMemorySaleStore};
pub use postgres::{PostgresRoomStore, PostgresSaleStore};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A conditional write lost against a concurrent writer.
    #[error("concurrency conflict: {0}")]
    Concurrency(String),

    #[error("record not found")]
    NotFound,

    #[error("duplicate record: {0}")]
    Duplicate(String),

    /// The backing store failed (connection, lock poisoning, decoding, ...).
    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn insert(&self, room: Room) -> StoreResult<Room>;

    async fn get(&self, id: RoomId) -> StoreResult<Option<Room>>;

    async fn list(&self) -> StoreResult<Vec<Room>>;

    /// Overwrite a room only if its stored version matches `expected`.
    ///
    /// On success the stored version is bumped by one and the stored room returned.
    /// A version mismatch is reported as `StoreError::Concurrency`.
    async fn replace(&self, room: Room, expected: ExpectedVersion) -> StoreResult<Room>;
}

#[async_trait]
pub trait SaleStore: Send + Sync {
    async fn insert(&self, sale: Sale) -> StoreResult<Sale>;

    async fn get(&self, id: SaleId) -> StoreResult<Option<Sale>>;

    /// All sales in insertion order.
    async fn list(&self) -> StoreResult<Vec<Sale>>;

    /// Returns `None` when the sale does not exist.
    async fn set_status(&self, id: SaleId, status: SaleStatus) -> StoreResult<Option<Sale>>;

    /// Returns whether a sale was removed.
    async fn delete(&self, id: SaleId) -> StoreResult<bool>;

    /// Returns the number of removed sales.
    async fn delete_all(&self) -> StoreResult<u64>;
}

//! Infrastructure layer: stores, audit sinks, the room service client and the
//! booking saga that ties them together.

pub mod audit;
pub mod client;
pub mod ledger;
pub mod rooms;
pub mod saga;
pub mod store;

pub use audit::{
    AuditAction, AuditEntry, AuditError, AuditRecorder, AuditSink, ElasticsearchAuditSink,
    InMemoryAuditSink, TracingAuditSink,
};
pub use client::{HttpRoomClient, LocalRoomClient, RemoteError, RoomServiceClient};
pub use ledger::{LedgerError, SaleLedger};
pub use rooms::{RoomError, RoomRegistry};
pub use saga::{BookingError, BookingSaga};
pub use store::{
    InMemoryRoomStore, InMemorySaleStore, PostgresRoomStore, PostgresSaleStore, RoomStore,
    SaleStore, StoreError, StoreResult,
};

//! Rooms domain module.
//!
//! Business rules for bookable rooms and their status state machine, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod room;

pub use room::{NewRoom, Room, RoomStatus, Transition, TransitionPolicy, TransitionRejected};

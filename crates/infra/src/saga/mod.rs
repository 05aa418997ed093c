//! Cross-resource workflows executed without a distributed transaction.

pub mod booking;

pub use booking::{BookingError, BookingSaga};

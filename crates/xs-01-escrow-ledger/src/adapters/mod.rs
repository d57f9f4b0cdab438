//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-process implementations of the outbound ports.

mod bank;
mod bus_sink;
mod clock;

pub use bank::InMemoryBank;
pub use clock::{ManualClock, SystemClock};

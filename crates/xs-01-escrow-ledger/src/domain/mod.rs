//! # Domain Module
//!
//! Swap records, ledger policy, invariants and errors.

pub mod entities;
pub mod errors;
pub mod event_log;
pub mod invariants;
pub mod policy;
pub mod secure_secret;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use event_log::{EventLog, LogEntry};
pub use invariants::*;
pub use policy::*;
pub use secure_secret::SecureSecret;
pub use value_objects::*;

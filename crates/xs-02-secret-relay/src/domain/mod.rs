//! # Domain Layer
//!
//! Relay records, wire payloads and errors.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;

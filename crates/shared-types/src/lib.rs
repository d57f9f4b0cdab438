//! # Shared Types Crate
//!
//! Identifiers, hashing and the `AuthenticatedMessage<T>` envelope shared by
//! both escrow ledgers and the secret relay.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every cross-crate type is defined here.
//! - **One Hash**: Keccak-256 locks both legs, so a hashlock created on one
//!   ledger is valid on the other.
//! - **Envelope Authority**: the envelope's `origin` is the only identity a
//!   receiver trusts; payloads never carry their own sender.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod hashing;
pub mod security;

pub use entities::*;
pub use envelope::{AuthenticatedMessage, VerificationResult};
pub use errors::*;
pub use hashing::keccak256;
pub use security::*;

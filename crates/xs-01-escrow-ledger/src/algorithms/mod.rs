//! # Algorithms
//!
//! Hashlock and timelock computations.

pub mod secret;
pub mod timelock;

pub use secret::{create_hash_lock, generate_random_secret, verify_secret};
pub use timelock::{can_cancel, require_elapsed, rescue_available_at, unlock_time};

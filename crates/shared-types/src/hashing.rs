//! # Hashing
//!
//! Keccak-256, the digest EVM ledgers use for hashlocks. Both ledgers use
//! it so a single `secret_hash` locks both legs of a swap.

use crate::entities::Hash;
use sha3::{Digest, Keccak256};

/// Keccak-256 of arbitrary bytes.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

//! # Secret Generation and Verification
//!
//! Hashlocks are Keccak-256, the hash EVM escrows use, so one secret opens
//! both legs.

use crate::domain::SecureSecret;
use shared_types::{keccak256, Hash, Secret};

/// Generate a fresh secret for a maker.
pub fn generate_random_secret() -> SecureSecret {
    SecureSecret::generate()
}

/// Hashlock for `secret`.
pub fn create_hash_lock(secret: &Secret) -> Hash {
    keccak256(secret)
}

/// Does `secret` open `hash_lock`? Pure recomputation, no ledger state.
pub fn verify_secret(secret: &Secret, hash_lock: &Hash) -> bool {
    create_hash_lock(secret) == *hash_lock
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_hash_lock_deterministic() {
        let secret = [0xABu8; 32];
        assert_eq!(create_hash_lock(&secret), create_hash_lock(&secret));
    }

    #[test]
    fn test_create_hash_lock_different_secrets() {
        assert_ne!(create_hash_lock(&[0xAB; 32]), create_hash_lock(&[0xCD; 32]));
    }

    #[test]
    fn test_verify_generated_secret() {
        let secret = generate_random_secret();
        assert!(verify_secret(&secret.reveal(), &secret.hash_lock()));
    }

    #[test]
    fn test_verify_secret_invalid() {
        assert!(!verify_secret(&[0xAB; 32], &[0xCD; 32]));
    }

    #[test]
    fn test_known_keccak_vector() {
        // keccak256 of 32 zero bytes
        assert_eq!(
            hex::encode(create_hash_lock(&[0u8; 32])),
            "290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563"
        );
    }
}

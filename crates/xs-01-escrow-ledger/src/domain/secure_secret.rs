//! # Secure Secret
//!
//! Maker-side holder for a swap preimage. The bytes are zeroed on drop and
//! never appear in `Debug` output, so a secret that is still private cannot
//! leak through logs before the maker chooses to reveal it.

use rand::RngCore;
use shared_types::{keccak256, Hash, Secret};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A swap preimage that zeroizes on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureSecret {
    inner: Secret,
}

impl SecureSecret {
    /// Wrap existing bytes.
    pub fn new(bytes: Secret) -> Self {
        Self { inner: bytes }
    }

    /// Draw a fresh secret from the thread RNG.
    pub fn generate() -> Self {
        let mut inner = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut inner);
        Self { inner }
    }

    /// Copy from a slice; `None` unless exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let inner: Secret = slice.try_into().ok()?;
        Some(Self { inner })
    }

    /// Hashlock for this secret.
    pub fn hash_lock(&self) -> Hash {
        keccak256(&self.inner)
    }

    /// Copy the bytes out for `complete_swap`. Once a swap completes the
    /// secret is public anyway.
    pub fn reveal(&self) -> Secret {
        self.inner
    }
}

impl std::fmt::Debug for SecureSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecureSecret(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_value() {
        let secret = SecureSecret::new([0xABu8; 32]);
        let rendered = format!("{:?}", secret);
        assert!(!rendered.to_lowercase().contains("ab"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn test_hash_lock_is_keccak() {
        let secret = SecureSecret::new([7u8; 32]);
        assert_eq!(secret.hash_lock(), keccak256(&[7u8; 32]));
    }

    #[test]
    fn test_generate_is_random() {
        assert_ne!(SecureSecret::generate().reveal(), SecureSecret::generate().reveal());
    }

    #[test]
    fn test_from_slice() {
        assert_eq!(SecureSecret::from_slice(&[0xCD; 32]).unwrap().reveal(), [0xCD; 32]);
        assert!(SecureSecret::from_slice(&[0xCD; 16]).is_none());
    }
}

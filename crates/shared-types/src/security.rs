//! # Cross-Chain Message Security
//!
//! The single implementation of envelope validation used by every receiver
//! of a cross-chain call.
//!
//! ## Security Properties
//!
//! - **HMAC-SHA256 Signatures**: every envelope is signed with the relay key
//!   shared between the two chains.
//! - **Time-Bounded Validity**: envelopes older than `MAX_AGE` are rejected.
//! - **Nonce Replay Prevention**: each nonce is accepted once.
//! - **Origin Pinning**: only the configured relay origin is trusted.
//!
//! Time is always passed in explicitly so verification follows the
//! receiving ledger's clock rather than the host clock.

use crate::entities::{ChainId, RemoteOrigin, Timestamp};
use crate::envelope::{AuthenticatedMessage, VerificationResult};
use crate::errors::MessageError;
use hmac::{Hmac, Mac};
use parking_lot::Mutex;
use serde::Serialize;
use sha2::Sha256;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Maximum allowed clock skew for future timestamps (seconds).
pub const MAX_FUTURE_SKEW: u64 = 60;

/// Maximum age for valid timestamps (seconds). Cross-chain delivery is
/// slower than local IPC, hence the wide window.
pub const MAX_AGE: u64 = 600;

/// How long a nonce is remembered (2x the validity window).
pub const NONCE_CACHE_TTL: u64 = 2 * (MAX_AGE + MAX_FUTURE_SKEW);

/// Disagreement tolerated between the block clocks of two chains
/// (seconds). Envelopes are stamped by the sender's clock and checked
/// against the receiver's.
pub const CROSS_CHAIN_CLOCK_SKEW: u64 = 900;

/// Maximum nonce cache size before forced cleanup.
pub const MAX_NONCE_CACHE_SIZE: usize = 100_000;

// =============================================================================
// NONCE CACHE
// =============================================================================

/// Thread-safe nonce cache for replay prevention.
///
/// Maps each seen nonce to the time it stops being remembered. Expired
/// entries are evicted when the cache grows past `MAX_NONCE_CACHE_SIZE`.
#[derive(Debug, Default)]
pub struct NonceCache {
    cache: Mutex<HashMap<Uuid, Timestamp>>,
}

impl NonceCache {
    /// Creates a new empty nonce cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a nonce cache wrapped in Arc for shared ownership.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns `true` if `nonce` is fresh at `now` and records it,
    /// `false` if it is a replay.
    pub fn check_and_insert(&self, nonce: Uuid, now: Timestamp) -> bool {
        self.check_and_insert_for(nonce, now, NONCE_CACHE_TTL)
    }

    /// As [`check_and_insert`](Self::check_and_insert), remembering the
    /// nonce for `ttl` seconds.
    pub fn check_and_insert_for(&self, nonce: Uuid, now: Timestamp, ttl: u64) -> bool {
        let mut cache = self.cache.lock();

        if cache.len() >= MAX_NONCE_CACHE_SIZE {
            cache.retain(|_, expiry| *expiry > now);
        }

        if let Some(&expiry) = cache.get(&nonce) {
            if expiry > now {
                return false;
            }
        }

        cache.insert(nonce, now.saturating_add(ttl));
        true
    }

    /// Drops every entry that expired before `now`.
    pub fn evict_expired(&self, now: Timestamp) {
        self.cache.lock().retain(|_, expiry| *expiry > now);
    }

    /// Returns the current number of cached nonces.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// HMAC
// =============================================================================

/// Signs `message_bytes` with HMAC-SHA256.
pub fn sign_message(message_bytes: &[u8], shared_secret: &[u8]) -> Result<[u8; 32], MessageError> {
    let mut mac =
        HmacSha256::new_from_slice(shared_secret).map_err(|_| MessageError::InvalidKey)?;
    mac.update(message_bytes);
    Ok(mac.finalize().into_bytes().into())
}

/// Validates an HMAC-SHA256 signature in constant time.
pub fn validate_hmac_signature(
    message_bytes: &[u8],
    signature: &[u8; 32],
    shared_secret: &[u8],
) -> bool {
    let mut mac = match HmacSha256::new_from_slice(shared_secret) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(message_bytes);
    mac.verify_slice(signature).is_ok()
}

// =============================================================================
// TIMESTAMP VALIDATION
// =============================================================================

/// Validates that `timestamp` lies within `now - max_age ..= now + max_future_skew`.
pub fn validate_timestamp(
    timestamp: Timestamp,
    now: Timestamp,
    max_age: u64,
    max_future_skew: u64,
) -> Result<(), VerificationResult> {
    if timestamp.saturating_add(max_age) < now {
        return Err(VerificationResult::TimestampOutOfRange { timestamp, now });
    }
    if timestamp > now.saturating_add(max_future_skew) {
        return Err(VerificationResult::TimestampOutOfRange { timestamp, now });
    }
    Ok(())
}

/// Returns the current Unix timestamp, or 0 if the host clock is before
/// the epoch.
pub fn current_timestamp() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// =============================================================================
// MESSAGE VERIFIER
// =============================================================================

/// Performs every check on an incoming envelope.
///
/// ## Verification Steps (in order)
///
/// 1. **Version**
/// 2. **Destination**: addressed to this chain
/// 3. **Origin**: equals the trusted relay origin
/// 4. **Timestamp**: inside the validity window
/// 5. **Signature**: HMAC over the canonical encoding
/// 6. **Nonce**: not seen before (checked last so forged envelopes cannot
///    burn nonces)
pub struct MessageVerifier {
    local_chain: ChainId,
    trusted_origin: RemoteOrigin,
    key: Zeroizing<Vec<u8>>,
    nonce_cache: Arc<NonceCache>,
    max_age: u64,
    max_future_skew: u64,
}

impl MessageVerifier {
    /// Creates a verifier for envelopes sent by `trusted_origin` to
    /// `local_chain`.
    pub fn new(local_chain: ChainId, trusted_origin: RemoteOrigin, key: &[u8]) -> Self {
        Self {
            local_chain,
            trusted_origin,
            key: Zeroizing::new(key.to_vec()),
            nonce_cache: NonceCache::new_shared(),
            max_age: MAX_AGE,
            max_future_skew: MAX_FUTURE_SKEW,
        }
    }

    /// Share a nonce cache with other verifiers on the same chain.
    #[must_use]
    pub fn with_nonce_cache(mut self, nonce_cache: Arc<NonceCache>) -> Self {
        self.nonce_cache = nonce_cache;
        self
    }

    /// Override the validity window. Nonces are remembered for twice its
    /// width.
    #[must_use]
    pub fn with_window(mut self, max_age: u64, max_future_skew: u64) -> Self {
        self.max_age = max_age;
        self.max_future_skew = max_future_skew;
        self
    }

    /// Widen both edges of the default window by `skew`, for envelopes
    /// stamped by another chain's clock.
    #[must_use]
    pub fn with_clock_skew(self, skew: u64) -> Self {
        self.with_window(
            MAX_AGE.saturating_add(skew),
            MAX_FUTURE_SKEW.saturating_add(skew),
        )
    }

    /// Current `(max_age, max_future_skew)`.
    pub fn window(&self) -> (u64, u64) {
        (self.max_age, self.max_future_skew)
    }

    /// The origin this verifier accepts.
    pub fn trusted_origin(&self) -> RemoteOrigin {
        self.trusted_origin
    }

    /// Verifies `message` against this node's view of time.
    pub fn verify<T: Serialize>(
        &self,
        message: &AuthenticatedMessage<T>,
        now: Timestamp,
    ) -> VerificationResult {
        if message.version != AuthenticatedMessage::<T>::CURRENT_VERSION {
            return VerificationResult::UnsupportedVersion {
                received: message.version,
                supported: AuthenticatedMessage::<T>::CURRENT_VERSION,
            };
        }

        if message.destination != self.local_chain {
            return VerificationResult::WrongDestination {
                expected: self.local_chain,
                received: message.destination,
            };
        }

        if message.origin != self.trusted_origin {
            return VerificationResult::UntrustedOrigin {
                origin: message.origin,
            };
        }

        if let Err(e) = validate_timestamp(
            message.timestamp,
            now,
            self.max_age,
            self.max_future_skew,
        ) {
            return e;
        }

        let bytes = match message.signing_bytes() {
            Ok(b) => b,
            Err(e) => return VerificationResult::Malformed(e.to_string()),
        };
        if !validate_hmac_signature(&bytes, &message.signature, &self.key) {
            return VerificationResult::InvalidSignature;
        }

        let ttl = self
            .max_age
            .saturating_add(self.max_future_skew)
            .saturating_mul(2);
        if !self
            .nonce_cache
            .check_and_insert_for(message.nonce, now, ttl)
        {
            return VerificationResult::ReplayDetected {
                nonce: message.nonce,
            };
        }

        VerificationResult::Valid
    }
}

impl fmt::Debug for MessageVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageVerifier")
            .field("local_chain", &self.local_chain)
            .field("trusted_origin", &self.trusted_origin)
            .field("key", &"***")
            .finish()
    }
}

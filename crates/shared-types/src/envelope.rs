//! # `AuthenticatedMessage` Envelope
//!
//! The wrapper for every cross-chain call between a relay and the sibling
//! ledger's receiver.
//!
//! ## Security Properties
//!
//! - **Versioning**: every message carries a `version` field.
//! - **Origin Authority**: `origin` is the sole identity of the caller; payloads
//!   never repeat it.
//! - **Time-Bounded Replay Prevention**: nonces are only valid inside the
//!   timestamp window.
//! - **Integrity**: HMAC-SHA256 over the canonical bincode encoding of header
//!   and payload.

use crate::entities::{ChainId, RemoteOrigin, Timestamp};
use crate::errors::MessageError;
use crate::security::sign_message;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Envelope for a cross-chain call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedMessage<T> {
    // =========================================================================
    // HEADER SECTION
    // =========================================================================
    /// Protocol version.
    pub version: u16,

    /// Chain and account that issued the call.
    pub origin: RemoteOrigin,

    /// Chain expected to execute the call.
    pub destination: ChainId,

    /// Correlates a call with its acknowledgement.
    pub correlation_id: Uuid,

    // =========================================================================
    // SECURITY SECTION
    // =========================================================================
    /// Origin ledger time when the message was built.
    pub timestamp: Timestamp,

    /// Single-use nonce.
    pub nonce: Uuid,

    /// HMAC-SHA256 over [`AuthenticatedMessage::signing_bytes`].
    pub signature: [u8; 32],

    // =========================================================================
    // PAYLOAD SECTION
    // =========================================================================
    /// The call itself.
    pub payload: T,
}

impl<T> AuthenticatedMessage<T> {
    /// Current protocol version.
    pub const CURRENT_VERSION: u16 = 1;

    /// Build an unsigned envelope with a fresh nonce and correlation id.
    pub fn new(
        origin: RemoteOrigin,
        destination: ChainId,
        timestamp: Timestamp,
        payload: T,
    ) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            origin,
            destination,
            correlation_id: Uuid::new_v4(),
            timestamp,
            nonce: Uuid::new_v4(),
            signature: [0u8; 32],
            payload,
        }
    }

    /// Reuse the correlation id of the call being answered.
    #[must_use]
    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }
}

impl<T: Serialize> AuthenticatedMessage<T> {
    /// Canonical bytes covered by the signature (everything but the
    /// signature itself).
    pub fn signing_bytes(&self) -> Result<Vec<u8>, MessageError> {
        let bytes = bincode::serialize(&(
            self.version,
            &self.origin,
            &self.destination,
            &self.correlation_id,
            self.timestamp,
            &self.nonce,
            &self.payload,
        ))?;
        Ok(bytes)
    }

    /// Sign the envelope with the shared relay key.
    pub fn sign(mut self, key: &[u8]) -> Result<Self, MessageError> {
        let bytes = self.signing_bytes()?;
        self.signature = sign_message(&bytes, key)?;
        Ok(self)
    }
}

/// Result of message verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// Message passed all verification checks.
    Valid,
    /// Message version is unsupported.
    UnsupportedVersion {
        /// Version found in the envelope.
        received: u16,
        /// Version this node speaks.
        supported: u16,
    },
    /// Message was addressed to another chain.
    WrongDestination {
        /// This node's chain.
        expected: ChainId,
        /// Destination in the envelope.
        received: ChainId,
    },
    /// Message came from an origin this node does not trust.
    UntrustedOrigin {
        /// Origin found in the envelope.
        origin: RemoteOrigin,
    },
    /// Message timestamp is outside the valid window.
    TimestampOutOfRange {
        /// Envelope timestamp.
        timestamp: Timestamp,
        /// Local time at verification.
        now: Timestamp,
    },
    /// Message signature is invalid.
    InvalidSignature,
    /// Message nonce has been seen before.
    ReplayDetected {
        /// The reused nonce.
        nonce: Uuid,
    },
    /// The envelope could not be canonically encoded.
    Malformed(String),
}

impl VerificationResult {
    /// Returns true if the verification was successful.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid)
    }

    /// Returns true if the verification failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.is_valid()
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::UnsupportedVersion { received, supported } => {
                write!(f, "unsupported version {received} (supported {supported})")
            }
            Self::WrongDestination { expected, received } => {
                write!(f, "addressed to {received}, this node is {expected}")
            }
            Self::UntrustedOrigin { origin } => write!(f, "untrusted origin {origin}"),
            Self::TimestampOutOfRange { timestamp, now } => {
                write!(f, "timestamp {timestamp} outside window at {now}")
            }
            Self::InvalidSignature => f.write_str("invalid signature"),
            Self::ReplayDetected { nonce } => write!(f, "replayed nonce {nonce}"),
            Self::Malformed(reason) => write!(f, "malformed envelope: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> RemoteOrigin {
        RemoteOrigin::new(ChainId::Polkadot, [0x42; 20])
    }

    #[test]
    fn test_new_envelope_uses_current_version() {
        let msg = AuthenticatedMessage::new(origin(), ChainId::Ethereum, 100, 7u32);
        assert_eq!(msg.version, AuthenticatedMessage::<u32>::CURRENT_VERSION);
        assert_eq!(msg.signature, [0u8; 32]);
    }

    #[test]
    fn test_fresh_nonce_per_envelope() {
        let a = AuthenticatedMessage::new(origin(), ChainId::Ethereum, 100, 7u32);
        let b = AuthenticatedMessage::new(origin(), ChainId::Ethereum, 100, 7u32);
        assert_ne!(a.nonce, b.nonce);
    }

    #[test]
    fn test_signing_bytes_cover_payload() {
        let a = AuthenticatedMessage::new(origin(), ChainId::Ethereum, 100, 7u32);
        let mut b = a.clone();
        b.payload = 8;
        assert_ne!(a.signing_bytes().unwrap(), b.signing_bytes().unwrap());
    }

    #[test]
    fn test_sign_sets_signature() {
        let msg = AuthenticatedMessage::new(origin(), ChainId::Ethereum, 100, 7u32)
            .sign(b"relay-key")
            .unwrap();
        assert_ne!(msg.signature, [0u8; 32]);
    }

    #[test]
    fn test_with_correlation() {
        let id = Uuid::new_v4();
        let msg =
            AuthenticatedMessage::new(origin(), ChainId::Ethereum, 1, ()).with_correlation(id);
        assert_eq!(msg.correlation_id, id);
    }

    #[test]
    fn test_verification_result_display() {
        let rendered = VerificationResult::InvalidSignature.to_string();
        assert_eq!(rendered, "invalid signature");
        assert!(VerificationResult::Valid.is_valid());
        assert!(VerificationResult::InvalidSignature.is_error());
    }
}

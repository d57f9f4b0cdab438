//! # Runtime Configuration
//!
//! Unified configuration for both ledgers, the relay and the demo swap.
//!
//! ## Security Requirements
//!
//! - `relay.key` MUST NOT be the default zero value
//! - Source minimum timelock MUST exceed the destination maximum
//! - The relay fee MUST NOT be below the fee floor

use shared_types::{Address, Amount, CROSS_CHAIN_CLOCK_SKEW, ZERO_ADDRESS};
use std::fmt;
use thiserror::Error;
use xs_01_escrow_ledger::{check_pairing, LedgerPolicy, PolicyError};
use xs_02_secret_relay::{FeeSchedule, NATIVE_UNIT};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Environment variables read by [`RuntimeConfig::from_env`].
pub mod env {
    /// Owner of both ledgers and the relay (40 hex chars).
    pub const OWNER: &str = "XS_OWNER";
    /// Account paying relay fees (40 hex chars).
    pub const OPERATOR: &str = "XS_OPERATOR";
    /// Event bus capacity per chain.
    pub const BUS_CAPACITY: &str = "XS_BUS_CAPACITY";
    /// Source ledger minimum timelock (seconds).
    pub const SOURCE_MIN_TIMELOCK: &str = "XS_SOURCE_MIN_TIMELOCK";
    /// Source ledger maximum timelock (seconds).
    pub const SOURCE_MAX_TIMELOCK: &str = "XS_SOURCE_MAX_TIMELOCK";
    /// Destination ledger minimum timelock (seconds).
    pub const DESTINATION_MIN_TIMELOCK: &str = "XS_DESTINATION_MIN_TIMELOCK";
    /// Destination ledger maximum timelock (seconds).
    pub const DESTINATION_MAX_TIMELOCK: &str = "XS_DESTINATION_MAX_TIMELOCK";
    /// Rescue delay on both ledgers (seconds).
    pub const RESCUE_DELAY: &str = "XS_RESCUE_DELAY";
    /// Relay HMAC key (64 hex chars).
    pub const RELAY_KEY: &str = "XS_RELAY_KEY";
    /// Fee per relayed secret.
    pub const RELAY_FEE: &str = "XS_RELAY_FEE";
    /// Fee floor.
    pub const RELAY_MIN_FEE: &str = "XS_RELAY_MIN_FEE";
    /// Tolerated drift between the two chains' clocks (seconds).
    pub const CLOCK_SKEW: &str = "XS_CLOCK_SKEW_SECS";
    /// Seconds the demo waits for the relayed leg to settle.
    pub const SETTLE_TIMEOUT: &str = "XS_SETTLE_TIMEOUT_SECS";
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Relay key is not set (zero value).
    #[error(
        "SECURITY VIOLATION: relay key is the default zero value. \
         Set XS_RELAY_KEY to 64 hex characters."
    )]
    InsecureRelayKey,

    /// Ledger policies are inconsistent.
    #[error("Invalid ledger policy: {0}")]
    Policy(#[from] PolicyError),

    /// Fee floor of zero.
    #[error("Relay fee floor must be non-zero")]
    ZeroFeeFloor,

    /// Fee configured below the floor.
    #[error("Relay fee {fee} below floor {min}")]
    FeeBelowMinimum {
        /// Configured fee.
        fee: Amount,
        /// Floor.
        min: Amount,
    },

    /// A required account is the zero address.
    #[error("{0} must not be the zero address")]
    ZeroAddress(&'static str),

    /// An environment variable could not be parsed.
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}

/// 32-byte HMAC key shared by the relay and the sibling receiver.
///
/// Wiped on drop and never printed.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RelayKey([u8; 32]);

impl RelayKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Fresh random key for a throwaway devnet.
    pub fn generate() -> Self {
        Self(rand::random())
    }

    /// Parse 64 hex characters.
    pub fn from_hex(value: &str) -> Option<Self> {
        let bytes = hex::decode(value.trim_start_matches("0x")).ok()?;
        let bytes: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Is this the all-zero placeholder?
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Raw key material.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RelayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RelayKey(<redacted>)")
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Deployed accounts.
    pub deployment: DeploymentConfig,
    /// Source (Ethereum) ledger policy.
    pub source_policy: LedgerPolicy,
    /// Destination (Polkadot) ledger policy.
    pub destination_policy: LedgerPolicy,
    /// Relay configuration.
    pub relay: RelayConfig,
    /// Demo swap parameters.
    pub demo: DemoConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            deployment: DeploymentConfig::default(),
            source_policy: LedgerPolicy::ethereum_source(),
            destination_policy: LedgerPolicy::polkadot_destination(),
            relay: RelayConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `XS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(env::OWNER) {
            config.deployment.owner = parse_address(env::OWNER, &value)?;
        }
        if let Some(value) = lookup(env::OPERATOR) {
            config.deployment.operator = parse_address(env::OPERATOR, &value)?;
        }
        if let Some(value) = lookup(env::BUS_CAPACITY) {
            config.deployment.bus_capacity = parse_number(env::BUS_CAPACITY, &value)?;
        }

        if let Some(value) = lookup(env::SOURCE_MIN_TIMELOCK) {
            config.source_policy.min_timelock = parse_number(env::SOURCE_MIN_TIMELOCK, &value)?;
        }
        if let Some(value) = lookup(env::SOURCE_MAX_TIMELOCK) {
            config.source_policy.max_timelock = parse_number(env::SOURCE_MAX_TIMELOCK, &value)?;
        }
        if let Some(value) = lookup(env::DESTINATION_MIN_TIMELOCK) {
            config.destination_policy.min_timelock =
                parse_number(env::DESTINATION_MIN_TIMELOCK, &value)?;
        }
        if let Some(value) = lookup(env::DESTINATION_MAX_TIMELOCK) {
            config.destination_policy.max_timelock =
                parse_number(env::DESTINATION_MAX_TIMELOCK, &value)?;
        }
        if let Some(value) = lookup(env::RESCUE_DELAY) {
            let delay = parse_number(env::RESCUE_DELAY, &value)?;
            config.source_policy.rescue_delay = delay;
            config.destination_policy.rescue_delay = delay;
        }
        config.source_policy.counterpart_max_timelock =
            Some(config.destination_policy.max_timelock);

        if let Some(value) = lookup(env::RELAY_KEY) {
            config.relay.key = RelayKey::from_hex(&value).ok_or(ConfigError::InvalidValue {
                var: env::RELAY_KEY,
                value: "<redacted>".into(),
            })?;
        }
        if let Some(value) = lookup(env::RELAY_FEE) {
            config.relay.fees.fee = parse_number(env::RELAY_FEE, &value)?;
        }
        if let Some(value) = lookup(env::RELAY_MIN_FEE) {
            config.relay.fees.min_fee = parse_number(env::RELAY_MIN_FEE, &value)?;
        }
        if let Some(value) = lookup(env::CLOCK_SKEW) {
            config.relay.clock_skew_secs = parse_number(env::CLOCK_SKEW, &value)?;
        }
        if let Some(value) = lookup(env::SETTLE_TIMEOUT) {
            config.demo.settle_timeout_secs = parse_number(env::SETTLE_TIMEOUT, &value)?;
        }

        Ok(config)
    }

    /// Validate before deploying anything.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the relay key is the default zero value
    /// - either policy has invalid bounds, or the pair overlaps
    /// - the fee floor is zero or the fee is below it
    /// - the owner or operator is the zero address
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.key.is_zero() {
            return Err(ConfigError::InsecureRelayKey);
        }
        if self.deployment.owner == ZERO_ADDRESS {
            return Err(ConfigError::ZeroAddress("owner"));
        }
        if self.deployment.operator == ZERO_ADDRESS {
            return Err(ConfigError::ZeroAddress("operator"));
        }

        let source = rebuild(&self.source_policy)?;
        let destination = rebuild(&self.destination_policy)?;
        check_pairing(&source, &destination)?;

        let fees = self.relay.fees;
        if fees.min_fee == 0 {
            return Err(ConfigError::ZeroFeeFloor);
        }
        if fees.fee < fees.min_fee {
            return Err(ConfigError::FeeBelowMinimum {
                fee: fees.fee,
                min: fees.min_fee,
            });
        }
        Ok(())
    }
}

/// Addresses of everything the runtime deploys.
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    /// Owner of both ledgers and the relay.
    pub owner: Address,
    /// Escrow on the source chain.
    pub source_escrow: Address,
    /// Escrow on the destination chain.
    pub destination_escrow: Address,
    /// Relay on the destination chain.
    pub relay: Address,
    /// Account the watcher pays relay fees from.
    pub operator: Address,
    /// Event bus capacity per chain.
    pub bus_capacity: usize,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            owner: [0x0A; 20],
            source_escrow: [0xE1; 20],
            destination_escrow: [0xE2; 20],
            relay: [0x77; 20],
            operator: [0x09; 20],
            bus_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// HMAC key. MUST be overridden.
    pub key: RelayKey,
    /// Fee floor and initial fee.
    pub fees: FeeSchedule,
    /// Balance minted to the operator on the destination chain.
    pub operator_funds: Amount,
    /// Drift tolerated between the relay chain's clock and the sibling's
    /// when checking envelope timestamps.
    pub clock_skew_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            key: RelayKey::default(),
            fees: FeeSchedule::default(),
            operator_funds: NATIVE_UNIT,
            clock_skew_secs: CROSS_CHAIN_CLOCK_SKEW,
        }
    }
}

/// Demo swap parameters.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Maker account, funded on the source chain.
    pub maker: Address,
    /// Resolver account, funded on the destination chain.
    pub resolver: Address,
    /// Value the maker locks on the source chain.
    pub amount: Amount,
    /// Value the resolver locks on the destination chain.
    pub counter_amount: Amount,
    /// Seconds to wait for the relayed leg.
    pub settle_timeout_secs: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            maker: [0x01; 20],
            resolver: [0x02; 20],
            amount: NATIVE_UNIT,
            counter_amount: 5 * NATIVE_UNIT,
            settle_timeout_secs: 10,
        }
    }
}

fn rebuild(policy: &LedgerPolicy) -> Result<LedgerPolicy, PolicyError> {
    LedgerPolicy::builder(policy.role)
        .min_timelock(policy.min_timelock)
        .max_timelock(policy.max_timelock)
        .rescue_delay(policy.rescue_delay)
        .claim_rule(policy.claim_rule)
        .counterpart_max_timelock(policy.counterpart_max_timelock)
        .build()
}

fn parse_address(var: &'static str, value: &str) -> Result<Address, ConfigError> {
    hex::decode(value.trim_start_matches("0x"))
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| ConfigError::InvalidValue {
            var,
            value: value.to_string(),
        })
}

fn parse_number<N: std::str::FromStr>(var: &'static str, value: &str) -> Result<N, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}

//! # Runtime Container
//!
//! Configuration and the deployed two-chain network.

pub mod config;
pub mod network;

pub use config::{ConfigError, DemoConfig, DeploymentConfig, RelayConfig, RelayKey, RuntimeConfig};
pub use network::{
    ChainClocks, ChainNode, Ledger, NetworkChannels, NetworkError, Relay, SwapNetwork,
    DESTINATION_CHAIN, SOURCE_CHAIN,
};

//! # Cross-Swap Runtime Library
//!
//! Deploys a two-chain devnet (an EVM-style source ledger and a
//! Polkadot-style destination ledger) with the secret relay between them,
//! and runs the relay's background tasks. The `swap-runtime` binary wraps
//! this library.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and network deployment
//! - `handlers/` - Cross-chain envelope loops
//! - `runtime` - Task lifecycle
//! - `scenario` - Scripted demo swap
//!
//! ## Relay Flow
//!
//! ```text
//! destination escrow ──SwapCompleted──→ RelayWatcher ──send──→ SecretRelay
//!                                                                 │
//!                                                           RelayCall
//!                                                                 ↓
//! SecretRelay ←──confirm_delivery── AckHandler ←──DeliveryAck── RelayCallHandler
//!                                                                 │
//!                                                   complete_swap_relayed
//!                                                                 ↓
//!                                                          source escrow
//! ```

#![warn(missing_docs)]
#![allow(clippy::type_complexity)]

pub mod container;
pub mod handlers;
pub mod runtime;
pub mod scenario;

pub use container::{ChainClocks, ConfigError, NetworkError, RelayKey, RuntimeConfig, SwapNetwork};
pub use runtime::{RuntimeError, SwapRuntime};
pub use scenario::{run_demo_swap, DemoReport};

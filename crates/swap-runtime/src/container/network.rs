//! # Swap Network
//!
//! Holds both ledgers, the relay and the receiver, wired together.
//!
//! ## Deployment
//!
//! ```text
//! Ethereum (source)                       Polkadot (destination)
//! ┌────────────────────┐   RelayCall    ┌────────────────────┐
//! │ EscrowLedger       │ ◄───────────── │ SecretRelay        │
//! │  trusted_relay ────┼── relay origin │  local escrow ─────┼──► EscrowLedger
//! │ RelayReceiver      │ ─────────────► │                    │
//! └────────────────────┘  DeliveryAck   └────────────────────┘
//! ```
//!
//! The source ledger accepts `complete_swap_relayed` only from the relay's
//! origin; the relay accepts acknowledgements only from the source escrow.
//!
//! Each chain keeps its own block clock. The relay and the destination
//! ledger read the destination clock; the receiver reads the source clock.

use std::sync::Arc;

use shared_bus::InMemoryEventBus;
use shared_types::{AuthenticatedMessage, ChainId};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;
use xs_01_escrow_ledger::{
    CallContext, EscrowApi, EscrowLedger, EscrowLedgerBuilder, InMemoryBank, LedgerClock,
    PolicyError,
};
use xs_02_secret_relay::{
    ChannelTransport, DeliveryAck, RelayCall, RelayError, RelayReceiver, SecretRelay,
    SecretRelayApi, SecretRelayBuilder,
};

use crate::container::config::{ConfigError, RuntimeConfig};

/// Ledger with in-memory balances.
pub type Ledger<C> = EscrowLedger<InMemoryBank, C>;

/// Relay on the destination chain.
pub type Relay<C> = SecretRelay<Ledger<C>, ChannelTransport<RelayCall>, InMemoryBank, C>;

/// Chain hosting the maker's leg.
pub const SOURCE_CHAIN: ChainId = ChainId::Ethereum;

/// Chain hosting the resolver's leg and the relay.
pub const DESTINATION_CHAIN: ChainId = ChainId::Polkadot;

/// Errors while deploying the network.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A ledger refused its policy.
    #[error("Ledger deployment failed: {0}")]
    Ledger(#[from] PolicyError),

    /// The relay could not be deployed or paired.
    #[error("Relay deployment failed: {0}")]
    Relay(#[from] RelayError),
}

/// Block clocks of the two chains.
pub struct ChainClocks<C: LedgerClock> {
    /// Source chain clock.
    pub source: Arc<C>,
    /// Destination chain clock, also read by the relay.
    pub destination: Arc<C>,
}

impl<C: LedgerClock> ChainClocks<C> {
    /// Separate clocks per chain.
    pub fn new(source: Arc<C>, destination: Arc<C>) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl<C: LedgerClock + Default> ChainClocks<C> {
    /// A fresh default clock for each chain.
    pub fn independent() -> Self {
        Self::new(Arc::new(C::default()), Arc::new(C::default()))
    }
}

/// One chain's public state.
pub struct ChainNode<C: LedgerClock> {
    /// Event feed.
    pub bus: Arc<InMemoryEventBus>,
    /// Native balances.
    pub bank: Arc<InMemoryBank>,
    /// Escrow ledger.
    pub escrow: Arc<Ledger<C>>,
}

/// Receiving ends of the cross-chain channels, consumed by the runtime's
/// background tasks.
pub struct NetworkChannels {
    /// Relay calls arriving on the source chain.
    pub relay_calls: UnboundedReceiver<AuthenticatedMessage<RelayCall>>,
    /// Acknowledgements arriving back on the destination chain.
    pub acks: UnboundedReceiver<AuthenticatedMessage<DeliveryAck>>,
}

/// Both chains plus the relay pair.
pub struct SwapNetwork<C: LedgerClock> {
    /// Source chain.
    pub source: ChainNode<C>,
    /// Destination chain.
    pub destination: ChainNode<C>,
    /// Relay paired with the destination escrow.
    pub relay: Arc<Relay<C>>,
    /// Receiver executing relayed calls on the source escrow.
    pub receiver: Arc<RelayReceiver<Ledger<C>>>,
    /// Transport carrying acknowledgements back to the relay.
    pub ack_transport: Arc<ChannelTransport<DeliveryAck>>,
    config: RuntimeConfig,
}

impl<C: LedgerClock + 'static> SwapNetwork<C> {
    /// Validate `config` and deploy everything, each chain on its own clock.
    ///
    /// ## Deployment Order
    ///
    /// 1. Validate configuration (timelock ordering, relay key, fees)
    /// 2. Source ledger, trusting the relay's origin
    /// 3. Destination ledger
    /// 4. Relay, paired with both escrows
    /// 5. Receiver on the source chain
    pub fn deploy(
        config: RuntimeConfig,
        clocks: ChainClocks<C>,
    ) -> Result<(Self, NetworkChannels), NetworkError> {
        config.validate()?;
        let deployment = &config.deployment;
        let key = config.relay.key.as_bytes();

        let relay_origin = shared_types::RemoteOrigin::new(DESTINATION_CHAIN, deployment.relay);

        let source_bus = Arc::new(InMemoryEventBus::with_capacity(deployment.bus_capacity));
        let source_bank = Arc::new(InMemoryBank::new());
        let source_escrow = Arc::new(
            EscrowLedgerBuilder::new(SOURCE_CHAIN, deployment.source_escrow, deployment.owner)
                .policy(config.source_policy.clone())
                .trusted_relay(relay_origin)
                .event_sink(source_bus.clone())
                .build(source_bank.clone(), clocks.source)?,
        );

        let destination_bus = Arc::new(InMemoryEventBus::with_capacity(deployment.bus_capacity));
        let destination_bank = Arc::new(InMemoryBank::new());
        let destination_escrow = Arc::new(
            EscrowLedgerBuilder::new(
                DESTINATION_CHAIN,
                deployment.destination_escrow,
                deployment.owner,
            )
            .policy(config.destination_policy.clone())
            .event_sink(destination_bus.clone())
            .build(destination_bank.clone(), clocks.destination.clone())?,
        );

        let (call_transport, relay_calls) = ChannelTransport::channel(SOURCE_CHAIN);
        let relay = SecretRelayBuilder::new(DESTINATION_CHAIN, deployment.relay, deployment.owner)
            .relay_key(key)
            .fee_schedule(config.relay.fees)
            .clock_skew(config.relay.clock_skew_secs)
            .event_sink(destination_bus.clone())
            .build(
                destination_escrow.clone(),
                Arc::new(call_transport),
                destination_bank.clone(),
                clocks.destination,
            )?;
        relay.configure_bridge(
            CallContext::call(deployment.owner),
            deployment.destination_escrow,
            deployment.source_escrow,
            SOURCE_CHAIN,
        )?;
        destination_bank.mint(deployment.operator, config.relay.operator_funds);

        let receiver = RelayReceiver::new(source_escrow.clone(), relay_origin, key)
            .with_clock_skew(config.relay.clock_skew_secs);
        let (ack_transport, acks) = ChannelTransport::channel(DESTINATION_CHAIN);

        info!(
            source = %source_escrow.chain(),
            destination = %destination_escrow.chain(),
            relay = %relay_origin,
            "Swap network deployed"
        );

        let network = Self {
            source: ChainNode {
                bus: source_bus,
                bank: source_bank,
                escrow: source_escrow,
            },
            destination: ChainNode {
                bus: destination_bus,
                bank: destination_bank,
                escrow: destination_escrow,
            },
            relay: Arc::new(relay),
            receiver: Arc::new(receiver),
            ack_transport: Arc::new(ack_transport),
            config,
        };
        Ok((network, NetworkChannels { relay_calls, acks }))
    }

    /// Configuration the network was deployed with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

//! Shared setup: a deployed two-chain network on manual clocks, with the
//! relay channels left to the test instead of background tasks.

use std::sync::Arc;

use shared_types::{keccak256, Address, Amount, CounterTerms, Hash, Secret};
use swap_runtime::container::{
    ChainClocks, NetworkChannels, RelayKey, RuntimeConfig, SwapNetwork,
};
use xs_01_escrow_ledger::{
    CallContext, CreateSwapRequest, EscrowApi, LedgerClock, ManualClock, NativeSwapRequest,
};
use xs_02_secret_relay::NATIVE_UNIT;

/// Key shared by relay and receiver.
pub const KEY: [u8; 32] = [0x4B; 32];
/// Maker: locks on the source chain, claims on the destination chain.
pub const MAKER: Address = [0x01; 20];
/// Resolver: locks on the destination chain, paid on the source chain.
pub const RESOLVER: Address = [0x02; 20];
/// Account with no role.
pub const STRANGER: Address = [0x66; 20];
/// One native unit.
pub const ONE: Amount = NATIVE_UNIT;
/// Maker's secret.
pub const SECRET: Secret = [0x5E; 32];

/// Swap id both legs share.
pub fn swap_id_for(secret: &Secret) -> Hash {
    keccak256(&[keccak256(secret).as_slice(), MAKER.as_slice()].concat())
}

/// Network type used throughout the suite.
pub type Network = SwapNetwork<ManualClock>;

/// Configuration with the test relay key.
pub fn test_config() -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    config.relay.key = RelayKey::new(KEY);
    config
}

/// Give the maker and the resolver their opening balances.
pub fn fund(network: &Network) {
    network.source.bank.mint(MAKER, 10 * ONE);
    network.destination.bank.mint(RESOLVER, 10 * ONE);
}

/// Maker locks `ONE` on the source ledger for the resolver.
pub fn lock_source(network: &Network, secret: &Secret) -> Hash {
    let swap_id = swap_id_for(secret);
    let request = CreateSwapRequest::new(
        swap_id,
        keccak256(secret),
        RESOLVER,
        ONE,
        CounterTerms {
            counter_amount: 5 * ONE,
            exchange_rate: 5,
        },
        network.config().source_policy.min_timelock,
    );
    network
        .source
        .escrow
        .create_swap(CallContext::payable(MAKER, ONE), request)
        .unwrap();
    swap_id
}

/// Resolver locks `5 * ONE` on the destination ledger for the maker.
pub fn lock_destination(network: &Network, secret: &Secret) -> Hash {
    let swap_id = swap_id_for(secret);
    network
        .destination
        .escrow
        .create_native_swap(
            CallContext::payable(RESOLVER, 5 * ONE),
            NativeSwapRequest {
                swap_id,
                secret_hash: keccak256(secret),
                taker: MAKER,
                timelock: network.config().destination_policy.max_timelock,
            },
        )
        .unwrap();
    swap_id
}

/// Lock both legs under one secret.
pub fn lock_both_legs(network: &Network, secret: &Secret) -> Hash {
    lock_source(network, secret);
    lock_destination(network, secret)
}

/// Maker reveals `secret` on the destination ledger.
pub fn reveal_on_destination(network: &Network, swap_id: Hash, secret: Secret) {
    network
        .destination
        .escrow
        .complete_swap(CallContext::call(MAKER), swap_id, secret)
        .unwrap();
}

/// Deployed network plus the undelivered channel ends.
pub struct TestNetwork {
    /// Ledgers, relay and receiver.
    pub network: Network,
    /// Relay calls and acknowledgements in flight.
    pub channels: NetworkChannels,
    /// Source chain clock.
    pub source_clock: Arc<ManualClock>,
    /// Destination chain clock, also read by the relay.
    pub destination_clock: Arc<ManualClock>,
}

impl TestNetwork {
    /// Deploy with default policies and a funded maker and resolver.
    pub fn deploy() -> Self {
        let start = ManualClock::default().now();
        Self::deploy_with_clocks(start, start)
    }

    /// Deploy with each chain's clock starting at its own time.
    pub fn deploy_with_clocks(source_start: u64, destination_start: u64) -> Self {
        Self::deploy_on(test_config(), source_start, destination_start)
    }

    /// Deploy `config` with each chain's clock starting at its own time.
    pub fn deploy_on(config: RuntimeConfig, source_start: u64, destination_start: u64) -> Self {
        let source_clock = Arc::new(ManualClock::new(source_start));
        let destination_clock = Arc::new(ManualClock::new(destination_start));
        let clocks = ChainClocks::new(source_clock.clone(), destination_clock.clone());
        let (network, channels) = SwapNetwork::deploy(config, clocks).unwrap();
        fund(&network);
        Self {
            network,
            channels,
            source_clock,
            destination_clock,
        }
    }

    /// Move both chains forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.source_clock.advance(secs);
        self.destination_clock.advance(secs);
    }

    /// Runtime configuration in use.
    pub fn config(&self) -> &RuntimeConfig {
        self.network.config()
    }

    /// Timelock used for source legs.
    pub fn source_timelock(&self) -> u64 {
        self.config().source_policy.min_timelock
    }

    /// Timelock used for destination legs.
    pub fn destination_timelock(&self) -> u64 {
        self.config().destination_policy.max_timelock
    }

    /// See [`lock_source`].
    pub fn lock_source(&self, secret: &Secret) -> Hash {
        lock_source(&self.network, secret)
    }

    /// See [`lock_both_legs`].
    pub fn lock_both_legs(&self, secret: &Secret) -> Hash {
        lock_both_legs(&self.network, secret)
    }

    /// See [`reveal_on_destination`].
    pub fn reveal_on_destination(&self, swap_id: Hash, secret: Secret) {
        reveal_on_destination(&self.network, swap_id, secret)
    }
}

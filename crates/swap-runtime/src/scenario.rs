//! # Demo Swap
//!
//! Scripted ETH → DOT swap driven against a running [`SwapRuntime`]:
//!
//! 1. Maker locks `amount` on the source ledger for the resolver.
//! 2. Resolver mirrors with `counter_amount` on the destination ledger for
//!    the maker, same hashlock and swap id.
//! 3. Maker reveals the secret on the destination ledger.
//! 4. The relay forwards the secret; the source leg completes to the
//!    resolver and the acknowledgement marks the message processed.
//!
//! [`SwapRuntime`]: crate::SwapRuntime

use std::time::Duration;

use anyhow::{bail, Context, Result};
use shared_types::{keccak256, short_hex, Amount, CounterTerms, Hash};
use tracing::info;
use xs_01_escrow_ledger::{
    generate_random_secret, CallContext, CreateSwapRequest, EscrowApi, LedgerClock, NativeBank,
    NativeSwapRequest, SwapState,
};
use xs_02_secret_relay::SecretRelayApi;

use crate::container::SwapNetwork;

/// Poll interval while waiting for the relayed leg.
const SETTLE_POLL: Duration = Duration::from_millis(20);

/// Outcome of [`run_demo_swap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoReport {
    /// Swap id used on both ledgers.
    pub swap_id: Hash,
    /// Final state on the source ledger.
    pub source_state: SwapState,
    /// Final state on the destination ledger.
    pub destination_state: SwapState,
    /// Whether the relay saw the acknowledgement.
    pub message_processed: bool,
    /// Value the resolver received on the source chain.
    pub resolver_received: Amount,
    /// Value the maker received on the destination chain.
    pub maker_received: Amount,
}

/// Run one full swap. The runtime's tasks must already be started.
pub async fn run_demo_swap<C: LedgerClock + 'static>(network: &SwapNetwork<C>) -> Result<DemoReport> {
    let config = network.config();
    let demo = &config.demo;
    let source = &network.source;
    let destination = &network.destination;

    source.bank.mint(demo.maker, demo.amount);
    destination.bank.mint(demo.resolver, demo.counter_amount);
    let resolver_before = source.bank.balance_of(&demo.resolver);
    let maker_before = destination.bank.balance_of(&demo.maker);

    let secret = generate_random_secret();
    let secret_hash = secret.hash_lock();
    let swap_id = keccak256(&[secret_hash.as_slice(), demo.maker.as_slice()].concat());
    info!(swap_id = %short_hex(&swap_id), "Demo swap starting");

    let request = CreateSwapRequest::new(
        swap_id,
        secret_hash,
        demo.resolver,
        demo.amount,
        CounterTerms {
            counter_amount: demo.counter_amount,
            exchange_rate: demo.counter_amount / demo.amount.max(1),
        },
        config.source_policy.min_timelock,
    );
    source
        .escrow
        .create_swap(CallContext::payable(demo.maker, demo.amount), request)
        .context("maker lock on source ledger")?;

    destination
        .escrow
        .create_native_swap(
            CallContext::payable(demo.resolver, demo.counter_amount),
            NativeSwapRequest {
                swap_id,
                secret_hash,
                taker: demo.maker,
                timelock: config.destination_policy.min_timelock,
            },
        )
        .context("resolver lock on destination ledger")?;

    destination
        .escrow
        .complete_swap(CallContext::call(demo.maker), swap_id, secret.reveal())
        .context("maker claim on destination ledger")?;

    let timeout = Duration::from_secs(demo.settle_timeout_secs);
    let settled = tokio::time::timeout(timeout, async {
        loop {
            let processed = network
                .relay
                .get_message(&swap_id)
                .is_some_and(|m| m.processed);
            if processed && source.escrow.swap_state(&swap_id) == SwapState::Completed {
                break;
            }
            tokio::time::sleep(SETTLE_POLL).await;
        }
    })
    .await;
    if settled.is_err() {
        bail!(
            "source leg of {} not settled within {:?}",
            short_hex(&swap_id),
            timeout
        );
    }

    let report = DemoReport {
        swap_id,
        source_state: source.escrow.swap_state(&swap_id),
        destination_state: destination.escrow.swap_state(&swap_id),
        message_processed: true,
        resolver_received: source
            .bank
            .balance_of(&demo.resolver)
            .saturating_sub(resolver_before),
        maker_received: destination
            .bank
            .balance_of(&demo.maker)
            .saturating_sub(maker_before),
    };
    info!(
        swap_id = %short_hex(&swap_id),
        resolver_received = report.resolver_received,
        maker_received = report.maker_received,
        "Demo swap settled on both chains"
    );
    Ok(report)
}

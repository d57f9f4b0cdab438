//! # Swap Runtime
//!
//! Owns a deployed [`SwapNetwork`] and the background tasks that keep the
//! relay moving.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration and deploy both ledgers and the relay
//! 2. Start the relay watcher on the destination event bus
//! 3. Start the relay call handler on the source chain
//! 4. Start the ack handler on the destination chain
//!
//! ## Shutdown Sequence
//!
//! 1. Signal shutdown to all handlers
//! 2. Wait for the tasks to finish (with timeout)

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use shared_bus::EventSubscriber;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use xs_01_escrow_ledger::LedgerClock;
use xs_02_secret_relay::RelayWatcher;

use crate::container::{ChainClocks, NetworkChannels, NetworkError, RuntimeConfig, SwapNetwork};
use crate::handlers::{AckHandler, RelayCallHandler};

/// How long [`SwapRuntime::shutdown`] waits for each task.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Runtime lifecycle errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Deployment failed.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// `start` was called twice.
    #[error("Runtime already started")]
    AlreadyStarted,

    /// The relay has no bridge to watch.
    #[error("Relay bridge is not configured")]
    BridgeNotConfigured,
}

/// The runtime orchestrating both chains.
pub struct SwapRuntime<C: LedgerClock + 'static> {
    /// Deployed ledgers and relay.
    network: Arc<SwapNetwork<C>>,
    /// Channel ends handed to the tasks on start.
    channels: Mutex<Option<NetworkChannels>>,
    /// Spawned background tasks.
    tasks: Mutex<Vec<JoinHandle<()>>>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
}

impl<C: LedgerClock + 'static> SwapRuntime<C> {
    /// Deploy the network described by `config`.
    pub fn new(config: RuntimeConfig, clocks: ChainClocks<C>) -> Result<Self, RuntimeError> {
        info!("Creating cross-swap runtime");
        let (network, channels) = SwapNetwork::deploy(config, clocks)?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            network: Arc::new(network),
            channels: Mutex::new(Some(channels)),
            tasks: Mutex::new(Vec::new()),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Spawn the watcher and both handlers. Must run inside a tokio runtime.
    pub fn start(&self) -> Result<(), RuntimeError> {
        let channels = self
            .channels
            .lock()
            .take()
            .ok_or(RuntimeError::AlreadyStarted)?;

        info!("===========================================");
        info!("  Cross-Swap Runtime Starting");
        info!("===========================================");

        let network = &self.network;
        let operator = network.config().deployment.operator;
        let watcher = RelayWatcher::new(Arc::clone(&network.relay), operator);
        let filter = watcher.filter().ok_or(RuntimeError::BridgeNotConfigured)?;
        let subscription = network.destination.bus.subscribe(filter);

        let call_handler = RelayCallHandler::new(
            Arc::clone(&network.receiver),
            Arc::clone(&network.ack_transport),
            channels.relay_calls,
        );
        let ack_handler = AckHandler::new(Arc::clone(&network.relay), channels.acks);

        let mut tasks = self.tasks.lock();
        tasks.push(tokio::spawn(
            watcher.run(subscription, self.shutdown_rx.clone()),
        ));
        tasks.push(tokio::spawn(call_handler.run(self.shutdown_rx.clone())));
        tasks.push(tokio::spawn(ack_handler.run(self.shutdown_rx.clone())));

        info!(tasks = tasks.len(), "Relay tasks started");
        Ok(())
    }

    /// Stop the background tasks gracefully.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Task ended abnormally: {}", e),
                Err(_) => warn!("Task did not stop within {:?}", SHUTDOWN_GRACE),
            }
        }

        info!("Shutdown complete");
    }

    /// The deployed network.
    pub fn network(&self) -> Arc<SwapNetwork<C>> {
        Arc::clone(&self.network)
    }

    /// Has `start` been called?
    pub fn is_started(&self) -> bool {
        self.channels.lock().is_none()
    }
}

use std::collections::HashMap;
use std::mem;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::Delivery;
use super::Waiter;
use super::WaiterGuard;
use crate::metrics::CHANGE_NOTIFICATIONS_TOTAL;
use crate::metrics::FANOUT_DELIVERIES_TOTAL;
use crate::signal::SignalSet;
use crate::source::SignalSource;

type Registration = (u64, oneshot::Sender<Delivery>);

/// Owner of the waiter registry.
///
/// Processes registrations, deregistrations and change notifications from
/// its queues; fetching and fan-out happen in spawned tasks so a slow
/// signal source never stalls the queues.
pub struct ChangeDistributor {
    source: Arc<dyn SignalSource>,
    waiters: HashMap<u64, oneshot::Sender<Delivery>>,

    register_rx: mpsc::UnboundedReceiver<Registration>,
    deregister_rx: mpsc::UnboundedReceiver<u64>,
    notify_rx: mpsc::UnboundedReceiver<()>,

    shutdown: watch::Receiver<()>,
}

/// Cloneable entry point to a running [`ChangeDistributor`]
#[derive(Clone)]
pub struct DistributorHandle {
    register_tx: mpsc::UnboundedSender<Registration>,
    deregister_tx: mpsc::UnboundedSender<u64>,
    notify_tx: mpsc::UnboundedSender<()>,

    next_id: Arc<AtomicU64>,
}

impl ChangeDistributor {
    /// Returns (distributor, handle) pair
    pub fn new(
        source: Arc<dyn SignalSource>,
        shutdown: watch::Receiver<()>,
    ) -> (Self, DistributorHandle) {
        let (register_tx, register_rx) = mpsc::unbounded_channel();
        let (deregister_tx, deregister_rx) = mpsc::unbounded_channel();
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();

        let distributor = Self {
            source,
            waiters: HashMap::new(),
            register_rx,
            deregister_rx,
            notify_rx,
            shutdown,
        };

        let handle = DistributorHandle {
            register_tx,
            deregister_tx,
            notify_tx,
            next_id: Arc::new(AtomicU64::new(1)),
        };

        (distributor, handle)
    }

    /// Main loop, runs until shutdown or until every handle is gone.
    ///
    /// Waiters still registered on exit are dropped; their requests see a
    /// closed channel and finish on their own deadline.
    pub async fn run(mut self) {
        info!("Change distributor started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.changed() => {
                    info!("Change distributor shutting down");
                    break;
                }

                notify = self.notify_rx.recv() => {
                    match notify {
                        Some(()) => {
                            self.drain_queued();
                            self.handle_notify();
                        }
                        None => {
                            debug!("All distributor handles dropped");
                            break;
                        }
                    }
                }

                Some((id, sender)) = self.register_rx.recv() => {
                    self.handle_register(id, sender);
                }

                Some(id) = self.deregister_rx.recv() => {
                    self.handle_deregister(id);
                }
            }
        }

        info!(abandoned = self.waiters.len(), "Change distributor stopped");
    }

    /// Applies every registration and deregistration queued so far.
    /// Registrations go first: a waiter's deregistration is always sent
    /// after its registration.
    fn drain_queued(&mut self) {
        while let Ok((id, sender)) = self.register_rx.try_recv() {
            self.handle_register(id, sender);
        }
        while let Ok(id) = self.deregister_rx.try_recv() {
            self.handle_deregister(id);
        }
    }

    fn handle_register(
        &mut self,
        id: u64,
        sender: oneshot::Sender<Delivery>,
    ) {
        if self.waiters.contains_key(&id) {
            debug!(waiter_id = id, "Waiter already registered");
            return;
        }
        self.waiters.insert(id, sender);
        debug!(waiter_id = id, waiters = self.waiters.len(), "Waiter registered");
    }

    fn handle_deregister(
        &mut self,
        id: u64,
    ) {
        if self.waiters.remove(&id).is_some() {
            debug!(waiter_id = id, waiters = self.waiters.len(), "Waiter deregistered");
        }
    }

    fn handle_notify(&mut self) {
        CHANGE_NOTIFICATIONS_TOTAL.inc();

        let batch = mem::take(&mut self.waiters);
        if batch.is_empty() {
            debug!("Change notified with no waiters");
            return;
        }

        debug!(batch = batch.len(), "Fanning out change");
        tokio::spawn(fan_out(self.source.clone(), batch));
    }
}

/// Fetches once and delivers the same snapshot to every waiter of `batch`.
async fn fan_out(
    source: Arc<dyn SignalSource>,
    batch: HashMap<u64, oneshot::Sender<Delivery>>,
) {
    let snapshot = match source.fetch_signals().await {
        Ok(set) => set,
        Err(e) => {
            warn!("Fetch for fan-out failed: {:?}", e);
            SignalSet::failed(e.to_string())
        }
    };
    let delivery: Delivery = Arc::new(snapshot);

    let mut delivered = 0_u64;
    for (id, sender) in batch {
        // Receiver already gone: the request finished or was cancelled.
        if sender.send(delivery.clone()).is_ok() {
            delivered += 1;
        } else {
            debug!(waiter_id = id, "Waiter left before delivery");
        }
    }
    FANOUT_DELIVERIES_TOTAL.inc_by(delivered);
}

impl DistributorHandle {
    /// Registers a new waiter.
    ///
    /// The returned [`Waiter`] deregisters itself when dropped before a
    /// delivery arrives.
    pub fn register(&self) -> Waiter {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();

        if self.register_tx.send((id, sender)).is_err() {
            warn!(waiter_id = id, "Change distributor is not running");
        }

        Waiter::new(id, receiver, WaiterGuard::new(id, self.deregister_tx.clone()))
    }

    pub fn deregister(
        &self,
        id: u64,
    ) {
        let _ = self.deregister_tx.send(id);
    }

    /// Signals that the signal table changed. Never blocks.
    pub fn notify(&self) {
        if self.notify_tx.send(()).is_err() {
            warn!("Change distributor is not running, notify dropped");
        }
    }
}

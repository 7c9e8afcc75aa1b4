use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::trace;

use super::Delivery;
use crate::constants::FAR_FUTURE_SECS;
use crate::metrics::LONG_POLL_WAITERS;

/// How a wait ended
#[derive(Debug)]
pub enum WaitOutcome {
    Delivered(Delivery),
    TimedOut,
}

/// A registered long-poll request waiting for the next change
pub struct Waiter {
    id: u64,
    receiver: oneshot::Receiver<Delivery>,
    guard: WaiterGuard,
}

impl Waiter {
    pub(super) fn new(
        id: u64,
        receiver: oneshot::Receiver<Delivery>,
        guard: WaiterGuard,
    ) -> Self {
        Self { id, receiver, guard }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Waits for a delivery or until `timeout` elapses, whichever comes
    /// first. Exactly one outcome is produced.
    ///
    /// A closed channel (distributor stopped) is waited out like a timeout.
    pub async fn wait(
        self,
        timeout: Duration,
    ) -> WaitOutcome {
        let Waiter {
            id,
            mut receiver,
            mut guard,
        } = self;
        let deadline = deadline_after(timeout);

        let outcome = tokio::select! {
            result = &mut receiver => match result {
                Ok(delivery) => {
                    // Removed from the registry by the fan-out already
                    guard.disarm();
                    WaitOutcome::Delivered(delivery)
                }
                Err(_) => {
                    trace!(waiter_id = id, "Distributor gone, waiting out deadline");
                    tokio::time::sleep_until(deadline).await;
                    WaitOutcome::TimedOut
                }
            },
            _ = tokio::time::sleep_until(deadline) => WaitOutcome::TimedOut,
        };

        trace!(waiter_id = id, ?outcome, "Wait finished");
        outcome
    }
}

/// `now + timeout`, saturating at a far-future instant for timeouts the
/// clock cannot represent
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(FAR_FUTURE_SECS))
}

/// Deregisters its waiter when dropped, covering timeouts as well as
/// requests cancelled mid-wait. Also tracks the parked waiter gauge.
pub struct WaiterGuard {
    id: u64,
    deregister_tx: mpsc::UnboundedSender<u64>,
    armed: bool,
}

impl WaiterGuard {
    pub(super) fn new(
        id: u64,
        deregister_tx: mpsc::UnboundedSender<u64>,
    ) -> Self {
        LONG_POLL_WAITERS.inc();
        Self {
            id,
            deregister_tx,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for WaiterGuard {
    fn drop(&mut self) {
        LONG_POLL_WAITERS.dec();
        if self.armed {
            let _ = self.deregister_tx.send(self.id);
            trace!(waiter_id = self.id, "Waiter deregistered via guard");
        }
    }
}

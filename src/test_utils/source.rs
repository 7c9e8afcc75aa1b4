use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::signals;
use crate::signal::Signal;
use crate::signal::SignalSet;
use crate::source::SignalSource;
use crate::Error;
use crate::Result;

/// In-memory signal source with a switchable result, a fetch counter and
/// an optional gate that holds every fetch until a permit is released.
pub struct FakeSource {
    result: Mutex<std::result::Result<Vec<Signal>, String>>,
    fetches: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl FakeSource {
    pub fn with_ids(ids: &[&str]) -> Self {
        Self {
            result: Mutex::new(Ok(signals(ids))),
            fetches: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Mutex::new(Err(reason.to_string())),
            fetches: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Each fetch consumes one permit of `gate` before answering
    pub fn gated(
        mut self,
        gate: Arc<Semaphore>,
    ) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set_ids(
        &self,
        ids: &[&str],
    ) {
        *self.result.lock() = Ok(signals(ids));
    }

    pub fn set_failing(
        &self,
        reason: &str,
    ) {
        *self.result.lock() = Err(reason.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalSource for FakeSource {
    async fn fetch_signals(&self) -> Result<SignalSet> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.map_err(|e| Error::Fatal(e.to_string()))?.forget();
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let result = self.result.lock().clone();
        result.map(SignalSet::new).map_err(Error::Fatal)
    }
}

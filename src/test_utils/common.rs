use lazy_static::lazy_static;
use tokio::sync::watch;

use crate::signal::Signal;
use crate::signal::SignalSet;

lazy_static! {
    static ref LOGGER_INIT: () = {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    };
}

pub fn enable_logger() {
    lazy_static::initialize(&LOGGER_INIT);
    println!("setup logger for unit test.");
}

/// Signals with the given ids; location and method derive from the id
pub fn signals(ids: &[&str]) -> Vec<Signal> {
    ids.iter()
        .map(|id| Signal::new(*id, format!("http://app/{id}"), "GET"))
        .collect()
}

pub fn signal_set(ids: &[&str]) -> SignalSet {
    SignalSet::new(signals(ids))
}

/// Sorted ids of `set`, for order-insensitive assertions
pub fn sorted_ids(set: &SignalSet) -> Vec<String> {
    let mut ids: Vec<String> = set.signals.iter().map(|s| s.id.clone()).collect();
    ids.sort();
    ids
}

/// Shutdown channel kept open for the lifetime of the returned sender
pub fn shutdown_channel() -> (watch::Sender<()>, watch::Receiver<()>) {
    watch::channel(())
}

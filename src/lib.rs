//! Long-poll HTTP gateway for trace signals.
//!
//! Clients fetch the set of active trace signals (debug capture sessions)
//! and may block until that set changes; captured trace data is relayed to
//! a blob store. See [`GatewayBuilder`] for assembling a running gateway.

pub mod api;
pub mod blobstore;
mod config;
mod constants;
pub mod distributor;
mod errors;
mod gateway;
pub mod listener;
pub mod metrics;
pub mod signal;
pub mod source;

pub use config::*;
pub use errors::*;
pub use gateway::*;

#[cfg(test)]
mod errors_test;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;

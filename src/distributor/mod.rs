//! Change distribution to parked long-poll requests.
//!
//! ```text
//! HTTP handler ── register ──┐
//! Waiter drop  ── deregister ┼─> ChangeDistributor::run() [1 task]
//! Listener     ── notify ────┘        └─> spawns one fan-out task per notify
//!                                              ├─> fetch_signals() once
//!                                              └─> oneshot::send() to each waiter
//! ```
//!
//! The registry is owned by the distributor task alone; every mutation
//! arrives through its channels, so no lock guards it. A notify takes the
//! whole registry as its batch: waiters registered afterwards wait for the
//! next change.

mod distributor;
mod waiter;
pub use distributor::*;
pub use waiter::*;


use std::sync::Arc;

use crate::signal::SignalSet;

/// Signal set handed to every waiter of one fan-out batch
pub type Delivery = Arc<SignalSet>;

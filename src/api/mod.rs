//! HTTP surface of the gateway.
//!
//! - `GET /<signal_path>?block=<secs>`: current trace signals, long-polled
//!   when the client sends its known ids in `If-None-Match`
//! - `POST /<upload_path>`: relays captured trace data to the blob store
//!
//! Both routes answer `404` until [`ApiControl::init_api`] has run.

mod long_poll;
mod manager;
mod response;
mod routes;
mod upload;
pub use long_poll::*;
pub use manager::*;
pub use response::*;
pub use routes::*;

#[cfg(test)]
mod manager_test;

#[cfg(test)]
use mockall::automock;

/// Control surface used by the sync event listener
#[cfg_attr(test, automock)]
pub trait ApiControl: Send + Sync + 'static {
    /// Enables the routes and starts change distribution. Idempotent.
    fn init_api(&self);

    /// Wakes every request currently waiting for a change
    fn notify_change(&self);
}

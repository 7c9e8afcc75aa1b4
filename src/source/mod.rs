//! Signal source abstraction over a versioned data service.
//!
//! The signal table lives in a database that is replaced wholesale whenever
//! a new snapshot is applied. [`DbManager`] keeps the currently active
//! handle behind a read/write lock: version switches take the write lock,
//! queries only ever take the read lock long enough to clone the handle.
//!
//! Capabilities are split into small traits so production and test
//! implementations can be swapped without touching the HTTP layer or the
//! distributor:
//! - [`SignalSource`]: fetch the current signal set
//! - [`DbVersionSwitch`]: point the source at another snapshot version
//! - [`DataService`] / [`SignalDb`]: the storage behind both

mod db_manager;
mod sled_data;
pub use db_manager::*;
pub use sled_data::*;


use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::signal::Signal;
use crate::signal::SignalSet;
use crate::Result;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SignalSource: Send + Sync + 'static {
    /// Reads the complete current signal set.
    ///
    /// Never retried here; an error is surfaced to the caller as-is.
    async fn fetch_signals(&self) -> Result<SignalSet>;
}

#[cfg_attr(test, automock)]
pub trait DbVersionSwitch: Send + Sync + 'static {
    /// Switches subsequent reads to the database of `version`.
    fn set_db_version(
        &self,
        version: &str,
    ) -> Result<()>;
}

/// Hands out database handles per snapshot version
pub trait DataService: Send + Sync + 'static {
    fn db_version(
        &self,
        version: &str,
    ) -> Result<Arc<dyn SignalDb>>;
}

/// One snapshot version of the signal table
pub trait SignalDb: Send + Sync + 'static {
    fn query_signals(&self) -> Result<Vec<Signal>>;
}

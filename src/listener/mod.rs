//! Reaction to sync events from the change feed.
//!
//! Two kinds of events arrive: a change list describing rows applied to the
//! database, and a snapshot announcing that a new database version is
//! ready. Change lists touching the signal table wake waiting requests;
//! snapshots switch the signal source, move the change feed onto the new
//! version and enable the API.

mod change_feed;
mod event;
mod handler;
pub use change_feed::*;
pub use event::*;
pub use handler::*;


#[cfg(test)]
use mockall::automock;

use crate::Result;

/// Source of change list events that follows the serving database version
#[cfg_attr(test, automock)]
pub trait ChangeFeed: Send + Sync + 'static {
    /// Moves the feed onto the signal table of `version`, replacing any
    /// feed on a previous version.
    fn follow(
        &self,
        version: &str,
    ) -> Result<()>;
}

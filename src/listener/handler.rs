use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::info;

use super::Change;
use super::ChangeFeed;
use super::Operation;
use super::SyncEvent;
use crate::api::ApiControl;
use crate::source::DbVersionSwitch;

/// Applies sync events to the signal source and the API
pub struct SyncEventHandler {
    db: Arc<dyn DbVersionSwitch>,
    api: Arc<dyn ApiControl>,
    feed: Option<Arc<dyn ChangeFeed>>,
    signal_table: String,
}

impl SyncEventHandler {
    pub fn new(
        db: Arc<dyn DbVersionSwitch>,
        api: Arc<dyn ApiControl>,
        signal_table: impl Into<String>,
    ) -> Self {
        Self {
            db,
            api,
            feed: None,
            signal_table: signal_table.into(),
        }
    }

    /// Moves `feed` onto every newly applied snapshot version
    pub fn with_change_feed(
        mut self,
        feed: Arc<dyn ChangeFeed>,
    ) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn handle(
        &self,
        event: SyncEvent,
    ) {
        match event {
            SyncEvent::ChangeList { changes } => self.process_change_list(&changes),
            SyncEvent::Snapshot { version } => self.process_snapshot(&version),
        }
    }

    /// Notifies at most once per change list, however many signal rows it
    /// touches.
    fn process_change_list(
        &self,
        changes: &[Change],
    ) {
        let mut changed = false;
        for change in changes.iter().filter(|c| c.table == self.signal_table) {
            match change.operation {
                Operation::Insert | Operation::Delete => changed = true,
                Operation::Update => {
                    error!(table = %change.table, "Update operation on signal table not supported")
                }
            }
        }

        if changed {
            debug!(changes = changes.len(), "Signal table changed");
            self.api.notify_change();
        }
    }

    fn process_snapshot(
        &self,
        version: &str,
    ) {
        debug!(version, "Snapshot received, switching database version");

        if let Err(e) = self.db.set_db_version(version) {
            error!(version, "Unable to access database version: {:?}", e);
            return;
        }

        // Reads already moved; a feed failure only costs wake-ups
        if let Some(feed) = &self.feed {
            if let Err(e) = feed.follow(version) {
                error!(version, "Unable to follow changes of database version: {:?}", e);
            }
        }

        self.api.init_api();
        debug!(version, "Snapshot processed");
    }

    /// Consumes events until shutdown or until every sender is gone
    pub async fn run(
        self,
        mut events: mpsc::UnboundedReceiver<SyncEvent>,
        mut shutdown: watch::Receiver<()>,
    ) {
        info!("Sync event listener started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.changed() => {
                    info!("Sync event listener shutting down");
                    break;
                }

                event = events.recv() => {
                    match event {
                        Some(event) => self.handle(event),
                        None => break,
                    }
                }
            }
        }

        info!("Sync event listener stopped");
    }
}

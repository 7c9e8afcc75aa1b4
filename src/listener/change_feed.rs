use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;

use super::Change;
use super::ChangeFeed;
use super::Operation;
use super::SyncEvent;
use crate::source::SledDataService;
use crate::Result;

/// Turns writes on a sled signal tree into change list events.
///
/// Every insert or remove on `tree` is forwarded as a one-change
/// [`SyncEvent::ChangeList`] on `table`. Stops on shutdown, when the
/// receiving side is gone or when the tree is dropped.
pub fn spawn_sled_change_feed(
    tree: sled::Tree,
    table: String,
    events: mpsc::UnboundedSender<SyncEvent>,
    mut shutdown: watch::Receiver<()>,
) -> JoinHandle<()> {
    let mut subscriber = tree.watch_prefix(vec![]);

    tokio::spawn(async move {
        info!(table = %table, "Sled change feed started");

        loop {
            let event = tokio::select! {
                _ = shutdown.changed() => break,
                event = &mut subscriber => event,
            };

            let Some(event) = event else {
                debug!("Sled subscriber closed");
                break;
            };

            let operation = match event {
                sled::Event::Insert { .. } => Operation::Insert,
                sled::Event::Remove { .. } => Operation::Delete,
            };
            let change_list = SyncEvent::ChangeList {
                changes: vec![Change::new(table.clone(), operation)],
            };
            if events.send(change_list).is_err() {
                debug!("Sync event receiver gone");
                break;
            }
        }

        info!(table = %table, "Sled change feed stopped");
    })
}

/// [`ChangeFeed`] over the versioned sled store.
///
/// Keeps one feed task, on the signal tree of the version it was last told
/// to follow.
pub struct SledChangeFeed {
    sled_data: Arc<SledDataService>,
    table: String,
    events: mpsc::UnboundedSender<SyncEvent>,
    shutdown: watch::Receiver<()>,
    current: Mutex<Option<FollowedVersion>>,
}

struct FollowedVersion {
    version: String,
    task: JoinHandle<()>,
}

impl SledChangeFeed {
    pub fn new(
        sled_data: Arc<SledDataService>,
        table: impl Into<String>,
        events: mpsc::UnboundedSender<SyncEvent>,
        shutdown: watch::Receiver<()>,
    ) -> Self {
        Self {
            sled_data,
            table: table.into(),
            events,
            shutdown,
            current: Mutex::new(None),
        }
    }

    /// Version the feed currently follows, if its task is still running
    pub fn followed_version(&self) -> Option<String> {
        self.current
            .lock()
            .as_ref()
            .filter(|followed| !followed.task.is_finished())
            .map(|followed| followed.version.clone())
    }
}

impl ChangeFeed for SledChangeFeed {
    fn follow(
        &self,
        version: &str,
    ) -> Result<()> {
        let mut current = self.current.lock();
        if let Some(followed) = current.as_ref() {
            if followed.version == version && !followed.task.is_finished() {
                debug!(version, "Change feed already follows version");
                return Ok(());
            }
        }

        let tree = self.sled_data.signal_tree(version)?;
        let task = spawn_sled_change_feed(tree, self.table.clone(), self.events.clone(), self.shutdown.clone());

        if let Some(previous) = current.replace(FollowedVersion {
            version: version.to_string(),
            task,
        }) {
            previous.task.abort();
            info!(version, previous = %previous.version, "Change feed moved to new version");
        }
        Ok(())
    }
}

impl Drop for SledChangeFeed {
    fn drop(&mut self) {
        if let Some(followed) = self.current.get_mut().take() {
            followed.task.abort();
        }
    }
}

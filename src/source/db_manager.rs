use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;
use tracing::info;

use super::DataService;
use super::DbVersionSwitch;
use super::SignalDb;
use super::SignalSource;
use crate::signal::SignalSet;
use crate::Result;
use crate::StorageError;

/// Signal source backed by a swappable, versioned database handle
pub struct DbManager {
    data: Arc<dyn DataService>,
    db: RwLock<Option<ActiveDb>>,
}

struct ActiveDb {
    version: String,
    db: Arc<dyn SignalDb>,
}

impl DbManager {
    pub fn new(data: Arc<dyn DataService>) -> Self {
        Self {
            data,
            db: RwLock::new(None),
        }
    }

    /// Version currently serving reads, if any
    pub fn current_version(&self) -> Option<String> {
        self.db.read().as_ref().map(|active| active.version.clone())
    }

    fn db(&self) -> Result<Arc<dyn SignalDb>> {
        self.db
            .read()
            .as_ref()
            .map(|active| active.db.clone())
            .ok_or_else(|| StorageError::VersionNotSet.into())
    }
}

impl DbVersionSwitch for DbManager {
    fn set_db_version(
        &self,
        version: &str,
    ) -> Result<()> {
        // Open outside the lock; readers keep using the previous version meanwhile.
        let db = self.data.db_version(version)?;

        let previous = self.db.write().replace(ActiveDb {
            version: version.to_string(),
            db,
        });

        info!(
            version,
            previous = ?previous.as_ref().map(|p| p.version.as_str()),
            "Switched signal database version"
        );
        Ok(())
    }
}

#[async_trait]
impl SignalSource for DbManager {
    async fn fetch_signals(&self) -> Result<SignalSet> {
        let signals = self.db()?.query_signals()?;
        debug!(count = signals.len(), "Fetched trace signals");
        Ok(SignalSet::new(signals))
    }
}

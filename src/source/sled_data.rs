use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use tracing::warn;

use super::DataService;
use super::SignalDb;
use crate::constants::SIGNAL_DB_CACHE_CAPACITY;
use crate::signal::Signal;
use crate::Result;
use crate::StorageError;

/// Data service keeping one sled database per snapshot version under
/// `<root>/<version>`.
///
/// Opened databases are cached: sled holds an exclusive file lock, so a
/// version must be opened at most once per process.
pub struct SledDataService {
    root: PathBuf,
    signal_table: String,
    dbs: Mutex<HashMap<String, sled::Db>>,
}

impl SledDataService {
    pub fn new(
        root: impl Into<PathBuf>,
        signal_table: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            signal_table: signal_table.into(),
            dbs: Mutex::new(HashMap::new()),
        }
    }

    /// Opens (or returns the cached) database of `version`
    pub fn open(
        &self,
        version: &str,
    ) -> Result<sled::Db> {
        let mut dbs = self.dbs.lock();
        if let Some(db) = dbs.get(version) {
            return Ok(db.clone());
        }

        let db = init_sled_signal_db(&self.root, version)?;
        dbs.insert(version.to_string(), db.clone());
        Ok(db)
    }

    /// Signal table of `version`, e.g. for subscribing to its changes
    pub fn signal_tree(
        &self,
        version: &str,
    ) -> Result<sled::Tree> {
        Ok(self.open(version)?.open_tree(&self.signal_table)?)
    }

    /// Typed handle on the signal table of `version`
    pub fn signal_db(
        &self,
        version: &str,
    ) -> Result<SledSignalDb> {
        Ok(SledSignalDb {
            tree: self.signal_tree(version)?,
        })
    }
}

impl DataService for SledDataService {
    fn db_version(
        &self,
        version: &str,
    ) -> Result<Arc<dyn SignalDb>> {
        Ok(Arc::new(self.signal_db(version)?))
    }
}

pub fn init_sled_signal_db(
    root: &Path,
    version: &str,
) -> Result<sled::Db> {
    let path = root.join(version);
    debug!("init_sled_signal_db from path: {:?}", &path);

    sled::Config::default()
        .path(&path)
        .cache_capacity(SIGNAL_DB_CACHE_CAPACITY)
        .use_compression(true)
        .compression_factor(1)
        .open()
        .map_err(|e| {
            warn!("Try to open DB at this location: {:?} and failed: {:?}", path, e);
            StorageError::OpenVersion {
                version: version.to_string(),
                path,
                source: e,
            }
            .into()
        })
}

/// Signal table of one snapshot version. Rows are keyed by signal id.
#[derive(Clone)]
pub struct SledSignalDb {
    tree: sled::Tree,
}

impl SledSignalDb {
    pub fn put_signal(
        &self,
        signal: &Signal,
    ) -> Result<()> {
        let row = bincode::serialize(signal)?;
        self.tree.insert(signal.id.as_bytes(), row)?;
        Ok(())
    }

    /// Returns whether a row was removed
    pub fn delete_signal(
        &self,
        id: &str,
    ) -> Result<bool> {
        Ok(self.tree.remove(id.as_bytes())?.is_some())
    }

    pub fn flush(&self) -> Result<()> {
        self.tree.flush()?;
        Ok(())
    }
}

impl SignalDb for SledSignalDb {
    fn query_signals(&self) -> Result<Vec<Signal>> {
        let mut signals = Vec::with_capacity(self.tree.len());
        for row in self.tree.iter() {
            let (key, value) = row?;
            let signal: Signal = bincode::deserialize(&value).map_err(|_| StorageError::CorruptRow {
                key: String::from_utf8_lossy(&key).into_owned(),
            })?;
            signals.push(signal);
        }
        Ok(signals)
    }
}

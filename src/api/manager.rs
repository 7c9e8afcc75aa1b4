use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;
use tracing::info;

use super::ApiControl;
use crate::blobstore::BlobstoreClient;
use crate::distributor::ChangeDistributor;
use crate::distributor::DistributorHandle;
use crate::source::SignalSource;
use crate::LongPollConfig;
use crate::ServerConfig;

/// State shared by the API handlers
pub struct ApiManager {
    pub(super) server: ServerConfig,
    pub(super) long_poll: LongPollConfig,
    pub(super) source: Arc<dyn SignalSource>,
    pub(super) blobstore: Arc<dyn BlobstoreClient>,
    pub(super) distributor: DistributorHandle,

    /// Distributor loop, taken and spawned by the first `init_api`
    pending: Mutex<Option<ChangeDistributor>>,
    initialized: AtomicBool,
}

impl ApiManager {
    pub fn new(
        server: ServerConfig,
        long_poll: LongPollConfig,
        source: Arc<dyn SignalSource>,
        blobstore: Arc<dyn BlobstoreClient>,
        shutdown: watch::Receiver<()>,
    ) -> Self {
        let (distributor, handle) = ChangeDistributor::new(source.clone(), shutdown);

        Self {
            server,
            long_poll,
            source,
            blobstore,
            distributor: handle,
            pending: Mutex::new(Some(distributor)),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn distributor(&self) -> &DistributorHandle {
        &self.distributor
    }
}

impl ApiControl for ApiManager {
    fn init_api(&self) {
        let Some(distributor) = self.pending.lock().take() else {
            debug!("API already initialized");
            return;
        };

        tokio::spawn(distributor.run());
        self.initialized.store(true, Ordering::Release);

        info!(
            signal_path = %self.server.signal_path,
            upload_path = %self.server.upload_path,
            "API endpoints initialized"
        );
    }

    fn notify_change(&self) {
        self.distributor.notify();
    }
}

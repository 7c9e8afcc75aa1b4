//! Assembly of a [`Gateway`] from its configuration.
//!
//! [`GatewayBuilder`] wires the signal source, the API manager, the change
//! distributor and the sync event listener together.
//!
//! - `build()`: creates the components and spawns the event listener
//! - `start_metrics_server()`: launches the Prometheus endpoint if enabled
//! - `ready()`: returns the assembled [`Gateway`]
//!
//! ## Example
//! ```ignore
//! let (shutdown_tx, shutdown_rx) = watch::channel(());
//! let gateway = GatewayBuilder::init(config, shutdown_rx.clone())
//!     .build()?
//!     .start_metrics_server(shutdown_tx.subscribe())
//!     .ready()?;
//! gateway.run().await?;
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::debug;
use tracing::info;

use super::Gateway;
use crate::api::ApiManager;
use crate::blobstore::BlobstoreClient;
use crate::blobstore::ReqwestBlobstoreClient;
use crate::listener::SledChangeFeed;
use crate::listener::SyncEventHandler;
use crate::metrics;
use crate::source::DataService;
use crate::source::DbManager;
use crate::source::SledDataService;
use crate::GatewayConfig;
use crate::Result;
use crate::SystemError;

pub struct GatewayBuilder {
    pub(super) config: GatewayConfig,
    shutdown_signal: watch::Receiver<()>,

    pub(super) data_service: Option<Arc<dyn DataService>>,
    pub(super) blobstore: Option<Arc<dyn BlobstoreClient>>,

    pub(super) gateway: Option<Arc<Gateway>>,
}

impl GatewayBuilder {
    /// Loads and validates configuration, then initializes the builder
    ///
    /// # Arguments
    /// * `config_path` - Optional file layered over the `CONFIG_PATH` configuration
    /// * `shutdown_signal` - Watch channel for graceful shutdown signaling
    pub fn new(
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<()>,
    ) -> Result<Self> {
        let mut config = GatewayConfig::new()?;
        if let Some(p) = config_path {
            info!("with_override_config from: {}", &p);
            config = config.with_override_config(p)?;
        }
        Ok(Self::init(config.validate()?, shutdown_signal))
    }

    /// Core initialization logic shared by all construction paths
    pub fn init(
        config: GatewayConfig,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        Self {
            config,
            shutdown_signal,
            data_service: None,
            blobstore: None,
            gateway: None,
        }
    }

    /// Sets a custom data service instead of the sled store under
    /// `storage.db_root_dir`
    pub fn data_service(
        mut self,
        data_service: Arc<dyn DataService>,
    ) -> Self {
        self.data_service = Some(data_service);
        self
    }

    /// Sets a custom blob store client instead of the configured blob server
    pub fn blobstore(
        mut self,
        blobstore: Arc<dyn BlobstoreClient>,
    ) -> Self {
        self.blobstore = Some(blobstore);
        self
    }

    /// Assembles the gateway and spawns its sync event listener. With the
    /// default sled store, every applied snapshot also moves the sled change
    /// feed onto that version.
    ///
    /// # Errors
    /// Fails when the blob store client cannot be created from configuration.
    pub fn build(mut self) -> Result<Self> {
        let storage = &self.config.storage;

        let mut sled_data = None;
        let data_service = match self.data_service.take() {
            Some(data_service) => data_service,
            None => {
                debug!(root = ?storage.db_root_dir, "Using sled signal store");
                let sled = Arc::new(SledDataService::new(
                    storage.db_root_dir.clone(),
                    storage.signal_table.clone(),
                ));
                sled_data = Some(sled.clone());
                sled as Arc<dyn DataService>
            }
        };

        let blobstore = match self.blobstore.take() {
            Some(blobstore) => blobstore,
            None => Arc::new(ReqwestBlobstoreClient::new(&self.config.blobstore)?) as Arc<dyn BlobstoreClient>,
        };

        let db_manager = Arc::new(DbManager::new(data_service));
        let api = Arc::new(ApiManager::new(
            self.config.server.clone(),
            self.config.long_poll.clone(),
            db_manager.clone(),
            blobstore,
            self.shutdown_signal.clone(),
        ));

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut handler = SyncEventHandler::new(db_manager.clone(), api.clone(), storage.signal_table.clone());
        if let Some(sled) = &sled_data {
            let feed = SledChangeFeed::new(
                sled.clone(),
                storage.signal_table.clone(),
                event_tx.clone(),
                self.shutdown_signal.clone(),
            );
            handler = handler.with_change_feed(Arc::new(feed));
        }
        tokio::spawn(handler.run(event_rx, self.shutdown_signal.clone()));

        self.gateway = Some(Arc::new(Gateway {
            config: self.config.clone(),
            api,
            db_manager,
            sled_data,
            event_tx,
            shutdown_signal: self.shutdown_signal.clone(),
        }));
        Ok(self)
    }

    /// Starts the metrics server when `monitoring.prometheus_enabled` is set.
    pub fn start_metrics_server(
        self,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        if !self.config.monitoring.prometheus_enabled {
            debug!("Prometheus metrics disabled");
            return self;
        }

        let port = self.config.monitoring.prometheus_port;
        info!(port, "start metric server!");
        tokio::spawn(async move {
            metrics::start_server(port, shutdown_signal).await;
        });
        self
    }

    /// Returns the built gateway instance.
    ///
    /// # Errors
    /// Returns `SystemError::ServerStart` if `build()` has not completed
    pub fn ready(self) -> Result<Arc<Gateway>> {
        self.gateway
            .ok_or_else(|| SystemError::ServerStart("check gateway ready failed".to_string()).into())
    }
}

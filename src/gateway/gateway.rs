//! A running trace gateway: the API server plus the channel feeding it sync
//! events.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::info;

use crate::api::routes;
use crate::api::ApiManager;
use crate::listener::SyncEvent;
use crate::source::DbManager;
use crate::source::SledDataService;
use crate::Error;
use crate::GatewayConfig;
use crate::Result;
use crate::SystemError;

pub struct Gateway {
    pub(super) config: GatewayConfig,
    pub(super) api: Arc<ApiManager>,
    pub(super) db_manager: Arc<DbManager>,
    /// Set when the default sled store backs the signal source
    pub(super) sled_data: Option<Arc<SledDataService>>,

    pub(super) event_tx: mpsc::UnboundedSender<SyncEvent>,
    pub(super) shutdown_signal: watch::Receiver<()>,
}

impl Gateway {
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn api(&self) -> &Arc<ApiManager> {
        &self.api
    }

    pub fn db_manager(&self) -> &Arc<DbManager> {
        &self.db_manager
    }

    pub fn sled_data(&self) -> Option<&Arc<SledDataService>> {
        self.sled_data.as_ref()
    }

    /// Sender feeding the sync event listener
    pub fn event_sender(&self) -> mpsc::UnboundedSender<SyncEvent> {
        self.event_tx.clone()
    }

    /// Queues a snapshot event switching to `version`
    pub fn apply_snapshot(
        &self,
        version: &str,
    ) -> Result<()> {
        self.event_tx
            .send(SyncEvent::Snapshot {
                version: version.to_string(),
            })
            .map_err(|e| Error::Fatal(format!("sync event listener stopped: {e}")))
    }

    /// Binds the API server to `server.listen_address`.
    ///
    /// Returns the bound address and the server future, which completes
    /// after the shutdown signal fires.
    pub fn bind(&self) -> Result<(SocketAddr, impl Future<Output = ()> + 'static)> {
        let mut shutdown = self.shutdown_signal.clone();
        warp::serve(routes(self.api.clone()))
            .try_bind_with_graceful_shutdown(self.config.server.listen_address, async move {
                let _ = shutdown.changed().await;
            })
            .map_err(|e| SystemError::ServerStart(e.to_string()).into())
    }

    /// Serves the API until shutdown
    pub async fn run(&self) -> Result<()> {
        let (addr, server) = self.bind()?;
        info!("Trace gateway listening on {}", addr);

        server.await;

        info!("Trace gateway stopped");
        Ok(())
    }
}

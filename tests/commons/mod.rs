#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use trace_gateway::signal::Signal;
use trace_gateway::source::SledSignalDb;
use trace_gateway::Gateway;
use trace_gateway::GatewayBuilder;
use trace_gateway::GatewayConfig;

pub const VERSION: &str = "v1";
const WAIT_FOR_API_READY_IN_MS: u64 = 2000;

/// A gateway serving a sled store in a temp dir. Writes to `signals` reach
/// blocked requests through the gateway's sled change feed.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub gateway: Arc<Gateway>,
    pub signals: SledSignalDb,
    shutdown_tx: watch::Sender<()>,
    server: JoinHandle<()>,
    _dir: TempDir,
}

impl TestGateway {
    pub fn url(
        &self,
        path_and_query: &str,
    ) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    pub fn insert(
        &self,
        id: &str,
    ) {
        self.signals.put_signal(&signal(id)).unwrap();
    }

    pub fn delete(
        &self,
        id: &str,
    ) {
        assert!(self.signals.delete_signal(id).unwrap());
    }

    /// Fills version `version` with `ids`, applies it as a snapshot and
    /// waits until reads are served from it. Returns its signal table.
    pub async fn switch_version(
        &self,
        version: &str,
        ids: &[&str],
    ) -> SledSignalDb {
        let signals = self.gateway.sled_data().unwrap().signal_db(version).unwrap();
        for id in ids {
            signals.put_signal(&signal(id)).unwrap();
        }
        self.gateway.apply_snapshot(version).unwrap();

        let result = tokio::time::timeout(Duration::from_millis(WAIT_FOR_API_READY_IN_MS), async {
            while self.gateway.db_manager().current_version().as_deref() != Some(version) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(result.is_ok(), "version {version} not applied");
        signals
    }

    pub async fn stop(self) {
        self.shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), self.server)
            .await
            .unwrap()
            .unwrap();
    }
}

pub fn signal(id: &str) -> Signal {
    Signal::new(id, format!("http://app/{id}"), "GET")
}

pub async fn start_gateway(
    ids: &[&str],
    configure: impl FnOnce(&mut GatewayConfig),
) -> TestGateway {
    let dir = tempfile::tempdir().unwrap();
    let mut config = GatewayConfig::default();
    config.storage.db_root_dir = dir.path().to_path_buf();
    config.server.listen_address = ([127, 0, 0, 1], 0).into();
    configure(&mut config);
    let config = config.validate().unwrap();

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let gateway = GatewayBuilder::init(config, shutdown_rx)
        .build()
        .unwrap()
        .ready()
        .unwrap();

    let sled_data = gateway.sled_data().unwrap();
    let signals = sled_data.signal_db(VERSION).unwrap();
    for id in ids {
        signals.put_signal(&signal(id)).unwrap();
    }
    gateway.apply_snapshot(VERSION).unwrap();
    wait_for_api_ready(&gateway).await;

    let (addr, server) = gateway.bind().unwrap();
    let server = tokio::spawn(server);

    TestGateway {
        addr,
        gateway,
        signals,
        shutdown_tx,
        server,
        _dir: dir,
    }
}

async fn wait_for_api_ready(gateway: &Gateway) {
    let retry_interval = Duration::from_millis(10);
    let result = tokio::time::timeout(Duration::from_millis(WAIT_FOR_API_READY_IN_MS), async {
        while !gateway.api().is_initialized() {
            tokio::time::sleep(retry_interval).await;
        }
    })
    .await;
    assert!(result.is_ok(), "API not initialized within {WAIT_FOR_API_READY_IN_MS}ms");
}

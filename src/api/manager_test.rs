use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use warp::http::StatusCode;

use super::*;
use crate::blobstore::MockBlobstoreClient;
use crate::distributor::WaitOutcome;
use crate::test_utils::FakeSource;
use crate::LongPollConfig;
use crate::ServerConfig;

fn build_api(source: Arc<FakeSource>) -> (Arc<ApiManager>, watch::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let api = Arc::new(ApiManager::new(
        ServerConfig::default(),
        LongPollConfig::default(),
        source,
        Arc::new(MockBlobstoreClient::new()),
        shutdown_rx,
    ));
    (api, shutdown_tx)
}

#[tokio::test]
async fn test_routes_are_not_found_before_init() {
    let (api, _shutdown_tx) = build_api(Arc::new(FakeSource::with_ids(&["0"])));
    let filter = routes(api.clone());

    for (method, path) in [("GET", "/tracesignals"), ("POST", "/uploadtrace"), ("POST", "/tracesignals")] {
        let response = warp::test::request().method(method).path(path).reply(&filter).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {path}");
    }
    assert!(!api.is_initialized());
}

#[tokio::test]
async fn test_routes_answer_after_init() {
    let (api, _shutdown_tx) = build_api(Arc::new(FakeSource::with_ids(&["0"])));
    api.init_api();

    let response = warp::test::request()
        .method("GET")
        .path("/tracesignals")
        .reply(&routes(api.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(api.is_initialized());
}

#[tokio::test]
async fn test_init_api_is_idempotent() {
    let source = Arc::new(FakeSource::with_ids(&["0"]));
    let (api, _shutdown_tx) = build_api(source.clone());

    api.init_api();
    api.init_api();
    api.init_api();

    let waiter = api.distributor().register();
    api.notify_change();

    assert!(matches!(
        waiter.wait(Duration::from_secs(5)).await,
        WaitOutcome::Delivered(_)
    ));
    // a single distributor loop fetches once per notify
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_notify_before_init_is_kept() {
    let source = Arc::new(FakeSource::with_ids(&["0"]));
    let (api, _shutdown_tx) = build_api(source.clone());

    let waiter = api.distributor().register();
    api.notify_change();
    api.init_api();

    assert!(matches!(
        waiter.wait(Duration::from_secs(5)).await,
        WaitOutcome::Delivered(_)
    ));
}

#[tokio::test]
async fn test_custom_paths_are_mounted() {
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let api = Arc::new(ApiManager::new(
        ServerConfig {
            signal_path: "signals".to_string(),
            upload_path: "upload".to_string(),
            ..Default::default()
        },
        LongPollConfig::default(),
        Arc::new(FakeSource::with_ids(&["0"])),
        Arc::new(MockBlobstoreClient::new()),
        shutdown_rx,
    ));
    api.init_api();
    let filter = routes(api);

    let response = warp::test::request().method("GET").path("/signals").reply(&filter).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = warp::test::request().method("GET").path("/tracesignals").reply(&filter).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    drop(shutdown_tx);
}

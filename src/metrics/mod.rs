use lazy_static::lazy_static;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing::warn;
use warp::Filter;
use warp::Rejection;
use warp::Reply;


lazy_static! {
    pub static ref SIGNAL_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("signal_requests_total", "Signal requests by outcome"),
        &["outcome"]
    )
    .expect("metric can not be created");

    pub static ref LONG_POLL_WAITERS: IntGauge = IntGauge::new(
        "long_poll_waiters",
        "Requests currently parked waiting for a change"
    )
    .expect("metric can not be created");

    pub static ref CHANGE_NOTIFICATIONS_TOTAL: IntCounter = IntCounter::new(
        "change_notifications_total",
        "Change notifications processed by the distributor"
    )
    .expect("metric can not be created");

    pub static ref FANOUT_DELIVERIES_TOTAL: IntCounter = IntCounter::new(
        "fanout_deliveries_total",
        "Signal sets handed to waiting requests"
    )
    .expect("metric can not be created");

    pub static ref TRACE_UPLOADS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("trace_uploads_total", "Relayed trace uploads by response status"),
        &["status"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

/// Outcome labels of `signal_requests_total`
pub mod outcome {
    pub const OK: &str = "ok";
    pub const NOT_MODIFIED: &str = "not_modified";
    pub const BAD_REQUEST: &str = "bad_request";
    pub const ERROR: &str = "error";
}

pub(crate) fn register_custom_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SIGNAL_REQUESTS_TOTAL.clone()),
        Box::new(LONG_POLL_WAITERS.clone()),
        Box::new(CHANGE_NOTIFICATIONS_TOTAL.clone()),
        Box::new(FANOUT_DELIVERIES_TOTAL.clone()),
        Box::new(TRACE_UPLOADS_TOTAL.clone()),
    ];
    for collector in collectors {
        if let Err(e) = registry.register(collector) {
            warn!("collector can not be registered: {:?}", e);
        }
    }
}

pub async fn start_server(
    port: u16,
    mut shutdown_signal: watch::Receiver<()>,
) {
    register_custom_metrics(&REGISTRY);

    let metrics_route = warp::path!("metrics").and_then(metrics_handler);

    match warp::serve(metrics_route).try_bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
        let _ = shutdown_signal.changed().await;
    }) {
        Ok((addr, server)) => {
            info!("Metrics server listening on {}", addr);
            server.await;
        }
        Err(e) => error!("Metrics server failed to bind port {}: {:?}", port, e),
    }
}

async fn metrics_handler() -> Result<impl Reply, Rejection> {
    Ok(gather_metrics(&REGISTRY))
}

/// Text exposition of `registry` followed by the default registry
pub fn gather_metrics(registry: &Registry) -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut res = String::new();
    for families in [registry.gather(), prometheus::gather()] {
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&families, &mut buffer) {
            error!("could not encode metrics: {}", e);
            continue;
        }
        match String::from_utf8(buffer) {
            Ok(v) => res.push_str(&v),
            Err(e) => error!("metrics could not be from_utf8'd: {}", e),
        }
    }
    res
}

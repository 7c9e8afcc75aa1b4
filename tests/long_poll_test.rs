mod commons;

use std::time::Duration;
use std::time::Instant;

use commons::signal;
use commons::start_gateway;
use reqwest::StatusCode;
use trace_gateway::api::ErrorResponse;
use trace_gateway::signal::SignalSet;
use trace_gateway::ResponseMode;

const ALL: [&str; 5] = ["0", "1", "2", "3", "4"];

async fn get(
    url: &str,
    if_none_match: Option<&str>,
) -> reqwest::Response {
    let mut request = reqwest::Client::new().get(url);
    if let Some(value) = if_none_match {
        request = request.header("If-None-Match", value);
    }
    request.send().await.unwrap()
}

fn sorted_ids(set: &SignalSet) -> Vec<String> {
    let mut ids: Vec<String> = set.signals.iter().map(|s| s.id.clone()).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_without_known_ids_returns_full_set() {
    let gateway = start_gateway(&ALL, |_| {}).await;
    let started = Instant::now();

    let response = get(&gateway.url("/tracesignals?block=10"), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let set: SignalSet = response.json().await.unwrap();
    assert_eq!(sorted_ids(&set), ALL);
    assert!(set.error.is_none());
    assert!(started.elapsed() < Duration::from_secs(1));

    gateway.stop().await;
}

#[tokio::test]
async fn test_client_missing_a_signal_gets_full_set() {
    let gateway = start_gateway(&ALL, |_| {}).await;

    let response = get(&gateway.url("/tracesignals?block=10"), Some("0, 1, 2, 3")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let set: SignalSet = response.json().await.unwrap();
    assert_eq!(set.signals.len(), 5);

    gateway.stop().await;
}

#[tokio::test]
async fn test_client_holding_revoked_signals_gets_current_set() {
    let gateway = start_gateway(&["0", "1"], |_| {}).await;

    let response = get(&gateway.url("/tracesignals?block=10"), Some("0,1,2")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let set: SignalSet = response.json().await.unwrap();
    assert_eq!(sorted_ids(&set), vec!["0", "1"]);

    gateway.stop().await;
}

#[tokio::test]
async fn test_partial_view_gets_full_set_or_delta() {
    let gateway = start_gateway(&ALL, |_| {}).await;
    let response = get(&gateway.url("/tracesignals"), Some("2,3,4")).await;
    let set: SignalSet = response.json().await.unwrap();
    assert_eq!(set.signals.len(), 5);
    gateway.stop().await;

    let gateway = start_gateway(&ALL, |config| config.long_poll.response_mode = ResponseMode::Delta).await;
    let response = get(&gateway.url("/tracesignals"), Some("2,3,4")).await;
    let set: SignalSet = response.json().await.unwrap();
    assert_eq!(sorted_ids(&set), vec!["0", "1"]);
    gateway.stop().await;
}

#[tokio::test]
async fn test_exact_match_without_block_is_not_modified() {
    let gateway = start_gateway(&ALL, |_| {}).await;

    let response = get(&gateway.url("/tracesignals"), Some("0,1,2,3,4")).await;

    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    gateway.stop().await;
}

#[tokio::test]
async fn test_bad_block_is_bad_request() {
    let gateway = start_gateway(&ALL, |_| {}).await;

    let response = get(&gateway.url("/tracesignals?block=abc"), Some("0,1,2,3,4")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.error_code, 1);
    gateway.stop().await;
}

#[tokio::test]
async fn test_block_without_change_times_out() {
    let gateway = start_gateway(&ALL, |_| {}).await;
    let started = Instant::now();

    let response = get(&gateway.url("/tracesignals?block=2"), Some("0,1,2,3,4")).await;

    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert!(started.elapsed() < Duration::from_millis(3500));
    gateway.stop().await;
}

#[tokio::test]
async fn test_insert_while_blocked_answers_early() {
    let gateway = start_gateway(&ALL, |_| {}).await;
    let url = gateway.url("/tracesignals?block=2");
    let started = Instant::now();

    let request = tokio::spawn(async move { get(&url, Some("0,1,2,3,4")).await });
    tokio::time::sleep(Duration::from_secs(1)).await;
    gateway.insert("5");

    let response = request.await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set: SignalSet = response.json().await.unwrap();
    assert_eq!(set.signals.len(), 6);
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(started.elapsed() < Duration::from_secs(2));
    gateway.stop().await;
}

#[tokio::test]
async fn test_delete_while_blocked_answers_early() {
    let gateway = start_gateway(&ALL, |_| {}).await;
    let url = gateway.url("/tracesignals?block=5");

    let request = tokio::spawn(async move { get(&url, Some("0,1,2,3,4")).await });
    tokio::time::sleep(Duration::from_millis(500)).await;
    gateway.delete("4");

    let response = request.await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set: SignalSet = response.json().await.unwrap();
    assert_eq!(sorted_ids(&set), vec!["0", "1", "2", "3"]);
    gateway.stop().await;
}

#[tokio::test]
async fn test_one_insert_wakes_all_blocked_clients() {
    let gateway = start_gateway(&["0"], |_| {}).await;

    let mut requests = Vec::new();
    for _ in 0..10 {
        let url = gateway.url("/tracesignals?block=10");
        requests.push(tokio::spawn(async move { get(&url, Some("0")).await }));
    }
    tokio::time::sleep(Duration::from_millis(500)).await;
    gateway.insert("1");

    for request in requests {
        let response = tokio::time::timeout(Duration::from_secs(5), request)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set: SignalSet = response.json().await.unwrap();
        assert_eq!(sorted_ids(&set), vec!["0", "1"]);
    }
    gateway.stop().await;
}

#[tokio::test]
async fn test_insert_into_switched_version_answers_early() {
    let gateway = start_gateway(&ALL, |_| {}).await;
    let v2 = gateway.switch_version("v2", &["a"]).await;
    let url = gateway.url("/tracesignals?block=5");
    let started = Instant::now();

    let request = tokio::spawn(async move { get(&url, Some("a")).await });
    tokio::time::sleep(Duration::from_millis(500)).await;
    v2.put_signal(&signal("b")).unwrap();

    let response = request.await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set: SignalSet = response.json().await.unwrap();
    assert_eq!(sorted_ids(&set), vec!["a", "b"]);
    assert!(started.elapsed() < Duration::from_secs(2));
    gateway.stop().await;
}

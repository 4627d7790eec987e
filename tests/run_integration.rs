//! End-to-end runs of the orchestrator against a mock Kraken API
//!
//! These drive the real REST client, signing, retry policy and Discord
//! notifier; only the remote endpoints are simulated.

mod common;

use common::{eth_and_btc, mount_online, responses, run_config};
use kraken_dca::{
    ExecutionStatus, KrakenRestClient, NotificationDispatcher, RunOrchestrator, RunSummary,
    Strategy,
};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_tickers(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/0/public/Ticker"))
        .and(query_param("pair", "ETHEUR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses::ticker("XETHZEUR", "2500.00000")))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/0/public/Ticker"))
        .and(query_param("pair", "XBTEUR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses::ticker("XXBTZEUR", "50000.00000")))
        .mount(server)
        .await;
}

async fn mount_balance(server: &MockServer, eur: &str) {
    Mock::given(method("POST"))
        .and(path("/0/private/BalanceEx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses::balance(eur, "0")))
        .mount(server)
        .await;
}

async fn run(server: &MockServer, dry_run: bool, strategies: Vec<Strategy>) -> RunSummary {
    run_with_webhook(server, dry_run, strategies, None).await
}

async fn run_with_webhook(
    server: &MockServer,
    dry_run: bool,
    strategies: Vec<Strategy>,
    webhook: Option<String>,
) -> RunSummary {
    let mut config = run_config(&server.uri(), dry_run, strategies);
    config.notification_target = webhook;

    let exchange = KrakenRestClient::from_run_config(&config).unwrap();
    let dispatcher = NotificationDispatcher::from_run_config(&config).unwrap();
    let mut orchestrator = RunOrchestrator::new(exchange, dispatcher, config);
    orchestrator.run().await
}

#[test_log::test(tokio::test)]
async fn test_dry_run_simulates_every_strategy() {
    let server = MockServer::start().await;
    mount_online(&server).await;
    mount_tickers(&server).await;
    mount_balance(&server, "1000").await;
    Mock::given(method("POST"))
        .and(path("/0/private/AddOrder"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let summary = run(&server, true, eth_and_btc()).await;

    assert!(summary.dry_run);
    assert_eq!(
        summary.statuses(),
        vec![ExecutionStatus::Simulated, ExecutionStatus::Simulated]
    );
    assert_eq!(summary.results[0].volume, Some(dec!(0.01000000)));
    assert_eq!(summary.results[1].volume, Some(dec!(0.00100000)));
    assert!(!summary.has_failures());
}

#[test_log::test(tokio::test)]
async fn test_rejection_does_not_stop_the_batch() {
    let server = MockServer::start().await;
    mount_online(&server).await;
    mount_tickers(&server).await;
    mount_balance(&server, "1000").await;
    Mock::given(method("POST"))
        .and(path("/0/private/AddOrder"))
        .and(body_string_contains("pair=ETHEUR"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(responses::error("EOrder:Order minimum not met")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/0/private/AddOrder"))
        .and(body_string_contains("pair=XBTEUR"))
        .and(body_string_contains("volume=0.00100000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses::add_order(
            "OXBT01-AAAAA-BBBBBB",
            "buy 0.00100000 XBTEUR @ market",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let summary = run(&server, false, eth_and_btc()).await;

    assert_eq!(
        summary.statuses(),
        vec![ExecutionStatus::Rejected, ExecutionStatus::Filled]
    );
    assert!(summary.results[0].detail.contains("Order minimum not met"));
    assert_eq!(summary.results[1].txids, vec!["OXBT01-AAAAA-BBBBBB"]);
    assert!(summary.has_failures());
}

#[test_log::test(tokio::test)]
async fn test_transient_order_failures_are_retried() {
    let server = MockServer::start().await;
    mount_online(&server).await;
    mount_tickers(&server).await;
    mount_balance(&server, "1000").await;
    Mock::given(method("POST"))
        .and(path("/0/private/AddOrder"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/0/private/AddOrder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses::add_order(
            "OETH01-AAAAA-BBBBBB",
            "buy 0.01000000 ETHEUR @ market",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let summary = run(&server, false, vec![Strategy::new("ETH/EUR", dec!(25))]).await;

    assert_eq!(summary.statuses(), vec![ExecutionStatus::Filled]);
    assert!(summary.results[0].detail.contains("after 3 attempts"));

    let order_nonces: Vec<u64> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/0/private/AddOrder")
        .map(|r| common::nonce_of(&r.body))
        .collect();
    assert_eq!(order_nonces.len(), 3);
    assert!(
        order_nonces.windows(2).all(|w| w[1] > w[0]),
        "each retry must be signed with a fresh nonce: {:?}",
        order_nonces
    );
}

#[test_log::test(tokio::test)]
async fn test_funds_shortfall_is_reported_before_strategies() {
    let server = MockServer::start().await;
    mount_online(&server).await;
    mount_tickers(&server).await;
    mount_balance(&server, "30").await;

    let hook = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(204))
        .expect(5)
        .mount(&hook)
        .await;

    let summary =
        run_with_webhook(&server, true, eth_and_btc(), Some(format!("{}/hook", hook.uri()))).await;

    assert_eq!(
        summary.statuses(),
        vec![ExecutionStatus::Simulated, ExecutionStatus::InsufficientFunds]
    );

    let requests = hook.received_requests().await.unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(payload["embeds"][0]["title"], "Insufficient EUR Balance");
}

#[test_log::test(tokio::test)]
async fn test_insufficient_funds_skips_order() {
    let server = MockServer::start().await;
    mount_online(&server).await;
    mount_tickers(&server).await;
    mount_balance(&server, "30").await;
    Mock::given(method("POST"))
        .and(path("/0/private/AddOrder"))
        .and(body_string_contains("pair=ETHEUR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses::add_order(
            "OETH01-AAAAA-BBBBBB",
            "buy 0.01000000 ETHEUR @ market",
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/0/private/AddOrder"))
        .and(body_string_contains("pair=XBTEUR"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let summary = run(&server, false, eth_and_btc()).await;

    assert_eq!(
        summary.statuses(),
        vec![ExecutionStatus::Filled, ExecutionStatus::InsufficientFunds]
    );
    assert_eq!(summary.results[1].volume, None);
    assert!(!summary.has_failures());
}

#[test_log::test(tokio::test)]
async fn test_invalid_key_skips_remaining_strategies() {
    let server = MockServer::start().await;
    mount_online(&server).await;
    mount_tickers(&server).await;
    Mock::given(method("POST"))
        .and(path("/0/private/BalanceEx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses::error("EAPI:Invalid key")))
        // pre-run funds check + first strategy
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/0/private/AddOrder"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let summary = run(&server, false, eth_and_btc()).await;

    assert_eq!(summary.results.len(), 2);
    assert_eq!(
        summary.statuses(),
        vec![ExecutionStatus::Error, ExecutionStatus::Error]
    );
    assert!(summary.results[0].detail.contains("Invalid key"));
    assert!(summary.results[1].detail.starts_with("skipped:"));
}

#[test_log::test(tokio::test)]
async fn test_maintenance_halts_live_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/0/public/SystemStatus"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(responses::system_status("maintenance")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/0/public/Ticker"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let summary = run(&server, false, eth_and_btc()).await;

    assert_eq!(
        summary.statuses(),
        vec![ExecutionStatus::Error, ExecutionStatus::Error]
    );
    assert!(summary
        .results
        .iter()
        .all(|r| r.detail.starts_with("skipped:") && r.detail.contains("maintenance")));
}

#[test_log::test(tokio::test)]
async fn test_every_step_is_notified() {
    let server = MockServer::start().await;
    mount_online(&server).await;
    mount_tickers(&server).await;
    mount_balance(&server, "1000").await;

    let hook = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(204))
        .expect(4)
        .mount(&hook)
        .await;

    let summary =
        run_with_webhook(&server, true, eth_and_btc(), Some(format!("{}/hook", hook.uri()))).await;

    assert_eq!(summary.results.len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_failing_webhook_does_not_change_outcome() {
    let server = MockServer::start().await;
    mount_online(&server).await;
    mount_tickers(&server).await;
    mount_balance(&server, "1000").await;

    let hook = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&hook)
        .await;

    let summary =
        run_with_webhook(&server, true, eth_and_btc(), Some(format!("{}/hook", hook.uri()))).await;

    assert_eq!(
        summary.statuses(),
        vec![ExecutionStatus::Simulated, ExecutionStatus::Simulated]
    );
    assert!(!summary.has_failures());
}

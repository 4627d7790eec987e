//! Common test utilities and fixtures
#![allow(dead_code)]

use kraken_dca::config::types::{ApiCredentials, ExecutionSettings, RunConfig};
use kraken_dca::{KrakenRestClient, Strategy};
use rust_decimal_macros::dec;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// base64("secret-key")
pub const TEST_SECRET: &str = "c2VjcmV0LWtleQ==";
pub const TEST_API_KEY: &str = "test-api-key";

/// Run configuration pointing at a mock server, without retry delays
pub fn run_config(base_url: &str, dry_run: bool, strategies: Vec<Strategy>) -> RunConfig {
    RunConfig {
        credentials: ApiCredentials::new(TEST_API_KEY.to_string(), TEST_SECRET.to_string()),
        base_url: base_url.to_string(),
        dry_run,
        quote_currency: "EUR".to_string(),
        strategies,
        notification_target: None,
        execution: ExecutionSettings {
            request_timeout_seconds: 5,
            backoff_base_ms: 0,
            backoff_max_ms: 0,
            notification_timeout_seconds: 1,
            ..ExecutionSettings::default()
        },
    }
}

pub fn eth_and_btc() -> Vec<Strategy> {
    vec![
        Strategy::new("ETH/EUR", dec!(25)),
        Strategy::new("XBT/EUR", dec!(50)),
    ]
}

/// Authenticated client against a mock server
pub fn client(server: &MockServer) -> KrakenRestClient {
    KrakenRestClient::with_timeout(&server.uri(), Duration::from_secs(5))
        .expect("Failed to create REST client")
        .with_credentials(ApiCredentials::new(
            TEST_API_KEY.to_string(),
            TEST_SECRET.to_string(),
        ))
}

/// Nonce of a signed form-encoded request body
pub fn nonce_of(body: &[u8]) -> u64 {
    let body = std::str::from_utf8(body).expect("request body is not UTF-8");
    body.split('&')
        .find_map(|kv| kv.strip_prefix("nonce="))
        .expect("request body has no nonce")
        .parse()
        .expect("nonce is not an integer")
}

/// Mount an `online` SystemStatus response
pub async fn mount_online(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/0/public/SystemStatus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses::system_status("online")))
        .mount(server)
        .await;
}

/// Sample Kraken API responses
pub mod responses {
    use serde_json::{json, Value};

    pub fn ticker(result_key: &str, ask: &str) -> Value {
        json!({
            "error": [],
            "result": {
                result_key: {
                    "a": [ask, "1", "1.000"],
                    "b": ["1.0", "1", "1.000"],
                    "c": [ask, "0.1"]
                }
            }
        })
    }

    pub fn balance(eur: &str, hold: &str) -> Value {
        json!({
            "error": [],
            "result": {
                "ZEUR": {"balance": eur, "hold_trade": hold},
                "XXBT": {"balance": "0.5000000000", "hold_trade": "0.0000000000"}
            }
        })
    }

    pub fn add_order(txid: &str, description: &str) -> Value {
        json!({
            "error": [],
            "result": {
                "descr": {"order": description},
                "txid": [txid]
            }
        })
    }

    pub fn error(message: &str) -> Value {
        json!({"error": [message]})
    }

    pub fn system_status(status: &str) -> Value {
        json!({
            "error": [],
            "result": {"status": status, "timestamp": "2024-01-01T00:00:00Z"}
        })
    }
}

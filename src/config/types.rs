//! Configuration types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::common::errors::{DcaError, Result};
use crate::common::types::Strategy;
use crate::engine::volume::MAX_ORDER_VOLUME;

/// Main application configuration, as read from `config.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Kraken API access
    pub api: ApiConfig,
    /// Recurring buy settings
    #[serde(default)]
    pub dca: DcaConfig,
    /// Log sinks and notification webhook
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Timeouts, retry and deadline settings
    #[serde(default)]
    pub execution: ExecutionSettings,
}

/// Kraken API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key sent in the `API-Key` header
    #[serde(default)]
    pub key: Option<String>,
    /// Base64 encoded private key used for signing
    #[serde(default)]
    pub secret: Option<String>,
    /// Base URL for the REST API
    #[serde(default = "default_kraken_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            secret: None,
            base_url: default_kraken_base_url(),
        }
    }
}

pub(crate) fn default_kraken_base_url() -> String {
    "https://api.kraken.com".to_string()
}

/// Recurring buy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcaConfig {
    /// Simulate orders instead of placing them
    #[serde(default)]
    pub dry_run: bool,
    /// Quote currency for pairs not written as `BASE/QUOTE`
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,
    /// Buys to execute, in order
    #[serde(default)]
    pub strategies: Vec<Strategy>,
}

impl Default for DcaConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            quote_currency: default_quote_currency(),
            strategies: Vec::new(),
        }
    }
}

fn default_quote_currency() -> String {
    "EUR".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path, empty to log to the console only
    #[serde(default = "default_log_file")]
    pub file: String,
    /// Discord webhook URL, empty to disable notifications
    #[serde(default)]
    pub discord_webhook: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
            discord_webhook: String::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "kraken_dca.log".to_string()
}

/// Network and retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// Per-request timeout for exchange calls in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Attempts for retryable failures, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First retry delay in milliseconds, doubled on each retry
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,
    /// Upper bound for a single retry delay in milliseconds
    #[serde(default = "default_backoff_max")]
    pub backoff_max_ms: u64,
    /// Timeout for a single notification delivery in seconds
    #[serde(default = "default_notification_timeout")]
    pub notification_timeout_seconds: u64,
    /// Total run deadline in seconds (checked between strategies)
    #[serde(default)]
    pub run_deadline_seconds: Option<u64>,
    /// Largest volume a single order may have, in base-asset units
    #[serde(default = "default_max_order_volume")]
    pub max_order_volume: Decimal,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_request_timeout(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base(),
            backoff_max_ms: default_backoff_max(),
            notification_timeout_seconds: default_notification_timeout(),
            run_deadline_seconds: None,
            max_order_volume: default_max_order_volume(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base() -> u64 {
    1000
}

fn default_backoff_max() -> u64 {
    10_000
}

fn default_notification_timeout() -> u64 {
    15
}

fn default_max_order_volume() -> Decimal {
    MAX_ORDER_VOLUME
}

impl ExecutionSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_seconds)
    }

    pub fn run_deadline(&self) -> Option<Duration> {
        self.run_deadline_seconds.map(Duration::from_secs)
    }
}

/// API credentials for authenticated requests
#[derive(Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiCredentials {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Everything one run needs, fully formed before the run starts
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub credentials: ApiCredentials,
    pub base_url: String,
    pub dry_run: bool,
    pub quote_currency: String,
    pub strategies: Vec<Strategy>,
    /// Discord webhook URL, `None` disables notifications
    pub notification_target: Option<String>,
    pub execution: ExecutionSettings,
}

impl RunConfig {
    /// Quote currency of a strategy, falling back to the configured default
    pub fn quote_currency_for<'a>(&'a self, strategy: &'a Strategy) -> &'a str {
        strategy
            .quote_currency()
            .unwrap_or(self.quote_currency.as_str())
    }

    /// Total fiat required per quote currency, in first-seen order
    pub fn required_by_currency(&self) -> Vec<(String, Decimal)> {
        let mut totals: Vec<(String, Decimal)> = Vec::new();
        for strategy in &self.strategies {
            let currency = self.quote_currency_for(strategy);
            match totals.iter_mut().find(|(c, _)| c == currency) {
                Some((_, total)) => *total += strategy.amount_fiat,
                None => totals.push((currency.to_string(), strategy.amount_fiat)),
            }
        }
        totals
    }
}

impl AppConfig {
    /// Build the typed run configuration, checking credentials are present
    pub fn into_run_config(self) -> Result<RunConfig> {
        let api_key = self
            .api
            .key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DcaError::Configuration("api.key is not set".to_string()))?;
        let api_secret = self
            .api
            .secret
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| DcaError::Configuration("api.secret is not set".to_string()))?;

        let webhook = self.logging.discord_webhook.trim();
        let notification_target = if webhook.is_empty() {
            None
        } else {
            Some(webhook.to_string())
        };

        if self.execution.max_order_volume <= Decimal::ZERO {
            return Err(DcaError::Configuration(
                "execution.max_order_volume must be positive".to_string(),
            ));
        }
        if self.execution.max_attempts == 0 {
            return Err(DcaError::Configuration(
                "execution.max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(RunConfig {
            credentials: ApiCredentials::new(api_key, api_secret),
            base_url: self.api.base_url,
            dry_run: self.dca.dry_run,
            quote_currency: self.dca.quote_currency,
            strategies: self.dca.strategies,
            notification_target,
            execution: self.execution,
        })
    }
}

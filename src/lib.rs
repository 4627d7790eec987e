//! KrakenDca Library
//!
//! Executes a batch of configured "buy a fixed fiat amount of an asset"
//! strategies against Kraken: live price lookup, balance validation,
//! volume calculation, order placement (or dry-run simulation) and
//! best-effort notifications.

pub mod common;
pub mod config;
pub mod engine;
pub mod kraken;
pub mod notify;

// Re-export commonly used types
pub use common::errors::{DcaError, Result};
pub use common::traits::ExchangeApi;
pub use common::types::{
    BalanceSnapshot, ExecutionResult, ExecutionStatus, OrderConfirmation, OrderIntent, PriceQuote,
    RunStats, RunSummary, Strategy, SystemStatus,
};
pub use config::types::{AppConfig, RunConfig};
pub use engine::{compute_volume, RunOrchestrator};
pub use kraken::KrakenRestClient;
pub use notify::{DiscordNotifier, Notification, NotificationDispatcher, Notifier};

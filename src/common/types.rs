//! Domain types shared by the exchange client, the engine and notifications

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A configured recurring buy: spend `amount_fiat` of the quote currency on `pair`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// Trading pair in `BASE/QUOTE` form, e.g. `ETH/EUR`
    pub pair: String,
    /// Quote-currency sum to spend per execution
    #[serde(alias = "amount_eur")]
    pub amount_fiat: Decimal,
}

impl Strategy {
    pub fn new(pair: impl Into<String>, amount_fiat: Decimal) -> Self {
        Self {
            pair: pair.into(),
            amount_fiat,
        }
    }

    /// Quote currency parsed from the pair, if it is written as `BASE/QUOTE`
    pub fn quote_currency(&self) -> Option<&str> {
        self.pair
            .split_once('/')
            .map(|(_, quote)| quote.trim())
            .filter(|quote| !quote.is_empty())
    }
}

/// Current best ask for a pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub pair: String,
    pub ask_price: Decimal,
    pub fetched_at: DateTime<Utc>,
}

/// Available (not held by open orders) balance of one currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub currency: String,
    pub available: Decimal,
}

/// Order side; only buys are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type; only market orders are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
        }
    }
}

/// An order ready for the executor. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub pair: String,
    /// Base asset volume, at most 8 decimal places
    pub volume: Decimal,
    pub side: Side,
    pub order_type: OrderType,
    /// Dry run: the order endpoint is never contacted
    pub simulated: bool,
}

impl OrderIntent {
    pub fn market_buy(pair: impl Into<String>, volume: Decimal, simulated: bool) -> Self {
        Self {
            pair: pair.into(),
            volume,
            side: Side::Buy,
            order_type: OrderType::Market,
            simulated,
        }
    }
}

/// Exchange acknowledgement of a placed order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Transaction ids assigned by the exchange
    pub txids: Vec<String>,
    /// Human-readable order description echoed by the exchange
    pub description: String,
}

/// Exchange trading status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemStatus {
    Online,
    Maintenance,
    CancelOnly,
    PostOnly,
    Unknown(String),
}

impl SystemStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "online" => SystemStatus::Online,
            "maintenance" => SystemStatus::Maintenance,
            "cancel_only" => SystemStatus::CancelOnly,
            "post_only" => SystemStatus::PostOnly,
            other => SystemStatus::Unknown(other.to_string()),
        }
    }

    /// Whether market orders can be placed
    pub fn accepts_market_orders(&self) -> bool {
        matches!(self, SystemStatus::Online)
    }
}

impl std::fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SystemStatus::Online => write!(f, "online"),
            SystemStatus::Maintenance => write!(f, "maintenance"),
            SystemStatus::CancelOnly => write!(f, "cancel_only"),
            SystemStatus::PostOnly => write!(f, "post_only"),
            SystemStatus::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Terminal outcome of one strategy execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Filled,
    Simulated,
    InsufficientFunds,
    Rejected,
    Error,
}

impl ExecutionStatus {
    /// `error` and `rejected` make the run fail; insufficient funds does not
    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionStatus::Rejected | ExecutionStatus::Error)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Filled => write!(f, "filled"),
            ExecutionStatus::Simulated => write!(f, "simulated"),
            ExecutionStatus::InsufficientFunds => write!(f, "insufficient_funds"),
            ExecutionStatus::Rejected => write!(f, "rejected"),
            ExecutionStatus::Error => write!(f, "error"),
        }
    }
}

/// Result of executing one strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub pair: String,
    pub amount_fiat: Decimal,
    /// Computed volume, absent when execution stopped before the calculation
    pub volume: Option<Decimal>,
    /// Ask price used, absent when no quote was obtained
    pub price: Option<Decimal>,
    pub status: ExecutionStatus,
    /// Human-readable explanation of the outcome
    pub detail: String,
    /// Exchange transaction ids for filled orders
    #[serde(default)]
    pub txids: Vec<String>,
}

impl ExecutionResult {
    /// Result without volume or price; add them with `with_price`/`with_volume`
    pub fn new(strategy: &Strategy, status: ExecutionStatus, detail: impl Into<String>) -> Self {
        Self {
            pair: strategy.pair.clone(),
            amount_fiat: strategy.amount_fiat,
            volume: None,
            price: None,
            status,
            detail: detail.into(),
            txids: Vec::new(),
        }
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_volume(mut self, volume: Decimal) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// Per-status counts of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total: usize,
    pub filled: usize,
    pub simulated: usize,
    pub insufficient_funds: usize,
    pub rejected: usize,
    pub errors: usize,
}

/// Ordered results of one run, one entry per configured strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<ExecutionResult>,
}

impl RunSummary {
    /// True when any strategy ended `error` or `rejected`
    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| r.status.is_failure())
    }

    pub fn stats(&self) -> RunStats {
        let mut stats = RunStats {
            total: self.results.len(),
            ..RunStats::default()
        };
        for result in &self.results {
            match result.status {
                ExecutionStatus::Filled => stats.filled += 1,
                ExecutionStatus::Simulated => stats.simulated += 1,
                ExecutionStatus::InsufficientFunds => stats.insufficient_funds += 1,
                ExecutionStatus::Rejected => stats.rejected += 1,
                ExecutionStatus::Error => stats.errors += 1,
            }
        }
        stats
    }

    pub fn statuses(&self) -> Vec<ExecutionStatus> {
        self.results.iter().map(|r| r.status).collect()
    }
}

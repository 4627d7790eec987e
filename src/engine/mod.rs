//! Execution engine for recurring fixed-fiat buys
//!
//! # Architecture
//!
//! ```text
//! RunOrchestrator (per strategy, strictly in order)
//!     │
//!     ├── PriceOracle       fresh ask price
//!     ├── BalanceValidator  available quote balance >= amount
//!     ├── compute_volume    floor(amount / ask, 8 dp)
//!     ├── OrderExecutor     simulate, or place with bounded retries
//!     └── NotificationDispatcher (best effort)
//!     │
//!     ▼
//! RunSummary (one ExecutionResult per strategy)
//! ```

pub mod backoff;
pub mod balance;
pub mod executor;
pub mod orchestrator;
pub mod price_oracle;
pub mod volume;

pub use backoff::{ExponentialBackoff, RetryPolicy};
pub use balance::{BalanceCheck, BalanceValidator};
pub use executor::{OrderExecutor, OrderOutcome};
pub use orchestrator::RunOrchestrator;
pub use price_oracle::PriceOracle;
pub use volume::{compute_volume, compute_volume_capped};

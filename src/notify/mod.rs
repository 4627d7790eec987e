//! Notification module - best-effort run and strategy messages
//!
//! Notifications are a side channel: a failed delivery is logged and
//! dropped, and never changes the run summary.

mod dispatcher;
pub mod discord;
pub mod format;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::common::errors::Result;
use crate::common::types::{ExecutionResult, RunStats};

pub use discord::DiscordNotifier;
pub use dispatcher::NotificationDispatcher;

/// A message about the run or one strategy's outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    RunStarted { strategy_count: usize, dry_run: bool },
    /// The run's total requirement in `currency` exceeds the available balance
    FundsShortfall {
        currency: String,
        required: Decimal,
        available: Decimal,
    },
    StrategyResult(ExecutionResult),
    RunCompleted { stats: RunStats, dry_run: bool },
}

/// An external channel notifications are delivered to
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification, a single attempt
    async fn send(&self, notification: &Notification) -> Result<()>;

    /// Channel name for logging
    fn channel_name(&self) -> &'static str;
}

/// Boxed notifier for dynamic dispatch
pub type BoxedNotifier = Box<dyn Notifier>;

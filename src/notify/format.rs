//! Human-readable rendering of notifications

use rust_decimal::Decimal;

use super::Notification;
use crate::common::types::{ExecutionResult, ExecutionStatus, RunStats};

impl Notification {
    /// Short headline for the message
    pub fn title(&self) -> String {
        match self {
            Notification::RunStarted { dry_run: true, .. } => "DCA Run Started (dry run)".to_string(),
            Notification::RunStarted { .. } => "DCA Run Started".to_string(),
            Notification::FundsShortfall { currency, .. } => {
                format!("Insufficient {} Balance", currency)
            }
            Notification::StrategyResult(result) => match result.status {
                ExecutionStatus::Filled => "Order Successfully Placed".to_string(),
                ExecutionStatus::Simulated => "Dry Run Executed".to_string(),
                ExecutionStatus::InsufficientFunds => "Insufficient Balance".to_string(),
                ExecutionStatus::Rejected => "Order Rejected".to_string(),
                ExecutionStatus::Error => "Execution Error".to_string(),
            },
            Notification::RunCompleted { stats, .. } if stats.rejected + stats.errors > 0 => {
                "DCA Run Completed With Failures".to_string()
            }
            Notification::RunCompleted { .. } => "DCA Run Completed".to_string(),
        }
    }

    /// Single-line plain-text rendering, also used for logging
    pub fn text(&self) -> String {
        match self {
            Notification::RunStarted {
                strategy_count,
                dry_run,
            } => format!(
                "Starting DCA execution with {} strategies{}",
                strategy_count,
                if *dry_run { " (dry run)" } else { "" }
            ),
            Notification::FundsShortfall {
                currency,
                required,
                available,
            } => format!(
                "Run requires {} {} but only {} is available",
                format_amount(*required),
                currency,
                format_amount(*available)
            ),
            Notification::StrategyResult(result) => result_line(result),
            Notification::RunCompleted { stats, .. } => stats_line(stats),
        }
    }
}

/// `STATUS | pair | amount | price | volume | detail`
pub fn result_line(result: &ExecutionResult) -> String {
    let mut line = format!(
        "{} | {} | amount={}",
        result.status.to_string().to_uppercase(),
        result.pair,
        result.amount_fiat
    );
    if let Some(price) = result.price {
        line.push_str(&format!(" | price={}", format_price(price)));
    }
    if let Some(volume) = result.volume {
        line.push_str(&format!(" | volume={}", format_volume(volume)));
    }
    if !result.txids.is_empty() {
        line.push_str(&format!(" | txid={}", result.txids.join(",")));
    }
    line.push_str(&format!(" | {}", result.detail));
    line
}

pub fn stats_line(stats: &RunStats) -> String {
    format!(
        "{} strategies processed: {} filled, {} simulated, {} insufficient funds, {} rejected, {} errors",
        stats.total,
        stats.filled,
        stats.simulated,
        stats.insufficient_funds,
        stats.rejected,
        stats.errors
    )
}

pub fn format_price(price: Decimal) -> String {
    format!("{:.4}", price)
}

pub fn format_volume(volume: Decimal) -> String {
    format!("{:.8}", volume)
}

pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

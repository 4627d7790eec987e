//! Order placement and dry-run simulation

use tracing::{error, info, warn};

use super::backoff::RetryPolicy;
use crate::common::errors::DcaError;
use crate::common::traits::ExchangeApi;
use crate::common::types::{OrderConfirmation, OrderIntent};

/// Tagged result of executing one order intent
#[derive(Debug)]
pub enum OrderOutcome {
    /// Order accepted by the exchange
    Filled {
        confirmation: OrderConfirmation,
        attempts: u32,
    },
    /// Dry run: nothing was sent
    Simulated,
    /// The exchange refused the order; never retried
    Rejected { reason: String },
    /// Retryable failures used up every attempt, or a non-retryable
    /// non-rejection fault occurred
    Exhausted { attempts: u32, last_error: DcaError },
    /// Credentials rejected; the rest of the run cannot succeed
    AuthFailed { reason: String },
}

/// Executes order intents against an exchange
///
/// `start → simulated` when the intent is simulated, otherwise
/// `start → filled | rejected | exhausted | auth_failed` with bounded
/// retries for transient failures.
#[derive(Debug, Clone, Default)]
pub struct OrderExecutor {
    retry: RetryPolicy,
}

impl OrderExecutor {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    pub async fn execute<E: ExchangeApi + ?Sized>(
        &self,
        exchange: &mut E,
        intent: &OrderIntent,
    ) -> OrderOutcome {
        if intent.simulated {
            info!(
                "DRY-RUN | {} | {} {} volume={}",
                intent.pair,
                intent.side,
                intent.order_type.as_str(),
                intent.volume
            );
            return OrderOutcome::Simulated;
        }

        let mut backoff = self.retry.backoff();
        let mut attempt = 1;
        loop {
            match exchange.place_market_buy(&intent.pair, intent.volume).await {
                Ok(confirmation) => {
                    info!(
                        "Order placed for {} volume={} txid={:?} (attempt {})",
                        intent.pair, intent.volume, confirmation.txids, attempt
                    );
                    return OrderOutcome::Filled {
                        confirmation,
                        attempts: attempt,
                    };
                }
                Err(DcaError::ExchangeRejection(reason)) => {
                    error!("Order for {} rejected: {}", intent.pair, reason);
                    return OrderOutcome::Rejected { reason };
                }
                Err(DcaError::Auth(reason)) => {
                    error!("Order for {} failed authentication: {}", intent.pair, reason);
                    return OrderOutcome::AuthFailed { reason };
                }
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = backoff.next_delay();
                    warn!(
                        "Order for {} failed (attempt {}/{}), retrying in {:?}: {}",
                        intent.pair, attempt, self.retry.max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        "Order for {} failed after {} attempt(s): {}",
                        intent.pair, attempt, e
                    );
                    return OrderOutcome::Exhausted {
                        attempts: attempt,
                        last_error: e,
                    };
                }
            }
        }
    }
}

//! Fresh ask-price lookups

use tracing::{debug, warn};

use super::backoff::RetryPolicy;
use crate::common::errors::Result;
use crate::common::traits::ExchangeApi;
use crate::common::types::PriceQuote;

/// Fetches the current ask price for a pair. Quotes are never cached: every
/// strategy gets its own lookup.
#[derive(Debug, Clone, Default)]
pub struct PriceOracle {
    retry: RetryPolicy,
}

impl PriceOracle {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Best ask as of call time, retrying retryable market data failures
    pub async fn current_ask<E: ExchangeApi + ?Sized>(
        &self,
        exchange: &E,
        pair: &str,
    ) -> Result<PriceQuote> {
        let mut backoff = self.retry.backoff();
        let mut attempt = 1;
        loop {
            match exchange.get_ask_price(pair).await {
                Ok(quote) => {
                    debug!("Ask for {} is {} (attempt {})", pair, quote.ask_price, attempt);
                    return Ok(quote);
                }
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = backoff.next_delay();
                    warn!(
                        "Price lookup for {} failed (attempt {}/{}), retrying in {:?}: {}",
                        pair, attempt, self.retry.max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

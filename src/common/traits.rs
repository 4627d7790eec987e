//! Trait definitions for exchange clients

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::errors::Result;
use super::types::{BalanceSnapshot, OrderConfirmation, PriceQuote, SystemStatus};

/// Operations the execution engine needs from an exchange
///
/// Authenticated calls take `&mut self`: every signed request consumes a
/// nonce owned by the client, and exclusive access keeps nonces strictly
/// increasing without any shared counter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Best ask for a pair as of call time
    ///
    /// Fails with `DcaError::MarketData` for unknown pairs or an unreachable
    /// ticker endpoint.
    async fn get_ask_price(&self, pair: &str) -> Result<PriceQuote>;

    /// Available balance of a currency (signed request)
    ///
    /// Fails with `DcaError::Auth` on bad credentials and
    /// `DcaError::Transient` on network/5xx failures.
    async fn get_available_balance(&mut self, currency: &str) -> Result<BalanceSnapshot>;

    /// Submit a market buy (signed request)
    ///
    /// Fails with `DcaError::ExchangeRejection` when the order itself is
    /// invalid or unfillable, distinct from retryable `DcaError::Transient`.
    async fn place_market_buy(&mut self, pair: &str, volume: Decimal) -> Result<OrderConfirmation>;

    /// Current trading status of the exchange
    async fn system_status(&self) -> Result<SystemStatus>;

    /// Get the name of the exchange
    fn exchange_name(&self) -> &'static str;
}

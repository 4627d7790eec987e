//! Available-funds validation

use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::common::errors::Result;
use crate::common::traits::ExchangeApi;
use crate::common::types::BalanceSnapshot;

/// Outcome of a balance check. Insufficient funds is a normal outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceCheck {
    pub sufficient: bool,
    pub required: Decimal,
    pub snapshot: BalanceSnapshot,
}

impl BalanceCheck {
    /// Human-readable explanation of the check
    pub fn detail(&self) -> String {
        if self.sufficient {
            format!(
                "{} {} available, {} required",
                self.snapshot.available, self.snapshot.currency, self.required
            )
        } else {
            format!(
                "insufficient {} balance: {} available, {} required",
                self.snapshot.currency, self.snapshot.available, self.required
            )
        }
    }
}

/// Checks the account can cover a strategy's fiat amount
///
/// The balance is fetched fresh for every check, since orders placed
/// earlier in the same run reduce it. Dry runs perform the same check.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceValidator;

impl BalanceValidator {
    pub fn new() -> Self {
        Self
    }

    /// Compare the available `currency` balance against `required`
    ///
    /// Only transport and authentication failures are errors.
    #[instrument(skip(self, exchange))]
    pub async fn check<E: ExchangeApi + ?Sized>(
        &self,
        exchange: &mut E,
        currency: &str,
        required: Decimal,
    ) -> Result<BalanceCheck> {
        let snapshot = exchange.get_available_balance(currency).await?;
        let check = BalanceCheck {
            sufficient: snapshot.available >= required,
            required,
            snapshot,
        };
        info!("Balance check: {}", check.detail());
        Ok(check)
    }
}

//! Sequential driver of a DCA run

use chrono::Utc;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use super::backoff::RetryPolicy;
use super::balance::BalanceValidator;
use super::executor::{OrderExecutor, OrderOutcome};
use super::price_oracle::PriceOracle;
use super::volume::compute_volume_capped;
use crate::common::errors::DcaError;
use crate::common::traits::ExchangeApi;
use crate::common::types::{
    ExecutionResult, ExecutionStatus, OrderIntent, RunSummary, Strategy,
};
use crate::config::types::RunConfig;
use crate::notify::format::result_line;
use crate::notify::{Notification, NotificationDispatcher};

/// How one strategy ended, from the run's point of view
enum StrategyRun {
    Completed(ExecutionResult),
    /// Result for this strategy plus the reason every remaining one is skipped
    Systemic(ExecutionResult, String),
}

/// Runs every configured strategy once, strictly in order
///
/// Per strategy: fetch price, validate balance, compute volume, execute
/// the order, notify, record. A strategy's failure never stops the batch
/// except for authentication failures, after which the remaining
/// strategies are recorded as skipped. The summary always holds exactly
/// one result per configured strategy, in configuration order.
pub struct RunOrchestrator<E: ExchangeApi> {
    exchange: E,
    dispatcher: NotificationDispatcher,
    config: RunConfig,
    oracle: PriceOracle,
    validator: BalanceValidator,
    executor: OrderExecutor,
}

impl<E: ExchangeApi> RunOrchestrator<E> {
    pub fn new(exchange: E, dispatcher: NotificationDispatcher, config: RunConfig) -> Self {
        let retry = RetryPolicy::from_settings(&config.execution);
        Self {
            exchange,
            dispatcher,
            oracle: PriceOracle::new(retry.clone()),
            validator: BalanceValidator::new(),
            executor: OrderExecutor::new(retry),
            config,
        }
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run with the configured deadline, if any
    pub async fn run(&mut self) -> RunSummary {
        let deadline = self
            .config
            .execution
            .run_deadline()
            .map(|d| Instant::now() + d);
        self.run_with_deadline(deadline).await
    }

    /// Run all strategies; `deadline` is checked between strategies
    #[instrument(skip(self), fields(dry_run = self.config.dry_run, strategies = self.config.strategies.len()))]
    pub async fn run_with_deadline(&mut self, deadline: Option<Instant>) -> RunSummary {
        let started_at = Utc::now();
        let dry_run = self.config.dry_run;
        let strategies = self.config.strategies.clone();

        info!(
            "Starting run with {} strategies on {} (dry_run={})",
            strategies.len(),
            self.exchange.exchange_name(),
            dry_run
        );
        self.dispatcher
            .dispatch(&Notification::RunStarted {
                strategy_count: strategies.len(),
                dry_run,
            })
            .await;

        let mut halted = self.check_exchange_status().await;
        if halted.is_none() {
            self.check_run_funds().await;
        }
        let mut results = Vec::with_capacity(strategies.len());

        for strategy in &strategies {
            if halted.is_none() && deadline.is_some_and(|d| Instant::now() >= d) {
                warn!("Run deadline exceeded, skipping remaining strategies");
                halted = Some("run deadline exceeded".to_string());
            }

            let result = match &halted {
                Some(reason) => ExecutionResult::new(
                    strategy,
                    ExecutionStatus::Error,
                    format!("skipped: {}", reason),
                ),
                None => match self.execute_strategy(strategy).await {
                    StrategyRun::Completed(result) => result,
                    StrategyRun::Systemic(result, reason) => {
                        warn!("Aborting remaining strategies: {}", reason);
                        halted = Some(reason);
                        result
                    }
                },
            };

            if result.status.is_failure() {
                warn!("{}", result_line(&result));
            } else {
                info!("{}", result_line(&result));
            }

            self.dispatcher
                .dispatch(&Notification::StrategyResult(result.clone()))
                .await;
            results.push(result);
        }

        let summary = RunSummary {
            dry_run,
            started_at,
            finished_at: Utc::now(),
            results,
        };

        self.dispatcher
            .dispatch(&Notification::RunCompleted {
                stats: summary.stats(),
                dry_run,
            })
            .await;
        info!("Run completed");

        summary
    }

    /// Reason to skip every strategy, if the exchange is not accepting orders
    async fn check_exchange_status(&self) -> Option<String> {
        let name = self.exchange.exchange_name();
        match self.exchange.system_status().await {
            Ok(status) if status.accepts_market_orders() => {
                info!("{} system status: {}", name, status);
                None
            }
            Ok(status) if self.config.dry_run => {
                warn!(
                    "{} system status is {}; continuing because this is a dry run",
                    name, status
                );
                None
            }
            Ok(status) => Some(format!(
                "{} system status is {}, market orders are not accepted",
                name, status
            )),
            Err(e) => {
                warn!("Could not fetch {} system status: {}", name, e);
                None
            }
        }
    }

    /// Compare the run's total requirement per quote currency with the
    /// available balance. Only warns and notifies; the per-strategy balance
    /// checks decide what is bought.
    async fn check_run_funds(&mut self) {
        for (currency, required) in self.config.required_by_currency() {
            info!("Run requires {} {} in total", required, currency);

            match self
                .validator
                .check(&mut self.exchange, &currency, required)
                .await
            {
                Ok(check) if check.sufficient => {}
                Ok(check) => {
                    warn!("Pre-trade funds check: {}", check.detail());
                    self.dispatcher
                        .dispatch(&Notification::FundsShortfall {
                            currency: currency.clone(),
                            required,
                            available: check.snapshot.available,
                        })
                        .await;
                }
                Err(e) => warn!("Pre-trade funds check for {} failed: {}", currency, e),
            }
        }
    }

    async fn execute_strategy(&mut self, strategy: &Strategy) -> StrategyRun {
        info!(
            "Processing strategy pair={} amount={}",
            strategy.pair, strategy.amount_fiat
        );

        let quote = match self.oracle.current_ask(&self.exchange, &strategy.pair).await {
            Ok(quote) => quote,
            Err(e) => return fault(ExecutionResult::new(strategy, ExecutionStatus::Error, ""), e),
        };
        let price = quote.ask_price;

        let currency = self.config.quote_currency_for(strategy).to_string();
        match self
            .validator
            .check(&mut self.exchange, &currency, strategy.amount_fiat)
            .await
        {
            Ok(check) if !check.sufficient => {
                return StrategyRun::Completed(
                    ExecutionResult::new(
                        strategy,
                        ExecutionStatus::InsufficientFunds,
                        check.detail(),
                    )
                    .with_price(price),
                );
            }
            Ok(_) => {}
            Err(e) => {
                return fault(
                    ExecutionResult::new(strategy, ExecutionStatus::Error, "").with_price(price),
                    e,
                )
            }
        }

        let max_volume = self.config.execution.max_order_volume;
        let volume = match compute_volume_capped(strategy.amount_fiat, price, max_volume) {
            Ok(volume) => volume,
            Err(e) => {
                return fault(
                    ExecutionResult::new(strategy, ExecutionStatus::Error, "").with_price(price),
                    e,
                )
            }
        };
        info!(
            "Calculated volume {} at price {} for pair {}",
            volume, price, strategy.pair
        );

        let intent = OrderIntent::market_buy(&strategy.pair, volume, self.config.dry_run);
        let base = ExecutionResult::new(strategy, ExecutionStatus::Error, "")
            .with_price(price)
            .with_volume(volume);

        match self.executor.execute(&mut self.exchange, &intent).await {
            OrderOutcome::Simulated => StrategyRun::Completed(ExecutionResult {
                status: ExecutionStatus::Simulated,
                detail: format!(
                    "dry run: would buy {} {} at ask {}",
                    volume, strategy.pair, price
                ),
                ..base
            }),
            OrderOutcome::Filled {
                confirmation,
                attempts,
            } => StrategyRun::Completed(ExecutionResult {
                status: ExecutionStatus::Filled,
                detail: if attempts > 1 {
                    format!(
                        "order placed after {} attempts: {}",
                        attempts, confirmation.description
                    )
                } else {
                    format!("order placed: {}", confirmation.description)
                },
                txids: confirmation.txids,
                ..base
            }),
            OrderOutcome::Rejected { reason } => StrategyRun::Completed(ExecutionResult {
                status: ExecutionStatus::Rejected,
                detail: format!("order rejected: {}", reason),
                ..base
            }),
            OrderOutcome::Exhausted {
                attempts,
                last_error,
            } => StrategyRun::Completed(ExecutionResult {
                detail: format!("order failed after {} attempt(s): {}", attempts, last_error),
                ..base
            }),
            OrderOutcome::AuthFailed { reason } => {
                let detail = format!("authentication failed: {}", reason);
                StrategyRun::Systemic(
                    ExecutionResult {
                        detail: detail.clone(),
                        ..base
                    },
                    detail,
                )
            }
        }
    }
}

/// Record `error` as the strategy's `error` result; auth errors halt the run
fn fault(result: ExecutionResult, error: DcaError) -> StrategyRun {
    let detail = error.to_string();
    let result = ExecutionResult { detail, ..result };
    if error.is_systemic() {
        let reason = result.detail.clone();
        StrategyRun::Systemic(result, reason)
    } else {
        StrategyRun::Completed(result)
    }
}

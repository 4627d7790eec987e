//! REST API client for Kraken

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use super::auth::{sign_request, NonceGenerator};
use super::errors::{
    classify_private_errors, classify_private_status, classify_ticker_errors, classify_transport,
};
use super::messages::*;
use crate::common::errors::{DcaError, Result};
use crate::common::traits::ExchangeApi;
use crate::common::types::{
    BalanceSnapshot, OrderConfirmation, OrderType, PriceQuote, Side, SystemStatus,
};
use crate::config::types::{ApiCredentials, RunConfig};

const TICKER_PATH: &str = "/0/public/Ticker";
const SYSTEM_STATUS_PATH: &str = "/0/public/SystemStatus";
const BALANCE_PATH: &str = "/0/private/BalanceEx";
const ADD_ORDER_PATH: &str = "/0/private/AddOrder";

/// REST API client for Kraken
///
/// Owns the nonce counter used for signing; the only process-wide mutable
/// state of a run.
#[derive(Debug, Clone)]
pub struct KrakenRestClient {
    /// HTTP client
    client: Client,
    /// Base URL, e.g. `https://api.kraken.com`
    base_url: String,
    /// API credentials for private endpoints
    credentials: Option<ApiCredentials>,
    /// Nonce source for private endpoints
    nonce: NonceGenerator,
}

impl KrakenRestClient {
    /// Create a new REST client (unauthenticated)
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DcaError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            nonce: NonceGenerator::new(),
        })
    }

    /// Set API credentials for authenticated requests
    pub fn with_credentials(mut self, credentials: ApiCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Build an authenticated client from a run configuration
    pub fn from_run_config(config: &RunConfig) -> Result<Self> {
        Ok(
            Self::with_timeout(&config.base_url, config.execution.request_timeout())?
                .with_credentials(config.credentials.clone()),
        )
    }

    /// Last nonce used for a signed request
    pub fn last_nonce(&self) -> u64 {
        self.nonce.last()
    }

    /// Kraken REST endpoints take the pair without the `/` separator
    fn rest_pair(pair: &str) -> String {
        pair.replace('/', "")
    }

    // ========================================================================
    // Public Endpoints (No Authentication Required)
    // ========================================================================

    async fn public_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<KrakenResponse<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_private_status(status, &body));
        }

        let text = response.text().await.map_err(|e| classify_transport(&e))?;
        Ok(serde_json::from_str(&text)?)
    }

    // ========================================================================
    // Private Endpoints (Signed)
    // ========================================================================

    async fn private_post<T: DeserializeOwned>(
        &mut self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| DcaError::Auth("no API credentials configured".to_string()))?;

        let nonce = self.nonce.next_nonce();
        // The serializer is not Sync and must not live across an await
        let body = {
            let mut form = url::form_urlencoded::Serializer::new(String::new());
            form.append_pair("nonce", &nonce.to_string());
            for (key, value) in params {
                form.append_pair(key, value);
            }
            form.finish()
        };
        let signature = sign_request(&credentials.api_secret, path, nonce, &body)?;

        let url = format!("{}{}", self.base_url, path);
        debug!("POST {} (nonce={})", url, nonce);

        let response = self
            .client
            .post(&url)
            .header("API-Key", &credentials.api_key)
            .header("API-Sign", signature)
            .header(
                CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=utf-8",
            )
            .body(body)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_private_status(status, &body));
        }

        let text = response.text().await.map_err(|e| classify_transport(&e))?;
        let envelope: KrakenResponse<T> = serde_json::from_str(&text)?;
        if !envelope.error.is_empty() {
            return Err(classify_private_errors(&envelope.error));
        }
        envelope
            .result
            .ok_or_else(|| DcaError::InvalidResponse(format!("{} returned no result", path)))
    }
}

#[async_trait]
impl ExchangeApi for KrakenRestClient {
    #[instrument(skip(self))]
    async fn get_ask_price(&self, pair: &str) -> Result<PriceQuote> {
        let rest_pair = Self::rest_pair(pair);
        let market_data = |message: String, retryable: bool| DcaError::MarketData {
            pair: pair.to_string(),
            message,
            retryable,
        };

        let response: KrakenResponse<TickerResponse> = self
            .public_get(TICKER_PATH, &[("pair", rest_pair.as_str())])
            .await
            .map_err(|e| {
                let retryable = e.is_retryable();
                market_data(e.to_string(), retryable)
            })?;

        if !response.error.is_empty() {
            return Err(classify_ticker_errors(pair, &response.error));
        }

        let tickers = response.result.unwrap_or_default();
        // Kraken keys the result by its canonical name (XETHZEUR for ETHEUR)
        let ticker = tickers
            .get(&rest_pair)
            .or_else(|| tickers.values().next())
            .ok_or_else(|| market_data("ticker response has no entry".to_string(), false))?;

        let ask_price: Decimal = ticker
            .ask
            .first()
            .ok_or_else(|| market_data("ticker has no ask".to_string(), false))?
            .parse()
            .map_err(|e| market_data(format!("Invalid ask price: {}", e), false))?;

        if ask_price <= Decimal::ZERO {
            return Err(market_data(format!("non-positive ask price {}", ask_price), false));
        }

        Ok(PriceQuote {
            pair: pair.to_string(),
            ask_price,
            fetched_at: chrono::Utc::now(),
        })
    }

    #[instrument(skip(self))]
    async fn get_available_balance(&mut self, currency: &str) -> Result<BalanceSnapshot> {
        let balances: BalanceExResponse = self.private_post(BALANCE_PATH, &[]).await?;

        // Fiat balances use legacy Z-prefixed codes (ZEUR), crypto X-prefixed
        let candidates = [
            currency.to_string(),
            format!("Z{}", currency),
            format!("X{}", currency),
        ];
        let entry = candidates.iter().find_map(|code| balances.get(code));

        let available = match entry {
            Some(entry) => {
                let balance: Decimal = entry.balance.parse().map_err(|e| {
                    DcaError::InvalidResponse(format!("Invalid balance for {}: {}", currency, e))
                })?;
                let hold: Decimal = match &entry.hold_trade {
                    Some(hold) => hold.parse().map_err(|e| {
                        DcaError::InvalidResponse(format!("Invalid hold for {}: {}", currency, e))
                    })?,
                    None => Decimal::ZERO,
                };
                (balance - hold).max(Decimal::ZERO)
            }
            None => {
                debug!("No balance entry for {}, treating as zero", currency);
                Decimal::ZERO
            }
        };

        Ok(BalanceSnapshot {
            currency: currency.to_string(),
            available,
        })
    }

    #[instrument(skip(self))]
    async fn place_market_buy(&mut self, pair: &str, volume: Decimal) -> Result<OrderConfirmation> {
        let params = [
            ("ordertype", OrderType::Market.as_str().to_string()),
            ("type", Side::Buy.as_str().to_string()),
            ("volume", volume.to_string()),
            ("pair", Self::rest_pair(pair)),
        ];

        let result: AddOrderResult = self.private_post(ADD_ORDER_PATH, &params).await?;

        Ok(OrderConfirmation {
            txids: result.txid,
            description: result.descr.order,
        })
    }

    #[instrument(skip(self))]
    async fn system_status(&self) -> Result<SystemStatus> {
        let response: KrakenResponse<SystemStatusResult> =
            self.public_get(SYSTEM_STATUS_PATH, &[]).await?;

        if !response.error.is_empty() {
            return Err(DcaError::Transient(response.error.join(", ")));
        }

        response
            .result
            .map(|r| SystemStatus::parse(&r.status))
            .ok_or_else(|| DcaError::InvalidResponse("SystemStatus returned no result".to_string()))
    }

    fn exchange_name(&self) -> &'static str {
        "Kraken"
    }
}

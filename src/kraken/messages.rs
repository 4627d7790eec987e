//! Kraken REST response types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Envelope shared by every Kraken REST response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KrakenResponse<T> {
    /// Error strings such as `EOrder:Insufficient funds`
    #[serde(default)]
    pub error: Vec<String>,
    /// Payload, absent when `error` is non-empty
    #[serde(default = "Option::default")]
    pub result: Option<T>,
}

/// Ticker information for one pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerInfo {
    /// Ask `[price, whole lot volume, lot volume]`
    #[serde(rename = "a")]
    pub ask: Vec<String>,
    /// Bid `[price, whole lot volume, lot volume]`
    #[serde(rename = "b", default)]
    pub bid: Vec<String>,
}

/// Ticker results keyed by the exchange's canonical pair name
pub type TickerResponse = HashMap<String, TickerInfo>;

/// Extended balance of one asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendedBalance {
    pub balance: String,
    /// Amount reserved by open orders
    #[serde(default)]
    pub hold_trade: Option<String>,
}

/// Extended balances keyed by asset code (`ZEUR`, `XXBT`, ...)
pub type BalanceExResponse = HashMap<String, ExtendedBalance>;

/// Order description returned by AddOrder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDescription {
    #[serde(default)]
    pub order: String,
}

/// AddOrder result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOrderResult {
    pub descr: OrderDescription,
    #[serde(default)]
    pub txid: Vec<String>,
}

/// SystemStatus result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatusResult {
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticker() {
        let json = r#"{
            "error": [],
            "result": {
                "XETHZEUR": {
                    "a": ["2500.10000", "3", "3.000"],
                    "b": ["2499.90000", "1", "1.000"],
                    "c": ["2500.00000", "0.1"]
                }
            }
        }"#;

        let response: KrakenResponse<TickerResponse> = serde_json::from_str(json).unwrap();
        assert!(response.error.is_empty());
        let ticker = response.result.unwrap();
        assert_eq!(ticker["XETHZEUR"].ask[0], "2500.10000");
    }

    #[test]
    fn test_parse_error_without_result() {
        let json = r#"{"error": ["EQuery:Unknown asset pair"]}"#;
        let response: KrakenResponse<TickerResponse> = serde_json::from_str(json).unwrap();
        assert_eq!(response.error, vec!["EQuery:Unknown asset pair"]);
        assert!(response.result.is_none());
    }

    #[test]
    fn test_parse_add_order() {
        let json = r#"{
            "error": [],
            "result": {
                "descr": {"order": "buy 0.01000000 ETHEUR @ market"},
                "txid": ["OUF4EM-FRGI2-MQMWZD"]
            }
        }"#;
        let response: KrakenResponse<AddOrderResult> = serde_json::from_str(json).unwrap();
        let result = response.result.unwrap();
        assert_eq!(result.txid, vec!["OUF4EM-FRGI2-MQMWZD"]);
        assert_eq!(result.descr.order, "buy 0.01000000 ETHEUR @ market");
    }
}

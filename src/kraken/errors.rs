//! Mapping of Kraken error strings and HTTP failures onto `DcaError`

use reqwest::StatusCode;

use crate::common::errors::DcaError;

/// Classify the `error` array of a private endpoint response
///
/// Kraken errors are `<severity><category>:<message>` strings. Credential and
/// nonce problems are systemic, throttling and service outages are retryable,
/// and everything else refers to the request itself.
pub fn classify_private_errors(errors: &[String]) -> DcaError {
    let joined = errors.join(", ");

    if errors.iter().any(|e| is_auth_error(e)) {
        return DcaError::Auth(joined);
    }
    if errors.iter().any(|e| is_transient_error(e)) {
        return DcaError::Transient(joined);
    }
    DcaError::ExchangeRejection(joined)
}

/// Classify the `error` array of the public ticker endpoint
pub fn classify_ticker_errors(pair: &str, errors: &[String]) -> DcaError {
    DcaError::MarketData {
        pair: pair.to_string(),
        message: errors.join(", "),
        retryable: errors.iter().any(|e| is_transient_error(e)),
    }
}

/// Classify a non-success HTTP status from a private endpoint
pub fn classify_private_status(status: StatusCode, body: &str) -> DcaError {
    let message = format!("Server returned status {}: {}", status, truncate(body, 200));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DcaError::Auth(message),
        s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
            DcaError::Transient(message)
        }
        _ => DcaError::InvalidResponse(message),
    }
}

/// Classify a transport-level failure (connect, timeout, body read)
pub fn classify_transport(err: &reqwest::Error) -> DcaError {
    if err.is_decode() {
        DcaError::InvalidResponse(err.to_string())
    } else {
        DcaError::Transient(err.to_string())
    }
}

fn is_auth_error(error: &str) -> bool {
    error.starts_with("EAPI:Invalid key")
        || error.starts_with("EAPI:Invalid signature")
        || error.starts_with("EAPI:Invalid nonce")
        || error.starts_with("EGeneral:Permission denied")
}

fn is_transient_error(error: &str) -> bool {
    error.starts_with("EService:")
        || error.contains("Rate limit exceeded")
        || error.starts_with("EGeneral:Temporary lockout")
        || error.starts_with("EGeneral:Internal error")
        || error.starts_with("EAPI:Too many requests")
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errs(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_auth_errors() {
        for e in ["EAPI:Invalid key", "EAPI:Invalid signature", "EAPI:Invalid nonce"] {
            assert!(matches!(classify_private_errors(&errs(&[e])), DcaError::Auth(_)), "{}", e);
        }
    }

    #[test]
    fn test_transient_errors() {
        for e in [
            "EService:Unavailable",
            "EService:Busy",
            "EAPI:Rate limit exceeded",
            "EOrder:Rate limit exceeded",
            "EGeneral:Temporary lockout",
        ] {
            assert!(
                matches!(classify_private_errors(&errs(&[e])), DcaError::Transient(_)),
                "{}",
                e
            );
        }
    }

    #[test]
    fn test_order_errors_are_rejections() {
        for e in [
            "EOrder:Order minimum not met",
            "EOrder:Insufficient funds",
            "EQuery:Unknown asset pair",
            "EGeneral:Invalid arguments:volume",
        ] {
            assert!(
                matches!(
                    classify_private_errors(&errs(&[e])),
                    DcaError::ExchangeRejection(_)
                ),
                "{}",
                e
            );
        }
    }

    #[test]
    fn test_ticker_errors() {
        let err = classify_ticker_errors("FOO/EUR", &errs(&["EQuery:Unknown asset pair"]));
        assert!(!err.is_retryable());
        let err = classify_ticker_errors("ETH/EUR", &errs(&["EService:Unavailable"]));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_http_status() {
        assert!(matches!(
            classify_private_status(StatusCode::SERVICE_UNAVAILABLE, ""),
            DcaError::Transient(_)
        ));
        assert!(matches!(
            classify_private_status(StatusCode::TOO_MANY_REQUESTS, ""),
            DcaError::Transient(_)
        ));
        assert!(matches!(
            classify_private_status(StatusCode::FORBIDDEN, ""),
            DcaError::Auth(_)
        ));
        assert!(matches!(
            classify_private_status(StatusCode::NOT_FOUND, ""),
            DcaError::InvalidResponse(_)
        ));
    }
}

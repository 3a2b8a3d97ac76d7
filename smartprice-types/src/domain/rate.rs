//! Exchange rate values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A base→target conversion rate: `amount_in_target = amount_in_base * rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    #[schema(example = "USD")]
    pub base: String,
    #[schema(example = "EUR")]
    pub target: String,
    #[schema(example = 0.92)]
    pub rate: f64,
    /// When the rate was retrieved.
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub as_of: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn new(base: impl Into<String>, target: impl Into<String>, rate: f64) -> Self {
        Self {
            base: base.into(),
            target: target.into(),
            rate,
            as_of: Utc::now(),
        }
    }

    /// The 1:1 rate used for same-currency pairs and failed lookups.
    pub fn identity(base: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(base, target, 1.0)
    }
}

/// Best-effort rate lookup result: a usable rate plus an advisory error.
///
/// When `error` is set, `rate.rate` is exactly 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
    #[serde(flatten)]
    pub rate: ExchangeRate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RateQuote {
    pub fn ok(rate: ExchangeRate) -> Self {
        Self { rate, error: None }
    }

    /// Identity rate with the failure recorded.
    pub fn failed(base: &str, target: &str, error: impl Into<String>) -> Self {
        Self {
            rate: ExchangeRate::identity(base, target),
            error: Some(error.into()),
        }
    }

    pub fn value(&self) -> f64 {
        self.rate.rate
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_quote_is_identity() {
        let quote = RateQuote::failed("USD", "EUR", "HTTP 503");
        assert_eq!(quote.value(), 1.0);
        assert!(quote.is_error());
        assert_eq!(quote.rate.target, "EUR");
    }

    #[test]
    fn test_quote_serializes_flat() {
        let quote = RateQuote::ok(ExchangeRate::new("USD", "INR", 83.0));
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["rate"], 83.0);
        assert_eq!(json["base"], "USD");
        assert!(json.get("asOf").is_some());
        assert!(json.get("error").is_none());
    }
}

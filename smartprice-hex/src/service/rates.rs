//! Exchange Rate Provider
//!
//! Wraps a [`RateSource`] with the fail-safe contract: same-currency pairs
//! are 1 without a network call, and any failure yields the identity rate
//! plus an advisory error instead of a wrong (or missing) conversion.

use std::time::Duration;

use smartprice_types::{ExchangeRate, ProviderError, RateQuote, RateSource};

use super::{DEFAULT_PROVIDER_TIMEOUT, bounded};

pub struct ExchangeRateProvider<S: RateSource> {
    source: S,
    timeout: Duration,
}

impl<S: RateSource> ExchangeRateProvider<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Overrides the per-call provider timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a reference to the underlying rate source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Looks up the base→target rate. Never fails.
    #[tracing::instrument(skip(self))]
    pub async fn get_rate(&self, base: &str, target: &str) -> RateQuote {
        let base = base.trim().to_uppercase();
        let target = target.trim().to_uppercase();

        if base == target {
            return RateQuote::ok(ExchangeRate::identity(base, target));
        }

        let result = bounded(self.timeout, self.source.fetch_rate(&base, &target))
            .await
            .and_then(|rate| {
                if rate.is_finite() && rate > 0.0 {
                    Ok(rate)
                } else {
                    Err(ProviderError::Malformed(format!("invalid rate {}", rate)))
                }
            });

        match result {
            Ok(rate) => {
                tracing::debug!(rate, "fetched exchange rate");
                RateQuote::ok(ExchangeRate::new(base, target, rate))
            }
            Err(err) => {
                tracing::warn!(error = %err, "exchange rate lookup failed, using identity rate");
                RateQuote::failed(&base, &target, err.to_string())
            }
        }
    }

    /// Numeric rate only; `1.0` on failure.
    pub async fn get_exchange_rate(&self, base: &str, target: &str) -> f64 {
        self.get_rate(base, target).await.value()
    }
}

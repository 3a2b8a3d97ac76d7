//! Exchange rate source port.

use crate::error::ProviderError;

/// Port for an upstream exchange rate service.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync + 'static {
    /// Returns how many units of `target` one unit of `base` buys.
    async fn fetch_rate(&self, base: &str, target: &str) -> Result<f64, ProviderError>;
}

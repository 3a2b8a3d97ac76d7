//! Application services.
//!
//! Orchestrate domain operations through the provider ports.
//! Contain NO infrastructure logic - HTTP clients are injected.

pub mod adapter;
pub mod loader;
pub mod location;
pub mod rates;

use std::future::Future;
use std::time::Duration;

use smartprice_types::ProviderError;

pub use adapter::{Phase, SmartPrice, SmartPriceConfig, SmartPriceSnapshot};
pub use loader::{LoaderSnapshot, ScriptLoader};
pub use location::{LocationResolver, ResolveOptions};
pub use rates::ExchangeRateProvider;

/// Upper bound on any single provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(8);

/// Runs a provider call, turning an elapsed deadline into [`ProviderError::Timeout`].
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(limit)),
    }
}

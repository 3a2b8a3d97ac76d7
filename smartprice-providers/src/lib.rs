//! # SmartPrice Providers
//!
//! Concrete provider implementations (adapters) for localized pricing.
//! This crate provides HTTP adapters that implement the geolocation and
//! rate ports from `smartprice-types`:
//!
//! - [`IpApiProvider`] - IP geolocation (ipapi.co)
//! - [`NominatimGeocoder`] - reverse geocoding (OpenStreetMap Nominatim)
//! - [`ErApiRateSource`] - exchange rates (open.er-api.com)
//! - [`CachedRateSource`] - TTL cache for any rate source
//! - [`StaticPermission`] - fixed permission outcome for non-browser hosts
//! - [`HttpScriptSource`] - third-party script availability for the script loader

use std::time::Duration;

pub mod cache;
pub mod er_api;
pub mod http;
pub mod ipapi;
pub mod nominatim;
pub mod permission;
pub mod script;

pub use cache::{CachedRateSource, DEFAULT_RATE_CACHE_CAPACITY};
pub use er_api::ErApiRateSource;
pub use http::DEFAULT_USER_AGENT;
pub use ipapi::IpApiProvider;
pub use nominatim::NominatimGeocoder;
pub use permission::StaticPermission;
pub use script::HttpScriptSource;

/// Endpoints and limits for the upstream providers.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub ipgeo_url: String,
    pub reverse_geocode_url: String,
    pub exchange_rate_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub rate_cache_ttl: Duration,
    pub rate_error_ttl: Duration,
    /// Maximum number of cached currency pairs.
    pub rate_cache_capacity: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            ipgeo_url: "https://ipapi.co".into(),
            reverse_geocode_url: "https://nominatim.openstreetmap.org".into(),
            exchange_rate_url: "https://open.er-api.com/v6".into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            timeout: Duration::from_secs(8),
            rate_cache_ttl: Duration::from_secs(3600),
            rate_error_ttl: Duration::from_secs(300),
            rate_cache_capacity: DEFAULT_RATE_CACHE_CAPACITY,
        }
    }
}

/// The production provider set.
pub struct Providers {
    pub ip: IpApiProvider,
    pub geocoder: NominatimGeocoder,
    pub rates: CachedRateSource<ErApiRateSource>,
}

/// Build the HTTP providers from configuration.
///
/// # Examples
///
/// ```ignore
/// let providers = build_providers(&ProviderConfig::default())?;
/// let resolver = LocationResolver::new(providers.ip, providers.geocoder);
/// ```
pub fn build_providers(config: &ProviderConfig) -> anyhow::Result<Providers> {
    let ip = IpApiProvider::new(&config.ipgeo_url, config.timeout, &config.user_agent)?;
    let geocoder = NominatimGeocoder::new(
        &config.reverse_geocode_url,
        config.timeout,
        &config.user_agent,
    )?;
    let rates = CachedRateSource::with_capacity(
        ErApiRateSource::new(&config.exchange_rate_url, config.timeout, &config.user_agent)?,
        config.rate_cache_ttl,
        config.rate_error_ttl,
        config.rate_cache_capacity,
    );

    tracing::debug!(
        ipgeo = %config.ipgeo_url,
        geocoder = %config.reverse_geocode_url,
        rates = %config.exchange_rate_url,
        "providers configured"
    );

    Ok(Providers {
        ip,
        geocoder,
        rates,
    })
}

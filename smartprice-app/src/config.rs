//! Configuration loading from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use smartprice_providers::{DEFAULT_USER_AGENT, ProviderConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub base_currency: String,
    pub rate_limit_per_minute: u32,
    /// Rate-limit by `X-Forwarded-For` rather than the TCP peer.
    pub trust_proxy_headers: bool,
    pub providers: ProviderConfig,
    /// OTLP collector; tracing export is disabled when unset.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let string = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let parsed = |key: &str, default: &str| -> anyhow::Result<u64> {
            parse(key, &string(key, default))
        };

        let port = parse("PORT", &string("PORT", "3000"))?;
        let rate_limit_per_minute = parse(
            "RATE_LIMIT_PER_MINUTE",
            &string("RATE_LIMIT_PER_MINUTE", "100"),
        )?;
        if rate_limit_per_minute == 0 {
            anyhow::bail!("RATE_LIMIT_PER_MINUTE must be at least 1");
        }

        let providers = ProviderConfig {
            ipgeo_url: string("IPGEO_URL", "https://ipapi.co"),
            reverse_geocode_url: string(
                "REVERSE_GEOCODE_URL",
                "https://nominatim.openstreetmap.org",
            ),
            exchange_rate_url: string("EXCHANGE_RATE_URL", "https://open.er-api.com/v6"),
            user_agent: string("GEOCODER_USER_AGENT", DEFAULT_USER_AGENT),
            timeout: Duration::from_secs(parsed("PROVIDER_TIMEOUT_SECS", "8")?),
            rate_cache_ttl: Duration::from_secs(parsed("RATE_CACHE_TTL_SECS", "3600")?),
            rate_error_ttl: Duration::from_secs(parsed("RATE_ERROR_TTL_SECS", "300")?),
            rate_cache_capacity: parsed("RATE_CACHE_CAPACITY", "10000")?,
        };

        Ok(Self {
            port,
            base_currency: string("BASE_CURRENCY", "USD").to_uppercase(),
            rate_limit_per_minute,
            trust_proxy_headers: parse("TRUST_PROXY_HEADERS", &string("TRUST_PROXY_HEADERS", "false"))?,
            providers,
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty()),
        })
    }
}

fn parse<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid {} value: {:?}", key, value))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.base_currency, "USD");
        assert_eq!(config.rate_limit_per_minute, 100);
        assert_eq!(config.providers.ipgeo_url, "https://ipapi.co");
        assert_eq!(config.providers.timeout, Duration::from_secs(8));
        assert_eq!(config.providers.rate_cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.providers.rate_error_ttl, Duration::from_secs(300));
        assert_eq!(config.providers.rate_cache_capacity, 10_000);
        assert!(!config.trust_proxy_headers);
        assert_eq!(config.otlp_endpoint, None);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "8080"),
            ("BASE_CURRENCY", "eur"),
            ("PROVIDER_TIMEOUT_SECS", "3"),
            ("TRUST_PROXY_HEADERS", "true"),
            ("RATE_CACHE_CAPACITY", "500"),
            ("GEOCODER_USER_AGENT", "shop.example (ops@example.com)"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(config.providers.timeout, Duration::from_secs(3));
        assert!(config.trust_proxy_headers);
        assert_eq!(config.providers.rate_cache_capacity, 500);
        assert_eq!(config.providers.user_agent, "shop.example (ops@example.com)");
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://collector:4317"));
    }

    #[test]
    fn test_invalid_values() {
        let err = config(&[("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(config(&[("RATE_LIMIT_PER_MINUTE", "0")]).is_err());
    }
}

//! Location Resolver
//!
//! Determines the caller's country and preferred currency from either an IP
//! address or browser-supplied coordinates.

use std::net::IpAddr;
use std::time::Duration;

use currency_engine::{country_name, currency_for_country};
use smartprice_types::domain::DEFAULT_CURRENCY;
use smartprice_types::{
    Accuracy, Coordinates, DetectionError, DetectionMethod, IpGeoRecord, IpGeolocationProvider,
    LocationResult, PermissionState, ProviderError, ReverseGeocodeRecord, ReverseGeocoder,
};

use super::{DEFAULT_PROVIDER_TIMEOUT, bounded};

/// Strategy selection for one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOptions {
    /// Try the browser strategy before IP.
    pub prefer_browser_geolocation: bool,
    /// Use the IP strategy when the browser strategy fails.
    pub fallback_to_ip: bool,
    /// Caller IP from forwarded headers; `None` means unknown.
    pub client_ip: Option<String>,
    /// Coordinates granted by the browser, if any.
    pub coordinates: Option<Coordinates>,
    /// Permission state that explains missing coordinates.
    pub permission: PermissionState,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            prefer_browser_geolocation: false,
            fallback_to_ip: true,
            client_ip: None,
            coordinates: None,
            permission: PermissionState::Prompt,
        }
    }
}

/// Resolves locations through the injected providers.
///
/// Generic over the two provider ports so tests can inject in-memory fakes.
pub struct LocationResolver<I: IpGeolocationProvider, G: ReverseGeocoder> {
    ip_provider: I,
    geocoder: G,
    timeout: Duration,
}

impl<I: IpGeolocationProvider, G: ReverseGeocoder> LocationResolver<I, G> {
    pub fn new(ip_provider: I, geocoder: G) -> Self {
        Self {
            ip_provider,
            geocoder,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Overrides the per-call provider timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a reference to the IP geolocation provider.
    pub fn ip_provider(&self) -> &I {
        &self.ip_provider
    }

    /// Returns a reference to the reverse geocoder.
    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Resolves a location according to `options`.
    ///
    /// Returns an error only when the browser strategy was preferred, failed,
    /// and falling back to IP is disabled. IP failures never error: they
    /// produce the fallback location.
    #[tracing::instrument(skip(self, options), fields(
        prefer_browser = options.prefer_browser_geolocation,
        fallback_to_ip = options.fallback_to_ip,
    ))]
    pub async fn resolve_location(
        &self,
        options: &ResolveOptions,
    ) -> Result<LocationResult, DetectionError> {
        if options.prefer_browser_geolocation {
            match self
                .resolve_browser(options.coordinates, options.permission)
                .await
            {
                Ok(location) => return Ok(location),
                Err(err) if options.fallback_to_ip => {
                    tracing::warn!(error = %err, "browser geolocation failed, falling back to IP");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "browser geolocation failed, no fallback configured");
                    return Err(err);
                }
            }
        }

        Ok(self.resolve_ip(options.client_ip.as_deref()).await)
    }

    /// IP strategy. Never fails: provider errors yield [`LocationResult::fallback`].
    #[tracing::instrument(skip(self))]
    pub async fn resolve_ip(&self, client_ip: Option<&str>) -> LocationResult {
        let target = lookup_target(client_ip);
        let result = bounded(self.timeout, self.ip_provider.lookup(target.as_deref()))
            .await
            .and_then(location_from_ip);

        match result {
            Ok(location) => {
                tracing::debug!(country = %location.country_code, currency = %location.currency, "resolved location from IP");
                location
            }
            Err(err) => {
                tracing::warn!(error = %err, "IP geolocation failed, using fallback location");
                LocationResult::fallback(err.to_string())
            }
        }
    }

    /// Browser strategy: reverse-geocodes granted coordinates.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_browser(
        &self,
        coordinates: Option<Coordinates>,
        permission: PermissionState,
    ) -> Result<LocationResult, DetectionError> {
        let coordinates = match (coordinates, permission) {
            (Some(coordinates), _) => coordinates,
            (None, PermissionState::Denied) => return Err(DetectionError::PermissionDenied),
            (None, PermissionState::Unsupported) => return Err(DetectionError::Unsupported),
            (None, _) => return Err(DetectionError::MissingCoordinates),
        };

        if !coordinates.is_valid() {
            return Err(DetectionError::InvalidCoordinates {
                lat: coordinates.lat,
                lon: coordinates.lon,
            });
        }

        let record = bounded(self.timeout, self.geocoder.reverse(coordinates)).await?;
        Ok(location_from_coordinates(record, coordinates)?)
    }
}

/// Address to send upstream. Loopback, private and unparseable addresses
/// mean "locate the caller", which providers do when no IP is given.
fn lookup_target(client_ip: Option<&str>) -> Option<String> {
    let raw = client_ip?.trim();
    match raw.parse::<IpAddr>() {
        Ok(ip) if is_public(&ip) => Some(ip.to_string()),
        Ok(_) => None,
        Err(_) => {
            tracing::debug!(ip = raw, "ignoring unparseable client IP");
            None
        }
    }
}

fn is_public(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_public(&IpAddr::V4(v4)),
            None => {
                !(v6.is_loopback()
                    || v6.is_unspecified()
                    || v6.is_unique_local()
                    || v6.is_unicast_link_local())
            }
        },
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn currency_for(country_code: &str) -> String {
    currency_for_country(country_code)
        .map(|c| c.code().to_string())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

fn display_name(country_code: &str, reported: Option<String>) -> String {
    non_empty(reported)
        .or_else(|| country_name(country_code).map(String::from))
        .unwrap_or_else(|| country_code.to_string())
}

fn location_from_ip(record: IpGeoRecord) -> Result<LocationResult, ProviderError> {
    let country_code = record.country_code.trim().to_uppercase();
    if country_code.is_empty() {
        return Err(ProviderError::Malformed("missing country code".into()));
    }

    let currency = non_empty(record.currency)
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| currency_for(&country_code));
    let city = non_empty(record.city);
    let accuracy = if city.is_some() {
        Accuracy::Medium
    } else {
        Accuracy::Low
    };

    Ok(LocationResult {
        method: DetectionMethod::Ip,
        country_name: display_name(&country_code, record.country_name),
        currency,
        accuracy,
        timezone: non_empty(record.timezone),
        city,
        region: non_empty(record.region),
        coordinates: None,
        error: None,
        country_code,
    })
}

fn location_from_coordinates(
    record: ReverseGeocodeRecord,
    coordinates: Coordinates,
) -> Result<LocationResult, ProviderError> {
    let country_code = record.country_code.trim().to_uppercase();
    if country_code.is_empty() {
        return Err(ProviderError::Malformed("missing country code".into()));
    }

    Ok(LocationResult {
        method: DetectionMethod::Browser,
        country_name: display_name(&country_code, record.country_name),
        currency: currency_for(&country_code),
        accuracy: Accuracy::High,
        timezone: None,
        city: non_empty(record.city),
        region: non_empty(record.region),
        coordinates: Some(coordinates),
        error: None,
        country_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_target_skips_local_addresses() {
        assert_eq!(lookup_target(None), None);
        assert_eq!(lookup_target(Some("127.0.0.1")), None);
        assert_eq!(lookup_target(Some("::1")), None);
        assert_eq!(lookup_target(Some("10.1.2.3")), None);
        assert_eq!(lookup_target(Some("192.168.0.10")), None);
        assert_eq!(lookup_target(Some("::ffff:192.168.0.10")), None);
        assert_eq!(lookup_target(Some("not-an-ip")), None);
    }

    #[test]
    fn test_lookup_target_keeps_public_addresses() {
        assert_eq!(lookup_target(Some(" 8.8.8.8 ")), Some("8.8.8.8".to_string()));
        assert_eq!(
            lookup_target(Some("2001:4860:4860::8888")),
            Some("2001:4860:4860::8888".to_string())
        );
    }

    #[test]
    fn test_provider_currency_takes_precedence() {
        let location = location_from_ip(IpGeoRecord {
            country_code: "de".into(),
            currency: Some("chf".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(location.country_code, "DE");
        assert_eq!(location.currency, "CHF");
        assert_eq!(location.country_name, "Germany");
    }

    #[test]
    fn test_unmapped_country_defaults_to_usd() {
        let location = location_from_ip(IpGeoRecord {
            country_code: "AQ".into(),
            country_name: Some("Antarctica".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(location.currency, "USD");
        assert_eq!(location.country_name, "Antarctica");
    }

    #[test]
    fn test_ip_accuracy_depends_on_city() {
        let with_city = location_from_ip(IpGeoRecord {
            country_code: "FR".into(),
            city: Some("Paris".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(with_city.accuracy, Accuracy::Medium);

        let without_city = location_from_ip(IpGeoRecord {
            country_code: "FR".into(),
            city: Some("  ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(without_city.accuracy, Accuracy::Low);
        assert_eq!(without_city.city, None);
    }

    #[test]
    fn test_missing_country_code_is_malformed() {
        let result = location_from_ip(IpGeoRecord::default());
        assert!(matches!(result, Err(ProviderError::Malformed(_))));
    }
}

//! Geolocation provider ports.
//!
//! Implementations are HTTP clients for IP geolocation and reverse geocoding
//! services, or platform bindings for the browser permission prompt.

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinates, PermissionOutcome};
use crate::error::ProviderError;

/// What an IP geolocation provider knows about an address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpGeoRecord {
    pub country_code: String,
    pub country_name: Option<String>,
    /// Provider-reported currency; takes precedence over the country table.
    pub currency: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub timezone: Option<String>,
}

/// Address details from a reverse geocoding lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReverseGeocodeRecord {
    pub country_code: String,
    pub country_name: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
}

/// Port for IP-address geolocation.
#[async_trait::async_trait]
pub trait IpGeolocationProvider: Send + Sync + 'static {
    /// Looks up `ip`. `None` asks the provider to locate the caller itself,
    /// which is what loopback and private addresses resolve to.
    async fn lookup(&self, ip: Option<&str>) -> Result<IpGeoRecord, ProviderError>;
}

/// Port for turning coordinates into an address.
#[async_trait::async_trait]
pub trait ReverseGeocoder: Send + Sync + 'static {
    async fn reverse(&self, coordinates: Coordinates) -> Result<ReverseGeocodeRecord, ProviderError>;
}

/// Port for the host platform's geolocation permission flow.
#[async_trait::async_trait]
pub trait GeolocationPermission: Send + Sync + 'static {
    /// Prompts (if needed) and resolves to a uniform outcome.
    async fn request(&self) -> PermissionOutcome;
}

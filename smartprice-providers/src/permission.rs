//! Non-interactive permission sources.

use async_trait::async_trait;
use smartprice_types::{Coordinates, GeolocationPermission, PermissionOutcome};

/// Answers every permission request with the same outcome.
///
/// Stands in for a browser prompt where coordinates come from configuration
/// or command-line flags.
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission(PermissionOutcome);

impl StaticPermission {
    pub fn granted(coordinates: Coordinates) -> Self {
        Self(PermissionOutcome::Granted(coordinates))
    }

    pub fn denied() -> Self {
        Self(PermissionOutcome::Denied)
    }

    /// No geolocation capability at all (e.g. a headless server).
    pub fn unsupported() -> Self {
        Self(PermissionOutcome::Unsupported)
    }
}

impl From<Option<Coordinates>> for StaticPermission {
    fn from(coordinates: Option<Coordinates>) -> Self {
        coordinates.map_or_else(Self::unsupported, Self::granted)
    }
}

#[async_trait]
impl GeolocationPermission for StaticPermission {
    async fn request(&self) -> PermissionOutcome {
        self.0
    }
}

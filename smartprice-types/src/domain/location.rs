//! Location detection results.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Currency used when detection cannot determine one.
pub const DEFAULT_CURRENCY: &str = "USD";
/// Country used by the fallback location.
pub const FALLBACK_COUNTRY_CODE: &str = "US";
pub const FALLBACK_COUNTRY_NAME: &str = "United States";

/// How a location was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Ip,
    Browser,
    Fallback,
}

/// Confidence tier of a location. IP lookups are low or medium, GPS is high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    Low,
    Medium,
    High,
}

/// Latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    #[schema(example = 52.52)]
    pub lat: f64,
    #[schema(example = 13.405)]
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both components are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// The outcome of one detection attempt.
///
/// Created fresh for every attempt and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationResult {
    pub method: DetectionMethod,
    #[schema(example = "DE")]
    pub country_code: String,
    #[schema(example = "Germany")]
    pub country_name: String,
    #[schema(example = "EUR")]
    pub currency: String,
    pub accuracy: Accuracy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Advisory description of why a fallback was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LocationResult {
    /// The US/USD result substituted when detection fails.
    pub fn fallback(error: impl Into<String>) -> Self {
        Self {
            method: DetectionMethod::Fallback,
            country_code: FALLBACK_COUNTRY_CODE.to_string(),
            country_name: FALLBACK_COUNTRY_NAME.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            accuracy: Accuracy::Low,
            timezone: None,
            city: None,
            region: None,
            coordinates: None,
            error: Some(error.into()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.method == DetectionMethod::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_location() {
        let location = LocationResult::fallback("provider timed out");
        assert!(location.is_fallback());
        assert_eq!(location.country_code, "US");
        assert_eq!(location.currency, "USD");
        assert_eq!(location.accuracy, Accuracy::Low);
        assert_eq!(location.error.as_deref(), Some("provider timed out"));
    }

    #[test]
    fn test_location_serializes_camel_case() {
        let json = serde_json::to_value(LocationResult::fallback("x")).unwrap();
        assert_eq!(json["method"], "fallback");
        assert_eq!(json["countryCode"], "US");
        assert_eq!(json["accuracy"], "low");
        assert!(json.get("city").is_none());
    }

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(52.52, 13.405).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_accuracy_ordering() {
        assert!(Accuracy::High > Accuracy::Medium);
        assert!(Accuracy::Medium > Accuracy::Low);
    }
}

//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use currency_engine::{CurrencyInfo, RoundingMode};

use crate::domain::Coordinates;

// ─────────────────────────────────────────────────────────────────────────────
// Location DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Coordinates reported by the browser, to be reverse-geocoded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct ReverseGeocodeRequest {
    #[schema(example = 52.52)]
    pub lat: f64,
    #[schema(example = 13.405)]
    pub lon: f64,
}

impl From<ReverseGeocodeRequest> for Coordinates {
    fn from(req: ReverseGeocodeRequest) -> Self {
        Coordinates::new(req.lat, req.lon)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Query for a single exchange rate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExchangeRateQuery {
    /// Base currency (defaults to the server's base currency)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[param(example = "USD")]
    pub base: Option<String>,
    /// Target currency
    #[param(example = "EUR")]
    pub target: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Query for a server-side price conversion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConvertQuery {
    /// Amount in the base currency
    #[param(example = 599.0)]
    pub amount: f64,
    /// Target currency
    #[param(example = "INR")]
    pub currency: String,
    /// Base currency (defaults to the server's base currency)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default)]
    pub mode: RoundingMode,
    /// Round to a multiple of this many units (0 or absent: currency precision)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<u32>,
}

/// Result of a server-side conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    #[schema(example = 599.0)]
    pub original_amount: f64,
    #[schema(example = "USD")]
    pub base: String,
    #[schema(example = "INR")]
    pub currency: String,
    #[schema(example = 83.0)]
    pub rate: f64,
    #[schema(example = 49717.0)]
    pub amount: f64,
    #[schema(example = "₹49717.00")]
    pub formatted: String,
    /// Set when the rate lookup failed and the identity rate was used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of the supported-currency listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyResponse {
    #[schema(example = "EUR")]
    pub code: String,
    #[schema(example = "€")]
    pub symbol: String,
    #[schema(example = "Euro")]
    pub name: String,
    #[schema(example = 2)]
    pub decimal_places: u8,
}

impl From<CurrencyInfo> for CurrencyResponse {
    fn from(info: CurrencyInfo) -> Self {
        Self {
            code: info.code.into_owned(),
            symbol: info.symbol.to_string(),
            name: info.name.into_owned(),
            decimal_places: info.decimal_places,
        }
    }
}

/// Service health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
}

//! Domain models for location detection and price conversion.

pub mod location;
pub mod permission;
pub mod rate;

pub use location::{
    Accuracy, Coordinates, DEFAULT_CURRENCY, DetectionMethod, FALLBACK_COUNTRY_CODE,
    FALLBACK_COUNTRY_NAME, LocationResult,
};
pub use permission::{PermissionOutcome, PermissionState};
pub use rate::{ExchangeRate, RateQuote};

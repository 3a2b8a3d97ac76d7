//! # SmartPrice Types
//!
//! Domain types and port traits for localized pricing.
//! This crate has ZERO external IO dependencies - only data structures
//! and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (LocationResult, ExchangeRate, permission model)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Provider, detection and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use currency_engine::{CurrencyCode, CurrencyInfo, RoundingMode, RoundingPolicy};
pub use domain::{
    Accuracy, Coordinates, DetectionMethod, ExchangeRate, LocationResult, PermissionOutcome,
    PermissionState, RateQuote,
};
pub use dto::*;
pub use error::{AppError, DetectionError, ProviderError};
pub use ports::{
    GeolocationPermission, IpGeoRecord, IpGeolocationProvider, RateSource, ReverseGeocodeRecord,
    ReverseGeocoder, ScriptSource,
};

//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use smartprice_types::domain::{
    Accuracy, Coordinates, DetectionMethod, ExchangeRate, LocationResult, RateQuote,
};
use smartprice_types::dto::{
    ConvertQuery, ConvertResponse, CurrencyResponse, ExchangeRateQuery, HealthResponse,
    ReverseGeocodeRequest,
};
use smartprice_types::RoundingMode;
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
async fn health() {}

/// Detect the caller's location from their IP address
///
/// Never fails: when the lookup is unavailable the fallback location (US/USD)
/// is returned with `method = "fallback"` and an `error` message.
#[utoipa::path(
    get,
    path = "/api/location",
    tag = "location",
    params(
        ("X-Forwarded-For" = Option<String>, Header, description = "Client address set by the proxy")
    ),
    responses(
        (status = 200, description = "Detected or fallback location", body = LocationResult),
        (status = 429, description = "Rate limit exceeded")
    )
)]
async fn detect_location() {}

/// Resolve browser coordinates to a location
#[utoipa::path(
    post,
    path = "/api/location/reverse",
    tag = "location",
    request_body = ReverseGeocodeRequest,
    responses(
        (status = 200, description = "Location with high accuracy", body = LocationResult),
        (status = 400, description = "Invalid coordinates"),
        (status = 502, description = "Reverse geocoding failed")
    )
)]
async fn reverse_geocode() {}

/// Look up an exchange rate
///
/// Upstream failures return rate 1 with an `error` field and a short cache lifetime.
#[utoipa::path(
    get,
    path = "/api/exchange-rate",
    tag = "rates",
    params(ExchangeRateQuery),
    responses(
        (status = 200, description = "Rate quote", body = RateQuote),
        (status = 400, description = "Missing target currency")
    )
)]
async fn exchange_rate() {}

/// Convert and format a price
#[utoipa::path(
    get,
    path = "/api/convert",
    tag = "rates",
    params(ConvertQuery),
    responses(
        (status = 200, description = "Converted amount", body = ConvertResponse),
        (status = 400, description = "Invalid amount or currency")
    )
)]
async fn convert() {}

/// List supported currencies
#[utoipa::path(
    get,
    path = "/api/currencies",
    tag = "currencies",
    responses(
        (status = 200, description = "Currency registry", body = Vec<CurrencyResponse>)
    )
)]
async fn list_currencies() {}

/// OpenAPI documentation for the SmartPrice API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SmartPrice API",
        version = "1.0.0",
        description = "Location-aware pricing: detect a visitor's currency, look up exchange rates and convert prices with configurable rounding.",
        license(name = "MIT"),
    ),
    paths(
        health,
        detect_location,
        reverse_geocode,
        exchange_rate,
        convert,
        list_currencies,
    ),
    components(
        schemas(
            HealthResponse,
            LocationResult,
            DetectionMethod,
            Accuracy,
            Coordinates,
            ReverseGeocodeRequest,
            ExchangeRate,
            RateQuote,
            ConvertResponse,
            CurrencyResponse,
            RoundingMode,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "location", description = "IP and browser location detection"),
        (name = "rates", description = "Exchange rates and conversion"),
        (name = "currencies", description = "Currency registry"),
    )
)]
pub struct ApiDoc;

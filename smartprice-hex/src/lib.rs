//! # SmartPrice Hex
//!
//! Application services and HTTP adapter for localized pricing.
//!
//! ## Architecture
//!
//! - `service/` - Location resolver, exchange rate provider, the stateful
//!   presentation adapter and the script loader
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi` - API documentation served at `/swagger-ui`
//!
//! Services are generic over the port traits from `smartprice-types`, so
//! HTTP-backed providers and in-memory fakes are interchangeable.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::{
    ExchangeRateProvider, LocationResolver, Phase, ResolveOptions, ScriptLoader, SmartPrice,
    SmartPriceConfig, SmartPriceSnapshot,
};

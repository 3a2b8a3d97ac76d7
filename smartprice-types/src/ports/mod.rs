//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The service layer depends on these traits, not concrete implementations.

mod geolocation;
mod rates;
mod script;

pub use geolocation::{
    GeolocationPermission, IpGeoRecord, IpGeolocationProvider, ReverseGeocodeRecord,
    ReverseGeocoder,
};
pub use rates::RateSource;
pub use script::ScriptSource;

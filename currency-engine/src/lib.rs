//! Currency Engine
//!
//! Pure, IO-free building blocks for localized prices:
//!
//! - [`registry`] - the static currency metadata table (symbol, name, decimal places),
//!   generated declaratively by the `define_currencies!` macro
//! - [`country`] - the country to currency mapping used by location detection
//! - [`rounding`] - applies an exchange rate and a rounding policy to an amount
//! - [`format`] - renders a converted amount for display
//!
//! # Adding a New Currency
//! Add a line to the `define_currencies!` invocation in `registry.rs`:
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     MNT => ("MNT", "₮", "Mongolian Tögrög", 2),
//! }
//! ```
//!
//! # Example
//! ```
//! use currency_engine::{RoundingMode, convert_code, format};
//!
//! let amount = convert_code(599.0, 83.0, "INR", RoundingMode::Nearest, None);
//! assert_eq!(format(amount, "INR"), "₹49717.00");
//!
//! // Unknown codes never fail
//! assert_eq!(format(12.5, "XYZ"), "12.50 XYZ");
//! ```

pub mod country;
pub mod format;
pub mod registry;
pub mod rounding;

pub use country::{country_name, currency_for_country};
pub use format::format;
pub use registry::{CurrencyCode, CurrencyInfo, UnknownCurrency, get, is_supported, lookup};
pub use rounding::{RoundingMode, RoundingPolicy, convert, convert_code};

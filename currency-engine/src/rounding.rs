//! Rate application and price rounding.
//!
//! `convert` multiplies an amount by a rate and rounds the result either to a
//! custom granularity ("clean" prices such as 295 instead of 297.43) or to the
//! target currency's natural number of decimal places.
//!
//! Midpoints round half away from zero (`f64::round`): `149350.5` becomes
//! `149351`. Negative amounts mirror positive ones.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::registry;

/// Scaled values within this relative distance of an integer are treated as that integer.
///
/// Absorbs binary representation noise such as `0.1 * 3 * 100 = 30.000000000000004`,
/// which would otherwise push `Up` to the next minor unit.
const SNAP_EPSILON: f64 = 1e-12;

/// Rounding direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// Ceiling
    Up,
    /// Floor
    Down,
    /// Half away from zero
    #[default]
    Nearest,
}

impl RoundingMode {
    fn apply(self, value: f64) -> f64 {
        let value = snap(value);
        match self {
            RoundingMode::Up => value.ceil(),
            RoundingMode::Down => value.floor(),
            RoundingMode::Nearest => value.round(),
        }
    }
}

impl std::fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RoundingMode::Up => "up",
            RoundingMode::Down => "down",
            RoundingMode::Nearest => "nearest",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for RoundingMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" | "ceil" => Ok(RoundingMode::Up),
            "down" | "floor" => Ok(RoundingMode::Down),
            "nearest" | "round" => Ok(RoundingMode::Nearest),
            _ => Err(format!("Unknown rounding mode: {}", s)),
        }
    }
}

/// How converted amounts are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingPolicy {
    /// When false, converted amounts are returned unrounded.
    pub enabled: bool,
    pub mode: RoundingMode,
    /// Round to a multiple of this many target-currency units instead of
    /// the currency's decimal places.
    pub granularity: Option<NonZeroU32>,
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: RoundingMode::Nearest,
            granularity: None,
        }
    }
}

impl RoundingPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_mode(mode: RoundingMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn granularity(mut self, granularity: Option<NonZeroU32>) -> Self {
        self.granularity = granularity;
        self
    }
}

fn snap(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() < SNAP_EPSILON * nearest.abs().max(1.0) {
        nearest
    } else {
        value
    }
}

/// Converts `amount` at `rate` and rounds according to `policy`.
///
/// `decimal_places` is the target currency's precision and only matters when
/// no granularity is set.
pub fn convert(amount: f64, rate: f64, decimal_places: u8, policy: RoundingPolicy) -> f64 {
    let raw = amount * rate;
    if !policy.enabled || !raw.is_finite() {
        return raw;
    }

    let rounded = match policy.granularity {
        Some(granularity) => {
            let step = f64::from(granularity.get());
            policy.mode.apply(raw / step) * step
        }
        None => {
            let factor = 10f64.powi(i32::from(decimal_places));
            policy.mode.apply(raw * factor) / factor
        }
    };

    // Normalize -0.0 so negative zero never leaks into formatting.
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Like [`convert`], looking up decimal places for `currency_code` in the registry.
pub fn convert_code(
    amount: f64,
    rate: f64,
    currency_code: &str,
    mode: RoundingMode,
    granularity: Option<NonZeroU32>,
) -> f64 {
    let decimal_places = registry::lookup(currency_code).decimal_places;
    convert(
        amount,
        rate,
        decimal_places,
        RoundingPolicy::with_mode(mode).granularity(granularity),
    )
}

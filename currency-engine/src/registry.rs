//! Static currency metadata.
//!
//! The registry is the single source of truth for symbols, display names and
//! decimal precision. Lookups by code never fail: an unrecognized code gets a
//! default entry with no symbol and two decimal places.

use std::borrow::Cow;

use serde::Serialize;

/// Display metadata for one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyInfo {
    /// ISO-4217 code
    #[schema(value_type = String, example = "EUR")]
    pub code: Cow<'static, str>,
    #[schema(example = "€")]
    pub symbol: &'static str,
    #[schema(value_type = String, example = "Euro")]
    pub name: Cow<'static, str>,
    /// Number of minor-unit digits (0 to 3)
    #[schema(example = 2)]
    pub decimal_places: u8,
}

impl CurrencyInfo {
    /// Default entry for a code that is not in the registry.
    pub fn unknown(code: &str) -> Self {
        Self {
            code: Cow::Owned(code.to_string()),
            symbol: "",
            name: Cow::Owned(code.to_string()),
            decimal_places: 2,
        }
    }
}

/// Error returned when parsing a [`CurrencyCode`] from an unregistered code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown currency: {0}")]
pub struct UnknownCurrency(pub String);

/// Defines the registry table and the `CurrencyCode` enum.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     Variant => ("CODE", "SYMBOL", "Display name", decimal_places),
/// }
/// ```
macro_rules! define_currencies {
    (
        $(
            $name:ident => ($code:literal, $symbol:literal, $display:literal, $decimals:expr)
        ),* $(,)?
    ) => {
        /// Every currency known to the registry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize, utoipa::ToSchema)]
        #[serde(rename_all = "UPPERCASE")]
        pub enum CurrencyCode {
            $($name),*
        }

        impl CurrencyCode {
            pub fn code(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $code),*
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $symbol),*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $display),*
                }
            }

            pub fn decimal_places(&self) -> u8 {
                match self {
                    $(CurrencyCode::$name => $decimals),*
                }
            }

            pub fn all() -> &'static [CurrencyCode] {
                &[$(CurrencyCode::$name),*]
            }

            pub fn info(&self) -> CurrencyInfo {
                CurrencyInfo {
                    code: Cow::Borrowed(self.code()),
                    symbol: self.symbol(),
                    name: Cow::Borrowed(self.name()),
                    decimal_places: self.decimal_places(),
                }
            }
        }

        impl std::fmt::Display for CurrencyCode {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        impl std::str::FromStr for CurrencyCode {
            type Err = UnknownCurrency;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($code => Ok(CurrencyCode::$name),)*
                    _ => Err(UnknownCurrency(s.to_string())),
                }
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS
// ─────────────────────────────────────────────────────────────────────────────

define_currencies! {
    // Americas
    USD => ("USD", "$", "US Dollar", 2),
    CAD => ("CAD", "C$", "Canadian Dollar", 2),
    MXN => ("MXN", "MX$", "Mexican Peso", 2),
    BRL => ("BRL", "R$", "Brazilian Real", 2),
    ARS => ("ARS", "AR$", "Argentine Peso", 2),
    CLP => ("CLP", "CL$", "Chilean Peso", 0),
    COP => ("COP", "CO$", "Colombian Peso", 2),
    PEN => ("PEN", "S/", "Peruvian Sol", 2),

    // Europe
    EUR => ("EUR", "€", "Euro", 2),
    GBP => ("GBP", "£", "British Pound", 2),
    CHF => ("CHF", "CHF ", "Swiss Franc", 2),
    SEK => ("SEK", "kr ", "Swedish Krona", 2),
    NOK => ("NOK", "kr ", "Norwegian Krone", 2),
    DKK => ("DKK", "kr ", "Danish Krone", 2),
    ISK => ("ISK", "kr ", "Icelandic Króna", 0),
    PLN => ("PLN", "zł", "Polish Złoty", 2),
    CZK => ("CZK", "Kč", "Czech Koruna", 2),
    HUF => ("HUF", "Ft", "Hungarian Forint", 2),
    RON => ("RON", "lei ", "Romanian Leu", 2),
    UAH => ("UAH", "₴", "Ukrainian Hryvnia", 2),
    TRY => ("TRY", "₺", "Turkish Lira", 2),

    // Asia-Pacific
    JPY => ("JPY", "¥", "Japanese Yen", 0),
    CNY => ("CNY", "CN¥", "Chinese Yuan", 2),
    KRW => ("KRW", "₩", "South Korean Won", 0),
    INR => ("INR", "₹", "Indian Rupee", 2),
    PKR => ("PKR", "Rs ", "Pakistani Rupee", 2),
    BDT => ("BDT", "৳", "Bangladeshi Taka", 2),
    IDR => ("IDR", "Rp ", "Indonesian Rupiah", 2),
    MYR => ("MYR", "RM ", "Malaysian Ringgit", 2),
    PHP => ("PHP", "₱", "Philippine Peso", 2),
    SGD => ("SGD", "S$", "Singapore Dollar", 2),
    THB => ("THB", "฿", "Thai Baht", 2),
    VND => ("VND", "₫", "Vietnamese Dong", 0),
    HKD => ("HKD", "HK$", "Hong Kong Dollar", 2),
    TWD => ("TWD", "NT$", "New Taiwan Dollar", 2),
    AUD => ("AUD", "A$", "Australian Dollar", 2),
    NZD => ("NZD", "NZ$", "New Zealand Dollar", 2),

    // Middle East & Africa
    AED => ("AED", "AED ", "UAE Dirham", 2),
    SAR => ("SAR", "SAR ", "Saudi Riyal", 2),
    QAR => ("QAR", "QAR ", "Qatari Riyal", 2),
    ILS => ("ILS", "₪", "Israeli New Shekel", 2),
    KWD => ("KWD", "KD ", "Kuwaiti Dinar", 3),
    BHD => ("BHD", "BD ", "Bahraini Dinar", 3),
    OMR => ("OMR", "OMR ", "Omani Rial", 3),
    JOD => ("JOD", "JD ", "Jordanian Dinar", 3),
    TND => ("TND", "DT ", "Tunisian Dinar", 3),
    EGP => ("EGP", "E£", "Egyptian Pound", 2),
    ZAR => ("ZAR", "R ", "South African Rand", 2),
    NGN => ("NGN", "₦", "Nigerian Naira", 2),
    KES => ("KES", "KSh ", "Kenyan Shilling", 2),
    UGX => ("UGX", "USh ", "Ugandan Shilling", 0),
    GHS => ("GHS", "GH₵", "Ghanaian Cedi", 2),
    MAD => ("MAD", "MAD ", "Moroccan Dirham", 2),
}

/// Returns the registered entry for `code`, if any (case-insensitive).
pub fn get(code: &str) -> Option<CurrencyCode> {
    code.parse().ok()
}

/// Returns true if `code` is in the registry.
pub fn is_supported(code: &str) -> bool {
    get(code).is_some()
}

/// Looks up currency metadata, falling back to [`CurrencyInfo::unknown`].
pub fn lookup(code: &str) -> CurrencyInfo {
    match get(code) {
        Some(currency) => currency.info(),
        None => CurrencyInfo::unknown(code),
    }
}

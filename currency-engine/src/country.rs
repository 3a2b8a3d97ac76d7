//! Country to currency mapping.
//!
//! Used by location detection when the geolocation provider does not report
//! a currency of its own. Kept separate from the currency metadata registry.

use crate::registry::CurrencyCode;

struct Country {
    code: &'static str,
    name: &'static str,
    currency: CurrencyCode,
}

macro_rules! countries {
    ($($code:literal => ($name:literal, $currency:ident)),* $(,)?) => {
        &[$(Country { code: $code, name: $name, currency: CurrencyCode::$currency }),*]
    };
}

static COUNTRIES: &[Country] = countries! {
    // Americas
    "US" => ("United States", USD),
    "PR" => ("Puerto Rico", USD),
    "EC" => ("Ecuador", USD),
    "SV" => ("El Salvador", USD),
    "CA" => ("Canada", CAD),
    "MX" => ("Mexico", MXN),
    "BR" => ("Brazil", BRL),
    "AR" => ("Argentina", ARS),
    "CL" => ("Chile", CLP),
    "CO" => ("Colombia", COP),
    "PE" => ("Peru", PEN),

    // Eurozone
    "AT" => ("Austria", EUR),
    "BE" => ("Belgium", EUR),
    "HR" => ("Croatia", EUR),
    "CY" => ("Cyprus", EUR),
    "EE" => ("Estonia", EUR),
    "FI" => ("Finland", EUR),
    "FR" => ("France", EUR),
    "DE" => ("Germany", EUR),
    "GR" => ("Greece", EUR),
    "IE" => ("Ireland", EUR),
    "IT" => ("Italy", EUR),
    "LV" => ("Latvia", EUR),
    "LT" => ("Lithuania", EUR),
    "LU" => ("Luxembourg", EUR),
    "MT" => ("Malta", EUR),
    "NL" => ("Netherlands", EUR),
    "PT" => ("Portugal", EUR),
    "SK" => ("Slovakia", EUR),
    "SI" => ("Slovenia", EUR),
    "ES" => ("Spain", EUR),
    "MC" => ("Monaco", EUR),
    "ME" => ("Montenegro", EUR),

    // Rest of Europe
    "GB" => ("United Kingdom", GBP),
    "CH" => ("Switzerland", CHF),
    "LI" => ("Liechtenstein", CHF),
    "SE" => ("Sweden", SEK),
    "NO" => ("Norway", NOK),
    "DK" => ("Denmark", DKK),
    "IS" => ("Iceland", ISK),
    "PL" => ("Poland", PLN),
    "CZ" => ("Czechia", CZK),
    "HU" => ("Hungary", HUF),
    "RO" => ("Romania", RON),
    "UA" => ("Ukraine", UAH),
    "TR" => ("Türkiye", TRY),

    // Asia-Pacific
    "JP" => ("Japan", JPY),
    "CN" => ("China", CNY),
    "KR" => ("South Korea", KRW),
    "IN" => ("India", INR),
    "PK" => ("Pakistan", PKR),
    "BD" => ("Bangladesh", BDT),
    "ID" => ("Indonesia", IDR),
    "MY" => ("Malaysia", MYR),
    "PH" => ("Philippines", PHP),
    "SG" => ("Singapore", SGD),
    "TH" => ("Thailand", THB),
    "VN" => ("Vietnam", VND),
    "HK" => ("Hong Kong", HKD),
    "TW" => ("Taiwan", TWD),
    "AU" => ("Australia", AUD),
    "NZ" => ("New Zealand", NZD),

    // Middle East & Africa
    "AE" => ("United Arab Emirates", AED),
    "SA" => ("Saudi Arabia", SAR),
    "QA" => ("Qatar", QAR),
    "IL" => ("Israel", ILS),
    "KW" => ("Kuwait", KWD),
    "BH" => ("Bahrain", BHD),
    "OM" => ("Oman", OMR),
    "JO" => ("Jordan", JOD),
    "TN" => ("Tunisia", TND),
    "EG" => ("Egypt", EGP),
    "ZA" => ("South Africa", ZAR),
    "NG" => ("Nigeria", NGN),
    "KE" => ("Kenya", KES),
    "UG" => ("Uganda", UGX),
    "GH" => ("Ghana", GHS),
    "MA" => ("Morocco", MAD),
};

fn find(country_code: &str) -> Option<&'static Country> {
    let code = country_code.trim();
    COUNTRIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Returns the currency used in `country_code` (ISO 3166-1 alpha-2), if mapped.
pub fn currency_for_country(country_code: &str) -> Option<CurrencyCode> {
    find(country_code).map(|c| c.currency)
}

/// Returns the English display name of a mapped country.
pub fn country_name(country_code: &str) -> Option<&'static str> {
    find(country_code).map(|c| c.name)
}

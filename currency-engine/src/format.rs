//! Display formatting for converted amounts.

use crate::registry;

/// Renders `amount` for `currency_code`.
///
/// Known currencies render as `symbol + amount` fixed to the currency's
/// decimal places. Unknown codes render as `amount` fixed to two places
/// followed by a space and the code.
pub fn format(amount: f64, currency_code: &str) -> String {
    // -0.0 would otherwise print as "-0.00"
    let amount = if amount == 0.0 { 0.0 } else { amount };
    match registry::get(currency_code) {
        Some(currency) => {
            let places = usize::from(currency.decimal_places());
            format!("{}{:.*}", currency.symbol(), places, amount)
        }
        None => format!("{:.2} {}", amount, currency_code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_inr() {
        assert_eq!(format(49717.0, "INR"), "₹49717.00");
    }

    #[test]
    fn test_format_zero_decimal_currency() {
        assert_eq!(format(149351.0, "JPY"), "¥149351");
        assert_eq!(format(1500.0, "KRW"), "₩1500");
    }

    #[test]
    fn test_format_three_decimal_currency() {
        assert_eq!(format(3.071, "KWD"), "KD 3.071");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format(299.0, "USD"), "$299.00");
    }

    #[test]
    fn test_format_unknown_currency() {
        assert_eq!(format(12.5, "XYZ"), "12.50 XYZ");
        assert_eq!(format(0.0, ""), "0.00 ");
    }

    #[test]
    fn test_format_negative_and_zero() {
        assert_eq!(format(-12.5, "EUR"), "€-12.50");
        assert_eq!(format(-0.0, "EUR"), "€0.00");
    }

    #[test]
    fn test_format_is_case_insensitive_on_code() {
        assert_eq!(format(10.0, "gbp"), "£10.00");
    }
}

//! Price and currency normalization shared by all marketplace adapters.

use rust_decimal::Decimal;

/// Parse a marketplace price string into a Decimal, tolerating currency
/// symbols, thousands separators and surrounding whitespace. Anything that
/// still fails to parse becomes 0, which the scoring side treats as "no
/// usable price" rather than an error.
pub fn parse_price(raw: &str) -> Decimal {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(Decimal::ZERO)
}

/// Uppercase ISO currency code, defaulting to USD when the source omits it.
pub fn normalize_currency(currency: Option<&str>) -> String {
    match currency {
        Some(c) if !c.trim().is_empty() => c.trim().to_uppercase(),
        _ => "USD".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_plain_and_decorated_prices() {
        assert_eq!(parse_price("549.99"), dec!(549.99));
        assert_eq!(parse_price("$1,234.56"), dec!(1234.56));
        assert_eq!(parse_price("  19.00 "), dec!(19.00));
    }

    #[test]
    fn test_unparseable_price_becomes_zero() {
        assert_eq!(parse_price(""), Decimal::ZERO);
        assert_eq!(parse_price("call for price"), Decimal::ZERO);
        assert_eq!(parse_price("1.2.3"), Decimal::ZERO);
    }

    #[test]
    fn test_currency_defaults_and_uppercases() {
        assert_eq!(normalize_currency(Some("usd")), "USD");
        assert_eq!(normalize_currency(Some("EUR")), "EUR");
        assert_eq!(normalize_currency(Some("  ")), "USD");
        assert_eq!(normalize_currency(None), "USD");
    }
}

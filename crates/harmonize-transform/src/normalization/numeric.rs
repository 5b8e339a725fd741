//! Numeric coercion for integer and decimal fields.

use crate::error::TransformError;

const CURRENCY_SYMBOLS: [char; 4] = ['€', '$', '£', '¥'];

/// Parses an integer after dropping `,` and space thousands separators.
///
/// Goes through `f64` so `"007"` and `"12.0"` are accepted; fractions are
/// truncated toward zero.
pub fn parse_integer(value: &str) -> Result<i64, TransformError> {
    let cleaned: String = value.chars().filter(|c| *c != ',' && *c != ' ').collect();
    let parsed = cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .ok_or_else(|| TransformError::Unparseable {
            value: value.to_string(),
        })?;
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if !parsed.is_finite() || parsed < i64::MIN as f64 || parsed >= i64::MAX as f64 {
        return Err(TransformError::OutOfRange {
            value: value.to_string(),
        });
    }
    Ok(parsed.trunc() as i64)
}

/// Parses a decimal amount.
///
/// Currency symbols and whitespace are dropped. With both `,` and `.`
/// present the comma is a thousands separator, otherwise a comma is the
/// decimal mark. Locale is not detected beyond that rule.
pub fn parse_decimal(value: &str) -> Result<f64, TransformError> {
    let stripped: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_SYMBOLS.contains(c))
        .collect();
    let canonical = if stripped.contains('.') {
        stripped.replace(',', "")
    } else {
        stripped.replace(',', ".")
    };
    let parsed = canonical
        .parse::<f64>()
        .map_err(|_| TransformError::Unparseable {
            value: value.to_string(),
        })?;
    if !parsed.is_finite() {
        return Err(TransformError::NonFinite {
            value: value.to_string(),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_thousands_separators() {
        assert_eq!(parse_integer("1,200").expect("int"), 1200);
        assert_eq!(parse_integer("1 200 000").expect("int"), 1_200_000);
        assert_eq!(parse_integer("007").expect("int"), 7);
        assert_eq!(parse_integer("12.9").expect("int"), 12);
        assert_eq!(parse_integer("-3.5").expect("int"), -3);
    }

    #[test]
    fn integer_failures() {
        assert!(matches!(
            parse_integer("abc"),
            Err(TransformError::Unparseable { .. })
        ));
        assert!(matches!(
            parse_integer(""),
            Err(TransformError::Unparseable { .. })
        ));
        assert!(matches!(
            parse_integer("NaN"),
            Err(TransformError::Unparseable { .. })
        ));
        assert!(matches!(
            parse_integer("inf"),
            Err(TransformError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_integer("1e30"),
            Err(TransformError::OutOfRange { .. })
        ));
    }

    #[test]
    fn decimal_comma_policy() {
        assert_eq!(parse_decimal("19,99").expect("dec"), 19.99);
        assert_eq!(parse_decimal("1,200.50").expect("dec"), 1200.5);
        assert_eq!(parse_decimal("18 500,00 €").expect("dec"), 18500.0);
        assert_eq!(parse_decimal("$ 42").expect("dec"), 42.0);
    }

    #[test]
    fn decimal_failures() {
        assert!(matches!(
            parse_decimal("n/a"),
            Err(TransformError::Unparseable { .. })
        ));
        assert!(matches!(
            parse_decimal("inf"),
            Err(TransformError::NonFinite { .. })
        ));
    }
}

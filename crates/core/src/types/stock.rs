//! Stock quantity input and the low-stock rule.

use core::fmt;

/// Parts with fewer units than this are reported as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 3;

/// Returns `true` when `stock_qnt` is below [`LOW_STOCK_THRESHOLD`].
#[must_use]
pub const fn is_low_stock(stock_qnt: i32) -> bool {
    stock_qnt < LOW_STOCK_THRESHOLD
}

/// A stock quantity as typed by a user.
///
/// Edited cells arrive as text. A value that is a non-negative whole number
/// (`"7"`, `" 7 "`, `"7.0"`) is [`StockInput::Valid`]; anything else keeps
/// the raw text so it can be reported back to the user before it is coerced
/// to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockInput {
    /// A usable, non-negative quantity.
    Valid(i32),
    /// Text that does not describe a non-negative whole number.
    Invalid(String),
}

impl StockInput {
    /// Interpret raw cell text.
    ///
    /// ```
    /// use chronify_core::StockInput;
    ///
    /// assert_eq!(StockInput::parse("7"), StockInput::Valid(7));
    /// assert_eq!(StockInput::parse("7.0"), StockInput::Valid(7));
    /// assert_eq!(StockInput::parse("abc"), StockInput::Invalid("abc".into()));
    /// assert_eq!(StockInput::parse("-2"), StockInput::Invalid("-2".into()));
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<i32>() {
            if n >= 0 {
                return Self::Valid(n);
            }
            return Self::Invalid(raw.to_owned());
        }

        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 && f >= 0.0 && f <= f64::from(i32::MAX) => {
                #[allow(clippy::cast_possible_truncation)] // range and fraction checked above
                Self::Valid(f as i32)
            }
            _ => Self::Invalid(raw.to_owned()),
        }
    }

    /// The integer this input is persisted as: the value itself, or 0 when
    /// the input is not usable.
    #[must_use]
    pub const fn coerced(&self) -> i32 {
        match self {
            Self::Valid(n) => *n,
            Self::Invalid(_) => 0,
        }
    }
}

impl fmt::Display for StockInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid(n) => write!(f, "{n}"),
            Self::Invalid(raw) => f.write_str(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_boundary() {
        assert!(is_low_stock(0));
        assert!(is_low_stock(2));
        assert!(!is_low_stock(3));
        assert!(!is_low_stock(10));
    }

    #[test]
    fn test_parse_whitespace_and_floats() {
        assert_eq!(StockInput::parse(" 12 "), StockInput::Valid(12));
        assert_eq!(StockInput::parse("4.0"), StockInput::Valid(4));
        assert_eq!(StockInput::parse("4.5"), StockInput::Invalid("4.5".into()));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(StockInput::parse(""), StockInput::Invalid(String::new()));
        assert_eq!(StockInput::parse("NaN"), StockInput::Invalid("NaN".into()));
        assert_eq!(StockInput::parse("1e99"), StockInput::Invalid("1e99".into()));
    }

    #[test]
    fn test_coerced() {
        assert_eq!(StockInput::parse("9").coerced(), 9);
        assert_eq!(StockInput::parse("abc").coerced(), 0);
        assert_eq!(StockInput::parse("-1").coerced(), 0);
    }

    #[test]
    fn test_display_keeps_raw_text() {
        assert_eq!(StockInput::parse("abc").to_string(), "abc");
        assert_eq!(StockInput::parse("7.0").to_string(), "7");
    }
}

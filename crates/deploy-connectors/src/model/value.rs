//! Raw property values as stored by the repository.
//!
//! Each connector knows which of these shapes its editor stores; nothing
//! beyond "may be null" is shared across connectors.

use std::fmt;

use crate::util::Timestamp;

/// Storage shapes a property value can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Text,
    Integer,
    Decimal,
    DateTime,
    Bool,
    Binary,
}

impl ValueKind {
    /// Returns a human-readable name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Decimal => "decimal",
            ValueKind::DateTime => "datetime",
            ValueKind::Bool => "bool",
            ValueKind::Binary => "binary",
        }
    }
}

/// Exact decimal: `mantissa * 10^-scale`.
///
/// The scale is kept as written, so `12.50` and `12.5` are different values
/// that both survive a round-trip through their text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    /// Maximum number of fractional digits.
    pub const MAX_SCALE: u32 = 28;

    /// Creates a decimal. Returns `None` if `scale` exceeds [`Decimal::MAX_SCALE`].
    pub fn new(mantissa: i128, scale: u32) -> Option<Decimal> {
        (scale <= Self::MAX_SCALE).then_some(Decimal { mantissa, scale })
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Parses invariant-culture decimal text (`-12.50`, `+3`, `.5`).
    pub fn parse(s: &str) -> Option<Decimal> {
        let (negative, unsigned) = match s.as_bytes().first()? {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };
        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let scale = u32::try_from(frac_part.len()).ok()?;
        let mut mantissa: i128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa.checked_mul(10)?.checked_add((b - b'0') as i128)?;
        }
        if negative {
            mantissa = -mantissa;
        }
        Decimal::new(mantissa, scale)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if self.mantissa < 0 {
            f.write_str("-")?;
        }
        if scale == 0 {
            return f.write_str(&digits);
        }
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{int_part}.{frac_part}")
    }
}

/// A property value in local (repository) form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyValue {
    #[default]
    Null,
    Text(String),
    Integer(i32),
    Decimal(Decimal),
    DateTime(Timestamp),
    Bool(bool),
    Binary(Vec<u8>),
}

impl PropertyValue {
    /// Returns the storage shape of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            PropertyValue::Null => ValueKind::Null,
            PropertyValue::Text(_) => ValueKind::Text,
            PropertyValue::Integer(_) => ValueKind::Integer,
            PropertyValue::Decimal(_) => ValueKind::Decimal,
            PropertyValue::DateTime(_) => ValueKind::DateTime,
            PropertyValue::Bool(_) => ValueKind::Bool,
            PropertyValue::Binary(_) => ValueKind::Binary,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Returns the text of a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number of an `Integer` value.
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            PropertyValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text of a `Text` value that is not empty or whitespace.
    pub fn non_blank_text(&self) -> Option<&str> {
        self.as_text().filter(|s| !s.trim().is_empty())
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<Decimal> for PropertyValue {
    fn from(value: Decimal) -> Self {
        PropertyValue::Decimal(value)
    }
}

impl From<Timestamp> for PropertyValue {
    fn from(value: Timestamp) -> Self {
        PropertyValue::DateTime(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropertyValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_parse_and_format() {
        for text in ["0", "0.00", "12.50", "-12.5", "-0.05", "123456789.000001", "7"] {
            let d = Decimal::parse(text).unwrap();
            assert_eq!(d.to_string(), text);
        }

        let d = Decimal::parse("+.5").unwrap();
        assert_eq!((d.mantissa(), d.scale()), (5, 1));
        assert_eq!(d.to_string(), "0.5");
    }

    #[test]
    fn test_decimal_rejects() {
        assert!(Decimal::parse("").is_none());
        assert!(Decimal::parse("-").is_none());
        assert!(Decimal::parse(".").is_none());
        assert!(Decimal::parse("1,5").is_none());
        assert!(Decimal::parse("1.2.3").is_none());
        assert!(Decimal::parse("1e5").is_none());
        assert!(Decimal::parse("0.00000000000000000000000000001").is_none());
        assert!(Decimal::parse(&"9".repeat(60)).is_none());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(PropertyValue::from("x").as_text(), Some("x"));
        assert_eq!(PropertyValue::from(4).as_integer(), Some(4));
        assert_eq!(PropertyValue::from(None::<String>), PropertyValue::Null);
        assert_eq!(PropertyValue::from("  ").non_blank_text(), None);
        assert_eq!(PropertyValue::Bool(true).kind().name(), "bool");
    }
}

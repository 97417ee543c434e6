//! Self-describing scalar encoding.
//!
//! A scalar is written as a one-character type tag followed by its text form,
//! so the exact primitive kind can be rebuilt without any schema on the
//! receiving side:
//!
//! ```text
//! shello                  text
//! i-42                    32-bit integer
//! d12.50                  decimal (invariant culture, scale preserved)
//! t2024-03-15T14:30:00Z   timestamp (ISO 8601)
//! ```

use crate::error::ConnectorError;
use crate::model::{Decimal, PropertyValue};
use crate::util::Timestamp;

/// A primitive value tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedScalar {
    Text(String),
    Integer(i32),
    Decimal(Decimal),
    DateTime(Timestamp),
}

impl TypedScalar {
    pub const TEXT_TAG: char = 's';
    pub const INTEGER_TAG: char = 'i';
    pub const DECIMAL_TAG: char = 'd';
    pub const DATETIME_TAG: char = 't';

    /// Returns the tag written in front of the value.
    pub fn tag(&self) -> char {
        match self {
            TypedScalar::Text(_) => Self::TEXT_TAG,
            TypedScalar::Integer(_) => Self::INTEGER_TAG,
            TypedScalar::Decimal(_) => Self::DECIMAL_TAG,
            TypedScalar::DateTime(_) => Self::DATETIME_TAG,
        }
    }

    /// Converts a property value. `Null` yields `None`; kinds without a tag are rejected.
    pub fn from_value(value: &PropertyValue) -> Result<Option<TypedScalar>, ConnectorError> {
        match value {
            PropertyValue::Null => Ok(None),
            PropertyValue::Text(s) => Ok(Some(TypedScalar::Text(s.clone()))),
            PropertyValue::Integer(v) => Ok(Some(TypedScalar::Integer(*v))),
            PropertyValue::Decimal(d) => Ok(Some(TypedScalar::Decimal(*d))),
            PropertyValue::DateTime(t) => Ok(Some(TypedScalar::DateTime(*t))),
            other => Err(ConnectorError::UnsupportedValueType {
                kind: other.kind().name(),
            }),
        }
    }

    pub fn into_value(self) -> PropertyValue {
        match self {
            TypedScalar::Text(s) => PropertyValue::Text(s),
            TypedScalar::Integer(v) => PropertyValue::Integer(v),
            TypedScalar::Decimal(d) => PropertyValue::Decimal(d),
            TypedScalar::DateTime(t) => PropertyValue::DateTime(t),
        }
    }

    /// Encodes the scalar as tag + text.
    pub fn encode(&self) -> String {
        let body = match self {
            TypedScalar::Text(s) => s.clone(),
            TypedScalar::Integer(v) => v.to_string(),
            TypedScalar::Decimal(d) => d.to_string(),
            TypedScalar::DateTime(t) => t.to_string(),
        };
        let mut out = String::with_capacity(body.len() + 1);
        out.push(self.tag());
        out.push_str(&body);
        out
    }

    /// Decodes tag + text.
    ///
    /// An unknown tag is [`ConnectorError::InvalidPrefix`]; a known tag whose
    /// body does not parse is [`ConnectorError::MalformedValue`].
    pub fn decode(encoded: &str) -> Result<TypedScalar, ConnectorError> {
        let mut chars = encoded.chars();
        let Some(tag) = chars.next() else {
            return Err(ConnectorError::MalformedValue {
                kind: "scalar",
                value: String::new(),
                reason: "empty input".to_string(),
            });
        };
        let body = chars.as_str();

        match tag {
            Self::TEXT_TAG => Ok(TypedScalar::Text(body.to_string())),
            Self::INTEGER_TAG => body
                .parse()
                .map(TypedScalar::Integer)
                .map_err(|err: std::num::ParseIntError| malformed("integer", body, err.to_string())),
            Self::DECIMAL_TAG => Decimal::parse(body)
                .map(TypedScalar::Decimal)
                .ok_or_else(|| malformed("decimal", body, "not an invariant decimal".to_string())),
            Self::DATETIME_TAG => Timestamp::parse(body)
                .map(TypedScalar::DateTime)
                .map_err(|err| malformed("datetime", body, err.message)),
            prefix => Err(ConnectorError::InvalidPrefix { prefix }),
        }
    }
}

fn malformed(kind: &'static str, value: &str, reason: String) -> ConnectorError {
    ConnectorError::MalformedValue {
        kind,
        value: value.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(TypedScalar::Text("hello".into()).encode(), "shello");
        assert_eq!(TypedScalar::Text(String::new()).encode(), "s");
        assert_eq!(TypedScalar::Integer(-42).encode(), "i-42");
        assert_eq!(
            TypedScalar::Decimal(Decimal::parse("-12.50").unwrap()).encode(),
            "d-12.50"
        );
        assert_eq!(
            TypedScalar::DateTime(Timestamp::utc(0)).encode(),
            "t1970-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            TypedScalar::decode("x123"),
            Err(ConnectorError::InvalidPrefix { prefix: 'x' })
        );
        assert!(matches!(
            TypedScalar::decode("iabc"),
            Err(ConnectorError::MalformedValue { kind: "integer", .. })
        ));
        assert!(matches!(
            TypedScalar::decode("d1,5"),
            Err(ConnectorError::MalformedValue { kind: "decimal", .. })
        ));
        assert!(matches!(
            TypedScalar::decode("tyesterday"),
            Err(ConnectorError::MalformedValue { kind: "datetime", .. })
        ));
        assert!(TypedScalar::decode("").is_err());
    }

    #[test]
    fn test_unsupported_kinds() {
        assert_eq!(TypedScalar::from_value(&PropertyValue::Null), Ok(None));
        assert_eq!(
            TypedScalar::from_value(&PropertyValue::Bool(true)),
            Err(ConnectorError::UnsupportedValueType { kind: "bool" })
        );
        assert!(TypedScalar::from_value(&PropertyValue::Binary(vec![1])).is_err());
    }

    #[test]
    fn test_text_keeps_tag_like_content() {
        let scalar = TypedScalar::Text("i42".into());
        assert_eq!(TypedScalar::decode(&scalar.encode()).unwrap(), scalar);
    }

    fn arb_scalar() -> impl Strategy<Value = TypedScalar> {
        prop_oneof![
            ".*".prop_map(TypedScalar::Text),
            any::<i32>().prop_map(TypedScalar::Integer),
            (any::<i64>(), 0u32..=Decimal::MAX_SCALE)
                .prop_map(|(m, s)| TypedScalar::Decimal(Decimal::new(m as i128, s).unwrap())),
            (0i64..253_402_300_800_000_000, prop::option::of(-1440i16..=1440))
                .prop_map(|(local_us, offset_min)| TypedScalar::DateTime(Timestamp { local_us, offset_min })),
        ]
    }

    proptest! {
        #[test]
        fn prop_encode_decode_roundtrip(scalar in arb_scalar()) {
            prop_assert_eq!(TypedScalar::decode(&scalar.encode()).unwrap(), scalar);
        }
    }
}

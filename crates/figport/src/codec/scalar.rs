//! Scalar codec: one field value to and from its cell text.
//!
//! | Value | Cell text |
//! |-------|-----------|
//! | null | `None` |
//! | true / false | `🬀` (U+1FB00) / `🬁` (U+1FB01) |
//! | integer, float | decimal form (floats use the shortest exact form) |
//! | timestamp | ISO-8601, offset only if the value has one |
//! | text | verbatim |
//!
//! An empty cell is not a value at all: it means "omitted, use your default".
//!
//! Text is written verbatim, so a text value of exactly `None` reads back as
//! null, and an empty text reads back as omitted. Existing documents depend
//! on that layout, so it is kept as is.

use std::borrow::Cow;

use crate::error::ScalarError;
use crate::model::{Scalar, ScalarKind, Timestamp};

/// Separates cells on an encoded line (U+2575).
pub const FIELD_SEPARATOR: char = '\u{2575}';

/// Cell text for null.
pub const NULL_LITERAL: &str = "None";

/// Cell text for boolean true.
pub const TRUE_SENTINEL: &str = "\u{1FB00}";

/// Cell text for boolean false.
pub const FALSE_SENTINEL: &str = "\u{1FB01}";

/// Result of decoding one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Empty cell: the field is left out and the destination applies its default.
    Omitted,
    Value(Scalar),
}

/// Encodes a value as cell text.
///
/// Never fails; text containing a reserved character is caught by
/// [`find_reserved`] before the cell is written.
pub fn encode_scalar(value: &Scalar) -> Cow<'_, str> {
    match value {
        Scalar::Null => Cow::Borrowed(NULL_LITERAL),
        Scalar::Boolean(true) => Cow::Borrowed(TRUE_SENTINEL),
        Scalar::Boolean(false) => Cow::Borrowed(FALSE_SENTINEL),
        Scalar::Integer(v) => Cow::Owned(v.to_string()),
        Scalar::Float(v) => Cow::Owned(v.to_string()),
        Scalar::Text(s) => Cow::Borrowed(s.as_str()),
        Scalar::Timestamp(ts) => Cow::Owned(ts.to_iso8601()),
    }
}

/// Returns the first character in `text` that cannot appear inside a cell.
pub fn find_reserved(text: &str) -> Option<char> {
    text.chars()
        .find(|&c| c == FIELD_SEPARATOR || c == '\n' || c == '\r')
}

/// Decodes cell text for a field of the given declared kind.
pub fn decode_scalar(text: &str, kind: ScalarKind) -> Result<Cell, ScalarError> {
    match text {
        "" => return Ok(Cell::Omitted),
        NULL_LITERAL => return Ok(Cell::Value(Scalar::Null)),
        TRUE_SENTINEL => return decode_sentinel(true, kind).map(Cell::Value),
        FALSE_SENTINEL => return decode_sentinel(false, kind).map(Cell::Value),
        _ => {}
    }

    let value = match kind {
        ScalarKind::Integer => text
            .parse::<i64>()
            .map(Scalar::Integer)
            .map_err(|_| invalid(kind, text))?,
        ScalarKind::Float => text
            .parse::<f64>()
            .map(Scalar::Float)
            .map_err(|_| invalid(kind, text))?,
        ScalarKind::Text => Scalar::Text(text.to_string()),
        // Older CF-Migrator documents spell booleans out
        ScalarKind::Boolean => match text {
            "True" => Scalar::Boolean(true),
            "False" => Scalar::Boolean(false),
            _ => return Err(invalid(kind, text)),
        },
        ScalarKind::Timestamp => Timestamp::parse(text)
            .map(Scalar::Timestamp)
            .map_err(|e| ScalarError::InvalidTimestamp {
                text: text.to_string(),
                reason: e.message,
            })?,
    };

    Ok(Cell::Value(value))
}

fn decode_sentinel(value: bool, kind: ScalarKind) -> Result<Scalar, ScalarError> {
    match kind {
        ScalarKind::Boolean => Ok(Scalar::Boolean(value)),
        ScalarKind::Integer => Ok(Scalar::Integer(value as i64)),
        _ => Err(ScalarError::UnexpectedSentinel { kind }),
    }
}

fn invalid(kind: ScalarKind, text: &str) -> ScalarError {
    ScalarError::InvalidLiteral {
        kind,
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn value(text: &str, kind: ScalarKind) -> Scalar {
        match decode_scalar(text, kind).unwrap() {
            Cell::Value(v) => v,
            Cell::Omitted => panic!("{:?} decoded as omitted", text),
        }
    }

    #[test]
    fn test_encode_sentinels() {
        assert_eq!(encode_scalar(&Scalar::Null), "None");
        assert_eq!(encode_scalar(&Scalar::Boolean(true)), "🬀");
        assert_eq!(encode_scalar(&Scalar::Boolean(false)), "🬁");
        assert_ne!(TRUE_SENTINEL, FALSE_SENTINEL);
    }

    #[test]
    fn test_separator_glyph() {
        assert_eq!(FIELD_SEPARATOR, '╵');
        assert_eq!("Ford╵".split(FIELD_SEPARATOR).collect::<Vec<_>>(), ["Ford", ""]);
    }

    #[test]
    fn test_encode_numbers() {
        assert_eq!(encode_scalar(&Scalar::Integer(-42)), "-42");
        assert_eq!(encode_scalar(&Scalar::Float(0.1)), "0.1");
        assert_eq!(encode_scalar(&Scalar::Float(2.0)), "2");
    }

    #[test]
    fn test_encode_timestamp() {
        let ts = Timestamp::parse("2024-03-15T14:30:00.25+00:00").unwrap();
        assert_eq!(encode_scalar(&ts.into()), "2024-03-15T14:30:00.25+00:00");
    }

    #[test]
    fn test_empty_is_omitted_not_null() {
        for kind in [
            ScalarKind::Integer,
            ScalarKind::Float,
            ScalarKind::Text,
            ScalarKind::Boolean,
            ScalarKind::Timestamp,
        ] {
            assert_eq!(decode_scalar("", kind), Ok(Cell::Omitted));
            assert_eq!(decode_scalar("None", kind), Ok(Cell::Value(Scalar::Null)));
        }
    }

    #[test]
    fn test_none_text_collides_with_null() {
        let none = Scalar::Text("None".into());
        let encoded = encode_scalar(&none);
        assert_eq!(value(&encoded, ScalarKind::Text), Scalar::Null);
    }

    #[test]
    fn test_decode_booleans() {
        assert_eq!(value("🬀", ScalarKind::Boolean), Scalar::Boolean(true));
        assert_eq!(value("🬁", ScalarKind::Boolean), Scalar::Boolean(false));
        assert_eq!(value("True", ScalarKind::Boolean), Scalar::Boolean(true));
        assert_eq!(value("False", ScalarKind::Boolean), Scalar::Boolean(false));
        assert_eq!(value("🬀", ScalarKind::Integer), Scalar::Integer(1));
        assert_eq!(
            decode_scalar("🬀", ScalarKind::Text),
            Err(ScalarError::UnexpectedSentinel { kind: ScalarKind::Text })
        );
        assert!(decode_scalar("yes", ScalarKind::Boolean).is_err());
    }

    #[test]
    fn test_decode_typed() {
        assert_eq!(value("7", ScalarKind::Integer), Scalar::Integer(7));
        assert_eq!(value("7", ScalarKind::Text), Scalar::Text("7".into()));
        assert_eq!(value("1.5", ScalarKind::Float), Scalar::Float(1.5));
        assert_eq!(value("3", ScalarKind::Float), Scalar::Float(3.0));
        assert_eq!(
            value("2024-03-15 14:30:00", ScalarKind::Timestamp),
            Scalar::Timestamp(Timestamp::naive(1710513000000000))
        );
    }

    #[test]
    fn test_decode_failures() {
        assert_eq!(
            decode_scalar("1.5", ScalarKind::Integer),
            Err(ScalarError::InvalidLiteral {
                kind: ScalarKind::Integer,
                text: "1.5".into(),
            })
        );
        assert!(decode_scalar("abc", ScalarKind::Float).is_err());
        assert!(matches!(
            decode_scalar("yesterday", ScalarKind::Timestamp),
            Err(ScalarError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_find_reserved() {
        assert_eq!(find_reserved("plain text"), None);
        assert_eq!(find_reserved("a\u{2575}b"), Some('\u{2575}'));
        assert_eq!(find_reserved("line\nbreak"), Some('\n'));
    }

    proptest! {
        #[test]
        fn prop_integer_roundtrip(v in any::<i64>()) {
            let value = Scalar::Integer(v);
            let text = encode_scalar(&value);
            prop_assert_eq!(decode_scalar(&text, ScalarKind::Integer), Ok(Cell::Value(value.clone())));
        }

        #[test]
        fn prop_float_roundtrip(v in any::<f64>().prop_filter("NaN never equals itself", |v| !v.is_nan())) {
            let value = Scalar::Float(v);
            let text = encode_scalar(&value);
            prop_assert_eq!(decode_scalar(&text, ScalarKind::Float), Ok(Cell::Value(value.clone())));
        }

        #[test]
        fn prop_text_roundtrip(s in "[^\u{2575}\r\n]+".prop_filter("reserved literals", |s| {
            s != NULL_LITERAL && s != TRUE_SENTINEL && s != FALSE_SENTINEL
        })) {
            let value = Scalar::Text(s);
            let text = encode_scalar(&value);
            prop_assert_eq!(decode_scalar(&text, ScalarKind::Text), Ok(Cell::Value(value.clone())));
        }

        #[test]
        fn prop_timestamp_roundtrip(
            // Years 0001 to 9999, with a day of slack for the offset
            epoch_us in -62_135_510_400_000_000i64..253_402_214_400_000_000i64,
            offset in proptest::option::of(-1440i16..=1440i16),
        ) {
            let ts = Timestamp { epoch_us, offset_min: offset };
            let value = Scalar::Timestamp(ts);
            let text = encode_scalar(&value);
            prop_assert_eq!(decode_scalar(&text, ScalarKind::Timestamp), Ok(Cell::Value(value.clone())));
        }
    }
}

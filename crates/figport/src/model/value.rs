//! Scalar types for record fields.
//!
//! Every field value moving through the codec is one of a closed set of
//! scalars. Destination schemas declare a [`ScalarKind`] per field so the
//! decoder knows how to read the text back.

use std::fmt;
use std::str::FromStr;

use crate::util::datetime::{DateTimeParseError, format_datetime_iso8601, parse_datetime_iso8601};

/// Declared type of a field in a destination schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Integer,
    Float,
    Text,
    Boolean,
    Timestamp,
}

impl ScalarKind {
    /// Returns the lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Text => "text",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A point in time, keeping the UTC offset only if the source had one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    /// Microseconds since 1970-01-01T00:00:00, UTC when `offset_min` is set.
    pub epoch_us: i64,
    /// Signed UTC offset in minutes, or None for a naive timestamp.
    pub offset_min: Option<i16>,
}

impl Timestamp {
    /// Creates a naive timestamp (no offset).
    pub fn naive(epoch_us: i64) -> Self {
        Self { epoch_us, offset_min: None }
    }

    /// Creates an offset-aware timestamp.
    pub fn with_offset(epoch_us: i64, offset_min: i16) -> Self {
        Self { epoch_us, offset_min: Some(offset_min) }
    }

    /// Parses an ISO-8601 datetime string.
    pub fn parse(text: &str) -> Result<Self, DateTimeParseError> {
        let (epoch_us, offset_min) = parse_datetime_iso8601(text)?;
        Ok(Self { epoch_us, offset_min })
    }

    /// Formats as ISO-8601, in the local time of the stored offset.
    pub fn to_iso8601(&self) -> String {
        format_datetime_iso8601(self.epoch_us, self.offset_min)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl FromStr for Timestamp {
    type Err = DateTimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::parse(s)
    }
}

/// A dynamically typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Absent value (SQL NULL).
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Timestamp(Timestamp),
}

impl Scalar {
    /// Returns the kind of this value, or None for null.
    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            Scalar::Null => None,
            Scalar::Integer(_) => Some(ScalarKind::Integer),
            Scalar::Float(_) => Some(ScalarKind::Float),
            Scalar::Text(_) => Some(ScalarKind::Text),
            Scalar::Boolean(_) => Some(ScalarKind::Boolean),
            Scalar::Timestamp(_) => Some(ScalarKind::Timestamp),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Value equality used for default elision.
    ///
    /// Same-kind values compare directly; integers and floats compare
    /// numerically so a stored `0.0` still matches a declared default of `0`.
    pub fn matches(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Integer(a), Scalar::Float(b)) | (Scalar::Float(b), Scalar::Integer(a)) => {
                (*a as f64) == *b && (*b as i64) == *a
            }
            _ => self == other,
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Integer(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Integer(v as i64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Boolean(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<Timestamp> for Scalar {
    fn from(v: Timestamp) -> Self {
        Scalar::Timestamp(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Scalar::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(Scalar::Null.kind(), None);
        assert_eq!(Scalar::from(3).kind(), Some(ScalarKind::Integer));
        assert_eq!(Scalar::from(1.5).kind(), Some(ScalarKind::Float));
        assert_eq!(Scalar::from("x").kind(), Some(ScalarKind::Text));
        assert_eq!(Scalar::from(true).kind(), Some(ScalarKind::Boolean));
        assert_eq!(
            Scalar::from(Timestamp::naive(0)).kind(),
            Some(ScalarKind::Timestamp)
        );
    }

    #[test]
    fn test_matches_numeric_cross_kind() {
        assert!(Scalar::Integer(0).matches(&Scalar::Float(0.0)));
        assert!(Scalar::Float(1.0).matches(&Scalar::Integer(1)));
        assert!(!Scalar::Float(1.5).matches(&Scalar::Integer(1)));
        assert!(!Scalar::Boolean(true).matches(&Scalar::Integer(1)));
        assert!(Scalar::Null.matches(&Scalar::Null));
        assert!(!Scalar::Null.matches(&Scalar::Text("None".into())));
    }

    #[test]
    fn test_option_into_scalar() {
        assert_eq!(Scalar::from(None::<i64>), Scalar::Null);
        assert_eq!(Scalar::from(Some("a")), Scalar::Text("a".into()));
    }

    #[test]
    fn test_timestamp_display() {
        let ts: Timestamp = "2024-03-15T14:30:00+05:30".parse().unwrap();
        assert_eq!(ts.offset_min, Some(330));
        assert_eq!(ts.to_string(), "2024-03-15T14:30:00+05:30");
    }
}

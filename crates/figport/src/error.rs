//! Error types for encoding, decoding and schema registration.

use thiserror::Error;

use crate::model::ScalarKind;

/// Stable error codes, printed as a prefix of every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// F001: Section code not in the active registry
    UnknownSection,
    /// F002: Positional field not present on the target type
    UnknownField,
    /// F003: Cell text does not parse as the declared type
    ScalarFormat,
    /// F004: Record store failure
    Persistence,
    /// F005: Malformed container, document or schema table
    Malformed,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "F001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::UnknownSection => "F001",
            ErrorCode::UnknownField => "F002",
            ErrorCode::ScalarFormat => "F003",
            ErrorCode::Persistence => "F004",
            ErrorCode::Malformed => "F005",
        }
    }
}

/// A single cell failed to convert to its declared type.
///
/// Carries no position; the line decoder wraps it in
/// [`DecodeError::ScalarFormat`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScalarError {
    #[error("{text:?} is not a valid {kind}")]
    InvalidLiteral { kind: ScalarKind, text: String },

    #[error("{text:?} is not a valid timestamp: {reason}")]
    InvalidTimestamp { text: String, reason: String },

    #[error("boolean sentinel is not valid for a {kind} field")]
    UnexpectedSentinel { kind: ScalarKind },
}

/// Error while building a registry or schema table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("[F001] unknown section code {code:?}")]
    UnknownSection { code: String },

    #[error("[F005] section code {code:?} is registered twice")]
    DuplicateSection { code: String },

    #[error("[F005] invalid section code {code:?}")]
    InvalidSectionCode { code: String },

    #[error("[F005] section {code:?} lists field {field:?} more than once")]
    DuplicateField { code: String, field: String },

    #[error("[F005] section {code:?} declares a default for {field:?} more than once")]
    DuplicateDefault { code: String, field: String },

    #[error("[F005] section {code:?} has no fields")]
    EmptySection { code: String },
}

impl RegistryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistryError::UnknownSection { .. } => ErrorCode::UnknownSection,
            _ => ErrorCode::Malformed,
        }
    }
}

/// The external record store rejected a read or a bulk insert.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[F004] {operation} for {target_type} failed: {cause}")]
pub struct PersistenceError {
    pub operation: &'static str,
    pub target_type: String,
    pub cause: String,
}

impl PersistenceError {
    pub fn new(operation: &'static str, target_type: impl Into<String>, cause: impl ToString) -> Self {
        Self {
            operation,
            target_type: target_type.into(),
            cause: cause.to_string(),
        }
    }
}

/// Error during document encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Source(#[from] PersistenceError),

    #[error(
        "[F003] {target_type} record {record} field {field:?} contains reserved character {ch:?}"
    )]
    ReservedCharacter {
        target_type: String,
        field: String,
        /// 1-based position of the record within its section.
        record: usize,
        ch: char,
    },

    #[error(
        "[F003] {target_type} record {record} would start with {prefix:?} and be read back as a marker or comment"
    )]
    ReservedPrefix {
        target_type: String,
        record: usize,
        prefix: &'static str,
    },

    #[error("[F003] {target_type} record {record} would encode to a blank line and be skipped on import")]
    BlankLine { target_type: String, record: usize },

    #[error(
        "[F003] {target_type} record {record} field {field:?} holds text that reads back as a boolean sentinel"
    )]
    SentinelText {
        target_type: String,
        field: String,
        record: usize,
    },

    #[error("[F005] zstd compression failed: {0}")]
    CompressionFailed(String),
}

impl EncodeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EncodeError::Registry(e) => e.code(),
            EncodeError::Source(_) => ErrorCode::Persistence,
            EncodeError::ReservedCharacter { .. }
            | EncodeError::ReservedPrefix { .. }
            | EncodeError::BlankLine { .. }
            | EncodeError::SentinelText { .. } => ErrorCode::ScalarFormat,
            EncodeError::CompressionFailed(_) => ErrorCode::Malformed,
        }
    }
}

/// Error during document decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === F001: Unknown section ===
    #[error("[F001] invalid section {code:?} detected on line {line}")]
    UnknownSection { code: String, line: usize },

    // === F002: Unknown field ===
    #[error(
        "[F002] unknown value {field:?} detected on line {line} - attribute {attribute} in {target_type} object"
    )]
    UnknownField {
        field: String,
        line: usize,
        /// 1-based cell position on the line.
        attribute: usize,
        target_type: String,
    },

    #[error("[F002] section {code:?} on line {line} targets {target_type}, which the destination schema does not define")]
    UnknownTargetType {
        code: String,
        target_type: String,
        line: usize,
    },

    // === F003: Scalar format ===
    #[error(
        "[F003] line {line} - attribute {attribute} ({target_type}.{field}) in section {section:?}: {source}"
    )]
    ScalarFormat {
        line: usize,
        attribute: usize,
        section: String,
        target_type: String,
        field: String,
        #[source]
        source: ScalarError,
    },

    // === F005: Malformed container/document ===
    #[error("[F005] zstd decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("[F005] document exceeds maximum size {max}")]
    DocumentTooLarge { max: usize },

    #[error("[F005] document is not valid UTF-8")]
    InvalidUtf8,

    #[error("[F005] defaults digest mismatch: document has {found}, expected {expected}")]
    DefaultsDigestMismatch { found: String, expected: String },
}

impl DecodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DecodeError::UnknownSection { .. } => ErrorCode::UnknownSection,
            DecodeError::UnknownField { .. } | DecodeError::UnknownTargetType { .. } => {
                ErrorCode::UnknownField
            }
            DecodeError::ScalarFormat { .. } => ErrorCode::ScalarFormat,
            _ => ErrorCode::Malformed,
        }
    }

    /// Returns the 1-based document line the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            DecodeError::UnknownSection { line, .. }
            | DecodeError::UnknownField { line, .. }
            | DecodeError::UnknownTargetType { line, .. }
            | DecodeError::ScalarFormat { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Error during a full import: decoding or inserting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ImportError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ImportError::Decode(e) => e.code(),
            ImportError::Persistence(_) => ErrorCode::Persistence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DecodeError::UnknownSection { code: "X".into(), line: 4 };
        assert_eq!(err.code().code(), "F001");
        assert_eq!(err.line(), Some(4));
        assert_eq!(err.to_string(), "[F001] invalid section \"X\" detected on line 4");

        let err = ImportError::from(PersistenceError::new("bulk_create", "Ball", "disk full"));
        assert_eq!(err.code(), ErrorCode::Persistence);
        assert_eq!(err.to_string(), "[F004] bulk_create for Ball failed: disk full");
    }

    #[test]
    fn test_unknown_field_message() {
        let err = DecodeError::UnknownField {
            field: "shiny".into(),
            line: 12,
            attribute: 3,
            target_type: "BallInstance".into(),
        };
        assert_eq!(
            err.to_string(),
            "[F002] unknown value \"shiny\" detected on line 12 - attribute 3 in BallInstance object"
        );
    }
}

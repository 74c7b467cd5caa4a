//! Record encoder and decoder for single lines.

use crate::codec::document::{COMMENT_PREFIX, SECTION_PREFIX};
use crate::codec::scalar::{
    Cell, FALSE_SENTINEL, FIELD_SEPARATOR, TRUE_SENTINEL, decode_scalar, encode_scalar, find_reserved,
};
use crate::error::{DecodeError, EncodeError};
use crate::model::{EntityDescriptor, Record, Scalar};
use crate::validate::TypeSchema;

/// Encodes one record as a line (without the terminator).
///
/// Cells follow [`EntityDescriptor::encoded_fields`]. A field missing from
/// the record is treated as null. When the value matches the field's
/// declared default the cell is left empty, except on a single-cell line,
/// where an empty cell would produce a blank line that readers skip.
///
/// `position` is the record's 1-based index within its section, used only
/// for error reporting.
pub fn encode_record(
    descriptor: &EntityDescriptor,
    record: &Record,
    position: usize,
) -> Result<String, EncodeError> {
    let single_cell = descriptor.width() == 1;
    let mut line = String::new();

    for (i, field) in descriptor.encoded_fields().enumerate() {
        if i > 0 {
            line.push(FIELD_SEPARATOR);
        }

        let value = record.get(field).unwrap_or(&Scalar::Null);

        if !single_cell {
            if let Some(default) = descriptor.default_for(field) {
                if value.matches(default) {
                    continue;
                }
            }
        }

        if let Scalar::Text(text) = value {
            if text == TRUE_SENTINEL || text == FALSE_SENTINEL {
                return Err(EncodeError::SentinelText {
                    target_type: descriptor.target_type().to_string(),
                    field: field.to_string(),
                    record: position,
                });
            }
        }

        let text = encode_scalar(value);
        if let Some(ch) = find_reserved(&text) {
            return Err(EncodeError::ReservedCharacter {
                target_type: descriptor.target_type().to_string(),
                field: field.to_string(),
                record: position,
                ch,
            });
        }
        line.push_str(&text);
    }

    if line.is_empty() {
        return Err(EncodeError::BlankLine {
            target_type: descriptor.target_type().to_string(),
            record: position,
        });
    }

    let prefix = if line.starts_with(SECTION_PREFIX) {
        Some(":")
    } else if line.starts_with(COMMENT_PREFIX) {
        Some(COMMENT_PREFIX)
    } else {
        None
    };
    if let Some(prefix) = prefix {
        return Err(EncodeError::ReservedPrefix {
            target_type: descriptor.target_type().to_string(),
            record: position,
            prefix,
        });
    }

    Ok(line)
}

/// Decodes one line into a record for the destination type.
///
/// Cells are matched positionally to the descriptor's fields; surplus cells
/// are ignored and missing trailing cells count as empty. Empty cells are
/// skipped before the field name is checked, so an unknown field only fails
/// when the line actually carries a value for it.
///
/// `line_no` is the 1-based line number in the document.
pub fn decode_line(
    line: &str,
    line_no: usize,
    descriptor: &EntityDescriptor,
    target: &TypeSchema,
) -> Result<Record, DecodeError> {
    let mut record = Record::with_capacity(descriptor.width());

    for (i, (field, text)) in descriptor
        .encoded_fields()
        .zip(line.split(FIELD_SEPARATOR))
        .enumerate()
    {
        if text.is_empty() {
            continue;
        }

        let attribute = i + 1;

        let Some(kind) = target.get_field(field) else {
            return Err(DecodeError::UnknownField {
                field: field.to_string(),
                line: line_no,
                attribute,
                target_type: target.name().to_string(),
            });
        };

        match decode_scalar(text, kind) {
            Ok(Cell::Value(value)) => {
                record.insert(field, value);
            }
            Ok(Cell::Omitted) => {}
            Err(source) => {
                return Err(DecodeError::ScalarFormat {
                    line: line_no,
                    attribute,
                    section: descriptor.code().to_string(),
                    target_type: target.name().to_string(),
                    field: field.to_string(),
                    source,
                });
            }
        }
    }

    Ok(record)
}

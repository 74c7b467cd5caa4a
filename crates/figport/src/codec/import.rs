//! Decode pass: document text to grouped records, then into a record sink.

use tracing::{info, warn};

use crate::codec::document::{DocumentHeader, split};
use crate::codec::line::decode_line;
use crate::error::{DecodeError, ImportError, PersistenceError};
use crate::model::Record;
use crate::registry::{DefaultsDigest, Registry};
use crate::store::RecordSink;
use crate::validate::SchemaContext;

/// Options for decoding documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Digest of the defaults table the importer expects the exporter used.
    pub expected_digest: Option<DefaultsDigest>,
    /// Fail on a digest mismatch instead of logging a warning.
    pub strict_digest: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_digest(mut self, digest: DefaultsDigest) -> Self {
        self.expected_digest = Some(digest);
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict_digest = true;
        self
    }
}

/// Decoded records of one target type, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordGroup {
    pub target_type: String,
    pub records: Vec<Record>,
}

/// A fully decoded document, not yet applied to any store.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedDocument {
    pub header: DocumentHeader,
    /// One group per target type, in the order each type first appears.
    pub groups: Vec<RecordGroup>,
}

impl DecodedDocument {
    /// Records decoded for a target type; empty if the type never appeared.
    pub fn records(&self, target_type: &str) -> &[Record] {
        self.groups
            .iter()
            .find(|g| g.target_type == target_type)
            .map_or(&[], |g| g.records.as_slice())
    }
}

/// Records inserted for one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertReport {
    pub target_type: String,
    pub records: usize,
}

/// Summary of an import, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: Vec<InsertReport>,
}

impl ImportReport {
    pub fn total_records(&self) -> usize {
        self.inserted.iter().map(|r| r.records).sum()
    }
}

/// Decodes document text against the import registry and destination schema.
///
/// Nothing is returned unless the whole document decodes: an unknown
/// section, unknown field or unparseable cell anywhere fails the call.
pub fn decode_document(
    text: &str,
    registry: &Registry,
    schema: &SchemaContext,
    options: &DecodeOptions,
) -> Result<DecodedDocument, DecodeError> {
    let parts = split(text, registry)?;
    check_digest(&parts.header, options)?;

    let mut groups: Vec<RecordGroup> = Vec::new();

    for run in &parts.runs {
        let desc = registry.resolve(run.code).map_err(|_| DecodeError::UnknownSection {
            code: run.code.to_string(),
            line: run.marker_line,
        })?;
        let target = schema.get_type(desc.target_type()).ok_or_else(|| DecodeError::UnknownTargetType {
            code: run.code.to_string(),
            target_type: desc.target_type().to_string(),
            line: run.marker_line,
        })?;

        let index = match groups.iter().position(|g| g.target_type == desc.target_type()) {
            Some(i) => i,
            None => {
                groups.push(RecordGroup {
                    target_type: desc.target_type().to_string(),
                    records: Vec::new(),
                });
                groups.len() - 1
            }
        };

        for &(line_no, line) in &run.lines {
            let record = decode_line(line, line_no, desc, target)?;
            groups[index].records.push(record);
        }
    }

    Ok(DecodedDocument {
        header: parts.header,
        groups,
    })
}

fn check_digest(header: &DocumentHeader, options: &DecodeOptions) -> Result<(), DecodeError> {
    let (Some(found), Some(expected)) = (header.defaults_digest, options.expected_digest) else {
        return Ok(());
    };
    if found == expected {
        return Ok(());
    }
    if options.strict_digest {
        return Err(DecodeError::DefaultsDigestMismatch {
            found: found.to_string(),
            expected: expected.to_string(),
        });
    }
    warn!(%found, %expected, "defaults digest mismatch; elided fields may take different defaults");
    Ok(())
}

/// Hands each record group to the sink, one type at a time.
///
/// Groups with no records are skipped. The first sink failure stops the
/// import; earlier groups stay inserted.
pub fn apply_document<K>(doc: DecodedDocument, sink: &mut K) -> Result<ImportReport, PersistenceError>
where
    K: RecordSink + ?Sized,
{
    let mut report = ImportReport::default();
    for group in doc.groups {
        if group.records.is_empty() {
            continue;
        }
        let count = group.records.len();
        sink.bulk_create(&group.target_type, group.records)?;
        info!(target_type = %group.target_type, records = count, "added {} {} objects", count, group.target_type);
        report.inserted.push(InsertReport {
            target_type: group.target_type,
            records: count,
        });
    }
    Ok(report)
}

/// Decodes `text` and applies it to `sink`.
pub fn import_document<K>(
    text: &str,
    registry: &Registry,
    schema: &SchemaContext,
    options: &DecodeOptions,
    sink: &mut K,
) -> Result<ImportReport, ImportError>
where
    K: RecordSink + ?Sized,
{
    let doc = decode_document(text, registry, schema, options)?;
    Ok(apply_document(doc, sink)?)
}

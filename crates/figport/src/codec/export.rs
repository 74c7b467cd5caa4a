//! Encode pass: record store to document text.

use tracing::info;

use crate::codec::document::{DocumentHeader, Section, assemble};
use crate::codec::line::encode_record;
use crate::error::EncodeError;
use crate::model::{EntityDescriptor, Record};
use crate::registry::Registry;
use crate::store::RecordSource;

/// Options for encoding documents.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Extra comment lines placed after the generator line.
    pub extra_header: Vec<String>,
    /// Write the registry's defaults digest into the header.
    pub embed_defaults_digest: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            extra_header: Vec::new(),
            embed_defaults_digest: true,
        }
    }
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that write only the fixed header lines.
    pub fn without_digest() -> Self {
        Self {
            embed_defaults_digest: false,
            ..Self::default()
        }
    }
}

/// Records written for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionReport {
    pub code: String,
    pub target_type: String,
    pub label: String,
    pub records: usize,
}

/// Summary of an encode pass, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub sections: Vec<SectionReport>,
}

impl ExportReport {
    pub fn total_records(&self) -> usize {
        self.sections.iter().map(|s| s.records).sum()
    }

    /// Report entry for a section code.
    pub fn section(&self, code: &str) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.code == code)
    }
}

/// Output of [`encode_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    pub text: String,
    pub report: ExportReport,
}

/// Encodes a stream of records for one descriptor.
pub fn encode_section<I>(descriptor: &EntityDescriptor, records: I) -> Result<Section, EncodeError>
where
    I: IntoIterator<Item = Record>,
{
    let lines = records
        .into_iter()
        .enumerate()
        .map(|(i, record)| encode_record(descriptor, &record, i + 1))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Section::from_lines(lines))
}

/// Reads every registered type from `source` and encodes the full document.
///
/// Sections are produced in registry order. A type with no records is
/// reported with a count of zero and gets no marker line.
pub fn encode_document<S>(
    registry: &Registry,
    source: &S,
    options: &EncodeOptions,
) -> Result<EncodedDocument, EncodeError>
where
    S: RecordSource + ?Sized,
{
    let mut sections = Vec::with_capacity(registry.len());
    let mut report = ExportReport::default();

    for desc in registry {
        let fields: Vec<&str> = desc.encoded_fields().collect();
        let records = source
            .records(desc.target_type(), &fields)?
            .collect::<Result<Vec<_>, _>>()?;

        let section = encode_section(desc, records)?;
        info!(code = desc.code(), records = section.len(), "migrated {} {}", section.len(), desc.label());

        report.sections.push(SectionReport {
            code: desc.code().to_string(),
            target_type: desc.target_type().to_string(),
            label: desc.label().to_string(),
            records: section.len(),
        });
        sections.push((desc.code(), section));
    }

    let digest = options
        .embed_defaults_digest
        .then(|| registry.defaults_digest());
    let header = DocumentHeader::generated(digest, &options.extra_header);
    let text = assemble(&header, sections.iter().map(|(code, s)| (*code, s)));

    Ok(EncodedDocument { text, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use crate::store::{MemoryStore, RecordIter};

    fn registry() -> Registry {
        Registry::builder()
            .section("R", "CarType", |s| s.label("cartypes").fields(["name", "image"]))
            .section("B", "Car", |s| s.label("cars").field("fullName").default("tradeable", true))
            .section("P", "Player", |s| s.label("players").field("discord_id"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_encode_document_layout() {
        let mut store = MemoryStore::new();
        store.insert("Car", Record::new().with("id", 2).with("fullName", "Beetle").with("tradeable", false)).unwrap();
        store.insert("Car", Record::new().with("id", 1).with("fullName", "Model T").with("tradeable", true)).unwrap();
        store.insert("Player", Record::new().with("discord_id", 42)).unwrap();

        let doc = encode_document(&registry(), &store, &EncodeOptions::without_digest()).unwrap();
        let body = doc.text.split("\n\n").nth(1).unwrap();
        assert_eq!(body, ":B\nModel T╵\nBeetle╵🬁\n:P\n42\n");

        assert!(doc.text.starts_with("// Generated with figport v"));
        assert!(!doc.text.contains("defaults-digest"));
        assert!(!doc.text.contains(":R"));

        assert_eq!(doc.report.section("R").unwrap().records, 0);
        assert_eq!(doc.report.section("B").unwrap().label, "cars");
        assert_eq!(doc.report.total_records(), 3);
    }

    #[test]
    fn test_digest_in_header() {
        let doc = encode_document(&registry(), &MemoryStore::new(), &EncodeOptions::new()).unwrap();
        let expected = format!("// defaults-digest: {}\n", registry().defaults_digest());
        assert!(doc.text.contains(&expected));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let mut store = MemoryStore::new();
        for name in ["Sport", "Classic", "Muscle"] {
            store.insert("CarType", Record::new().with("name", name).with("image", "x.png")).unwrap();
        }
        let a = encode_document(&registry(), &store, &EncodeOptions::new()).unwrap();
        let b = encode_document(&registry(), &store, &EncodeOptions::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_blank_record_aborts() {
        let mut store = MemoryStore::new();
        store.insert("Player", Record::new().with("discord_id", "")).unwrap();
        store.insert("Player", Record::new().with("discord_id", "B")).unwrap();

        let err = encode_document(&registry(), &store, &EncodeOptions::new()).unwrap_err();
        assert_eq!(
            err,
            EncodeError::BlankLine {
                target_type: "Player".into(),
                record: 1,
            }
        );
    }

    struct FailingSource;

    impl RecordSource for FailingSource {
        fn records<'a>(&'a self, target_type: &str, _fields: &[&str]) -> Result<RecordIter<'a>, PersistenceError> {
            Err(PersistenceError::new("query", target_type, "connection reset"))
        }
    }

    #[test]
    fn test_source_failure_aborts() {
        let err = encode_document(&registry(), &FailingSource, &EncodeOptions::new()).unwrap_err();
        assert_eq!(
            err,
            EncodeError::Source(PersistenceError::new("query", "CarType", "connection reset"))
        );
    }
}

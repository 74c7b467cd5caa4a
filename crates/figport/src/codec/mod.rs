//! Text encoding and decoding for figport documents.
//!
//! Layers, leaf first: [`scalar`] cells, [`line`] records, [`document`]
//! sections, then the [`export`] and [`import`] passes. [`container`] wraps
//! the finished text in zstd.

pub mod container;
pub mod document;
pub mod export;
pub mod import;
pub mod line;
pub mod scalar;

pub use container::{compress, decompress, read_document, write_document};
pub use document::{DocumentHeader, Section, SectionRun, SplitDocument, assemble, split};
pub use export::{EncodeOptions, EncodedDocument, ExportReport, SectionReport, encode_document, encode_section};
pub use import::{
    DecodeOptions, DecodedDocument, ImportReport, InsertReport, RecordGroup, apply_document,
    decode_document, import_document,
};
pub use line::{decode_line, encode_record};
pub use scalar::{Cell, decode_scalar, encode_scalar};

//! figport: line-oriented interchange format for moving relational records
//! between two applications with overlapping data models.
//!
//! # Overview
//!
//! An exporter reads every record type listed in its [`Registry`] from a
//! [`RecordSource`], writes each record as one line of `╵`-separated cells
//! under a `:CODE` section marker, and leaves cells empty where the value
//! equals a declared default. An importer splits the document with its own
//! registry, checks every non-empty cell against the destination's
//! [`SchemaContext`], and hands the decoded records to a [`RecordSink`] one
//! type at a time.
//!
//! # Quick Start
//!
//! ```rust
//! use figport::{MemoryStore, Record, Registry, ScalarKind, SchemaContext, TypeSchema};
//! use figport::codec::{DecodeOptions, EncodeOptions, decode_document, encode_document};
//!
//! let registry = Registry::builder()
//!     .section("B", "Car", |s| s.label("cars").field("name").default("tradeable", true))
//!     .build()
//!     .unwrap();
//!
//! let mut store = MemoryStore::new();
//! store.insert("Car", Record::new().with("name", "Ford").with("tradeable", true)).unwrap();
//!
//! let encoded = encode_document(&registry, &store, &EncodeOptions::new()).unwrap();
//! assert!(encoded.text.ends_with(":B\nFord╵\n"));
//!
//! let schema = SchemaContext::new().with_type(
//!     TypeSchema::new("Car")
//!         .field("name", ScalarKind::Text)
//!         .field("tradeable", ScalarKind::Boolean),
//! );
//! let decoded = decode_document(&encoded.text, &registry, &schema, &DecodeOptions::new()).unwrap();
//! assert_eq!(decoded.records("Car"), &[Record::new().with("name", "Ford")]);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Scalars, records, entity descriptors and builders
//! - [`registry`]: Section code to descriptor mapping
//! - [`codec`]: Scalar, line and document codecs plus the zstd container
//! - [`validate`]: Destination schema checks
//! - [`store`]: Record source/sink interfaces and an in-memory store
//! - [`presets`]: Built-in CarFigures and Ballsdex tables
//! - [`error`]: Error types
//! - [`limits`]: Format constants and decoding limits
//!
//! # Compatibility
//!
//! Decoding refills an empty cell from the importer's own defaults, so the
//! two sides must agree on them. Documents carry a digest of the exporter's
//! defaults table in their header; pass it to [`codec::DecodeOptions`] to
//! have mismatches reported.

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod presets;
pub mod registry;
pub mod store;
pub mod util;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{decode_document, encode_document, import_document};
pub use error::{DecodeError, EncodeError, ErrorCode, ImportError, PersistenceError, RegistryError, ScalarError};
pub use model::{DescriptorBuilder, EntityDescriptor, PRIMARY_KEY, Record, RegistryBuilder, Scalar, ScalarKind, Timestamp};
pub use registry::{DefaultsDigest, Registry};
pub use store::{MemoryStore, RecordSink, RecordSource};
pub use validate::{SchemaContext, TypeSchema, unknown_fields};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

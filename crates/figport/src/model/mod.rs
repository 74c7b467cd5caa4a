//! Data model types for figport.
//!
//! - Scalars (typed field values) and timestamps
//! - Records (field maps read from or written to a store)
//! - Entity descriptors (what one document section holds)
//! - Builders (ergonomic construction)

pub mod builder;
pub mod descriptor;
pub mod record;
pub mod value;

pub use builder::{DescriptorBuilder, RegistryBuilder};
pub use descriptor::EntityDescriptor;
pub use record::{PRIMARY_KEY, Record};
pub use value::{Scalar, ScalarKind, Timestamp};

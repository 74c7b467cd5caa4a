//! Record store interfaces.
//!
//! The codec never talks to a database directly. The encode pass reads
//! through a [`RecordSource`] and the import pass writes through a
//! [`RecordSink`]; [`MemoryStore`] implements both.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::PersistenceError;
use crate::model::Record;

/// Lazily yielded records of one type.
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Record, PersistenceError>> + 'a>;

/// Read side of a record store, consumed once per record type per export.
pub trait RecordSource {
    /// Returns every record of `target_type`, in ascending primary
    /// identifier order, carrying only the requested `fields`.
    ///
    /// A type the store has never seen yields no records.
    fn records<'a>(&'a self, target_type: &str, fields: &[&str]) -> Result<RecordIter<'a>, PersistenceError>;
}

/// Write side of a record store.
pub trait RecordSink {
    /// Creates all `records` as new instances of `target_type`.
    ///
    /// Failure is fatal to the import; records inserted by earlier calls are
    /// not rolled back.
    fn bulk_create(&mut self, target_type: &str, records: Vec<Record>) -> Result<(), PersistenceError>;
}

impl<T: RecordSource + ?Sized> RecordSource for &T {
    fn records<'a>(&'a self, target_type: &str, fields: &[&str]) -> Result<RecordIter<'a>, PersistenceError> {
        (**self).records(target_type, fields)
    }
}

impl<T: RecordSink + ?Sized> RecordSink for &mut T {
    fn bulk_create(&mut self, target_type: &str, records: Vec<Record>) -> Result<(), PersistenceError> {
        (**self).bulk_create(target_type, records)
    }
}

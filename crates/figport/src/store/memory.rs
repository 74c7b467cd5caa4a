//! In-memory record store keyed by type name and primary identifier.

use std::collections::BTreeMap;

use crate::error::PersistenceError;
use crate::model::{PRIMARY_KEY, Record};
use crate::store::{RecordIter, RecordSink, RecordSource};

/// Tables of records, each ordered by `id`.
///
/// Inserted records without an integer `id` get the next free one, the way
/// an auto-increment column would.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    tables: BTreeMap<String, BTreeMap<i64, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one record, returning the identifier it is stored under.
    pub fn insert(&mut self, target_type: &str, mut record: Record) -> Result<i64, PersistenceError> {
        let table = self.tables.entry(target_type.to_string()).or_default();
        let id = match record.get(PRIMARY_KEY) {
            None => {
                let next = table.keys().next_back().map_or(1, |last| last + 1);
                record.insert(PRIMARY_KEY, next);
                next
            }
            Some(_) => record.id().ok_or_else(|| {
                PersistenceError::new("insert", target_type, "primary key is not an integer")
            })?,
        };

        if table.contains_key(&id) {
            return Err(PersistenceError::new(
                "insert",
                target_type,
                format!("duplicate primary key {}", id),
            ));
        }
        table.insert(id, record);
        Ok(id)
    }

    /// Removes every record of every type.
    pub fn clear(&mut self) {
        self.tables.clear();
    }

    /// Number of records stored for a type.
    pub fn count(&self, target_type: &str) -> usize {
        self.tables.get(target_type).map_or(0, BTreeMap::len)
    }

    /// Records of one type in `id` order.
    pub fn get_all<'a>(&'a self, target_type: &str) -> impl Iterator<Item = &'a Record> + use<'a> {
        self.tables.get(target_type).into_iter().flat_map(|t| t.values())
    }

    /// Type names in sorted order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl RecordSource for MemoryStore {
    fn records<'a>(&'a self, target_type: &str, fields: &[&str]) -> Result<RecordIter<'a>, PersistenceError> {
        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        Ok(Box::new(self.get_all(target_type).map(move |record| {
            let names: Vec<&str> = fields.iter().map(String::as_str).collect();
            Ok(record.project(&names))
        })))
    }
}

impl RecordSink for MemoryStore {
    /// Validates the whole batch before inserting any of it.
    fn bulk_create(&mut self, target_type: &str, records: Vec<Record>) -> Result<(), PersistenceError> {
        let mut staged = self.clone();
        for record in records {
            staged
                .insert(target_type, record)
                .map_err(|e| PersistenceError::new("bulk_create", target_type, e.cause))?;
        }
        *self = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_increment() {
        let mut store = MemoryStore::new();
        assert_eq!(store.insert("Player", Record::new().with("discord_id", 10)).unwrap(), 1);
        assert_eq!(store.insert("Player", Record::new().with("id", 5)).unwrap(), 5);
        assert_eq!(store.insert("Player", Record::new()).unwrap(), 6);
        assert_eq!(store.count("Player"), 3);
        assert_eq!(store.count("Car"), 0);
    }

    #[test]
    fn test_records_ordered_and_projected() {
        let mut store = MemoryStore::new();
        store.insert("Car", Record::new().with("id", 3).with("name", "C")).unwrap();
        store.insert("Car", Record::new().with("id", 1).with("name", "A").with("weight", 900)).unwrap();

        let records: Vec<Record> = store
            .records("Car", &["name"])
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records, vec![Record::new().with("name", "A"), Record::new().with("name", "C")]);

        assert_eq!(store.records("Missing", &["name"]).unwrap().count(), 0);
    }

    #[test]
    fn test_bulk_create_all_or_nothing() {
        let mut store = MemoryStore::new();
        store.insert("Car", Record::new().with("id", 2)).unwrap();

        let err = store
            .bulk_create("Car", vec![Record::new().with("id", 1), Record::new().with("id", 2)])
            .unwrap_err();
        assert_eq!(err.operation, "bulk_create");
        assert_eq!(err.cause, "duplicate primary key 2");
        assert_eq!(store.count("Car"), 1);

        let err = store.insert("Car", Record::new().with("id", "x")).unwrap_err();
        assert_eq!(err.cause, "primary key is not an integer");
    }
}

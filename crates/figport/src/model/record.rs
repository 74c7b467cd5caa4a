//! In-memory records: a field name to scalar mapping.

use rustc_hash::FxHashMap;

use crate::model::Scalar;

/// Name of the primary identifier field used to order records.
pub const PRIMARY_KEY: &str = "id";

/// One entity instance as a map of field name to value.
///
/// Records are transient: read from a source when encoding, or produced by
/// the decoder and handed to a sink. Fields missing from the map are
/// "omitted", which is distinct from a field holding [`Scalar::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: FxHashMap<String, Scalar>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Sets a field, returning self for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, returning the previous value if there was one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Scalar> {
        self.fields.remove(name)
    }

    /// Returns the primary identifier if the record has an integer `id`.
    pub fn id(&self) -> Option<i64> {
        match self.fields.get(PRIMARY_KEY) {
            Some(Scalar::Integer(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a copy holding only the named fields that are present.
    pub fn project(&self, names: &[&str]) -> Record {
        let mut out = Record::with_capacity(names.len());
        for name in names {
            if let Some(value) = self.fields.get(*name) {
                out.fields.insert((*name).to_string(), value.clone());
            }
        }
        out
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

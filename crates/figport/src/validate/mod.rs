//! Destination schema context for decoding.
//!
//! The decoder needs to know, for the importing application, which fields
//! each record type really has and what scalar kind each one is. That
//! metadata lives in the destination record store; callers describe it with
//! a [`SchemaContext`].
//!
//! Field-name compatibility is enforced lazily by the decoder, one cell at a
//! time. [`unknown_fields`] runs the same check eagerly over a whole
//! registry, which is useful for reporting before an import starts.

use rustc_hash::FxHashMap;

use crate::model::ScalarKind;
use crate::registry::Registry;

/// Fields of one destination record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSchema {
    name: String,
    fields: FxHashMap<String, ScalarKind>,
}

impl TypeSchema {
    /// Creates a type with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: FxHashMap::default(),
        }
    }

    /// Adds a field, returning self for chaining.
    pub fn field(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.add_field(name, kind);
        self
    }

    /// Registers a field with its declared kind. Re-adding replaces the kind.
    pub fn add_field(&mut self, name: impl Into<String>, kind: ScalarKind) {
        self.fields.insert(name.into(), kind);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the declared kind for a field, if the type has it.
    pub fn get_field(&self, name: &str) -> Option<ScalarKind> {
        self.fields.get(name).copied()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Record types known to the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaContext {
    types: FxHashMap<String, TypeSchema>,
}

impl SchemaContext {
    /// Creates a new empty schema context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type, returning self for chaining.
    pub fn with_type(mut self, schema: TypeSchema) -> Self {
        self.add_type(schema);
        self
    }

    /// Registers a record type. Re-adding a name replaces it.
    pub fn add_type(&mut self, schema: TypeSchema) {
        self.types.insert(schema.name.clone(), schema);
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeSchema> {
        self.types.get(name)
    }
}

/// A registry entry whose field the destination type does not define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub code: String,
    pub target_type: String,
    pub field: String,
    /// 1-based position on an encoded line.
    pub attribute: usize,
}

/// Lists every registry field the schema does not recognize.
///
/// A missing target type reports all of its section's fields. Unlike the
/// decoder, this also flags fields whose cells might always be empty in
/// practice; treat the result as advisory.
pub fn unknown_fields(registry: &Registry, schema: &SchemaContext) -> Vec<FieldMismatch> {
    let mut out = Vec::new();
    for desc in registry {
        let target = schema.get_type(desc.target_type());
        for (i, field) in desc.encoded_fields().enumerate() {
            if target.and_then(|t| t.get_field(field)).is_none() {
                out.push(FieldMismatch {
                    code: desc.code().to_string(),
                    target_type: desc.target_type().to_string(),
                    field: field.to_string(),
                    attribute: i + 1,
                });
            }
        }
    }
    out
}

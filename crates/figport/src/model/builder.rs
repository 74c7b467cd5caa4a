//! Builder API for descriptors and registries.
//!
//! # Example
//!
//! ```rust
//! use figport::model::builder::RegistryBuilder;
//!
//! let registry = RegistryBuilder::new()
//!     .section("R", "CarType", |s| s.label("cartypes").fields(["name", "image"]))
//!     .section("P", "Player", |s| s
//!         .label("players")
//!         .field("discord_id")
//!         .default("donationPolicy", 1)
//!         .default("privacyPolicy", 1)
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(registry.resolve("P").unwrap().width(), 3);
//! ```

use rustc_hash::FxHashSet;

use crate::codec::scalar::FIELD_SEPARATOR;
use crate::error::RegistryError;
use crate::model::{EntityDescriptor, Scalar};
use crate::registry::Registry;

/// Builder for a single [`EntityDescriptor`].
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    code: String,
    target_type: String,
    label: Option<String>,
    fields: Vec<String>,
    defaults: Vec<(String, Scalar)>,
}

impl DescriptorBuilder {
    /// Creates a builder for the given section code and target type.
    pub fn new(code: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            target_type: target_type.into(),
            label: None,
            fields: Vec::new(),
            defaults: Vec::new(),
        }
    }

    /// Sets the report label. Defaults to the target type name.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Appends a field to the ordered field list.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    /// Appends several fields, in order.
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declares a default value for a field.
    pub fn default(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.defaults.push((name.into(), value.into()));
        self
    }

    /// Validates and builds the descriptor.
    pub fn build(self) -> Result<EntityDescriptor, RegistryError> {
        if !is_valid_code(&self.code) {
            return Err(RegistryError::InvalidSectionCode { code: self.code });
        }

        let mut seen = FxHashSet::with_capacity_and_hasher(self.fields.len(), Default::default());
        for field in &self.fields {
            if !seen.insert(field.as_str()) {
                return Err(RegistryError::DuplicateField {
                    code: self.code.clone(),
                    field: field.clone(),
                });
            }
        }

        let mut seen_defaults = FxHashSet::with_capacity_and_hasher(self.defaults.len(), Default::default());
        for (field, _) in &self.defaults {
            if !seen_defaults.insert(field.as_str()) {
                return Err(RegistryError::DuplicateDefault {
                    code: self.code.clone(),
                    field: field.clone(),
                });
            }
        }

        if self.fields.is_empty() && self.defaults.is_empty() {
            return Err(RegistryError::EmptySection { code: self.code });
        }

        let label = self.label.unwrap_or_else(|| self.target_type.clone());
        Ok(EntityDescriptor {
            code: self.code,
            target_type: self.target_type,
            label,
            fields: self.fields,
            defaults: self.defaults,
        })
    }
}

/// Section codes must survive a round trip through a marker line.
fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| !c.is_whitespace() && !c.is_control() && c != FIELD_SEPARATOR)
}

/// Builder for a [`Registry`], keeping sections in insertion order.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    sections: Vec<DescriptorBuilder>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a section using a builder function.
    pub fn section<F>(mut self, code: impl Into<String>, target_type: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(DescriptorBuilder) -> DescriptorBuilder,
    {
        self.sections.push(f(DescriptorBuilder::new(code, target_type)));
        self
    }

    /// Builds every descriptor and the registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let descriptors = self
            .sections
            .into_iter()
            .map(DescriptorBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;
        Registry::new(descriptors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_label_to_type() {
        let desc = DescriptorBuilder::new("GC", "GuildConfig")
            .field("guild_id")
            .build()
            .unwrap();
        assert_eq!(desc.label(), "GuildConfig");
        assert_eq!(desc.code(), "GC");
    }

    #[test]
    fn test_rejects_duplicate_field() {
        let result = DescriptorBuilder::new("BI", "BallInstance")
            .fields(["special_id", "id", "special_id"])
            .build();
        assert_eq!(
            result,
            Err(RegistryError::DuplicateField {
                code: "BI".into(),
                field: "special_id".into(),
            })
        );
    }

    #[test]
    fn test_rejects_duplicate_default() {
        let result = DescriptorBuilder::new("P", "Player")
            .default("privacyPolicy", 1)
            .default("privacyPolicy", 2)
            .build();
        assert!(matches!(result, Err(RegistryError::DuplicateDefault { .. })));
    }

    #[test]
    fn test_rejects_bad_codes() {
        for code in ["", "A B", "A\u{2575}", "A\n"] {
            let result = DescriptorBuilder::new(code, "T").field("x").build();
            assert!(
                matches!(result, Err(RegistryError::InvalidSectionCode { .. })),
                "accepted {:?}",
                code
            );
        }
    }

    #[test]
    fn test_rejects_empty_section() {
        let result = DescriptorBuilder::new("E", "Economy").build();
        assert!(matches!(result, Err(RegistryError::EmptySection { .. })));
    }

    #[test]
    fn test_registry_builder_order() {
        let registry = RegistryBuilder::new()
            .section("R", "Regime", |s| s.field("name"))
            .section("E", "Economy", |s| s.field("name"))
            .build()
            .unwrap();
        let codes: Vec<&str> = registry.iter().map(|d| d.code()).collect();
        assert_eq!(codes, ["R", "E"]);
    }
}

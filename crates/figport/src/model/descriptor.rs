//! Entity descriptors: what one section of a document holds.

use crate::model::Scalar;

/// Schema metadata for one section code.
///
/// Immutable once built (see [`crate::model::DescriptorBuilder`]). The
/// positional layout of an encoded line is [`EntityDescriptor::encoded_fields`]:
/// the ordered fields, followed by any defaulted field not already listed.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    pub(crate) code: String,
    pub(crate) target_type: String,
    pub(crate) label: String,
    pub(crate) fields: Vec<String>,
    pub(crate) defaults: Vec<(String, Scalar)>,
}

impl EntityDescriptor {
    /// Section code written after the `:` marker.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Record type this section maps to.
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// Human-readable plural used in reports ("car instances").
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Ordered field names, as declared.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Declared defaults, in declaration order.
    pub fn defaults(&self) -> &[(String, Scalar)] {
        &self.defaults
    }

    /// Returns the declared default for a field, if any.
    pub fn default_for(&self, field: &str) -> Option<&Scalar> {
        self.defaults
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Field names in positional order on an encoded line.
    pub fn encoded_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str).chain(
            self.defaults
                .iter()
                .map(|(name, _)| name.as_str())
                .filter(|name| !self.fields.iter().any(|f| f == name)),
        )
    }

    /// Number of cells on a fully encoded line.
    pub fn width(&self) -> usize {
        self.encoded_fields().count()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::DescriptorBuilder;

    #[test]
    fn test_encoded_fields_union() {
        let desc = DescriptorBuilder::new("B", "Car")
            .fields(["name", "tradeable"])
            .default("tradeable", true)
            .default("enabled", true)
            .build()
            .unwrap();

        let fields: Vec<&str> = desc.encoded_fields().collect();
        assert_eq!(fields, ["name", "tradeable", "enabled"]);
        assert_eq!(desc.width(), 3);
        assert_eq!(desc.default_for("enabled"), Some(&true.into()));
        assert_eq!(desc.default_for("name"), None);
    }
}

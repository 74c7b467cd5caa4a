//! Schema registry: section code to entity descriptor.
//!
//! An export run and an import run each use their own registry. The two are
//! not required to agree on codes, field names or field order; mismatches
//! surface at decode time as [`crate::DecodeError::UnknownField`].
//!
//! The one thing the format cannot check is that both sides agree on
//! *defaults*: an elided cell is refilled by the importer's own default.
//! [`Registry::defaults_digest`] gives a fingerprint of the export-side table
//! that is written into the document header so an importer can compare.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256};

use crate::codec::scalar::encode_scalar;
use crate::error::RegistryError;
use crate::model::EntityDescriptor;
use crate::model::builder::RegistryBuilder;

/// Ordered set of entity descriptors keyed by section code.
///
/// Iteration order is registration order, which is also the order sections
/// are encoded and therefore the order record types are inserted on import.
/// Parent types must be registered before types that reference them.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    sections: Vec<EntityDescriptor>,
    index: FxHashMap<String, usize>,
}

impl Registry {
    /// Creates a registry from descriptors, rejecting duplicate codes.
    pub fn new(sections: Vec<EntityDescriptor>) -> Result<Self, RegistryError> {
        let mut index = FxHashMap::with_capacity_and_hasher(sections.len(), Default::default());
        for (i, desc) in sections.iter().enumerate() {
            if index.insert(desc.code().to_string(), i).is_some() {
                return Err(RegistryError::DuplicateSection {
                    code: desc.code().to_string(),
                });
            }
        }
        Ok(Self { sections, index })
    }

    /// Builds a registry from static tables whose validity is covered by tests.
    pub(crate) fn from_static(sections: Vec<EntityDescriptor>) -> Self {
        let index = sections
            .iter()
            .enumerate()
            .map(|(i, desc)| (desc.code().to_string(), i))
            .collect();
        Self { sections, index }
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up the descriptor for a section code.
    pub fn resolve(&self, code: &str) -> Result<&EntityDescriptor, RegistryError> {
        self.get(code).ok_or_else(|| RegistryError::UnknownSection {
            code: code.to_string(),
        })
    }

    pub fn get(&self, code: &str) -> Option<&EntityDescriptor> {
        self.index.get(code).map(|&i| &self.sections[i])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// Iterates descriptors in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, EntityDescriptor> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Fingerprint of every declared default, in registry order.
    ///
    /// ```text
    /// digest = SHA-256( for each section, for each default:
    ///                   code 0x00 field 0x00 encoded_default 0x0A )[0:16]
    /// ```
    pub fn defaults_digest(&self) -> DefaultsDigest {
        let mut hasher = Sha256::new();
        for desc in &self.sections {
            for (field, value) in desc.defaults() {
                hasher.update(desc.code().as_bytes());
                hasher.update([0u8]);
                hasher.update(field.as_bytes());
                hasher.update([0u8]);
                hasher.update(encode_scalar(value).as_bytes());
                hasher.update([b'\n']);
            }
        }
        let hash = hasher.finalize();

        let mut digest = [0u8; 16];
        digest.copy_from_slice(&hash[..16]);
        DefaultsDigest(digest)
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a EntityDescriptor;
    type IntoIter = std::slice::Iter<'a, EntityDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

/// Truncated SHA-256 over a registry's defaults table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefaultsDigest(pub [u8; 16]);

impl fmt::Display for DefaultsDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for DefaultsDigest {
    type Err = ();

    /// Parses 32 lowercase or uppercase hex digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 32 {
            return Err(());
        }
        let mut out = [0u8; 16];
        for (i, pair) in bytes.chunks_exact(2).enumerate() {
            let hi = hex_digit(pair[0]).ok_or(())?;
            let lo = hex_digit(pair[1]).ok_or(())?;
            out[i] = (hi << 4) | lo;
        }
        Ok(DefaultsDigest(out))
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

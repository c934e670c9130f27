//! Call metadata (headers).
//!
//! Header names are case-insensitive and stored lowercase. Values are ASCII
//! strings, one per name. Metadata travels in the clear next to the
//! encrypted messages.

use std::collections::{BTreeMap, btree_map};

use thiserror::Error;

/// Errors from building metadata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// Header name is empty or contains characters other than ASCII
    /// alphanumerics, `-`, `_` and `.`
    #[error("invalid header name: {0:?}")]
    InvalidName(String),

    /// Header value contains non-ASCII or control characters
    #[error("invalid value for header {name}: values must be printable ASCII")]
    InvalidValue {
        /// Header the value was meant for
        name: String,
    },
}

/// Header collection attached to a call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

impl Metadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, replacing any existing value.
    ///
    /// Returns the previous value, if any.
    pub fn insert(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>, MetadataError> {
        let (name, value) = validate(name, value.into())?;
        Ok(self.entries.insert(name, value))
    }

    /// Set `name` to `value` only if no value is present.
    ///
    /// Returns `true` if the value was inserted. An existing value is never
    /// overwritten.
    pub fn insert_if_absent(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<bool, MetadataError> {
        let (name, value) = validate(name, value.into())?;
        match self.entries.entry(name) {
            btree_map::Entry::Occupied(_) => Ok(false),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(true)
            },
        }
    }

    /// Value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Whether `name` has a value.
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Remove `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(&name.to_ascii_lowercase())
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate headers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

fn validate(name: &str, value: String) -> Result<(String, String), MetadataError> {
    let valid_name = !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    if !valid_name {
        return Err(MetadataError::InvalidName(name.to_string()));
    }

    let name = name.to_ascii_lowercase();
    if !value.bytes().all(|b| b == b' ' || b.is_ascii_graphic()) {
        return Err(MetadataError::InvalidValue { name });
    }

    Ok((name, value))
}

//! Record identity.
//!
//! A `KeySpec` is the ordered list of attribute names that identify a record
//! inside a keyed collection. Two records match when every key attribute
//! compares equal, missing attributes reading as `Null`.

use crate::record::Record;
use crate::value::Value;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

/// Ordered attribute names forming a record key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeySpec {
    attributes: Vec<String>,
}

impl Default for KeySpec {
    fn default() -> Self {
        Self {
            attributes: vec!["id".to_string()],
        }
    }
}

impl KeySpec {
    /// Creates a key from attribute names.
    pub fn new<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the key attribute names.
    #[inline]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Returns the first key attribute, if any.
    pub fn first(&self) -> Option<&str> {
        self.attributes.first().map(String::as_str)
    }

    /// Returns the key tuple of a record.
    pub fn extract(&self, record: &Record) -> Vec<Value> {
        self.attributes
            .iter()
            .map(|a| record.get_or_null(a).clone())
            .collect()
    }

    /// Returns true if both records carry the same key.
    pub fn matches(&self, a: &Record, b: &Record) -> bool {
        self.attributes
            .iter()
            .all(|attr| a.get_or_null(attr) == b.get_or_null(attr))
    }
}

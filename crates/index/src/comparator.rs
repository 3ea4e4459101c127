//! Comparators for ordering records.
//!
//! An `Organizer` is the comparison order of an ordered view: a list of
//! attributes, each with a sort order. It is built once from the declared keys
//! and then used both to keep a view sorted and to sort incoming batches the
//! same way before they are located in the view.

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use sluice_core::{Record, Value};

/// Sort order for a key attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Order {
    /// Ascending order (smallest first)
    #[default]
    Asc,
    /// Descending order (largest first)
    Desc,
}

impl Order {
    /// Applies this order to a comparison result.
    #[inline]
    pub fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            Order::Asc => ord,
            Order::Desc => ord.reverse(),
        }
    }
}

/// One attribute of an organizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    /// Attribute name
    pub attribute: String,
    /// Sort order for this attribute
    pub order: Order,
}

impl SortKey {
    /// Creates an ascending sort key.
    pub fn asc(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            order: Order::Asc,
        }
    }

    /// Creates a descending sort key.
    pub fn desc(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            order: Order::Desc,
        }
    }
}

/// Trait for comparing records.
pub trait Comparator {
    /// Compares two records according to the comparator's ordering.
    fn compare(&self, a: &Record, b: &Record) -> Ordering;

    /// Returns true if a == b according to this comparator.
    fn is_equal(&self, a: &Record, b: &Record) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    /// Returns true if a < b according to this comparator.
    fn is_less(&self, a: &Record, b: &Record) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

/// Multi-attribute comparison order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Organizer {
    keys: Vec<SortKey>,
}

impl Organizer {
    /// Creates an organizer from sort keys.
    pub fn new(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    /// Creates an ascending organizer over the given attributes.
    pub fn ascending<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: attributes.into_iter().map(SortKey::asc).collect(),
        }
    }

    /// Returns the sort keys.
    #[inline]
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Returns the key tuple of a record under this organizer.
    pub fn key_of(&self, record: &Record) -> Vec<Value> {
        self.keys
            .iter()
            .map(|k| record.get_or_null(&k.attribute).clone())
            .collect()
    }

    /// Sorts a batch of records consistently with this organizer.
    ///
    /// The sort is stable, so records with equal keys keep their batch order.
    pub fn sort(&self, records: &mut [Record]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

impl Comparator for Organizer {
    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        for key in &self.keys {
            let cmp = key
                .order
                .apply(a.get_or_null(&key.attribute).cmp(b.get_or_null(&key.attribute)));
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    }
}

//! Ordered view trait definitions.
//!
//! This module defines the `OrderedView` trait consumed by half-joins: a sorted
//! view of a changing set that answers equality lookups for whole batches.

use crate::comparator::Organizer;
use alloc::vec::Vec;
use sluice_core::Record;

/// The result of locating one record of a batch in an ordered view.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    /// The record that was looked up
    pub record: Record,
    /// True when at least one record in the view has an equal key
    pub found: bool,
    /// Every record with an equal key, populated only when all matches were requested
    pub matches: Vec<Record>,
}

/// A sorted view of a set that is kept current from the set's operations.
pub trait OrderedView {
    /// Returns the comparison order of this view.
    ///
    /// Batches passed to `locate` should be sorted with it first.
    fn organizer(&self) -> &Organizer;

    /// Locates each record of `records` in the view.
    ///
    /// When `all` is true every equal-key record is returned in
    /// `Location::matches`; otherwise only `found` is meaningful.
    fn locate(&self, records: &[Record], all: bool) -> Vec<Location>;

    /// Inserts records, keeping the view sorted.
    fn add(&mut self, records: &[Record]);

    /// Removes records equal to the given ones. Unknown records are ignored.
    fn remove(&mut self, records: &[Record]);

    /// Replaces old records by new ones.
    fn update(&mut self, pairs: &[(Record, Record)]) {
        for (old, new) in pairs {
            self.remove(core::slice::from_ref(old));
            self.add(core::slice::from_ref(new));
        }
    }

    /// Empties the view.
    fn clear(&mut self);

    /// Returns the records of the view in order.
    fn records(&self) -> &[Record];

    /// Returns the number of records in the view.
    fn len(&self) -> usize {
        self.records().len()
    }

    /// Returns true if the view is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

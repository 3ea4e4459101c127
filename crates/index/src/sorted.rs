//! Sorted-vector ordered view.

use crate::comparator::{Comparator, Organizer};
use crate::traits::{Location, OrderedView};
use alloc::vec::Vec;
use core::cmp::Ordering;
use sluice_core::Record;

/// An ordered view backed by a sorted `Vec`.
///
/// Inserts and removals are O(n) moves after an O(log n) search; batch
/// lookups walk the view once when the batch is sorted by the same organizer.
#[derive(Clone, Debug)]
pub struct SortedView {
    organizer: Organizer,
    records: Vec<Record>,
}

impl SortedView {
    /// Creates an empty view ordered by `organizer`.
    pub fn new(organizer: Organizer) -> Self {
        Self {
            organizer,
            records: Vec::new(),
        }
    }

    /// Creates a view from unsorted records.
    pub fn from_records(organizer: Organizer, mut records: Vec<Record>) -> Self {
        organizer.sort(&mut records);
        Self { organizer, records }
    }

    /// Returns the index range of records whose key equals `probe`'s, searching from `start`.
    fn equal_range(&self, probe: &Record, start: usize) -> (usize, usize) {
        let tail = &self.records[start..];
        let lower = start + tail.partition_point(|r| self.organizer.is_less(r, probe));
        let upper = lower
            + self.records[lower..]
                .partition_point(|r| self.organizer.compare(r, probe) == Ordering::Equal);
        (lower, upper)
    }
}

impl OrderedView for SortedView {
    fn organizer(&self) -> &Organizer {
        &self.organizer
    }

    fn locate(&self, records: &[Record], all: bool) -> Vec<Location> {
        let mut locations = Vec::with_capacity(records.len());
        let mut start = 0;
        let mut previous: Option<&Record> = None;

        for record in records {
            // Unsorted input falls back to searching from the beginning.
            if let Some(prev) = previous {
                if self.organizer.is_less(record, prev) {
                    start = 0;
                }
            }
            let (lower, upper) = self.equal_range(record, start);
            start = lower;
            previous = Some(record);

            let matches = if all {
                self.records[lower..upper].to_vec()
            } else {
                Vec::new()
            };
            locations.push(Location {
                record: record.clone(),
                found: upper > lower,
                matches,
            });
        }

        locations
    }

    fn add(&mut self, records: &[Record]) {
        for record in records {
            let at = self
                .records
                .partition_point(|r| self.organizer.compare(r, record) != Ordering::Greater);
            self.records.insert(at, record.clone());
        }
    }

    fn remove(&mut self, records: &[Record]) {
        for record in records {
            let (lower, upper) = self.equal_range(record, 0);
            if let Some(offset) = self.records[lower..upper].iter().position(|r| r == record) {
                self.records.remove(lower + offset);
            }
        }
    }

    fn clear(&mut self) {
        self.records.clear();
    }

    fn records(&self) -> &[Record] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use sluice_core::Value;

    fn employee(id: i64, name: &str) -> Record {
        Record::from([("id", Value::from(id)), ("name", Value::from(name))])
    }

    #[test]
    fn test_add_keeps_order() {
        let mut view = SortedView::new(Organizer::ascending(["id"]));
        view.add(&[employee(3, "c"), employee(1, "a"), employee(2, "b")]);
        let ids: Vec<_> = view.records().iter().map(|r| r.get_or_null("id").clone()).collect();
        assert_eq!(ids, vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)]);
    }

    #[test]
    fn test_remove_exact_record() {
        let mut view = SortedView::new(Organizer::ascending(["id"]));
        view.add(&[employee(1, "a"), employee(1, "b")]);
        view.remove(&[employee(1, "b")]);
        assert_eq!(view.records(), &[employee(1, "a")]);

        // Unknown record is ignored
        view.remove(&[employee(9, "z")]);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_locate_all_matches() {
        let view = SortedView::from_records(
            Organizer::ascending(["id"]),
            vec![employee(2, "x"), employee(1, "a"), employee(2, "y")],
        );
        let probes = vec![Record::from([("id", 1)]), Record::from([("id", 2)]), Record::from([("id", 5)])];
        let found = view.locate(&probes, true);

        assert_eq!(found.len(), 3);
        assert!(found[0].found);
        assert_eq!(found[0].matches, vec![employee(1, "a")]);
        assert_eq!(found[1].matches.len(), 2);
        assert!(!found[2].found);
        assert!(found[2].matches.is_empty());
    }

    #[test]
    fn test_locate_without_all_skips_matches() {
        let view = SortedView::from_records(Organizer::ascending(["id"]), vec![employee(1, "a")]);
        let found = view.locate(&[Record::from([("id", 1)])], false);
        assert!(found[0].found);
        assert!(found[0].matches.is_empty());
    }

    #[test]
    fn test_locate_unsorted_batch() {
        let view = SortedView::from_records(
            Organizer::ascending(["id"]),
            vec![employee(1, "a"), employee(2, "b")],
        );
        let found = view.locate(&[Record::from([("id", 2)]), Record::from([("id", 1)])], false);
        assert!(found[0].found);
        assert!(found[1].found);
    }

    #[test]
    fn test_update_moves_record() {
        let mut view = SortedView::new(Organizer::ascending(["id"]));
        view.add(&[employee(1, "a"), employee(2, "b")]);
        view.update(&[(employee(1, "a"), employee(3, "a"))]);
        assert_eq!(view.records(), &[employee(2, "b"), employee(3, "a")]);
    }
}

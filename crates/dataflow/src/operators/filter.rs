//! Stateless filter node.

use crate::dataflow::Operator;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use sluice_core::Record;

/// Predicate deciding whether a record passes.
pub type Predicate = Box<dyn Fn(&Record) -> bool>;

/// Passes through records matching a predicate.
///
/// An update whose old or new side is filtered out degrades to a remove
/// followed by an add.
pub struct Filter {
    predicate: Predicate,
}

impl Filter {
    /// Creates a filter node.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + 'static,
    {
        Self {
            predicate: Box::new(predicate),
        }
    }

    /// Returns true if `record` passes.
    #[inline]
    pub fn accepts(&self, record: &Record) -> bool {
        (self.predicate)(record)
    }
}

impl Operator for Filter {
    fn kind(&self) -> &'static str {
        "filter"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn transform(&self, records: Vec<Record>) -> Vec<Record> {
        records.into_iter().filter(|r| self.accepts(r)).collect()
    }
}

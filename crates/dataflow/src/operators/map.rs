//! Stateless map node.

use crate::dataflow::Operator;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use sluice_core::Record;

/// Record mapper.
pub type Mapper = Box<dyn Fn(&Record) -> Record>;

/// Transforms every record with a mapper function.
///
/// A map is one-to-one, so updates always stay updates.
pub struct Map {
    mapper: Mapper,
}

impl Map {
    /// Creates a map node.
    pub fn new<F>(mapper: F) -> Self
    where
        F: Fn(&Record) -> Record + 'static,
    {
        Self {
            mapper: Box::new(mapper),
        }
    }

    /// Creates a map node keeping only `attributes`.
    pub fn project<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<alloc::string::String>,
    {
        let attributes: Vec<alloc::string::String> =
            attributes.into_iter().map(Into::into).collect();
        Self::new(move |record| {
            attributes
                .iter()
                .filter_map(|a| record.get(a).map(|v| (a.clone(), v.clone())))
                .collect()
        })
    }
}

impl Operator for Map {
    fn kind(&self) -> &'static str {
        "map"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn transform(&self, records: Vec<Record>) -> Vec<Record> {
        records.iter().map(|r| (self.mapper)(r)).collect()
    }
}

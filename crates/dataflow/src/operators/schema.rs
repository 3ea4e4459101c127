//! Aggregator schema: measures and dimensions.
//!
//! Both are live sets keyed by `id`. A `SchemaInput` applies the operations
//! arriving on an aggregator's schema port and reports whether the schema
//! changed, so the aggregator can rebuild its grouping and reduction.

use crate::operation::Operation;
use alloc::string::String;
use alloc::vec::Vec;
use sluice_core::{Error, Record, Result, Value};

/// A schema entry that travels as a record.
pub trait SchemaEntry: Clone {
    /// Returns the entry identifier.
    fn id(&self) -> &str;

    /// Parses an entry from its record form.
    fn from_record(record: &Record) -> Result<Self>;

    /// Returns the record form of this entry.
    fn to_record(&self) -> Record;
}

fn entry_id(record: &Record) -> Result<String> {
    match record.get_or_null("id") {
        Value::String(id) if !id.is_empty() => Ok(id.clone()),
        other => Err(Error::invalid_payload(alloc::format!(
            "schema entry id must be a non-empty string, got {}",
            other
        ))),
    }
}

/// A summed attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Measure {
    /// Attribute summed per group
    pub id: String,
    /// Propagate missing and falsy values instead of counting them as zero
    pub no_null_guard: bool,
}

impl Measure {
    /// Creates a guarded measure.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            no_null_guard: false,
        }
    }

    /// Disables the null guard.
    pub fn no_null_guard(mut self) -> Self {
        self.no_null_guard = true;
        self
    }
}

impl SchemaEntry for Measure {
    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: entry_id(record)?,
            no_null_guard: record.get_or_null("no_null_guard").is_truthy(),
        })
    }

    fn to_record(&self) -> Record {
        let record = Record::new().with("id", self.id.as_str());
        if self.no_null_guard {
            record.with("no_null_guard", true)
        } else {
            record
        }
    }
}

/// A grouping attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dimension {
    /// Attribute grouped on
    pub id: String,
}

impl Dimension {
    /// Creates a dimension.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl SchemaEntry for Dimension {
    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: entry_id(record)?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new().with("id", self.id.as_str())
    }
}

/// Ordered schema set fed from an aggregator port.
#[derive(Clone, Debug)]
pub struct SchemaInput<T> {
    entries: Vec<T>,
}

impl<T> Default for SchemaInput<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: SchemaEntry> SchemaInput<T> {
    /// Creates a schema set from entries.
    pub fn new(entries: Vec<T>) -> Self {
        let mut input = Self::default();
        for entry in entries {
            input.upsert(entry);
        }
        input
    }

    /// Returns the entries in declaration order.
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    /// Inserts an entry, replacing the one with the same id in place.
    fn upsert(&mut self, entry: T) {
        match self.position(entry.id()) {
            Some(pos) => self.entries[pos] = entry,
            None => self.entries.push(entry),
        }
    }

    /// Applies a schema operation.
    ///
    /// Returns true if the operation carried anything to apply.
    pub fn apply(&mut self, operation: Operation) -> Result<bool> {
        if operation.is_empty() {
            return Ok(false);
        }
        match operation {
            Operation::Add(records) => {
                for record in &records {
                    self.upsert(T::from_record(record)?);
                }
            }
            Operation::Remove(records) => {
                for record in &records {
                    let id = entry_id(record)?;
                    if let Some(pos) = self.position(&id) {
                        self.entries.remove(pos);
                    }
                }
            }
            Operation::Update(pairs) => {
                for (old, new) in &pairs {
                    let new = T::from_record(new)?;
                    match self.position(&entry_id(old)?) {
                        Some(pos) => {
                            self.entries[pos] = new;
                            // A renamed entry may now collide with a later one
                            let id = self.entries[pos].id();
                            if let Some(dup) = self
                                .entries
                                .iter()
                                .enumerate()
                                .position(|(i, e)| i != pos && e.id() == id)
                            {
                                self.entries.remove(dup);
                            }
                        }
                        None => self.upsert(new),
                    }
                }
            }
            Operation::Clear => self.entries.clear(),
        }
        Ok(true)
    }
}

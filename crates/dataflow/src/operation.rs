//! Operation type for the propagation protocol.
//!
//! An `Operation` is one change applied to a batch of records. Operations flow
//! downstream through `add`/`remove`/`update`/`clear` calls; the optional
//! `more` flag marks operations that belong to a larger transaction.

use alloc::string::String;
use alloc::vec::Vec;
use sluice_core::{Error, Record, Result};

/// A change to a batch of records.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    /// Records entering the set
    Add(Vec<Record>),
    /// Records leaving the set
    Remove(Vec<Record>),
    /// (old, new) record pairs
    Update(Vec<(Record, Record)>),
    /// Every record leaves the set
    Clear,
}

impl Operation {
    /// Returns the action name of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add(_) => "add",
            Operation::Remove(_) => "remove",
            Operation::Update(_) => "update",
            Operation::Clear => "clear",
        }
    }

    /// Returns the number of records (or pairs) carried.
    pub fn len(&self) -> usize {
        match self {
            Operation::Add(records) | Operation::Remove(records) => records.len(),
            Operation::Update(pairs) => pairs.len(),
            Operation::Clear => 0,
        }
    }

    /// Returns true for batch operations carrying nothing.
    ///
    /// `Clear` is never empty: it has an effect without any records.
    pub fn is_empty(&self) -> bool {
        match self {
            Operation::Clear => false,
            _ => self.len() == 0,
        }
    }

    /// Builds an operation from a named action.
    pub fn from_action(action: Action) -> Result<Self> {
        match (action.name.as_str(), action.payload) {
            ("add", Payload::Records(records)) => Ok(Operation::Add(records)),
            ("remove", Payload::Records(records)) => Ok(Operation::Remove(records)),
            ("update", Payload::Pairs(pairs)) => Ok(Operation::Update(pairs)),
            ("clear", _) => Ok(Operation::Clear),
            ("add", Payload::None) | ("remove", Payload::None) | ("update", Payload::None) => {
                Ok(Self::empty(&action.name))
            }
            ("add", Payload::Pairs(_)) | ("remove", Payload::Pairs(_)) => Err(Error::invalid_payload(
                alloc::format!("{} expects records, got pairs", action.name),
            )),
            ("update", Payload::Records(_)) => {
                Err(Error::invalid_payload("update expects (old, new) pairs"))
            }
            (name, _) => Err(Error::unsupported_action(name)),
        }
    }

    fn empty(name: &str) -> Self {
        match name {
            "remove" => Operation::Remove(Vec::new()),
            "update" => Operation::Update(Vec::new()),
            _ => Operation::Add(Vec::new()),
        }
    }
}

/// Options accompanying an operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// More operations of the same transaction follow.
    ///
    /// Recipients may buffer until an operation without `more` arrives,
    /// but are not required to.
    pub more: bool,
}

impl Options {
    /// Options marking a non-final operation of a transaction.
    #[inline]
    pub fn more() -> Self {
        Self { more: true }
    }
}

/// Payload of a named action.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Payload {
    /// No payload (clear)
    #[default]
    None,
    /// Records for add or remove
    Records(Vec<Record>),
    /// (old, new) pairs for update
    Pairs(Vec<(Record, Record)>),
}

/// An operation named by string, as found in batched transactions.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    /// Action name: `add`, `remove`, `update` or `clear`
    pub name: String,
    /// Records or pairs the action applies to
    pub payload: Payload,
}

impl Action {
    /// Creates an action from a name and payload.
    pub fn new(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Creates an `add` action.
    pub fn add(records: Vec<Record>) -> Self {
        Self::new("add", Payload::Records(records))
    }

    /// Creates a `remove` action.
    pub fn remove(records: Vec<Record>) -> Self {
        Self::new("remove", Payload::Records(records))
    }

    /// Creates an `update` action.
    pub fn update(pairs: Vec<(Record, Record)>) -> Self {
        Self::new("update", Payload::Pairs(pairs))
    }

    /// Creates a `clear` action.
    pub fn clear() -> Self {
        Self::new("clear", Payload::None)
    }
}

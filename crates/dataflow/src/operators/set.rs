//! Reconciling set.
//!
//! A `Set` holds its confirmed records in `state` and the removes it could
//! not match yet in `anti_state`. An add that matches a parked entry
//! compensates the earlier remove instead of entering the set, so the final
//! membership depends only on the net count of adds and removes, never on
//! the order they arrived in.
//!
//! An incoming record matches a stored one when their keys agree and every
//! attribute the incoming side carries is equal. Key-only payloads therefore
//! match by key, while full payloads pin one version of a key, which keeps
//! chains of updates to the same key convergent under reordering.
//!
//! Lookups are linear scans.

use crate::dataflow::{Emitter, Operator, Port, Receiver, Upstream};
use crate::operation::{Operation, Options};
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;
use sluice_core::{Error, KeySpec, Record, Result, Value};
use tracing::debug;

/// Reconciling set configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetOptions {
    key: KeySpec,
    auto_increment: Option<AutoIncrement>,
    start: i64,
}

#[derive(Clone, Debug, PartialEq)]
enum AutoIncrement {
    /// Use the first key attribute.
    Key,
    Attribute(String),
}

impl SetOptions {
    /// Creates the default options: key `["id"]`, no auto-increment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key attributes.
    pub fn key<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key = KeySpec::new(attributes);
        self
    }

    /// Assigns ids to `attribute` on records lacking it.
    pub fn auto_increment(mut self, attribute: impl Into<String>) -> Self {
        self.auto_increment = Some(AutoIncrement::Attribute(attribute.into()));
        self
    }

    /// Assigns ids to the first key attribute on records lacking it.
    pub fn auto_increment_key(mut self) -> Self {
        self.auto_increment = Some(AutoIncrement::Key);
        self
    }

    /// Sets the auto-increment seed. The first assigned id is `start + 1`.
    pub fn start(mut self, start: i64) -> Self {
        self.start = start;
        self
    }

    /// Reads options from a record:
    /// `key` (comma-separated names), `auto_increment` (name or boolean),
    /// `auto_increment_start` (integer).
    pub fn from_record(options: &Record) -> Result<Self> {
        let mut parsed = SetOptions::new();

        match options.get_or_null("key") {
            Value::Null => {}
            Value::String(names) => {
                let names: Vec<&str> = names
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .collect();
                if names.is_empty() {
                    return Err(Error::invalid_options("set key must name an attribute"));
                }
                parsed = parsed.key(names);
            }
            other => {
                return Err(Error::invalid_options(alloc::format!(
                    "set key must be a string, got {}",
                    other
                )))
            }
        }

        match options.get_or_null("auto_increment") {
            Value::Null | Value::Boolean(false) => {}
            Value::Boolean(true) => parsed = parsed.auto_increment_key(),
            Value::String(name) => parsed = parsed.auto_increment(name.as_str()),
            other => {
                return Err(Error::invalid_options(alloc::format!(
                    "auto_increment must be a name or boolean, got {}",
                    other
                )))
            }
        }

        match options.get_or_null("auto_increment_start") {
            Value::Null => {}
            Value::Int64(start) => parsed = parsed.start(*start),
            other => {
                return Err(Error::invalid_options(alloc::format!(
                    "auto_increment_start must be an integer, got {}",
                    other
                )))
            }
        }

        Ok(parsed)
    }

    /// Returns the key.
    pub fn key_spec(&self) -> &KeySpec {
        &self.key
    }

    /// Returns the auto-increment attribute, if enabled.
    pub fn auto_increment_attribute(&self) -> Option<&str> {
        match &self.auto_increment {
            Some(AutoIncrement::Key) => self.key.first(),
            Some(AutoIncrement::Attribute(name)) => Some(name.as_str()),
            None => None,
        }
    }
}

/// Stateful node with anti-state reconciliation.
#[derive(Clone, Debug, Default)]
pub struct Set {
    key: KeySpec,
    state: Vec<Record>,
    anti_state: Vec<Record>,
    /// Auto-increment attribute
    auto_increment: Option<String>,
    /// Last assigned id
    counter: i64,
}

impl Set {
    /// Creates an empty set keyed on `id`.
    pub fn new() -> Self {
        Self::with_options(SetOptions::default())
    }

    /// Creates an empty set from options.
    pub fn with_options(options: SetOptions) -> Self {
        let auto_increment = options.auto_increment_attribute().map(ToString::to_string);
        Self {
            key: options.key,
            state: Vec::new(),
            anti_state: Vec::new(),
            auto_increment,
            counter: options.start,
        }
    }

    /// Returns the key.
    pub fn key(&self) -> &KeySpec {
        &self.key
    }

    /// Returns the confirmed records.
    pub fn state(&self) -> &[Record] {
        &self.state
    }

    /// Returns the parked removes awaiting their add.
    pub fn anti_state(&self) -> &[Record] {
        &self.anti_state
    }

    /// Returns the number of confirmed records.
    #[inline]
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Returns true if no record is confirmed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Assigns ids to the records lacking one, all or nothing.
    fn assign_ids(&mut self, records: &mut [Record]) -> Result<()> {
        let Some(attribute) = &self.auto_increment else {
            return Ok(());
        };
        let mut counter = self.counter;
        for record in records.iter_mut() {
            if record.get_or_null(attribute).is_null() {
                counter = counter.checked_add(1).ok_or_else(|| {
                    Error::invalid_options(alloc::format!(
                        "auto-increment on {} overflowed after {}",
                        attribute,
                        counter
                    ))
                })?;
                record.set(attribute.as_str(), counter);
            }
        }
        self.counter = counter;
        Ok(())
    }

    /// Returns the position of the confirmed record matched by `probe`.
    fn find(&self, probe: &Record) -> Option<usize> {
        self.state
            .iter()
            .position(|stored| self.key.matches(stored, probe) && stored.covers(probe))
    }

    /// Removes and returns the anti-state entry matched by `record`.
    fn take_anti(&mut self, record: &Record) -> Option<Record> {
        let pos = self
            .anti_state
            .iter()
            .position(|parked| self.key.matches(parked, record) && record.covers(parked))?;
        Some(self.anti_state.remove(pos))
    }

    fn park(&mut self, record: Record) {
        debug!(key = ?self.key.extract(&record), "parked in anti-state");
        self.anti_state.push(record);
    }
}

impl Operator for Set {
    fn kind(&self) -> &'static str {
        "set"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn add(
        &mut self,
        _port: Port,
        mut records: Vec<Record>,
        options: Options,
        out: &mut Emitter,
    ) -> Result<()> {
        self.assign_ids(&mut records)?;
        let mut added = Vec::with_capacity(records.len());
        for record in records {
            if self.take_anti(&record).is_some() {
                debug!(key = ?self.key.extract(&record), "add compensated");
                continue;
            }
            self.state.push(record.clone());
            added.push(record);
        }
        out.emit_add(added, options);
        Ok(())
    }

    fn remove(
        &mut self,
        _port: Port,
        records: Vec<Record>,
        options: Options,
        out: &mut Emitter,
    ) -> Result<()> {
        let mut removed = Vec::with_capacity(records.len());
        for record in records {
            match self.find(&record) {
                Some(pos) => removed.push(self.state.remove(pos)),
                None => self.park(record),
            }
        }
        out.emit_remove(removed, options);
        Ok(())
    }

    fn update(
        &mut self,
        _port: Port,
        pairs: Vec<(Record, Record)>,
        options: Options,
        out: &mut Emitter,
    ) -> Result<()> {
        let mut removed = Vec::new();
        let mut updated = Vec::new();
        let mut added = Vec::new();

        for (old, new) in pairs {
            match self.find(&old) {
                Some(pos) => {
                    if self.take_anti(&new).is_some() {
                        // `new` was already removed
                        removed.push(self.state.remove(pos));
                    } else {
                        let stored = core::mem::replace(&mut self.state[pos], new.clone());
                        updated.push((stored, new));
                    }
                }
                None => {
                    if self.take_anti(&new).is_none() {
                        self.state.push(new.clone());
                        added.push(new);
                    }
                    self.park(old);
                }
            }
        }

        out.emit_all(
            vec![
                Operation::Remove(removed),
                Operation::Update(updated),
                Operation::Add(added),
            ],
            options,
        );
        Ok(())
    }

    fn clear(&mut self, _port: Port, options: Options, out: &mut Emitter) -> Result<()> {
        self.state.clear();
        self.anti_state.clear();
        out.emit_clear(options);
        Ok(())
    }

    fn fetch(&self, _upstream: &Upstream<'_>, receiver: &mut Receiver<'_>) -> Result<()> {
        receiver.push(self.state.clone(), true)
    }
}

//! Node protocol definitions.
//!
//! Every pipeline node implements `Operator`. A stateless node only overrides
//! `transform`; the default `add`/`remove`/`update`/`clear` apply it and emit
//! downstream, and the default `fetch` applies it to the upstream snapshot.

use crate::dataflow::fan_in::Upstream;
use crate::dataflow::fetch::Receiver;
use crate::operation::{Operation, Options};
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;
use sluice_core::{Record, Result};

/// Unique identifier for a node in a pipeline.
pub type NodeId = u32;

/// Input port of a node.
///
/// Most nodes only read `MAIN`. Half-joins take the peer set on `FILTER`,
/// aggregators take their schema sets on `MEASURES` and `DIMENSIONS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Port(pub u8);

impl Port {
    /// Primary data input; the only port pulled by `fetch`.
    pub const MAIN: Port = Port(0);
    /// Half-join filter input.
    pub const FILTER: Port = Port(1);
    /// Aggregator measures schema input.
    pub const MEASURES: Port = Port(2);
    /// Aggregator dimensions schema input.
    pub const DIMENSIONS: Port = Port(3);
}

impl Default for Port {
    fn default() -> Self {
        Port::MAIN
    }
}

/// Operations emitted by a node while handling one incoming operation.
///
/// The pipeline replicates them to the node's destinations once the handler
/// returns.
#[derive(Debug, Default)]
pub struct Emitter {
    emitted: Vec<(Operation, Options)>,
}

impl Emitter {
    /// Creates an empty emitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits an add. Empty batches are dropped.
    pub fn emit_add(&mut self, records: Vec<Record>, options: Options) {
        self.emit(Operation::Add(records), options);
    }

    /// Emits a remove. Empty batches are dropped.
    pub fn emit_remove(&mut self, records: Vec<Record>, options: Options) {
        self.emit(Operation::Remove(records), options);
    }

    /// Emits an update. Empty batches are dropped.
    pub fn emit_update(&mut self, pairs: Vec<(Record, Record)>, options: Options) {
        self.emit(Operation::Update(pairs), options);
    }

    /// Emits a clear.
    pub fn emit_clear(&mut self, options: Options) {
        self.emit(Operation::Clear, options);
    }

    /// Emits a single operation unless it is an empty batch.
    pub fn emit(&mut self, operation: Operation, options: Options) {
        if !operation.is_empty() {
            self.emitted.push((operation, options));
        }
    }

    /// Emits several operations as one transaction.
    ///
    /// Empty batches are dropped; every remaining operation but the last
    /// carries `more`, the last carries `options`.
    pub fn emit_all(&mut self, operations: Vec<Operation>, options: Options) {
        let mut operations: Vec<Operation> =
            operations.into_iter().filter(|op| !op.is_empty()).collect();
        let last = operations.pop();
        for operation in operations {
            self.emitted.push((operation, Options::more()));
        }
        if let Some(operation) = last {
            self.emitted.push((operation, options));
        }
    }

    /// Returns true if nothing was emitted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }

    /// Returns the number of emitted operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.emitted.len()
    }

    /// Returns the emitted operations in order.
    pub fn operations(&self) -> &[(Operation, Options)] {
        &self.emitted
    }

    /// Takes the emitted operations, leaving the emitter empty.
    pub fn take(&mut self) -> Vec<(Operation, Options)> {
        core::mem::take(&mut self.emitted)
    }
}

/// A node of the dataflow graph.
pub trait Operator {
    /// Short operator name used in logs and error messages.
    fn kind(&self) -> &'static str;

    /// Returns `self` for typed inspection through `Pipeline::operator`.
    fn as_any(&self) -> &dyn Any;

    /// Maps a batch of records. Stateless nodes override only this.
    fn transform(&self, records: Vec<Record>) -> Vec<Record> {
        records
    }

    /// Handles an add arriving on `port`.
    fn add(
        &mut self,
        _port: Port,
        records: Vec<Record>,
        options: Options,
        out: &mut Emitter,
    ) -> Result<()> {
        out.emit_add(self.transform(records), options);
        Ok(())
    }

    /// Handles a remove arriving on `port`.
    fn remove(
        &mut self,
        _port: Port,
        records: Vec<Record>,
        options: Options,
        out: &mut Emitter,
    ) -> Result<()> {
        out.emit_remove(self.transform(records), options);
        Ok(())
    }

    /// Handles an update arriving on `port`.
    fn update(
        &mut self,
        _port: Port,
        pairs: Vec<(Record, Record)>,
        options: Options,
        out: &mut Emitter,
    ) -> Result<()> {
        transform_update(self, pairs, options, out);
        Ok(())
    }

    /// Handles a clear arriving on `port`.
    fn clear(&mut self, _port: Port, options: Options, out: &mut Emitter) -> Result<()> {
        out.emit_clear(options);
        Ok(())
    }

    /// Delivers this node's current snapshot to `receiver`.
    ///
    /// The receiver may be called several times; exactly one call, the last,
    /// must pass `last = true`.
    fn fetch(&self, upstream: &Upstream<'_>, receiver: &mut Receiver<'_>) -> Result<()> {
        upstream.fetch(&mut |records, last| receiver.push(self.transform(records), last))
    }
}

/// Applies `transform` to each (old, new) pair of an update.
///
/// When every pair still maps to exactly one old and one new record the
/// update is emitted as such; otherwise it degrades to a remove of all old
/// outputs followed by an add of all new outputs.
pub fn transform_update<O: Operator + ?Sized>(
    operator: &O,
    pairs: Vec<(Record, Record)>,
    options: Options,
    out: &mut Emitter,
) {
    let transformed: Vec<(Vec<Record>, Vec<Record>)> = pairs
        .into_iter()
        .map(|(old, new)| (operator.transform(vec![old]), operator.transform(vec![new])))
        .collect();

    let one_to_one = transformed
        .iter()
        .all(|(old, new)| old.len() == 1 && new.len() == 1);

    if one_to_one {
        let updates = transformed
            .into_iter()
            .filter_map(|(mut old, mut new)| Some((old.pop()?, new.pop()?)))
            .collect();
        out.emit_update(updates, options);
    } else {
        let mut removed = Vec::new();
        let mut added = Vec::new();
        for (old, new) in transformed {
            removed.extend(old);
            added.extend(new);
        }
        out.emit_all(vec![Operation::Remove(removed), Operation::Add(added)], options);
    }
}

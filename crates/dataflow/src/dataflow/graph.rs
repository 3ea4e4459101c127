//! Pipeline: the explicit context owning every node of a dataflow graph.

use crate::dataflow::fan_in::{FanIn, Upstream};
use crate::dataflow::fan_out::FanOut;
use crate::dataflow::fetch::{Receiver, Sink};
use crate::dataflow::node::{Emitter, NodeId, Operator, Port};
use crate::operation::{Action, Operation, Options};
use crate::registry::OperatorRegistry;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use hashbrown::HashMap;
use sluice_core::{Error, Record, Result};
use tracing::{debug, trace};

/// A node slot: the operator and its edges.
struct Slot {
    label: String,
    operator: Box<dyn Operator>,
    inputs: FanIn,
    outputs: FanOut,
}

/// A dataflow pipeline.
///
/// Nodes are added once and live until removed or until the pipeline is
/// dropped. Edges are owned by the pipeline; nodes never reference each
/// other and interact only through the operations the pipeline routes.
pub struct Pipeline {
    /// Counter for generating node IDs
    next_id: NodeId,
    /// Map from node ID to node slot
    slots: HashMap<NodeId, Slot>,
    /// Operator builders available to `build`
    registry: OperatorRegistry,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Creates an empty pipeline with the default operator registry.
    pub fn new() -> Self {
        Self::with_registry(OperatorRegistry::default())
    }

    /// Creates an empty pipeline using `registry` for `build`.
    pub fn with_registry(registry: OperatorRegistry) -> Self {
        Self {
            next_id: 0,
            slots: HashMap::new(),
            registry,
        }
    }

    /// Returns the operator registry.
    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    /// Returns the operator registry for registering new operators.
    pub fn registry_mut(&mut self) -> &mut OperatorRegistry {
        &mut self.registry
    }

    // ------------------------------------------------------------------
    // Construction and teardown
    // ------------------------------------------------------------------

    /// Adds a node to the pipeline.
    ///
    /// Returns the node ID assigned to this node.
    pub fn add_node<O: Operator + 'static>(&mut self, operator: O) -> NodeId {
        self.add_boxed(Box::new(operator))
    }

    /// Adds an already boxed operator.
    pub fn add_boxed(&mut self, operator: Box<dyn Operator>) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;

        let label = format!("{}#{}", operator.kind(), id);
        debug!(node = %label, "node added");
        self.slots.insert(
            id,
            Slot {
                label,
                operator,
                inputs: FanIn::new(),
                outputs: FanOut::new(),
            },
        );
        id
    }

    /// Builds a registered operator by name and adds it.
    pub fn build(&mut self, name: &str, options: &Record) -> Result<NodeId> {
        let operator = self.registry.build(name, options)?;
        Ok(self.add_boxed(operator))
    }

    /// Removes a node after detaching every edge it takes part in.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Box<dyn Operator>> {
        let slot = self.slots.remove(&id).ok_or(Error::node_not_found(id))?;

        for input in slot.inputs.inputs() {
            if let Some(source) = self.slots.get_mut(&input.node) {
                source.outputs.remove(id, input.port)?;
            }
        }
        for output in slot.outputs.destinations() {
            if let Some(dest) = self.slots.get_mut(&output.node) {
                dest.inputs.remove(id, output.port)?;
            }
        }

        debug!(node = %slot.label, "node removed");
        Ok(slot.operator)
    }

    /// Connects `source` to the `MAIN` port of `dest`.
    pub fn connect(&mut self, source: NodeId, dest: NodeId) -> Result<()> {
        self.connect_port(source, dest, Port::MAIN)
    }

    /// Connects `source` to `port` of `dest`.
    ///
    /// The source's current snapshot is delivered to `dest` as an add before
    /// the edge is linked, so `dest` starts from the same state as `source`.
    pub fn connect_port(&mut self, source: NodeId, dest: NodeId, port: Port) -> Result<()> {
        if source == dest {
            return Err(Error::topology(format!(
                "cannot connect node {} to itself",
                source
            )));
        }
        if !self.slots.contains_key(&dest) {
            return Err(Error::node_not_found(dest));
        }
        if self.slot(source)?.outputs.contains(dest, port) {
            return Err(Error::topology(format!(
                "edge {} -> {} (port {}) already exists",
                source, dest, port.0
            )));
        }
        if self.reaches(dest, source) {
            return Err(Error::topology(format!(
                "edge {} -> {} would create a cycle",
                source, dest
            )));
        }

        let initial = self.snapshot(source)?;
        if !initial.is_empty() {
            self.deliver(dest, port, Operation::Add(initial), Options::default())?;
        }

        self.slot_mut(source)?.outputs.add(dest, port)?;
        self.slot_mut(dest)?.inputs.add(source, port)?;
        debug!(source, dest, port = port.0, "connected");
        Ok(())
    }

    /// Removes the edge from `source` to `port` of `dest`.
    pub fn disconnect(&mut self, source: NodeId, dest: NodeId, port: Port) -> Result<()> {
        self.slot(dest)?;
        self.slot_mut(source)?.outputs.remove(dest, port)?;
        self.slot_mut(dest)?.inputs.remove(source, port)?;
        debug!(source, dest, port = port.0, "disconnected");
        Ok(())
    }

    /// Returns true if `to` is reachable from `from` through destinations.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut stack = vec![from];
        let mut visited = Vec::new();
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if visited.contains(&node) {
                continue;
            }
            visited.push(node);
            if let Some(slot) = self.slots.get(&node) {
                stack.extend(slot.outputs.destinations().iter().map(|d| d.node));
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    fn slot(&self, id: NodeId) -> Result<&Slot> {
        self.slots.get(&id).ok_or(Error::node_not_found(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut Slot> {
        self.slots.get_mut(&id).ok_or(Error::node_not_found(id))
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the pipeline has no nodes.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns true if the node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Returns the node label, `kind#id`.
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.slots.get(&id).map(|s| s.label.as_str())
    }

    /// Returns the sources of a node on `port`, in registration order.
    pub fn sources(&self, id: NodeId, port: Port) -> Vec<NodeId> {
        self.slots
            .get(&id)
            .map(|s| s.inputs.sources(port))
            .unwrap_or_default()
    }

    /// Returns the destinations of a node, in registration order.
    pub fn destinations(&self, id: NodeId) -> Vec<NodeId> {
        self.slots
            .get(&id)
            .map(|s| s.outputs.destinations().iter().map(|d| d.node).collect())
            .unwrap_or_default()
    }

    /// Returns the operator of a node downcast to `T`.
    pub fn operator<T: 'static>(&self, id: NodeId) -> Option<&T> {
        self.slots.get(&id)?.operator.as_any().downcast_ref::<T>()
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Adds records to a node.
    pub fn add(&mut self, node: NodeId, records: Vec<Record>, options: Options) -> Result<()> {
        self.deliver(node, Port::MAIN, Operation::Add(records), options)
    }

    /// Removes records from a node.
    pub fn remove(&mut self, node: NodeId, records: Vec<Record>, options: Options) -> Result<()> {
        self.deliver(node, Port::MAIN, Operation::Remove(records), options)
    }

    /// Updates records of a node with (old, new) pairs.
    pub fn update(
        &mut self,
        node: NodeId,
        pairs: Vec<(Record, Record)>,
        options: Options,
    ) -> Result<()> {
        self.deliver(node, Port::MAIN, Operation::Update(pairs), options)
    }

    /// Clears a node.
    pub fn clear(&mut self, node: NodeId, options: Options) -> Result<()> {
        self.deliver(node, Port::MAIN, Operation::Clear, options)
    }

    /// Applies a batch of named actions as one transaction.
    ///
    /// Every action is parsed before any is applied, so an unsupported
    /// action name leaves the pipeline untouched. All but the last
    /// operation carry `more`.
    pub fn notify(&mut self, node: NodeId, transaction: Vec<Action>) -> Result<()> {
        let operations = transaction
            .into_iter()
            .map(Operation::from_action)
            .collect::<Result<Vec<_>>>()?;

        let count = operations.len();
        for (index, operation) in operations.into_iter().enumerate() {
            let options = Options {
                more: index + 1 < count,
            };
            self.deliver(node, Port::MAIN, operation, options)?;
        }
        Ok(())
    }

    /// Hands one operation to a node and replicates what it emits.
    pub fn deliver(
        &mut self,
        node: NodeId,
        port: Port,
        operation: Operation,
        options: Options,
    ) -> Result<()> {
        let mut out = Emitter::new();
        {
            let slot = self.slot_mut(node)?;
            trace!(
                node = %slot.label,
                port = port.0,
                action = operation.name(),
                count = operation.len(),
                more = options.more,
                "deliver"
            );
            let operator = &mut slot.operator;
            match operation {
                Operation::Add(records) => operator.add(port, records, options, &mut out)?,
                Operation::Remove(records) => operator.remove(port, records, options, &mut out)?,
                Operation::Update(pairs) => operator.update(port, pairs, options, &mut out)?,
                Operation::Clear => operator.clear(port, options, &mut out)?,
            }
        }
        self.emit(node, out)
    }

    /// Replicates emitted operations to the node's destinations.
    fn emit(&mut self, node: NodeId, mut out: Emitter) -> Result<()> {
        if out.is_empty() {
            return Ok(());
        }
        let outputs = self.slot(node)?.outputs.clone();
        for (operation, options) in out.take() {
            outputs.replicate(operation, options, |dest, operation, options| {
                self.deliver(dest.node, dest.port, operation, options)
            })?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Pulls the snapshot of a node chunk by chunk.
    ///
    /// `sink` is called one or more times; the final call, and only that
    /// one, has `last = true`.
    pub fn fetch(&self, node: NodeId, sink: &mut Sink<'_>) -> Result<()> {
        let slot = self.slot(node)?;
        let upstream = Upstream::new(self, slot.inputs.sources(Port::MAIN));
        let mut receiver = Receiver::new(&slot.label, sink);
        slot.operator.fetch(&upstream, &mut receiver)?;
        receiver.finish()
    }

    /// Collects the full snapshot of a node.
    pub fn snapshot(&self, node: NodeId) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        self.fetch(node, &mut |chunk, _| {
            records.extend(chunk);
            Ok(())
        })?;
        Ok(records)
    }
}

//! Fan-in: many sources, one destination.
//!
//! Operations from any source pass through unchanged. A fetch queries the
//! `MAIN` sources in registration order and signals the end of the stream
//! once, after the last source has ended.

use crate::dataflow::fetch::Sink;
use crate::dataflow::graph::Pipeline;
use crate::dataflow::node::{NodeId, Port};
use alloc::format;
use alloc::vec::Vec;
use sluice_core::{Error, Result};

/// An incoming edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Input {
    /// Upstream node
    pub node: NodeId,
    /// Port of the owning node the edge arrives on
    pub port: Port,
}

/// Ordered list of a node's sources.
#[derive(Clone, Debug, Default)]
pub struct FanIn {
    inputs: Vec<Input>,
}

impl FanIn {
    /// Creates an empty fan-in.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `node` is registered on `port`.
    pub fn contains(&self, node: NodeId, port: Port) -> bool {
        self.inputs.iter().any(|i| i.node == node && i.port == port)
    }

    /// Registers a source. Registering it twice on the same port is an error.
    pub fn add(&mut self, node: NodeId, port: Port) -> Result<()> {
        if self.contains(node, port) {
            return Err(Error::topology(format!(
                "source {} already registered on port {}",
                node, port.0
            )));
        }
        self.inputs.push(Input { node, port });
        Ok(())
    }

    /// Unregisters a source. Removing an absent source is an error.
    pub fn remove(&mut self, node: NodeId, port: Port) -> Result<()> {
        match self.inputs.iter().position(|i| i.node == node && i.port == port) {
            Some(pos) => {
                self.inputs.remove(pos);
                Ok(())
            }
            None => Err(Error::topology(format!(
                "source {} not registered on port {}",
                node, port.0
            ))),
        }
    }

    /// Returns all incoming edges in registration order.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Returns the sources registered on `port`, in registration order.
    pub fn sources(&self, port: Port) -> Vec<NodeId> {
        self.inputs
            .iter()
            .filter(|i| i.port == port)
            .map(|i| i.node)
            .collect()
    }

    /// Returns the number of incoming edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Returns true if the node has no sources.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// The `MAIN` sources of a node, as seen from inside its `fetch`.
pub struct Upstream<'a> {
    pipeline: &'a Pipeline,
    sources: Vec<NodeId>,
}

impl<'a> Upstream<'a> {
    /// Creates an upstream view over `sources`.
    pub fn new(pipeline: &'a Pipeline, sources: Vec<NodeId>) -> Self {
        Self { pipeline, sources }
    }

    /// Returns the source ids in fetch order.
    pub fn sources(&self) -> &[NodeId] {
        &self.sources
    }

    /// Fetches every source in order, concatenating their chunks.
    ///
    /// Intermediate end-of-stream signals are swallowed: `sink` sees
    /// `last = true` exactly once, with the last source's final chunk.
    /// A node without sources ends immediately with an empty chunk.
    pub fn fetch(&self, sink: &mut Sink<'_>) -> Result<()> {
        let Some(final_index) = self.sources.len().checked_sub(1) else {
            return sink(Vec::new(), true);
        };

        for (index, &source) in self.sources.iter().enumerate() {
            let is_final = index == final_index;
            self.pipeline.fetch(source, &mut |records, last| {
                if last && !is_final {
                    if records.is_empty() {
                        return Ok(());
                    }
                    return sink(records, false);
                }
                sink(records, last)
            })?;
        }
        Ok(())
    }
}

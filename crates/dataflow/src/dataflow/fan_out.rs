//! Fan-out: one source, many destinations.
//!
//! Every emitted operation is replicated to each destination in registration
//! order, synchronously. There is no atomicity across destinations: when a
//! destination fails, the ones before it keep the operation.

use crate::dataflow::node::{NodeId, Port};
use crate::operation::{Operation, Options};
use alloc::format;
use alloc::vec::Vec;
use sluice_core::{Error, Result};

/// An outgoing edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Destination {
    /// Downstream node
    pub node: NodeId,
    /// Port of the downstream node the edge arrives on
    pub port: Port,
}

/// Ordered list of a node's destinations.
#[derive(Clone, Debug, Default)]
pub struct FanOut {
    destinations: Vec<Destination>,
}

impl FanOut {
    /// Creates an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `node` is registered on `port`.
    pub fn contains(&self, node: NodeId, port: Port) -> bool {
        self.destinations
            .iter()
            .any(|d| d.node == node && d.port == port)
    }

    /// Registers a destination. Registering it twice is an error.
    pub fn add(&mut self, node: NodeId, port: Port) -> Result<()> {
        if self.contains(node, port) {
            return Err(Error::topology(format!(
                "destination {} already registered on port {}",
                node, port.0
            )));
        }
        self.destinations.push(Destination { node, port });
        Ok(())
    }

    /// Unregisters a destination. Removing an absent destination is an error.
    pub fn remove(&mut self, node: NodeId, port: Port) -> Result<()> {
        match self
            .destinations
            .iter()
            .position(|d| d.node == node && d.port == port)
        {
            Some(pos) => {
                self.destinations.remove(pos);
                Ok(())
            }
            None => Err(Error::topology(format!(
                "destination {} not registered on port {}",
                node, port.0
            ))),
        }
    }

    /// Returns the destinations in registration order.
    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// Returns the number of destinations.
    #[inline]
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// Returns true if the node has no destinations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Replicates `operation` to every destination through `deliver`.
    ///
    /// Stops at the first failing destination.
    pub fn replicate<F>(&self, operation: Operation, options: Options, mut deliver: F) -> Result<()>
    where
        F: FnMut(Destination, Operation, Options) -> Result<()>,
    {
        let Some((last, rest)) = self.destinations.split_last() else {
            return Ok(());
        };
        for destination in rest {
            deliver(*destination, operation.clone(), options)?;
        }
        deliver(*last, operation, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use sluice_core::Record;

    #[test]
    fn test_replicate_in_registration_order() {
        let mut fan_out = FanOut::new();
        fan_out.add(7, Port::MAIN).unwrap();
        fan_out.add(4, Port::FILTER).unwrap();

        let mut seen = Vec::new();
        let op = Operation::Add(vec![Record::from([("id", 1)])]);
        fan_out
            .replicate(op.clone(), Options::default(), |d, o, _| {
                seen.push((d.node, d.port, o));
                Ok(())
            })
            .unwrap();

        assert_eq!(seen, vec![(7, Port::MAIN, op.clone()), (4, Port::FILTER, op)]);
    }

    #[test]
    fn test_replicate_stops_without_rollback() {
        let mut fan_out = FanOut::new();
        fan_out.add(1, Port::MAIN).unwrap();
        fan_out.add(2, Port::MAIN).unwrap();
        fan_out.add(3, Port::MAIN).unwrap();

        let mut delivered = Vec::new();
        let result = fan_out.replicate(Operation::Clear, Options::default(), |d, _, _| {
            if d.node == 2 {
                return Err(Error::topology("boom"));
            }
            delivered.push(d.node);
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(delivered, vec![1]);
    }

    #[test]
    fn test_duplicate_and_absent_destinations() {
        let mut fan_out = FanOut::new();
        fan_out.add(1, Port::MAIN).unwrap();
        assert!(fan_out.add(1, Port::MAIN).is_err());
        assert!(fan_out.remove(2, Port::MAIN).is_err());
        fan_out.remove(1, Port::MAIN).unwrap();
        assert!(fan_out.is_empty());
    }
}

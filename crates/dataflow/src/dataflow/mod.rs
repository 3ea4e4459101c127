//! Dataflow graph for incremental propagation.
//!
//! This module provides the pipeline that owns every node and routes
//! operations along fan-out edges, plus the pull-based fetch protocol used
//! to read snapshots back through fan-in edges.

pub mod fan_in;
pub mod fan_out;
pub mod fetch;
mod graph;
pub mod node;

pub use fan_in::{FanIn, Input, Upstream};
pub use fan_out::{Destination, FanOut};
pub use fetch::{Receiver, Sink};
pub use graph::Pipeline;
pub use node::{transform_update, Emitter, NodeId, Operator, Port};

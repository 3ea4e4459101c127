//! Sluice Dataflow - Order-independent incremental dataflow.
//!
//! This crate propagates record changes through a graph of nodes so that the
//! final state of every stateful node is independent of the order in which
//! changes arrive. Pipelines can therefore be sharded and fed over unordered
//! transports.
//!
//! # Core Concepts
//!
//! - `Operation`: `add`, `remove`, `update` or `clear` over a batch of records
//! - `Operator`: a node of the graph; stateless nodes only override `transform`
//! - `Pipeline`: owns the nodes, routes emitted operations along fan-out edges
//!   and answers snapshot fetches through fan-in edges
//! - `OperatorRegistry`: builds operators by name from option records
//!
//! # Operators
//!
//! - `Set`: reconciling set; unmatched removes wait in anti-state for their add
//! - `Filter` / `Map` / `PassThrough`: stateless transforms
//! - `HalfJoin` / `Pipeline::join`: an equi-join as two mirrored half-joins
//! - `Aggregator`: group-by/sum whose schema is itself a live set
//!
//! # Example
//!
//! ```rust
//! use sluice_core::Record;
//! use sluice_dataflow::{JoinOptions, JoinSpec, Options, Pipeline, Set};
//!
//! let mut pipeline = Pipeline::new();
//! let sales = pipeline.add_node(Set::new());
//! let employees = pipeline.add_node(Set::new());
//!
//! let join = pipeline
//!     .join(
//!         sales,
//!         employees,
//!         JoinSpec::new([("employee_id", "id")]).options(JoinOptions::left()),
//!     )
//!     .unwrap();
//!
//! pipeline
//!     .add(employees, vec![Record::new().with("id", 1).with("name", "Jane")], Options::default())
//!     .unwrap();
//! pipeline
//!     .add(sales, vec![Record::new().with("id", 100).with("employee_id", 1)], Options::default())
//!     .unwrap();
//!
//! let joined = pipeline.snapshot(join.output()).unwrap();
//! assert_eq!(joined.len(), 1);
//! assert!(joined[0].contains("name"));
//! ```

#![no_std]

extern crate alloc;

pub mod dataflow;
pub mod operation;
pub mod operators;
pub mod registry;

pub use dataflow::{
    transform_update, Destination, Emitter, FanIn, FanOut, Input, NodeId, Operator, Pipeline,
    Port, Receiver, Sink, Upstream,
};
pub use operation::{Action, Operation, Options, Payload};
pub use operators::{
    merge_records, Aggregator, Condition, Dimension, Filter, Group, Grouping, HalfJoin, Join,
    JoinOptions, JoinSpec, Map, Measure, MergeFn, PassThrough, SchemaEntry, SchemaInput, Set,
    SetOptions, Side,
};
pub use registry::{Builder, OperatorRegistry};

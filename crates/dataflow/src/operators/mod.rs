//! Pipeline operators.
//!
//! This module provides the nodes a pipeline is assembled from:
//! - PassThrough: forwards operations unchanged; the fan-in point of joins
//! - Filter / Map: stateless transforms
//! - Set: reconciling set with anti-state
//! - HalfJoin / join: distributable equi-join
//! - Aggregator: group-by/sum with a live schema

mod aggregate;
mod filter;
pub mod half_join;
mod join;
mod map;
mod pass_through;
pub mod schema;
mod set;

pub use aggregate::{Aggregator, Group, GroupFn, Grouping, ReduceFn};
pub use filter::{Filter, Predicate};
pub use half_join::{HalfJoin, MergeFn, Side};
pub use join::{merge_records, Condition, Join, JoinOptions, JoinSpec, ViewFactory};
pub use map::{Map, Mapper};
pub use pass_through::PassThrough;
pub use schema::{Dimension, Measure, SchemaEntry, SchemaInput};
pub use set::{Set, SetOptions};

//! Group/reduce aggregator.
//!
//! Records are bucketed by their dimension values and every measure is summed
//! per bucket. The grouping and reduction closures are rebuilt whenever the
//! schema changes on `Port::MEASURES` or `Port::DIMENSIONS`; data arrives on
//! `Port::MAIN`.
//!
//! A data `add` recomputes the aggregate of the incoming batch and replaces
//! the previous result wholesale. Data `remove` and `update` are ignored:
//! retraction is not supported.

use crate::dataflow::{Emitter, Operator, Port, Receiver, Upstream};
use crate::operation::{Operation, Options};
use crate::operators::schema::{Dimension, Measure, SchemaInput};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use sluice_core::{Record, Result, Value};
use tracing::debug;

/// Partitions a batch into groups.
pub type GroupFn = Box<dyn Fn(&[Record]) -> Grouping>;

/// Reduces groups to one output record each.
pub type ReduceFn = Box<dyn Fn(&Grouping) -> Vec<Record>>;

/// Records sharing the same dimension values.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    /// Dimension values, in dimension order
    pub values: Vec<Value>,
    /// Member records, in batch order
    pub records: Vec<Record>,
}

/// Result of grouping a batch.
#[derive(Clone, Debug, Default)]
pub struct Grouping {
    groups: HashMap<String, Group>,
    /// Group keys in first-seen order
    keys: Vec<String>,
}

impl Grouping {
    /// Returns the group keys in first-seen order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns the group with the given key.
    pub fn get(&self, key: &str) -> Option<&Group> {
        self.groups.get(key)
    }

    /// Iterates over groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Group> + '_ {
        self.keys.iter().filter_map(move |k| self.groups.get(k))
    }

    /// Returns the number of groups.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Comma-joined encoding of dimension values.
fn group_key(values: &[Value]) -> String {
    let mut key = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        value.encode_into(&mut key);
    }
    key
}

fn compile_group(dimensions: &[Dimension]) -> GroupFn {
    let attributes: Vec<String> = dimensions.iter().map(|d| d.id.clone()).collect();
    Box::new(move |records: &[Record]| {
        let mut grouping = Grouping::default();
        for record in records {
            let values: Vec<Value> = attributes
                .iter()
                .map(|a| record.get_or_null(a).clone())
                .collect();
            match grouping.groups.entry(group_key(&values)) {
                Entry::Occupied(entry) => entry.into_mut().records.push(record.clone()),
                Entry::Vacant(entry) => {
                    grouping.keys.push(entry.key().clone());
                    entry.insert(Group {
                        values,
                        records: vec![record.clone()],
                    });
                }
            }
        }
        grouping
    })
}

fn compile_reduce(measures: &[Measure], dimensions: &[Dimension]) -> ReduceFn {
    let measures = measures.to_vec();
    let attributes: Vec<String> = dimensions.iter().map(|d| d.id.clone()).collect();
    Box::new(move |grouping: &Grouping| {
        grouping
            .iter()
            .map(|group| {
                let mut output: Record = attributes
                    .iter()
                    .cloned()
                    .zip(group.values.iter().cloned())
                    .collect();
                for measure in &measures {
                    output.set(measure.id.as_str(), sum(&group.records, measure));
                }
                output
            })
            .collect()
    })
}

/// Reads one measure value as a summand.
fn summand(value: &Value, guarded: bool) -> Value {
    if guarded && !value.is_truthy() {
        return Value::Int64(0);
    }
    match value {
        Value::Int64(_) | Value::Float64(_) => value.clone(),
        Value::Boolean(b) => Value::Int64(i64::from(*b)),
        Value::Null | Value::String(_) => Value::Float64(f64::NAN),
    }
}

fn add_values(acc: Value, value: Value) -> Value {
    match (&acc, &value) {
        (Value::Int64(a), Value::Int64(b)) => match a.checked_add(*b) {
            Some(total) => Value::Int64(total),
            None => Value::Float64(*a as f64 + *b as f64),
        },
        _ => Value::Float64(
            acc.as_f64().unwrap_or(f64::NAN) + value.as_f64().unwrap_or(f64::NAN),
        ),
    }
}

/// Sums one measure over a group.
fn sum(records: &[Record], measure: &Measure) -> Value {
    records.iter().fold(Value::Int64(0), |acc, record| {
        add_values(
            acc,
            summand(record.get_or_null(&measure.id), !measure.no_null_guard),
        )
    })
}

/// Group-by/sum node with a live schema.
pub struct Aggregator {
    measures: SchemaInput<Measure>,
    dimensions: SchemaInput<Dimension>,
    group_fn: GroupFn,
    reduce_fn: ReduceFn,
    /// Current result
    aggregate: Vec<Record>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl Aggregator {
    /// Creates an aggregator with an initial schema.
    pub fn new(measures: Vec<Measure>, dimensions: Vec<Dimension>) -> Self {
        let measures = SchemaInput::new(measures);
        let dimensions = SchemaInput::new(dimensions);
        let group_fn = compile_group(dimensions.entries());
        let reduce_fn = compile_reduce(measures.entries(), dimensions.entries());
        Self {
            measures,
            dimensions,
            group_fn,
            reduce_fn,
            aggregate: Vec::new(),
        }
    }

    /// Returns the measures.
    pub fn measures(&self) -> &[Measure] {
        self.measures.entries()
    }

    /// Returns the dimensions.
    pub fn dimensions(&self) -> &[Dimension] {
        self.dimensions.entries()
    }

    /// Returns the current aggregate.
    pub fn aggregate(&self) -> &[Record] {
        &self.aggregate
    }

    /// Groups records by the current dimensions.
    pub fn group(&self, records: &[Record]) -> Grouping {
        (self.group_fn)(records)
    }

    /// Sums the current measures per group.
    pub fn reduce(&self, grouping: &Grouping) -> Vec<Record> {
        (self.reduce_fn)(grouping)
    }

    fn recompile(&mut self) {
        self.group_fn = compile_group(self.dimensions.entries());
        self.reduce_fn = compile_reduce(self.measures.entries(), self.dimensions.entries());
        debug!(
            measures = self.measures.entries().len(),
            dimensions = self.dimensions.entries().len(),
            "aggregator recompiled"
        );
    }

    /// Applies an operation arriving on a schema port.
    fn apply_schema(&mut self, port: Port, operation: Operation) -> Result<()> {
        let changed = if port == Port::MEASURES {
            self.measures.apply(operation)?
        } else {
            self.dimensions.apply(operation)?
        };
        if changed {
            self.recompile();
        }
        Ok(())
    }

    fn is_schema(port: Port) -> bool {
        port == Port::MEASURES || port == Port::DIMENSIONS
    }
}

impl Operator for Aggregator {
    fn kind(&self) -> &'static str {
        "aggregate"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn add(
        &mut self,
        port: Port,
        records: Vec<Record>,
        options: Options,
        out: &mut Emitter,
    ) -> Result<()> {
        if Self::is_schema(port) {
            return self.apply_schema(port, Operation::Add(records));
        }
        let result = self.reduce(&self.group(&records));
        let previous = core::mem::replace(&mut self.aggregate, result.clone());
        out.emit_all(vec![Operation::Remove(previous), Operation::Add(result)], options);
        Ok(())
    }

    fn remove(
        &mut self,
        port: Port,
        records: Vec<Record>,
        _options: Options,
        _out: &mut Emitter,
    ) -> Result<()> {
        if Self::is_schema(port) {
            return self.apply_schema(port, Operation::Remove(records));
        }
        Ok(())
    }

    fn update(
        &mut self,
        port: Port,
        pairs: Vec<(Record, Record)>,
        _options: Options,
        _out: &mut Emitter,
    ) -> Result<()> {
        if Self::is_schema(port) {
            return self.apply_schema(port, Operation::Update(pairs));
        }
        Ok(())
    }

    fn clear(&mut self, port: Port, options: Options, out: &mut Emitter) -> Result<()> {
        if Self::is_schema(port) {
            return self.apply_schema(port, Operation::Clear);
        }
        self.aggregate.clear();
        out.emit_clear(options);
        Ok(())
    }

    fn fetch(&self, _upstream: &Upstream<'_>, receiver: &mut Receiver<'_>) -> Result<()> {
        receiver.push(self.aggregate.clone(), true)
    }
}

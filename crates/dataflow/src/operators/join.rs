//! Join assembly.
//!
//! A join of A and B is two mirrored half-joins whose outputs meet in a
//! pass-through fan-in node:
//!
//! ```text
//!   A ──MAIN──▶ H0(Left) ──┐
//!   B ─FILTER─▶            ├──▶ output
//!   B ──MAIN──▶ H1(Right) ─┘
//!   A ─FILTER─▶
//! ```
//!
//! Each matched pair is emitted by exactly one half: whichever sees its
//! primary record change. Unmatched A records come from H0 when left-outer,
//! unmatched B records from H1 when right-outer.
//!
//! Clearing one set re-emits the other set's records as unmatched rows when
//! that side is outer. An outer row emitted for a record without peers is
//! not retracted when a peer arrives later.

use crate::dataflow::{NodeId, Pipeline, Port};
use crate::operators::half_join::{HalfJoin, MergeFn, Side};
use crate::operators::PassThrough;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use sluice_core::{Error, Record, Result};
use sluice_index::{OrderedView, Organizer, SortedView};
use tracing::debug;

/// Builds the ordered view a half-join filters against.
pub type ViewFactory = Rc<dyn Fn(Organizer) -> Box<dyn OrderedView>>;

/// An equality condition between an attribute of A and one of B.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Same attribute name on both sides
    Same(String),
    /// (attribute in A, attribute in B)
    Pair(String, String),
}

impl Condition {
    /// Returns the (A, B) attribute names.
    pub fn attributes(&self) -> (&str, &str) {
        match self {
            Condition::Same(name) => (name.as_str(), name.as_str()),
            Condition::Pair(a, b) => (a.as_str(), b.as_str()),
        }
    }
}

impl From<&str> for Condition {
    fn from(name: &str) -> Self {
        Condition::Same(name.into())
    }
}

impl From<(&str, &str)> for Condition {
    fn from((a, b): (&str, &str)) -> Self {
        Condition::Pair(a.into(), b.into())
    }
}

/// Outer join flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinOptions {
    /// Keep A records without a match
    pub left: bool,
    /// Keep B records without a match
    pub right: bool,
    /// Keep unmatched records of both sides
    pub outer: bool,
}

impl JoinOptions {
    /// Inner join.
    pub fn inner() -> Self {
        Self::default()
    }

    /// Left outer join.
    pub fn left() -> Self {
        Self {
            left: true,
            ..Self::default()
        }
    }

    /// Right outer join.
    pub fn right() -> Self {
        Self {
            right: true,
            ..Self::default()
        }
    }

    /// Full outer join.
    pub fn outer() -> Self {
        Self {
            outer: true,
            ..Self::default()
        }
    }

    /// Returns true if unmatched A records are emitted.
    #[inline]
    pub fn left_all(&self) -> bool {
        self.left || self.outer
    }

    /// Returns true if unmatched B records are emitted.
    #[inline]
    pub fn right_all(&self) -> bool {
        self.right || self.outer
    }
}

/// Merges two optional records, attributes of B overriding those of A.
pub fn merge_records(a: Option<&Record>, b: Option<&Record>) -> Record {
    match (a, b) {
        (Some(a), Some(b)) => a.merge(b),
        (Some(only), None) | (None, Some(only)) => only.clone(),
        (None, None) => Record::new(),
    }
}

/// Join configuration.
#[derive(Clone)]
pub struct JoinSpec {
    conditions: Vec<Condition>,
    merge: MergeFn,
    options: JoinOptions,
    view_factory: ViewFactory,
}

impl JoinSpec {
    /// Creates an inner join on `conditions` merging with `merge_records`.
    pub fn new<I, C>(conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Self {
            conditions: conditions.into_iter().map(Into::into).collect(),
            merge: Rc::new(merge_records),
            options: JoinOptions::default(),
            view_factory: Rc::new(|organizer| {
                Box::new(SortedView::new(organizer)) as Box<dyn OrderedView>
            }),
        }
    }

    /// Sets the merge function.
    pub fn merge<F>(mut self, merge: F) -> Self
    where
        F: Fn(Option<&Record>, Option<&Record>) -> Record + 'static,
    {
        self.merge = Rc::new(merge);
        self
    }

    /// Sets the outer join flags.
    pub fn options(mut self, options: JoinOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the ordered view implementation used by both half-joins.
    pub fn view_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(Organizer) -> Box<dyn OrderedView> + 'static,
    {
        self.view_factory = Rc::new(factory);
        self
    }

    /// Returns the conditions.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns the outer join flags.
    pub fn join_options(&self) -> JoinOptions {
        self.options
    }

    fn pairs(&self) -> Vec<(String, String)> {
        self.conditions
            .iter()
            .map(|c| {
                let (a, b) = c.attributes();
                (a.into(), b.into())
            })
            .collect()
    }

    fn half(&self, side: Side) -> HalfJoin {
        let pairs = self.pairs();
        let organizer = match side {
            Side::Left => Organizer::ascending(pairs.iter().map(|(_, b)| b.clone())),
            Side::Right => Organizer::ascending(pairs.iter().map(|(a, _)| a.clone())),
        };
        let (all, peer_all) = match side {
            Side::Left => (self.options.left_all(), self.options.right_all()),
            Side::Right => (self.options.right_all(), self.options.left_all()),
        };
        HalfJoin::new(
            side,
            pairs,
            self.merge.clone(),
            all,
            (self.view_factory)(organizer),
        )
        .peer_all(peer_all)
    }
}

/// Node ids of an assembled join.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Join {
    /// Half-join primary on A
    pub left: NodeId,
    /// Half-join primary on B
    pub right: NodeId,
    /// Fan-in node carrying the join result
    pub output: NodeId,
}

impl Join {
    /// Returns the node to connect downstream consumers to.
    pub fn output(&self) -> NodeId {
        self.output
    }
}

impl Pipeline {
    /// Joins sets `a` and `b`.
    ///
    /// Returns the ids of both half-joins and of the output node.
    pub fn join(&mut self, a: NodeId, b: NodeId, spec: JoinSpec) -> Result<Join> {
        if spec.conditions.is_empty() {
            return Err(Error::invalid_options("join needs at least one condition"));
        }
        if !self.contains(a) {
            return Err(Error::node_not_found(a));
        }
        if !self.contains(b) {
            return Err(Error::node_not_found(b));
        }

        let left = self.add_node(spec.half(Side::Left));
        let right = self.add_node(spec.half(Side::Right));
        let output = self.add_node(PassThrough::new());

        self.connect_port(b, left, Port::FILTER)?;
        self.connect_port(a, left, Port::MAIN)?;
        self.connect_port(a, right, Port::FILTER)?;
        self.connect_port(b, right, Port::MAIN)?;
        self.connect(left, output)?;
        self.connect(right, output)?;

        debug!(a, b, left, right, output, "join assembled");
        Ok(Join {
            left,
            right,
            output,
        })
    }
}

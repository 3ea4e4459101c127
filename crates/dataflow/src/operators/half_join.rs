//! Half-join: one side of a distributable join.
//!
//! A half-join filters the operations of its primary set (on `Port::MAIN`)
//! against an ordered view of the other set (fed on `Port::FILTER`). Changes
//! to the view emit nothing; the mirror half-join reacts to them instead.
//! Two half-joins with opposite sides, merged by a fan-in node, form a join.

use crate::dataflow::{transform_update, Emitter, Operator, Port, Receiver, Upstream};
use crate::operation::{Operation, Options};
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;
use sluice_core::{Record, Result};
use sluice_index::{Comparator, OrderedView};

/// Merges a record of A and a record of B into one output record.
///
/// Under outer semantics one side is `None`; the function must handle it.
pub type MergeFn = Rc<dyn Fn(Option<&Record>, Option<&Record>) -> Record>;

/// Which set a half-join is primary on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Primary on A, filtered against B. Produces the join snapshot.
    Left,
    /// Primary on B, filtered against A.
    Right,
}

/// One half of a join.
pub struct HalfJoin {
    side: Side,
    /// (attribute in A, attribute in B) pairs
    conditions: Vec<(String, String)>,
    merge: MergeFn,
    /// Emit unmatched primary records
    all: bool,
    /// The mirror half emits unmatched records of the other side
    peer_all: bool,
    /// Ordered view of the other set, keyed on its join attributes
    view: Box<dyn OrderedView>,
}

impl HalfJoin {
    /// Creates a half-join.
    ///
    /// `view` must be ordered on the other side's condition attributes.
    pub fn new(
        side: Side,
        conditions: Vec<(String, String)>,
        merge: MergeFn,
        all: bool,
        view: Box<dyn OrderedView>,
    ) -> Self {
        Self {
            side,
            conditions,
            merge,
            all,
            peer_all: false,
            view,
        }
    }

    /// Sets whether the mirror half-join is outer.
    ///
    /// Clearing the primary set then re-emits every record of the other set
    /// as unmatched, since nothing else would.
    pub fn peer_all(mut self, peer_all: bool) -> Self {
        self.peer_all = peer_all;
        self
    }

    /// Returns the primary side.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Returns true if unmatched primary records are emitted.
    pub fn is_all(&self) -> bool {
        self.all
    }

    /// Returns the view of the other set.
    pub fn view(&self) -> &dyn OrderedView {
        self.view.as_ref()
    }

    /// Builds the lookup record of `primary`, renamed to the other side's attributes.
    fn probe(&self, primary: &Record) -> Record {
        self.conditions
            .iter()
            .map(|(a, b)| match self.side {
                Side::Left => (b.clone(), primary.get_or_null(a).clone()),
                Side::Right => (a.clone(), primary.get_or_null(b).clone()),
            })
            .collect()
    }

    /// Calls `merge` with arguments in (A, B) order.
    fn merge_pair(&self, primary: Option<&Record>, other: Option<&Record>) -> Record {
        match self.side {
            Side::Left => (self.merge)(primary, other),
            Side::Right => (self.merge)(other, primary),
        }
    }

    /// Probes a batch, sorted by the view's organizer.
    fn located(&self, records: Vec<Record>, all: bool) -> Vec<(Record, Vec<Record>, bool)> {
        let organizer = self.view.organizer();
        let mut probes: Vec<(Record, Record)> = records
            .into_iter()
            .map(|r| (self.probe(&r), r))
            .collect();
        probes.sort_by(|x, y| organizer.compare(&x.0, &y.0));

        let keys: Vec<Record> = probes.iter().map(|(probe, _)| probe.clone()).collect();
        let locations = self.view.locate(&keys, all);

        probes
            .into_iter()
            .zip(locations)
            .map(|((_, primary), location)| (primary, location.matches, location.found))
            .collect()
    }
}

impl Operator for HalfJoin {
    fn kind(&self) -> &'static str {
        match self.side {
            Side::Left => "half_join_left",
            Side::Right => "half_join_right",
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn transform(&self, records: Vec<Record>) -> Vec<Record> {
        let mut output = Vec::with_capacity(records.len());
        for (primary, matches, _) in self.located(records, true) {
            if matches.is_empty() {
                if self.all {
                    output.push(self.merge_pair(Some(&primary), None));
                }
                continue;
            }
            for other in &matches {
                output.push(self.merge_pair(Some(&primary), Some(other)));
            }
        }
        output
    }

    fn add(
        &mut self,
        port: Port,
        records: Vec<Record>,
        options: Options,
        out: &mut Emitter,
    ) -> Result<()> {
        if port == Port::FILTER {
            self.view.add(&records);
        } else {
            out.emit_add(self.transform(records), options);
        }
        Ok(())
    }

    fn remove(
        &mut self,
        port: Port,
        records: Vec<Record>,
        options: Options,
        out: &mut Emitter,
    ) -> Result<()> {
        if port == Port::FILTER {
            self.view.remove(&records);
        } else {
            out.emit_remove(self.transform(records), options);
        }
        Ok(())
    }

    fn update(
        &mut self,
        port: Port,
        pairs: Vec<(Record, Record)>,
        options: Options,
        out: &mut Emitter,
    ) -> Result<()> {
        if port == Port::FILTER {
            self.view.update(&pairs);
        } else {
            transform_update(self, pairs, options, out);
        }
        Ok(())
    }

    fn clear(&mut self, port: Port, options: Options, out: &mut Emitter) -> Result<()> {
        if port == Port::FILTER {
            self.view.clear();
        } else if self.peer_all {
            let unmatched = self
                .view
                .records()
                .iter()
                .map(|other| self.merge_pair(None, Some(other)))
                .collect();
            out.emit_all(vec![Operation::Clear, Operation::Add(unmatched)], options);
        } else {
            out.emit_clear(options);
        }
        Ok(())
    }

    /// The left half produces every matched pair and its unmatched rows;
    /// the right half only adds its unmatched rows when it is outer.
    fn fetch(&self, upstream: &Upstream<'_>, receiver: &mut Receiver<'_>) -> Result<()> {
        match (self.side, self.all) {
            (Side::Left, _) => {
                upstream.fetch(&mut |records, last| receiver.push(self.transform(records), last))
            }
            (Side::Right, false) => receiver.push(vec![], true),
            (Side::Right, true) => upstream.fetch(&mut |records, last| {
                let unmatched = self
                    .located(records, false)
                    .into_iter()
                    .filter(|(_, _, found)| !found)
                    .map(|(primary, _, _)| self.merge_pair(Some(&primary), None))
                    .collect();
                receiver.push(unmatched, last)
            }),
        }
    }
}

//! Property-based tests for sluice-dataflow using proptest.

use std::collections::BTreeMap;

use sluice_core::{Record, Value};
use sluice_dataflow::{JoinOptions, JoinSpec, Operation, Options, Pipeline, Set, SetOptions};
use proptest::prelude::*;

fn keyed(id: i64) -> Record {
    Record::new().with("id", id).with("v", "a")
}

/// Applies (is_add, id) operations one by one.
fn apply(ops: &[(bool, i64)]) -> Set {
    let mut pipeline = Pipeline::new();
    let set = pipeline.add_node(Set::new());
    for &(is_add, id) in ops {
        if is_add {
            pipeline.add(set, vec![keyed(id)], Options::default()).unwrap();
        } else {
            pipeline.remove(set, vec![keyed(id)], Options::default()).unwrap();
        }
    }
    pipeline.operator::<Set>(set).unwrap().clone()
}

fn count(records: &[Record], id: i64) -> usize {
    records
        .iter()
        .filter(|r| r.get_or_null("id") == &Value::from(id))
        .count()
}

fn ops_and_permutation() -> impl Strategy<Value = (Vec<(bool, i64)>, Vec<(bool, i64)>)> {
    prop::collection::vec((any::<bool>(), 0i64..4), 0..40)
        .prop_flat_map(|ops| (Just(ops.clone()), Just(ops).prop_shuffle()))
}

fn version(id: i64, v: i64) -> Record {
    Record::new().with("id", id).with("v", v)
}

/// Builds a valid history over keys 0..4 from (choice, key) steps.
///
/// Absent keys are added. Present keys are removed, updated in place, or
/// moved to the next key when that one is free. Every write creates a
/// fresh version so each record is unique. Returns the operations and the
/// final records.
fn history(steps: &[(u8, i64)]) -> (Vec<Operation>, Vec<Record>) {
    let mut live: BTreeMap<i64, Record> = BTreeMap::new();
    let mut ops = Vec::new();
    for (v, &(choice, id)) in steps.iter().enumerate() {
        let v = v as i64;
        let Some(current) = live.get(&id).cloned() else {
            let record = version(id, v);
            live.insert(id, record.clone());
            ops.push(Operation::Add(vec![record]));
            continue;
        };
        let target = (id + 1) % 4;
        match choice % 3 {
            0 => {
                live.remove(&id);
                ops.push(Operation::Remove(vec![current]));
            }
            2 if !live.contains_key(&target) => {
                let moved = version(target, v);
                live.remove(&id);
                live.insert(target, moved.clone());
                ops.push(Operation::Update(vec![(current, moved)]));
            }
            _ => {
                let next = version(id, v);
                live.insert(id, next.clone());
                ops.push(Operation::Update(vec![(current, next)]));
            }
        }
    }
    (ops, live.into_values().collect())
}

fn replay(ops: &[Operation]) -> Set {
    let mut pipeline = Pipeline::new();
    let set = pipeline.add_node(Set::new());
    for op in ops {
        let options = Options::default();
        match op.clone() {
            Operation::Add(records) => pipeline.add(set, records, options),
            Operation::Remove(records) => pipeline.remove(set, records, options),
            Operation::Update(pairs) => pipeline.update(set, pairs, options),
            Operation::Clear => pipeline.clear(set, options),
        }
        .unwrap();
    }
    pipeline.operator::<Set>(set).unwrap().clone()
}

fn history_and_permutation() -> impl Strategy<Value = (Vec<Operation>, Vec<Operation>, Vec<Record>)> {
    prop::collection::vec((any::<u8>(), 0i64..4), 0..40).prop_flat_map(|steps| {
        let (ops, expected) = history(&steps);
        (Just(ops.clone()), Just(ops).prop_shuffle(), Just(expected))
    })
}

fn id_of(record: Option<&Record>) -> Value {
    record.map_or(Value::Null, |r| r.get_or_null("id").clone())
}

fn pair(a: Option<&Record>, b: Option<&Record>) -> Record {
    Record::new().with("a", id_of(a)).with("b", id_of(b))
}

/// Nested-loop reference for a join on `k`.
fn expected_join(a: &[Record], b: &[Record], options: JoinOptions) -> Vec<Record> {
    let mut rows = Vec::new();
    for ra in a {
        let matches: Vec<&Record> = b.iter().filter(|rb| rb.get("k") == ra.get("k")).collect();
        if matches.is_empty() && options.left_all() {
            rows.push(pair(Some(ra), None));
        }
        for rb in matches {
            rows.push(pair(Some(ra), Some(rb)));
        }
    }
    if options.right_all() {
        for rb in b {
            if !a.iter().any(|ra| ra.get("k") == rb.get("k")) {
                rows.push(pair(None, Some(rb)));
            }
        }
    }
    rows.sort();
    rows
}

fn join_options() -> impl Strategy<Value = JoinOptions> {
    prop_oneof![
        Just(JoinOptions::inner()),
        Just(JoinOptions::left()),
        Just(JoinOptions::right()),
        Just(JoinOptions::outer()),
    ]
}

proptest! {
    /// Test that final set membership does not depend on delivery order.
    #[test]
    fn set_order_independence((ops, shuffled) in ops_and_permutation()) {
        let ordered = apply(&ops);
        let reordered = apply(&shuffled);

        for id in 0..4 {
            let net: i64 = ops
                .iter()
                .filter(|(_, k)| *k == id)
                .map(|(is_add, _)| if *is_add { 1 } else { -1 })
                .sum();
            let expected = net.max(0) as usize;
            prop_assert_eq!(count(ordered.state(), id), expected);
            prop_assert_eq!(count(reordered.state(), id), expected);
            // A key never lives in both collections
            prop_assert!(count(ordered.state(), id) == 0 || count(ordered.anti_state(), id) == 0);
        }
    }

    /// Test that histories with update chains converge under any delivery order.
    #[test]
    fn set_update_chains_converge((ops, shuffled, expected) in history_and_permutation()) {
        let ordered = replay(&ops);
        let reordered = replay(&shuffled);

        let mut state = ordered.state().to_vec();
        state.sort();
        prop_assert_eq!(&state, &expected);

        let mut state = reordered.state().to_vec();
        state.sort();
        prop_assert_eq!(&state, &expected);
        prop_assert!(reordered.anti_state().is_empty());
    }

    /// Test that a join snapshot yields every row exactly once.
    #[test]
    fn join_snapshot_uniqueness(
        a_keys in prop::collection::vec(0i64..4, 0..12),
        b_keys in prop::collection::vec(0i64..4, 0..12),
        options in join_options(),
    ) {
        let a: Vec<Record> = a_keys.iter().enumerate()
            .map(|(i, &k)| Record::new().with("id", i as i64).with("k", k))
            .collect();
        let b: Vec<Record> = b_keys.iter().enumerate()
            .map(|(i, &k)| Record::new().with("id", 100 + i as i64).with("k", k))
            .collect();

        let mut pipeline = Pipeline::new();
        let sa = pipeline.add_node(Set::new());
        let sb = pipeline.add_node(Set::new());
        pipeline.add(sa, a.clone(), Options::default()).unwrap();
        pipeline.add(sb, b.clone(), Options::default()).unwrap();
        let join = pipeline
            .join(sa, sb, JoinSpec::new(["k"]).merge(pair).options(options))
            .unwrap();

        let mut rows = pipeline.snapshot(join.output()).unwrap();
        rows.sort();
        prop_assert_eq!(rows, expected_join(&a, &b, options));
    }

    /// Test that live inner-join emissions produce each matched pair once.
    #[test]
    fn join_live_pairs_emitted_once(
        records in prop::collection::vec((any::<bool>(), 0i64..3), 0..24),
    ) {
        let mut pipeline = Pipeline::new();
        let sa = pipeline.add_node(Set::new());
        let sb = pipeline.add_node(Set::new());
        let join = pipeline
            .join(sa, sb, JoinSpec::new(["k"]).merge(pair))
            .unwrap();
        let sink = pipeline.add_node(Set::with_options(SetOptions::new().key(["a", "b"])));
        pipeline.connect(join.output(), sink).unwrap();

        let mut a = Vec::new();
        let mut b = Vec::new();
        for (i, &(to_a, k)) in records.iter().enumerate() {
            let record = Record::new().with("id", i as i64).with("k", k);
            if to_a {
                pipeline.add(sa, vec![record.clone()], Options::default()).unwrap();
                a.push(record);
            } else {
                pipeline.add(sb, vec![record.clone()], Options::default()).unwrap();
                b.push(record);
            }
        }

        let mut rows = pipeline.snapshot(sink).unwrap();
        rows.sort();
        prop_assert_eq!(rows, expected_join(&a, &b, JoinOptions::inner()));
    }
}

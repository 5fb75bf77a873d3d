//! Integration tests for FactStore

use std::collections::HashSet;

use larder_foundation::{DemandLevel, Fact, FactId, FactKind, Value, fields};
use larder_storage::{DuplicatePolicy, FactStore};
use proptest::prelude::*;

fn catalogue() -> FactStore {
    let mut store = FactStore::new();
    for (name, stock) in [("Leche", 4), ("Arroz", 60), ("Pan", 0)] {
        store.assert(Fact::product(name)).unwrap();
        store.assert(Fact::stock(name, stock)).unwrap();
    }
    store.assert(Fact::demand("Leche", DemandLevel::High)).unwrap();
    store
}

// =============================================================================
// Indexing
// =============================================================================

#[test]
fn counts_track_kind_index() {
    let mut store = catalogue();
    assert_eq!(store.count(FactKind::Product), 3);
    assert_eq!(store.count(FactKind::Stock), 3);
    assert_eq!(store.count(FactKind::Order), 0);

    let pan: Vec<FactId> = store
        .query(FactKind::Stock, &[(fields::PRODUCT, Value::from("Pan"))])
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    store.retract(pan[0]).unwrap();
    assert_eq!(store.count(FactKind::Stock), 2);
    assert_eq!(
        store
            .query(FactKind::Stock, &[(fields::PRODUCT, Value::from("Pan"))])
            .into_iter()
            .count(),
        0
    );
}

#[test]
fn query_preserves_insertion_order() {
    let store = catalogue();
    let products: Vec<_> = store
        .query(FactKind::Stock, &[])
        .into_iter()
        .filter_map(|(_, f)| f.get(fields::PRODUCT).and_then(Value::as_str))
        .collect();
    assert_eq!(products, vec!["Leche", "Arroz", "Pan"]);
}

#[test]
fn query_with_multiple_constraints() {
    let store = catalogue();
    let constraints = [
        (fields::PRODUCT, Value::from("Arroz")),
        (fields::QUANTITY, Value::Int(60)),
    ];
    assert_eq!(store.query(FactKind::Stock, &constraints).into_iter().count(), 1);

    let constraints = [
        (fields::PRODUCT, Value::from("Arroz")),
        (fields::QUANTITY, Value::Int(59)),
    ];
    assert_eq!(store.query(FactKind::Stock, &constraints).into_iter().count(), 0);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn clone_is_independent() {
    let mut store = catalogue();
    let before = store.clone();
    store.assert(Fact::order("Leche", 10)).unwrap();
    assert_eq!(before.count(FactKind::Order), 0);
    assert_eq!(store.count(FactKind::Order), 1);
}

#[test]
fn clear_keeps_handle_counter() {
    let mut store = catalogue().with_policy(DuplicatePolicy::Reject);
    let last = store.iter().map(|(id, _)| id).max().unwrap();
    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.count(FactKind::Stock), 0);

    let next = store.assert(Fact::product("Leche")).unwrap();
    assert!(next > last);
    assert_eq!(store.policy(), DuplicatePolicy::Reject);
}

// =============================================================================
// Properties
// =============================================================================

#[derive(Clone, Debug)]
enum Op {
    Assert(i64),
    Retract(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0i64..5).prop_map(Op::Assert),
        (0usize..32).prop_map(Op::Retract),
    ]
}

proptest! {
    #[test]
    fn handles_are_never_reissued(ops in prop::collection::vec(op(), 0..64)) {
        let mut store = FactStore::new();
        let mut issued = HashSet::new();
        let mut live = Vec::new();

        for op in ops {
            match op {
                Op::Assert(q) => {
                    let id = store.assert(Fact::stock("P", q)).unwrap();
                    prop_assert!(issued.insert(id));
                    live.push(id);
                }
                Op::Retract(i) if !live.is_empty() => {
                    let id = live.remove(i % live.len());
                    store.retract(id).unwrap();
                    prop_assert!(store.retract(id).is_err());
                }
                Op::Retract(_) => {}
            }
            prop_assert_eq!(store.len(), live.len());
            prop_assert_eq!(store.count(FactKind::Stock), live.len());
        }
    }
}

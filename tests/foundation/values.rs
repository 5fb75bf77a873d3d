//! Integration tests for Value

use std::cmp::Ordering;
use std::collections::HashSet;

use larder_foundation::{Value, ValueType};
use proptest::prelude::*;

// =============================================================================
// Equality and Hashing
// =============================================================================

#[test]
fn int_and_float_are_distinct_values() {
    assert_ne!(Value::Int(1), Value::Float(1.0));
    assert_eq!(
        Value::Int(1).compare_numeric(&Value::Float(1.0)),
        Some(Ordering::Equal)
    );
}

#[test]
fn signed_zeros_are_equal() {
    let mut set = HashSet::new();
    set.insert(Value::Float(0.0));
    set.insert(Value::Float(-0.0));
    assert_eq!(set.len(), 1);
}

#[test]
fn nan_equals_itself() {
    assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    assert_eq!(
        Value::Float(f64::NAN).compare_numeric(&Value::Int(1)),
        None
    );
}

// =============================================================================
// Accessors
// =============================================================================

#[test]
fn accessors_return_only_matching_types() {
    let s = Value::from("Arroz");
    assert_eq!(s.as_str(), Some("Arroz"));
    assert_eq!(s.as_int(), None);
    assert_eq!(s.value_type(), ValueType::String);

    let n = Value::from(60);
    assert_eq!(n.as_int(), Some(60));
    assert_eq!(n.as_number(), Some(60.0));
    assert!(ValueType::Number.accepts(n.value_type()));
    assert!(!ValueType::Float.accepts(n.value_type()));
}

#[test]
fn display_and_debug() {
    assert_eq!(Value::from("Pan").to_string(), "Pan");
    assert_eq!(format!("{:?}", Value::from("Pan")), "\"Pan\"");
    assert_eq!(Value::Int(-3).to_string(), "-3");
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn cross_type_order_is_total() {
    let mut values = vec![Value::Float(0.5), Value::Int(7), Value::from("a")];
    values.sort();
    assert_eq!(values, vec![Value::from("a"), Value::Int(7), Value::Float(0.5)]);
}

fn any_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        any::<f64>().prop_map(Value::Float),
        "[a-zA-Z]{0,8}".prop_map(Value::from),
    ]
}

proptest! {
    #[test]
    fn ordering_is_antisymmetric(a in any_value(), b in any_value()) {
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    #[test]
    fn equal_values_compare_equal(a in any_value()) {
        let b = a.clone();
        prop_assert_eq!(a.cmp(&b), Ordering::Equal);
        prop_assert_eq!(a, b);
    }
}

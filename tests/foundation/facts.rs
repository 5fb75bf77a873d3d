//! Integration tests for facts, kinds, and demand levels

use larder_foundation::{DemandLevel, ErrorKind, Fact, FactId, FactKind, Value, fields};

#[test]
fn typed_constructors_set_fields() {
    let fact = Fact::order("Leche", 10);
    assert_eq!(fact.kind(), FactKind::Order);
    assert_eq!(fact.get(fields::PRODUCT), Some(&Value::from("Leche")));
    assert_eq!(fact.get(fields::QUANTITY), Some(&Value::Int(10)));
    assert_eq!(fact.len(), 2);
}

#[test]
fn identical_content_is_equal() {
    assert_eq!(Fact::stock("Sal", 55), Fact::stock("Sal", 55));
    assert_ne!(Fact::stock("Sal", 55), Fact::order("Sal", 55));
}

#[test]
fn require_reports_missing_field() {
    let fact = Fact::product("Aceite");
    let err = fact.require(fields::QUANTITY).unwrap_err();
    match err.kind {
        ErrorKind::MissingField { kind, field } => {
            assert_eq!(kind, FactKind::Product);
            assert_eq!(field, fields::QUANTITY);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn debug_lists_fields_in_name_order() {
    let fact = Fact::stock("Pan", 3);
    assert_eq!(format!("{fact:?}"), "Stock(product=\"Pan\", quantity=3)");
}

#[test]
fn kinds_parse_case_insensitively() {
    for kind in FactKind::ALL {
        assert_eq!(kind.as_str().to_lowercase().parse::<FactKind>().unwrap(), kind);
    }
    assert!("Shelf".parse::<FactKind>().is_err());
}

#[test]
fn demand_levels_accept_catalogue_labels() {
    assert_eq!("Alta".parse::<DemandLevel>().unwrap(), DemandLevel::High);
    assert_eq!("media".parse::<DemandLevel>().unwrap(), DemandLevel::Medium);
    assert_eq!("Low".parse::<DemandLevel>().unwrap(), DemandLevel::Low);
    assert!("Enorme".parse::<DemandLevel>().is_err());

    let fact = Fact::demand("Arroz", "Baja".parse().unwrap());
    assert!(fact.field_equals(fields::LEVEL, &Value::from("Low")));
}

#[test]
fn fact_ids_are_ordered_and_displayed() {
    let a = FactId::from_raw(1);
    let b = a.next();
    assert!(a < b);
    assert_eq!(b.raw(), 2);
    assert_eq!(b.to_string(), "f-2");
    assert_eq!(format!("{b:?}"), "FactId(2)");
}

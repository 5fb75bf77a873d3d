//! Integration tests for pattern matching

use larder_engine::{Pattern, PatternMatcher, Template};
use larder_foundation::{Fact, FactKind, fields};
use larder_storage::FactStore;

fn order_stock() -> Pattern {
    Pattern {
        templates: vec![
            Template::new(FactKind::Order)
                .bind(fields::PRODUCT, "p")
                .bind(fields::QUANTITY, "q"),
            Template::new(FactKind::Stock)
                .bind(fields::PRODUCT, "p")
                .bind(fields::QUANTITY, "s"),
        ],
    }
}

#[test]
fn join_only_pairs_same_product() {
    let mut store = FactStore::new();
    let order = store.assert(Fact::order("Leche", 10)).unwrap();
    store.assert(Fact::stock("Arroz", 60)).unwrap();
    let stock = store.assert(Fact::stock("Leche", 4)).unwrap();

    let matches = PatternMatcher::match_pattern(&order_stock(), &store);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].facts, vec![order, stock]);
    assert_eq!(matches[0].bindings.int("q").unwrap(), 10);
    assert_eq!(matches[0].bindings.int("s").unwrap(), 4);
}

#[test]
fn discovery_order_follows_templates_then_insertion() {
    let mut store = FactStore::new();
    let s1 = store.assert(Fact::stock("A", 1)).unwrap();
    let o2 = store.assert(Fact::order("B", 2)).unwrap();
    let s2 = store.assert(Fact::stock("B", 3)).unwrap();
    let o1 = store.assert(Fact::order("A", 4)).unwrap();

    let matches = PatternMatcher::match_pattern(&order_stock(), &store);
    let facts: Vec<_> = matches.into_iter().map(|m| m.facts).collect();
    assert_eq!(facts, vec![vec![o2, s2], vec![o1, s1]]);
}

#[test]
fn pattern_reports_variables_and_kinds() {
    let pattern = order_stock();
    let vars: Vec<_> = pattern.variables().into_iter().collect();
    assert_eq!(vars, vec!["p", "q", "s"]);
    assert!(pattern.kinds().contains(&FactKind::Order));
    assert_eq!(pattern.alias_position("missing"), None);
}

#[test]
fn no_candidates_no_matches() {
    let mut store = FactStore::new();
    store.assert(Fact::order("Leche", 10)).unwrap();
    assert!(PatternMatcher::match_pattern(&order_stock(), &store).is_empty());
}

//! Integration tests for rule registration

use std::sync::Arc;

use larder_engine::{Rule, RuleRegistry, Template};
use larder_foundation::{ErrorKind, FactKind, fields};

fn stock() -> Template {
    Template::new(FactKind::Stock)
        .bind(fields::PRODUCT, "p")
        .bind(fields::QUANTITY, "c")
}

#[test]
fn registry_is_shareable_and_ordered() {
    let registry = Arc::new(
        RuleRegistry::builder()
            .register(Rule::new("first").salience(5).when(stock()))
            .unwrap()
            .register(Rule::new("second").salience(50).when(stock()))
            .unwrap()
            .build(),
    );
    let other = Arc::clone(&registry);

    let names: Vec<_> = other.iter().map(|(id, r)| (id.index(), r.name())).collect();
    assert_eq!(names, vec![(0, "first"), (1, "second")]);
    assert!(registry.by_name("third").is_none());
    assert!(!registry.is_empty());
}

#[test]
fn register_all_stops_at_first_invalid_rule() {
    let err = RuleRegistry::builder()
        .register_all(vec![
            Rule::new("ok").when(stock()),
            Rule::new("empty"),
            Rule::new("never-reached").when(stock()),
        ])
        .unwrap_err();
    match err.kind {
        ErrorKind::InvalidRule { rule, .. } => assert_eq!(rule, "empty"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn rule_debug_hides_closures() {
    let rule = Rule::new("dbg")
        .when(stock())
        .guard(|_| Ok(true));
    let shown = format!("{rule:?}");
    assert!(shown.contains("dbg"));
    assert!(shown.contains("guard: true"));
    assert!(shown.contains("action: false"));
}

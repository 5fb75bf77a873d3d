//! The full sample catalogue run

use larder_engine::{CollectingSink, EngineConfig, NullSink};
use larder_foundation::{FactKind, Value, fields};
use larder_inventory::{export, names, sample_engine};

#[test]
fn sample_run_converges_and_removes_depleted_bread() {
    let mut engine = sample_engine(EngineConfig::new()).unwrap();
    let loaded = engine.facts().len();

    let mut sink = CollectingSink::new();
    let result = engine.run(&mut sink);

    assert!(result.is_converged());
    assert_eq!(result.facts.len(), loaded - 1);
    assert_eq!(result.facts.count(FactKind::Stock), 7);
    assert!(
        result
            .facts
            .query(FactKind::Stock, &[(fields::PRODUCT, Value::from("Pan"))])
            .into_iter()
            .next()
            .is_none()
    );
    assert_eq!(sink.notifications().len(), result.iterations);
}

#[test]
fn sample_run_fires_expected_rules() {
    let mut engine = sample_engine(EngineConfig::new()).unwrap();
    let mut sink = CollectingSink::new();
    engine.run(&mut sink);

    let products = |rule: &str| -> Vec<String> {
        sink.from_rule(rule)
            .filter_map(|n| n.product.as_deref().map(str::to_string))
            .collect()
    };

    assert_eq!(products(names::STOCK_DEPLETED), vec!["Pan"]);
    assert_eq!(products(names::URGENT_RESTOCK), vec!["Leche", "Azúcar"]);
    assert_eq!(products(names::OVERSTOCK), vec!["Arroz", "Sal"]);
    assert_eq!(
        products(names::ORDER_EXCEEDS_STOCK),
        vec!["Leche", "Medicamentos", "Huevos"]
    );
    assert_eq!(products(names::ORDER_COVERED), vec!["Arroz"]);
    assert_eq!(products(names::CRITICAL_PRODUCT), vec!["Medicamentos"]);
    assert_eq!(
        products(names::UNRELIABLE_SUPPLIER_LOW_STOCK),
        vec!["Leche", "Huevos"]
    );
    assert!(products(names::INVALID_STOCK).is_empty());
}

#[test]
fn sample_runs_are_deterministic() {
    let run = || {
        let mut engine = sample_engine(EngineConfig::strict()).unwrap();
        let result = engine.run(&mut NullSink);
        (result.trace, result.facts.snapshot())
    };
    assert_eq!(run(), run());
}

#[test]
fn final_facts_survive_export() {
    let mut engine = sample_engine(EngineConfig::new()).unwrap();
    let snapshot = engine.run(&mut NullSink).facts.snapshot();

    let restored = export::from_bytes(&export::to_bytes(&snapshot).unwrap()).unwrap();
    assert_eq!(restored, snapshot);
}

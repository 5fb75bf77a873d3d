//! Integration tests for the execution loop
//!
//! Tests refraction, salience ordering, retraction, convergence, and the
//! iteration ceiling.

use std::sync::Arc;

use larder_engine::{
    CancelToken, CollectingSink, Engine, EngineConfig, HaltReason, MIN_ITERATIONS, NullSink, Rule,
    RuleRegistry, RunOutcome, Template,
};
use larder_foundation::{ErrorKind, Fact, FactKind, fields};
use proptest::prelude::*;

fn stock() -> Template {
    Template::new(FactKind::Stock)
        .bind(fields::PRODUCT, "p")
        .bind(fields::QUANTITY, "c")
        .alias("s")
}

fn notify(name: &str, salience: i32) -> Rule {
    Rule::new(name).salience(salience).when(stock()).then(|ctx| {
        let note = ctx.notification("seen");
        ctx.notify(note);
        Ok(())
    })
}

fn engine(rules: Vec<Rule>, config: EngineConfig) -> Engine {
    let registry = RuleRegistry::builder().register_all(rules).unwrap().build();
    Engine::new(Arc::new(registry), config)
}

fn fired_names(engine_trace: &[larder_engine::Firing]) -> Vec<String> {
    engine_trace.iter().map(|f| f.rule_name.to_string()).collect()
}

// =============================================================================
// Refraction
// =============================================================================

#[test]
fn non_mutating_rule_fires_once_per_binding() {
    let mut engine = engine(vec![notify("watch", 0)], EngineConfig::new());
    engine.assert(Fact::stock("Leche", 4)).unwrap();
    engine.assert(Fact::stock("Arroz", 60)).unwrap();

    let result = engine.run(&mut NullSink);
    assert!(result.is_converged());
    assert_eq!(result.iterations, 2);
}

#[test]
fn reasserted_fact_fires_again() {
    let mut engine = engine(vec![notify("watch", 0)], EngineConfig::new());
    let id = engine.assert(Fact::stock("Leche", 4)).unwrap();
    assert_eq!(engine.run(&mut NullSink).iterations, 1);

    engine.retract(id).unwrap();
    engine.assert(Fact::stock("Leche", 4)).unwrap();
    assert_eq!(engine.run(&mut NullSink).iterations, 1);
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn higher_salience_fires_first() {
    let mut engine = engine(
        vec![notify("low", 20), notify("high", 50)],
        EngineConfig::new(),
    );
    engine.assert(Fact::stock("Pan", 0)).unwrap();

    let result = engine.run(&mut NullSink);
    assert_eq!(fired_names(&result.trace), vec!["high", "low"]);
    assert_eq!(result.trace[0].salience, 50);
}

#[test]
fn ties_follow_registration_then_insertion_order() {
    let mut engine = engine(vec![notify("b", 30), notify("a", 30)], EngineConfig::new());
    let first = engine.assert(Fact::stock("X", 1)).unwrap();
    let second = engine.assert(Fact::stock("Y", 2)).unwrap();

    let mut sink = CollectingSink::new();
    let result = engine.run(&mut sink);
    let order: Vec<_> = result
        .trace
        .iter()
        .map(|f| (f.rule_name.to_string(), f.facts[0]))
        .collect();
    assert_eq!(
        order,
        vec![
            ("b".to_string(), first),
            ("b".to_string(), second),
            ("a".to_string(), first),
            ("a".to_string(), second),
        ]
    );
    let emitted: Vec<_> = sink.notifications().iter().map(|n| n.rule.to_string()).collect();
    assert_eq!(emitted, vec!["b", "b", "a", "a"]);
}

// =============================================================================
// Retraction
// =============================================================================

#[test]
fn retraction_removes_pending_activations() {
    let mut engine = engine(
        vec![
            Rule::new("remove")
                .salience(50)
                .when(stock())
                .then(|ctx| ctx.retract_alias("s")),
            notify("never", 10),
        ],
        EngineConfig::new(),
    );
    engine.assert(Fact::stock("Pan", 0)).unwrap();

    let result = engine.run(&mut NullSink);
    assert!(result.is_converged());
    assert_eq!(fired_names(&result.trace), vec!["remove"]);
    assert_eq!(result.facts.count(FactKind::Stock), 0);
}

#[test]
fn external_retraction_between_runs() {
    let mut engine = engine(vec![notify("watch", 0)], EngineConfig::new());
    let id = engine.assert(Fact::stock("Pan", 0)).unwrap();
    engine.retract(id).unwrap();

    let result = engine.run(&mut NullSink);
    assert_eq!(result.iterations, 0);
    assert!(matches!(
        engine.retract(id).unwrap_err().kind,
        ErrorKind::UnknownHandle(_)
    ));
}

// =============================================================================
// Termination
// =============================================================================

#[test]
fn non_retriggering_rules_converge_within_rule_count() {
    let rules = vec![notify("a", 3), notify("b", 2), notify("c", 1)];
    let rule_count = rules.len();
    let mut engine = engine(rules, EngineConfig::new());
    engine.assert(Fact::stock("Sal", 55)).unwrap();

    let result = engine.run(&mut NullSink);
    assert!(result.is_converged());
    assert!(result.iterations <= rule_count);
}

fn ping_pong() -> Vec<Rule> {
    vec![
        Rule::new("to-order").when(stock()).then(|ctx| {
            let p = ctx.bindings().text("p")?.to_string();
            let c = ctx.bindings().int("c")?;
            ctx.retract_alias("s")?;
            ctx.assert(Fact::order(&p, c));
            Ok(())
        }),
        Rule::new("to-stock")
            .when(
                Template::new(FactKind::Order)
                    .bind(fields::PRODUCT, "p")
                    .bind(fields::QUANTITY, "q")
                    .alias("o"),
            )
            .then(|ctx| {
                let p = ctx.bindings().text("p")?.to_string();
                let q = ctx.bindings().int("q")?;
                ctx.retract_alias("o")?;
                ctx.assert(Fact::stock(&p, q));
                Ok(())
            }),
    ]
}

#[test]
fn mutually_reasserting_rules_halt_at_configured_ceiling() {
    let mut engine = engine(ping_pong(), EngineConfig::new().with_max_iterations(10));
    engine.assert(Fact::stock("Pan", 1)).unwrap();

    let result = engine.run(&mut NullSink);
    assert!(matches!(
        result.outcome,
        RunOutcome::Halted(HaltReason::NonTermination { limit: 10 })
    ));
    assert_eq!(result.iterations, 10);
    assert_eq!(result.facts.len(), 1);

    let err = result.into_result().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NonTermination { limit: 10 }));
}

#[test]
fn derived_ceiling_has_floor() {
    let mut engine = engine(ping_pong(), EngineConfig::new());
    engine.assert(Fact::stock("Pan", 1)).unwrap();

    let result = engine.run(&mut NullSink);
    assert_eq!(result.iterations, MIN_ITERATIONS);
}

// =============================================================================
// Cancellation
// =============================================================================

#[test]
fn cancellation_is_checked_between_firings() {
    let token = CancelToken::new();
    let from_action = token.clone();
    let mut engine = engine(
        vec![Rule::new("stop").when(stock()).then(move |_| {
            from_action.cancel();
            Ok(())
        })],
        EngineConfig::new(),
    );
    engine.assert(Fact::stock("A", 1)).unwrap();
    engine.assert(Fact::stock("B", 2)).unwrap();

    let result = engine.run_with_cancel(&mut NullSink, &token);
    assert!(matches!(
        result.outcome,
        RunOutcome::Halted(HaltReason::Cancelled)
    ));
    assert_eq!(result.iterations, 1);
}

// =============================================================================
// Determinism
// =============================================================================

fn mixed_rules() -> Vec<Rule> {
    vec![
        Rule::new("drop-empty")
            .salience(50)
            .when(stock())
            .guard(|b| Ok(b.int("c")? == 0))
            .then(|ctx| ctx.retract_alias("s")),
        Rule::new("reorder")
            .salience(30)
            .when(stock())
            .guard(|b| Ok(b.int("c")? < 5))
            .then(|ctx| {
                let p = ctx.bindings().text("p")?.to_string();
                ctx.assert(Fact::order(&p, 10));
                Ok(())
            }),
        notify("audit", 10),
    ]
}

proptest! {
    #[test]
    fn identical_inputs_give_identical_runs(
        stocks in prop::collection::vec((0usize..6, 0i64..8), 0..12)
    ) {
        let run = || {
            let mut engine = engine(mixed_rules(), EngineConfig::new());
            for (p, c) in &stocks {
                engine.assert(Fact::stock(&format!("p{p}"), *c)).unwrap();
            }
            let result = engine.run(&mut NullSink);
            (result.trace, result.facts.snapshot())
        };

        let (trace_a, facts_a) = run();
        let (trace_b, facts_b) = run();
        prop_assert_eq!(trace_a, trace_b);
        prop_assert_eq!(facts_a, facts_b);
    }
}

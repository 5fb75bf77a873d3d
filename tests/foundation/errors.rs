//! Integration tests for Error

use larder_foundation::{Error, ErrorContext, ErrorKind, FactId, ValueType};

#[test]
fn recoverable_kinds() {
    assert!(Error::unknown_handle(FactId::from_raw(1)).is_recoverable());
    assert!(Error::duplicate_fact(FactId::from_raw(1)).is_recoverable());
    assert!(!Error::non_termination(64).is_recoverable());
    assert!(!Error::type_mismatch(ValueType::Int, ValueType::Float).is_recoverable());
    assert!(!Error::new(ErrorKind::Cancelled).is_recoverable());
}

#[test]
fn messages_name_the_problem() {
    let msg = Error::unknown_handle(FactId::from_raw(4)).to_string();
    assert!(msg.contains("f-4"));

    let msg = Error::invalid_rule("r", "pattern has no templates").to_string();
    assert!(msg.contains("\"r\""));

    let msg = Error::unbound_variable("c").to_string();
    assert!(msg.contains("?c"));
}

#[test]
fn context_display_lists_frames() {
    let ctx = ErrorContext::new()
        .with_rule("stock-depleted")
        .with_frame("run")
        .with_frame("fire");
    let shown = ctx.to_string();
    assert!(shown.starts_with("in rule stock-depleted"));
    assert!(shown.contains("  in run"));
    assert!(shown.contains("  in fire"));
}

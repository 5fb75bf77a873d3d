//! Forward-chaining rule engine for Larder.
//!
//! This crate provides:
//! - [`PatternMatcher`] - Conjunctive template matching over a fact store
//! - [`RuleRegistry`] - Immutable, validated, ordered rule sets
//! - [`Agenda`] - Conflict resolution and refraction
//! - [`Engine`] - The execution loop and run lifecycle
//! - [`NotificationSink`] - Where rule actions send structured events

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod action;
pub mod agenda;
pub mod config;
pub mod engine;
pub mod notify;
pub mod pattern;
pub mod rule;

pub use action::{ActionContext, Effect};
pub use agenda::{Activation, Agenda, AgendaState, RefractionKey, Refraction};
pub use config::{EngineConfig, ITERATION_FACTOR, MIN_ITERATIONS};
pub use engine::{
    CancelToken, Engine, Firing, HaltReason, RunOutcome, RunResult, RunState, with_rule_context,
};
pub use notify::{CollectingSink, LogSink, Notification, NotificationSink, NullSink};
pub use pattern::{Bindings, FieldBinding, Match, Pattern, PatternMatcher, Template};
pub use rule::{Action, Guard, Rule, RuleId, RuleRegistry, RuleRegistryBuilder};

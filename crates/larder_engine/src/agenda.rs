//! Activations, refraction memory, and conflict resolution.
//!
//! The agenda is rebuilt from scratch after every firing. Ordering is
//! salience (descending), then rule registration order, then discovery
//! order within a rule.

use std::collections::HashSet;
use std::sync::Arc;

use larder_foundation::FactId;
use larder_storage::FactStore;
use tracing::{debug, trace};

use crate::pattern::{Bindings, PatternMatcher};
use crate::rule::{RuleId, RuleRegistry};

// =============================================================================
// Activation
// =============================================================================

/// A rule whose pattern and guard are satisfied by specific facts.
#[derive(Clone, Debug)]
pub struct Activation {
    /// Which rule.
    pub rule: RuleId,
    /// Rule name.
    pub rule_name: Arc<str>,
    /// Rule salience.
    pub salience: i32,
    /// Variable bindings from the pattern match.
    pub bindings: Bindings,
    /// Originating fact handles, in template order.
    pub facts: Vec<FactId>,
}

impl Activation {
    /// Returns the key under which this activation is refracted.
    #[must_use]
    pub fn refraction_key(&self) -> RefractionKey {
        RefractionKey {
            rule: self.rule,
            bindings: self.bindings.clone(),
            facts: self.facts.clone(),
        }
    }
}

/// Two activations are equal when they share a rule and a binding set. The
/// originating handles only matter for refraction, see [`RefractionKey`].
impl PartialEq for Activation {
    fn eq(&self, other: &Self) -> bool {
        self.rule == other.rule && self.bindings == other.bindings
    }
}

impl Eq for Activation {}

// =============================================================================
// Refraction
// =============================================================================

/// Identity of a firing: rule, bindings, and originating facts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RefractionKey {
    rule: RuleId,
    bindings: Bindings,
    facts: Vec<FactId>,
}

/// Every activation that has already fired in the current run.
#[derive(Clone, Debug, Default)]
pub struct Refraction {
    fired: HashSet<RefractionKey>,
}

impl Refraction {
    /// Creates an empty refraction memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that an activation fired. Returns false if it was already
    /// recorded.
    pub fn record(&mut self, activation: &Activation) -> bool {
        self.fired.insert(activation.refraction_key())
    }

    /// Returns true if the activation has already fired.
    #[must_use]
    pub fn contains(&self, activation: &Activation) -> bool {
        self.fired.contains(&activation.refraction_key())
    }

    /// Returns the number of recorded firings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fired.len()
    }

    /// Returns true if nothing has fired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }

    /// Forgets every recorded firing.
    pub fn clear(&mut self) {
        self.fired.clear();
    }
}

// =============================================================================
// Agenda
// =============================================================================

/// Whether the agenda has anything to fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgendaState {
    /// No pending activations.
    Idle,
    /// At least one pending activation.
    Active,
}

/// Pending activations in firing order.
#[derive(Clone, Debug, Default)]
pub struct Agenda {
    activations: Vec<Activation>,
}

impl Agenda {
    /// Computes the agenda for the current fact set.
    ///
    /// Guard errors count as a failed guard for that binding set.
    #[must_use]
    pub fn compute(registry: &RuleRegistry, store: &FactStore, refraction: &Refraction) -> Self {
        let mut activations = Vec::new();

        for (id, rule) in registry.iter() {
            for m in PatternMatcher::match_pattern(rule.pattern(), store) {
                match rule.evaluate_guard(&m.bindings) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(err) => {
                        debug!(rule = rule.name(), bindings = %m.bindings, error = %err, "guard error treated as false");
                        continue;
                    }
                }

                let activation = Activation {
                    rule: id,
                    rule_name: rule.name_arc().clone(),
                    salience: rule.salience_value(),
                    bindings: m.bindings,
                    facts: m.facts,
                };

                if refraction.contains(&activation) {
                    continue;
                }
                activations.push(activation);
            }
        }

        // Stable sort keeps registration order, then discovery order, on ties
        activations.sort_by(|a, b| b.salience.cmp(&a.salience));

        trace!(pending = activations.len(), "agenda computed");
        Self { activations }
    }

    /// Returns the agenda state.
    #[must_use]
    pub fn state(&self) -> AgendaState {
        if self.activations.is_empty() {
            AgendaState::Idle
        } else {
            AgendaState::Active
        }
    }

    /// Returns the activation that fires next.
    #[must_use]
    pub fn peek(&self) -> Option<&Activation> {
        self.activations.first()
    }

    /// Consumes the agenda, returning the activation that fires next.
    #[must_use]
    pub fn select(self) -> Option<Activation> {
        self.activations.into_iter().next()
    }

    /// Iterates pending activations in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &Activation> {
        self.activations.iter()
    }

    /// Returns the number of pending activations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.activations.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }
}

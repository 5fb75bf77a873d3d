//! Production pattern matching for the rule engine.
//!
//! A rule's left-hand side is a [`Pattern`]: an ordered list of fact
//! [`Template`]s joined on shared variable names. The [`PatternMatcher`]
//! computes every binding set that satisfies a pattern against a
//! [`FactStore`] with a nested-loop join.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use larder_foundation::{Error, Fact, FactId, FactKind, Result, Value, ValueType};
use larder_storage::FactStore;

// =============================================================================
// Templates
// =============================================================================

/// What a template does with one field of a candidate fact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldBinding {
    /// Bind the field to a pattern variable: `Stock(product=?p)`.
    Variable(Arc<str>),
    /// Require the field to equal a literal: `Demand(level="High")`.
    Literal(Value),
}

/// One fact-kind template within a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    kind: FactKind,
    constraints: Vec<(Arc<str>, FieldBinding)>,
    alias: Option<Arc<str>>,
}

impl Template {
    /// Creates a template matching any fact of a kind.
    #[must_use]
    pub fn new(kind: FactKind) -> Self {
        Self {
            kind,
            constraints: Vec::new(),
            alias: None,
        }
    }

    /// Binds a field to a pattern variable.
    #[must_use]
    pub fn bind(mut self, field: impl Into<Arc<str>>, var: impl Into<Arc<str>>) -> Self {
        self.constraints
            .push((field.into(), FieldBinding::Variable(var.into())));
        self
    }

    /// Requires a field to equal a literal value.
    #[must_use]
    pub fn field(mut self, field: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.constraints
            .push((field.into(), FieldBinding::Literal(value.into())));
        self
    }

    /// Names the matched fact so an action can retract it.
    #[must_use]
    pub fn alias(mut self, name: impl Into<Arc<str>>) -> Self {
        self.alias = Some(name.into());
        self
    }

    /// Returns the fact kind this template matches.
    #[must_use]
    pub fn kind(&self) -> FactKind {
        self.kind
    }

    /// Returns the alias, if any.
    #[must_use]
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Iterates the field constraints in declaration order.
    pub fn constraints(&self) -> impl Iterator<Item = (&str, &FieldBinding)> {
        self.constraints.iter().map(|(f, b)| (f.as_ref(), b))
    }

    /// Returns the variables this template binds.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.constraints.iter().filter_map(|(_, b)| match b {
            FieldBinding::Variable(v) => Some(v.as_ref()),
            FieldBinding::Literal(_) => None,
        })
    }

    /// Tries to extend `bindings` so that this template matches `fact`.
    ///
    /// Returns `None` on a kind mismatch, a missing field, a literal
    /// mismatch, or a conflict with an existing binding.
    #[must_use]
    pub fn unify(&self, fact: &Fact, bindings: &Bindings) -> Option<Bindings> {
        if fact.kind() != self.kind {
            return None;
        }

        let mut extended = bindings.clone();
        for (field, binding) in &self.constraints {
            let value = fact.get(field)?;
            match binding {
                FieldBinding::Literal(lit) => {
                    if value != lit {
                        return None;
                    }
                }
                FieldBinding::Variable(var) => {
                    if let Some(existing) = extended.get(var) {
                        // Must match existing binding (unification)
                        if existing != value {
                            return None;
                        }
                    } else {
                        extended.set(var.clone(), value.clone());
                    }
                }
            }
        }
        Some(extended)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alias) = &self.alias {
            write!(f, "{alias} << ")?;
        }
        write!(f, "{}(", self.kind)?;
        for (i, (field, binding)) in self.constraints.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match binding {
                FieldBinding::Variable(var) => write!(f, "{field}=?{var}")?,
                FieldBinding::Literal(lit) => write!(f, "{field}={lit:?}")?,
            }
        }
        write!(f, ")")
    }
}

// =============================================================================
// Pattern
// =============================================================================

/// A rule's left-hand side: templates joined on shared variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    /// Templates in match order.
    pub templates: Vec<Template>,
}

impl Pattern {
    /// Creates an empty pattern.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if the pattern has no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Returns every variable the pattern binds.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<&str> {
        self.templates.iter().flat_map(Template::variables).collect()
    }

    /// Returns the distinct fact kinds the pattern reads.
    #[must_use]
    pub fn kinds(&self) -> BTreeSet<FactKind> {
        self.templates.iter().map(Template::kind).collect()
    }

    /// Returns the template position of an alias.
    #[must_use]
    pub fn alias_position(&self, alias: &str) -> Option<usize> {
        self.templates
            .iter()
            .position(|t| t.alias_name() == Some(alias))
    }
}

// =============================================================================
// Bindings
// =============================================================================

/// A set of variable bindings from pattern matching.
///
/// Ordered by variable name, so equal binding sets compare and hash equal
/// regardless of the order variables were bound in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bindings {
    values: BTreeMap<Arc<str>, Value>,
}

impl Bindings {
    /// Create empty bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a binding by variable name.
    #[must_use]
    pub fn get(&self, var: &str) -> Option<&Value> {
        self.values.get(var)
    }

    /// Set a binding.
    pub fn set(&mut self, var: impl Into<Arc<str>>, value: Value) {
        self.values.insert(var.into(), value);
    }

    /// Returns a bound value, or an `UnboundVariable` error.
    ///
    /// # Errors
    /// Returns an error if the variable is not bound.
    pub fn value(&self, var: &str) -> Result<&Value> {
        self.get(var).ok_or_else(|| Error::unbound_variable(var))
    }

    /// Returns a bound integer.
    ///
    /// # Errors
    /// Returns an error if the variable is unbound or not an integer.
    pub fn int(&self, var: &str) -> Result<i64> {
        let value = self.value(var)?;
        value
            .as_int()
            .ok_or_else(|| Error::type_mismatch(ValueType::Int, value.value_type()))
    }

    /// Returns a bound number, widening integers to floats.
    ///
    /// # Errors
    /// Returns an error if the variable is unbound or not numeric.
    pub fn number(&self, var: &str) -> Result<f64> {
        let value = self.value(var)?;
        value
            .as_number()
            .ok_or_else(|| Error::type_mismatch(ValueType::Number, value.value_type()))
    }

    /// Returns a bound string.
    ///
    /// # Errors
    /// Returns an error if the variable is unbound or not a string.
    pub fn text(&self, var: &str) -> Result<&str> {
        let value = self.value(var)?;
        value
            .as_str()
            .ok_or_else(|| Error::type_mismatch(ValueType::String, value.value_type()))
    }

    /// Iterate all bindings in variable-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Returns the number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (var, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "?{var}={value:?}")?;
        }
        write!(f, "}}")
    }
}

// =============================================================================
// Pattern Matching
// =============================================================================

/// One way a pattern is satisfied: bindings plus the facts that produced them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    /// Variable bindings.
    pub bindings: Bindings,
    /// Originating fact handles, one per template, in template order.
    pub facts: Vec<FactId>,
}

/// Pattern matcher that executes patterns against a fact store.
pub struct PatternMatcher;

impl PatternMatcher {
    /// Find all matches of a pattern against a store.
    ///
    /// Matches come in discovery order: the first template's candidates in
    /// insertion order, each extended depth-first through later templates.
    /// An empty pattern matches nothing.
    #[must_use]
    pub fn match_pattern(pattern: &Pattern, store: &FactStore) -> Vec<Match> {
        let mut results = Vec::new();
        if pattern.is_empty() {
            return results;
        }

        Self::join(
            &pattern.templates,
            store,
            &Bindings::new(),
            &mut Vec::with_capacity(pattern.len()),
            &mut results,
        );
        results
    }

    fn join(
        templates: &[Template],
        store: &FactStore,
        bindings: &Bindings,
        facts: &mut Vec<FactId>,
        results: &mut Vec<Match>,
    ) {
        let Some((template, rest)) = templates.split_first() else {
            results.push(Match {
                bindings: bindings.clone(),
                facts: facts.clone(),
            });
            return;
        };

        // Literals and already-bound variables narrow the store query
        let constraints: Vec<(&str, Value)> = template
            .constraints()
            .filter_map(|(field, binding)| match binding {
                FieldBinding::Literal(lit) => Some((field, lit.clone())),
                FieldBinding::Variable(var) => bindings.get(var).map(|v| (field, v.clone())),
            })
            .collect();

        for (id, fact) in store.query(template.kind(), &constraints) {
            if let Some(extended) = template.unify(fact, bindings) {
                facts.push(id);
                Self::join(rest, store, &extended, facts, results);
                facts.pop();
            }
        }
    }
}

//! Production rules and the registry that holds them.
//!
//! A [`Rule`] is data: a pattern, a guard closure, an action closure, and a
//! salience. Rules are registered once through [`RuleRegistryBuilder`] and
//! then shared immutably between engines.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use larder_foundation::{Error, Result};

use crate::action::ActionContext;
use crate::pattern::{Bindings, Pattern, Template};

/// Guard predicate over an activation's bindings.
pub type Guard = Arc<dyn Fn(&Bindings) -> Result<bool> + Send + Sync>;

/// Rule body, run once per firing.
pub type Action = Arc<dyn Fn(&mut ActionContext<'_>) -> Result<()> + Send + Sync>;

// =============================================================================
// Rule
// =============================================================================

/// Identifies a rule by its registration index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(usize);

impl RuleId {
    /// Returns the registration index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A production rule.
#[derive(Clone)]
pub struct Rule {
    name: Arc<str>,
    salience: i32,
    pattern: Pattern,
    guard: Option<Guard>,
    action: Option<Action>,
}

impl Rule {
    /// Creates a rule with salience 0, no templates, no guard and no action.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            salience: 0,
            pattern: Pattern::new(),
            guard: None,
            action: None,
        }
    }

    /// Sets the salience (higher fires first).
    #[must_use]
    pub fn salience(mut self, salience: i32) -> Self {
        self.salience = salience;
        self
    }

    /// Appends a template to the pattern.
    #[must_use]
    pub fn when(mut self, template: Template) -> Self {
        self.pattern.templates.push(template);
        self
    }

    /// Sets the guard.
    #[must_use]
    pub fn guard<F>(mut self, guard: F) -> Self
    where
        F: Fn(&Bindings) -> Result<bool> + Send + Sync + 'static,
    {
        self.guard = Some(Arc::new(guard));
        self
    }

    /// Sets the action.
    #[must_use]
    pub fn then<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shared rule name.
    #[must_use]
    pub fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    /// Returns the salience.
    #[must_use]
    pub fn salience_value(&self) -> i32 {
        self.salience
    }

    /// Returns the pattern.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Evaluates the guard against a binding set.
    ///
    /// A rule without a guard accepts every binding set.
    ///
    /// # Errors
    /// Propagates whatever the guard returns.
    pub fn evaluate_guard(&self, bindings: &Bindings) -> Result<bool> {
        match &self.guard {
            Some(guard) => guard(bindings),
            None => Ok(true),
        }
    }

    /// Runs the action.
    ///
    /// # Errors
    /// Propagates whatever the action returns.
    pub fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<()> {
        match &self.action {
            Some(action) => action(ctx),
            None => Ok(()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::invalid_rule("", "rule name is empty"));
        }
        if self.pattern.is_empty() {
            return Err(Error::invalid_rule(
                self.name.as_ref(),
                "pattern has no templates",
            ));
        }

        let mut aliases = HashSet::new();
        for template in &self.pattern.templates {
            let mut seen = HashSet::new();
            for (field, _) in template.constraints() {
                if !seen.insert(field) {
                    return Err(Error::invalid_rule(
                        self.name.as_ref(),
                        format!("field {field} constrained twice in {template}"),
                    ));
                }
            }
            if let Some(alias) = template.alias_name() {
                if !aliases.insert(alias) {
                    return Err(Error::invalid_rule(
                        self.name.as_ref(),
                        format!("alias {alias} used twice"),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("salience", &self.salience)
            .field("pattern", &self.pattern)
            .field("guard", &self.guard.is_some())
            .field("action", &self.action.is_some())
            .finish()
    }
}

// =============================================================================
// Registry
// =============================================================================

/// An immutable, ordered set of rules.
#[derive(Clone, Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> RuleRegistryBuilder {
        RuleRegistryBuilder::default()
    }

    /// Returns every rule in registration order.
    #[must_use]
    pub fn all(&self) -> &[Rule] {
        &self.rules
    }

    /// Iterates rules with their ids, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules.iter().enumerate().map(|(i, r)| (RuleId(i), r))
    }

    /// Gets a rule by id.
    #[must_use]
    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    /// Looks up a rule by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<(RuleId, &Rule)> {
        self.iter().find(|(_, r)| r.name() == name)
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Collects and validates rules before freezing them into a registry.
#[derive(Debug, Default)]
pub struct RuleRegistryBuilder {
    rules: Vec<Rule>,
    names: HashSet<Arc<str>>,
}

impl RuleRegistryBuilder {
    /// Registers a rule.
    ///
    /// # Errors
    /// Returns `InvalidRule` if the rule has an empty name or pattern, a
    /// name already registered, a field constrained twice in one template,
    /// or a repeated alias.
    pub fn register(mut self, rule: Rule) -> Result<Self> {
        rule.validate()?;
        if !self.names.insert(rule.name.clone()) {
            return Err(Error::invalid_rule(
                rule.name(),
                "a rule with this name is already registered",
            ));
        }
        self.rules.push(rule);
        Ok(self)
    }

    /// Registers several rules in order.
    ///
    /// # Errors
    /// Fails on the first rule that [`register`](Self::register) rejects.
    pub fn register_all(self, rules: impl IntoIterator<Item = Rule>) -> Result<Self> {
        rules.into_iter().try_fold(self, Self::register)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> RuleRegistry {
        RuleRegistry { rules: self.rules }
    }
}

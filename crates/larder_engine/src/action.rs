//! Rule actions and the effects they produce.
//!
//! An action does not touch the fact store directly. It reads its
//! activation through an [`ActionContext`] and records [`Effect`]s, which
//! the execution loop applies in order once the action returns.

use std::sync::Arc;

use larder_foundation::{Error, Fact, FactId, Result};
use larder_storage::FactStore;

use crate::notify::Notification;
use crate::pattern::{Bindings, Pattern};

/// A change requested by a rule action.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Add a fact to working memory.
    Assert(Fact),
    /// Remove a fact from working memory.
    Retract(FactId),
    /// Hand a structured event to the notification sink.
    Notify(Notification),
}

/// What an action sees while it runs.
pub struct ActionContext<'a> {
    rule_name: &'a Arc<str>,
    pattern: &'a Pattern,
    bindings: &'a Bindings,
    facts: &'a [FactId],
    store: &'a FactStore,
    effects: Vec<Effect>,
}

impl<'a> ActionContext<'a> {
    /// Creates a context for one firing.
    #[must_use]
    pub fn new(
        rule_name: &'a Arc<str>,
        pattern: &'a Pattern,
        bindings: &'a Bindings,
        facts: &'a [FactId],
        store: &'a FactStore,
    ) -> Self {
        Self {
            rule_name,
            pattern,
            bindings,
            facts,
            store,
            effects: Vec::new(),
        }
    }

    /// Returns the firing rule's name.
    #[must_use]
    pub fn rule_name(&self) -> &str {
        self.rule_name
    }

    /// Returns the activation's bindings.
    #[must_use]
    pub fn bindings(&self) -> &'a Bindings {
        self.bindings
    }

    /// Returns the originating fact handles, in template order.
    #[must_use]
    pub fn facts(&self) -> &'a [FactId] {
        self.facts
    }

    /// Returns the handle of the fact matched by an aliased template.
    ///
    /// # Errors
    /// Returns `UnboundVariable` if no template carries the alias.
    pub fn fact(&self, alias: &str) -> Result<FactId> {
        self.pattern
            .alias_position(alias)
            .and_then(|pos| self.facts.get(pos).copied())
            .ok_or_else(|| Error::unbound_variable(alias))
    }

    /// Read-only view of working memory as it was when the rule fired.
    #[must_use]
    pub fn store(&self) -> &'a FactStore {
        self.store
    }

    /// Requests that a fact be asserted.
    pub fn assert(&mut self, fact: Fact) {
        self.effects.push(Effect::Assert(fact));
    }

    /// Requests that a fact be retracted.
    pub fn retract(&mut self, id: FactId) {
        self.effects.push(Effect::Retract(id));
    }

    /// Requests retraction of the fact matched by an aliased template.
    ///
    /// # Errors
    /// Returns `UnboundVariable` if no template carries the alias.
    pub fn retract_alias(&mut self, alias: &str) -> Result<()> {
        let id = self.fact(alias)?;
        self.retract(id);
        Ok(())
    }

    /// Starts a notification stamped with this rule's name.
    #[must_use]
    pub fn notification(&self, code: &str) -> Notification {
        Notification::new(self.rule_name.clone(), code)
    }

    /// Emits a notification.
    pub fn notify(&mut self, notification: Notification) {
        self.effects.push(Effect::Notify(notification));
    }

    /// Returns the effects recorded so far.
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Consumes the context, returning the recorded effects in order.
    #[must_use]
    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}

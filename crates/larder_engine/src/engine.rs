//! The forward-chaining execution loop.
//!
//! An [`Engine`] owns a fact store and runs a shared [`RuleRegistry`]
//! against it. Each iteration recomputes the agenda, fires the single
//! highest-priority activation, and applies that activation's effects
//! before the next iteration starts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use larder_foundation::{Error, ErrorContext, ErrorKind, Fact, FactId, FactKind, Result};
use larder_storage::{FactQuery, FactStore, FieldConstraint};
use tracing::{debug, info, warn};

use crate::action::{ActionContext, Effect};
use crate::agenda::{Activation, Agenda, Refraction};
use crate::config::EngineConfig;
use crate::notify::NotificationSink;
use crate::pattern::Bindings;
use crate::rule::{RuleId, RuleRegistry};

// =============================================================================
// Cancellation
// =============================================================================

/// Cooperative cancellation flag, checked between firings.
///
/// Clones share the flag, so a token can be handed to another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Run Results
// =============================================================================

/// Where the engine is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Facts may be loaded; no run has finished yet.
    Ready,
    /// A run is in progress.
    Running,
    /// The last run ended with an empty agenda.
    Converged,
    /// The last run stopped early.
    Halted,
}

/// Why a run stopped before converging.
#[derive(Debug)]
pub enum HaltReason {
    /// The iteration ceiling was reached with activations pending.
    NonTermination {
        /// The ceiling in force for the run.
        limit: usize,
    },
    /// The cancel token was set.
    Cancelled,
    /// A rule action returned an error.
    ActionFailed {
        /// The failing rule.
        rule: Arc<str>,
        /// The error it returned.
        error: Error,
    },
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// No activations remained.
    Converged,
    /// The run stopped early.
    Halted(HaltReason),
}

impl RunOutcome {
    /// Returns true for [`RunOutcome::Converged`].
    #[must_use]
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged)
    }
}

/// One fired activation.
#[derive(Clone, Debug, PartialEq)]
pub struct Firing {
    /// Position in the engine's trace since the last reset, starting at 0.
    pub sequence: usize,
    /// The rule that fired.
    pub rule: RuleId,
    /// Its name.
    pub rule_name: Arc<str>,
    /// Its salience.
    pub salience: i32,
    /// The bindings it fired with.
    pub bindings: Bindings,
    /// Originating fact handles, in template order.
    pub facts: Vec<FactId>,
    /// Handles the action asserted.
    pub asserted: Vec<FactId>,
    /// Handles the action retracted.
    pub retracted: Vec<FactId>,
}

/// The result of [`Engine::run`].
#[derive(Debug)]
pub struct RunResult {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Firings performed by this run.
    pub iterations: usize,
    /// Working memory when the run ended.
    pub facts: FactStore,
    /// This run's firings, in order.
    pub trace: Vec<Firing>,
}

impl RunResult {
    /// Returns true if the run converged.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.outcome.is_converged()
    }

    /// Iterates the firings of one rule.
    pub fn fired<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Firing> {
        self.trace
            .iter()
            .filter(move |f| f.rule_name.as_ref() == rule)
    }

    /// Converts a halted outcome into its error.
    ///
    /// # Errors
    /// `NonTermination`, `Cancelled`, or the failing action's error with the
    /// rule name attached as context.
    pub fn into_result(self) -> Result<Self> {
        match self.outcome {
            RunOutcome::Converged => Ok(self),
            RunOutcome::Halted(HaltReason::NonTermination { limit }) => {
                Err(Error::non_termination(limit))
            }
            RunOutcome::Halted(HaltReason::Cancelled) => Err(Error::new(ErrorKind::Cancelled)),
            RunOutcome::Halted(HaltReason::ActionFailed { rule, error }) => {
                Err(with_rule_context(error, &rule))
            }
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// A rule engine instance with its own working memory.
#[derive(Debug)]
pub struct Engine {
    registry: Arc<RuleRegistry>,
    config: EngineConfig,
    store: FactStore,
    refraction: Refraction,
    trace: Vec<Firing>,
    iterations: usize,
    state: RunState,
}

impl Engine {
    /// Creates an engine with empty working memory.
    #[must_use]
    pub fn new(registry: Arc<RuleRegistry>, config: EngineConfig) -> Self {
        Self {
            registry,
            store: FactStore::new().with_policy(config.duplicate_policy),
            config,
            refraction: Refraction::new(),
            trace: Vec::new(),
            iterations: 0,
            state: RunState::Ready,
        }
    }

    /// Returns the shared rule registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Adds a fact to working memory.
    ///
    /// # Errors
    /// Returns `DuplicateFact` under a strict configuration.
    pub fn assert(&mut self, fact: Fact) -> Result<FactId> {
        self.store.assert(fact)
    }

    /// Removes a fact from working memory.
    ///
    /// # Errors
    /// Returns `UnknownHandle` if the handle is not live.
    pub fn retract(&mut self, id: FactId) -> Result<Fact> {
        self.store.retract(id)
    }

    /// Queries working memory.
    #[must_use]
    pub fn query<'a>(
        &'a self,
        kind: FactKind,
        constraints: &'a [FieldConstraint<'a>],
    ) -> FactQuery<'a> {
        self.store.query(kind, constraints)
    }

    /// Returns working memory.
    #[must_use]
    pub fn facts(&self) -> &FactStore {
        &self.store
    }

    /// Returns every firing since the last reset.
    #[must_use]
    pub fn trace(&self) -> &[Firing] {
        &self.trace
    }

    /// Returns the number of firings since the last reset.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Clears facts, refraction memory, trace, and counters.
    ///
    /// The rule registry and configuration are kept. Handles issued after a
    /// reset never repeat handles issued before it.
    pub fn reset(&mut self) {
        self.store.clear();
        self.refraction.clear();
        self.trace.clear();
        self.iterations = 0;
        self.state = RunState::Ready;
    }

    /// Runs until no activation remains or the run halts.
    pub fn run<S>(&mut self, sink: &mut S) -> RunResult
    where
        S: NotificationSink + ?Sized,
    {
        self.run_with_cancel(sink, &CancelToken::new())
    }

    /// Runs like [`run`](Self::run), checking `cancel` before every
    /// iteration.
    pub fn run_with_cancel<S>(&mut self, sink: &mut S, cancel: &CancelToken) -> RunResult
    where
        S: NotificationSink + ?Sized,
    {
        let registry = Arc::clone(&self.registry);
        let limit = self.config.iteration_limit(registry.len(), self.store.len());
        let first = self.trace.len();
        let mut iterations = 0;

        info!(
            rules = registry.len(),
            facts = self.store.len(),
            limit,
            "run started"
        );
        self.state = RunState::Running;

        let outcome = loop {
            if cancel.is_cancelled() {
                break RunOutcome::Halted(HaltReason::Cancelled);
            }

            let agenda = Agenda::compute(&registry, &self.store, &self.refraction);
            let Some(activation) = agenda.select() else {
                break RunOutcome::Converged;
            };

            if iterations >= limit {
                break RunOutcome::Halted(HaltReason::NonTermination { limit });
            }

            let live = activation.facts.iter().all(|&id| self.store.contains(id));
            debug_assert!(live, "activation references a retracted fact");
            if !live {
                warn!(rule = %activation.rule_name, "discarding stale activation");
                self.refraction.record(&activation);
                continue;
            }

            let rule = activation.rule_name.clone();
            let fired = self.fire(&registry, activation, sink);
            iterations += 1;
            if let Err(error) = fired {
                break RunOutcome::Halted(HaltReason::ActionFailed { rule, error });
            }
        };

        self.iterations += iterations;
        self.state = if outcome.is_converged() {
            RunState::Converged
        } else {
            RunState::Halted
        };

        match &outcome {
            RunOutcome::Converged => info!(iterations, facts = self.store.len(), "run converged"),
            RunOutcome::Halted(reason) => {
                warn!(iterations, facts = self.store.len(), ?reason, "run halted");
            }
        }

        RunResult {
            outcome,
            iterations,
            facts: self.store.clone(),
            trace: self.trace[first..].to_vec(),
        }
    }

    /// Fires one activation and applies its effects.
    ///
    /// The firing is appended to the trace before the action runs, so a
    /// failing action is still visible as the last trace entry.
    fn fire<S>(&mut self, registry: &RuleRegistry, activation: Activation, sink: &mut S) -> Result<()>
    where
        S: NotificationSink + ?Sized,
    {
        self.refraction.record(&activation);

        let Activation {
            rule: rule_id,
            rule_name,
            salience,
            bindings,
            facts,
        } = activation;

        debug!(rule = %rule_name, %bindings, "firing");
        self.trace.push(Firing {
            sequence: self.trace.len(),
            rule: rule_id,
            rule_name,
            salience,
            bindings,
            facts,
            asserted: Vec::new(),
            retracted: Vec::new(),
        });
        let index = self.trace.len() - 1;

        let rule = registry
            .get(rule_id)
            .ok_or_else(|| Error::internal(format!("rule {rule_id} is not registered")))?;

        let effects = {
            let firing = &self.trace[index];
            let mut ctx = ActionContext::new(
                &firing.rule_name,
                rule.pattern(),
                &firing.bindings,
                &firing.facts,
                &self.store,
            );
            rule.execute(&mut ctx)?;
            ctx.into_effects()
        };

        for effect in effects {
            match effect {
                Effect::Assert(fact) => match self.store.assert(fact) {
                    Ok(id) => self.trace[index].asserted.push(id),
                    Err(err) if err.is_recoverable() => {
                        debug!(rule = rule.name(), error = %err, "assert skipped");
                    }
                    Err(err) => return Err(err),
                },
                Effect::Retract(id) => match self.store.retract(id) {
                    Ok(_) => self.trace[index].retracted.push(id),
                    Err(err) if err.is_recoverable() => {
                        debug!(rule = rule.name(), error = %err, "retract skipped");
                    }
                    Err(err) => return Err(err),
                },
                Effect::Notify(notification) => sink.notify(&notification),
            }
        }
        Ok(())
    }
}

/// Attaches the failing rule to an error that has no context yet.
#[must_use]
pub fn with_rule_context(error: Error, rule: &str) -> Error {
    if error.context.is_some() {
        error
    } else {
        error.with_context(ErrorContext::new().with_rule(rule))
    }
}

//! Error types for the Larder system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::fact::FactKind;
use crate::handle::FactId;
use crate::types::ValueType;

/// The main error type for Larder operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an unknown handle error.
    #[must_use]
    pub fn unknown_handle(id: FactId) -> Self {
        Self::new(ErrorKind::UnknownHandle(id))
    }

    /// Creates a duplicate fact error pointing at the fact already stored.
    #[must_use]
    pub fn duplicate_fact(existing: FactId) -> Self {
        Self::new(ErrorKind::DuplicateFact { existing })
    }

    /// Creates an invalid rule error.
    #[must_use]
    pub fn invalid_rule(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRule {
            rule: rule.into(),
            reason: reason.into(),
        })
    }

    /// Creates a non-termination error.
    #[must_use]
    pub fn non_termination(limit: usize) -> Self {
        Self::new(ErrorKind::NonTermination { limit })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: ValueType, actual: ValueType) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an unbound variable error.
    #[must_use]
    pub fn unbound_variable(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnboundVariable(name.into()))
    }

    /// Creates a missing field error.
    #[must_use]
    pub fn missing_field(kind: FactKind, field: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingField {
            kind,
            field: field.into(),
        })
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns the existing handle if this is a `DuplicateFact` error.
    #[must_use]
    pub fn duplicate_of(&self) -> Option<FactId> {
        match self.kind {
            ErrorKind::DuplicateFact { existing } => Some(existing),
            _ => None,
        }
    }

    /// Returns true if a rule action may recover from this error locally.
    ///
    /// Stale handles and strict-mode duplicates are skipped by the execution
    /// loop instead of halting the run.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::UnknownHandle(_) | ErrorKind::DuplicateFact { .. }
        )
    }
}

/// Categorized error kinds.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Retract or lookup on a handle that was retracted or never existed.
    #[error("unknown fact handle: {0}")]
    UnknownHandle(FactId),

    /// Identical fact content is already stored (strict mode only).
    #[error("duplicate fact: identical content already stored as {existing}")]
    DuplicateFact {
        /// Handle of the fact already in the store.
        existing: FactId,
    },

    /// Malformed rule rejected at registration.
    #[error("invalid rule {rule:?}: {reason}")]
    InvalidRule {
        /// The rule name.
        rule: String,
        /// Why the rule was rejected.
        reason: String,
    },

    /// The iteration ceiling was reached with activations still pending.
    #[error("rules did not converge within {limit} iterations")]
    NonTermination {
        /// The configured ceiling.
        limit: usize,
    },

    /// Type mismatch while reading a binding or field.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: ValueType,
        /// The actual type encountered.
        actual: ValueType,
    },

    /// A guard or action read a variable the pattern does not bind.
    #[error("unbound variable: ?{0}")]
    UnboundVariable(String),

    /// A fact lacks a field that was required.
    #[error("missing field {field} on {kind} fact")]
    MissingField {
        /// The fact kind.
        kind: FactKind,
        /// The field name.
        field: String,
    },

    /// External input outside its documented domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The run was cancelled between firings.
    #[error("run cancelled")]
    Cancelled,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Rule that was firing or being registered.
    pub rule: Option<String>,
    /// Stack of operations leading to the error, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rule name.
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "in rule {rule}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias using the Larder error type.
pub type Result<T> = std::result::Result<T, Error>;

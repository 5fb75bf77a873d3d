//! Engine configuration.

use larder_storage::DuplicatePolicy;

/// Multiplier for the default iteration ceiling.
pub const ITERATION_FACTOR: usize = 4;

/// Floor for the default iteration ceiling.
pub const MIN_ITERATIONS: usize = 64;

/// Configuration for an [`Engine`](crate::Engine).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Explicit iteration ceiling. `None` derives one from the workload.
    pub max_iterations: Option<usize>,
    /// Policy for asserting content that is already stored.
    pub duplicate_policy: DuplicatePolicy,
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that rejects duplicate fact content.
    #[must_use]
    pub fn strict() -> Self {
        Self::default().with_duplicate_policy(DuplicatePolicy::Reject)
    }

    /// Sets an explicit iteration ceiling.
    #[must_use]
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Sets the duplicate policy.
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Returns the iteration ceiling for a run over the given workload.
    #[must_use]
    pub fn iteration_limit(&self, rule_count: usize, fact_count: usize) -> usize {
        self.max_iterations.unwrap_or_else(|| {
            ITERATION_FACTOR
                .saturating_mul(rule_count)
                .saturating_mul(fact_count.max(1))
                .max(MIN_ITERATIONS)
        })
    }
}

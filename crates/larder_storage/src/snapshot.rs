//! Owned copies of a store's live facts, for inspection and export.

use larder_foundation::{Fact, FactId, FactKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The live facts of a store at one moment, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactSnapshot {
    facts: Vec<(FactId, Fact)>,
}

impl FactSnapshot {
    /// Creates a snapshot from handle/fact pairs.
    #[must_use]
    pub fn new(facts: Vec<(FactId, Fact)>) -> Self {
        Self { facts }
    }

    /// Returns the number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if the snapshot holds no facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterates facts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FactId, &Fact)> {
        self.facts.iter().map(|(id, fact)| (*id, fact))
    }

    /// Iterates facts of one kind.
    pub fn of_kind(&self, kind: FactKind) -> impl Iterator<Item = (FactId, &Fact)> {
        self.iter().filter(move |(_, fact)| fact.kind() == kind)
    }

    /// Consumes the snapshot, returning its pairs.
    #[must_use]
    pub fn into_inner(self) -> Vec<(FactId, Fact)> {
        self.facts
    }
}

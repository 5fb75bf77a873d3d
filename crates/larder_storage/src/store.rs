//! Working-memory fact store with per-kind indexing.
//!
//! The `FactStore` owns every live fact and hands out [`FactId`] handles.
//! It uses persistent data structures, so cloning the store is O(1) and a
//! clone is an independent snapshot.

use larder_foundation::{Error, Fact, FactId, FactKind, Result, Value};
use tracing::trace;

use crate::snapshot::FactSnapshot;

/// Policy for asserting a fact whose content equals a live fact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Identical content may be asserted any number of times.
    #[default]
    Allow,
    /// Asserting identical content fails with `DuplicateFact`.
    Reject,
}

/// A literal field constraint used by [`FactStore::query`].
pub type FieldConstraint<'a> = (&'a str, Value);

/// Working memory of typed facts.
#[derive(Clone, Debug)]
pub struct FactStore {
    /// Live facts, keyed by handle (handle order is insertion order).
    facts: im::OrdMap<FactId, Fact>,
    /// Live handles per kind.
    by_kind: im::HashMap<FactKind, im::OrdSet<FactId>>,
    /// Next handle to assign. Never rewinds.
    next_id: FactId,
    /// Duplicate content policy.
    policy: DuplicatePolicy,
}

impl Default for FactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FactStore {
    /// Creates an empty store that permits duplicate content.
    #[must_use]
    pub fn new() -> Self {
        Self {
            facts: im::OrdMap::new(),
            by_kind: im::HashMap::new(),
            next_id: FactId::from_raw(1),
            policy: DuplicatePolicy::Allow,
        }
    }

    /// Sets the duplicate policy.
    #[must_use]
    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the duplicate policy.
    #[must_use]
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Adds a fact and returns its handle.
    ///
    /// # Errors
    /// Under [`DuplicatePolicy::Reject`], returns `DuplicateFact` carrying the
    /// existing handle if a live fact has identical content. The store is
    /// left unchanged in that case.
    pub fn assert(&mut self, fact: Fact) -> Result<FactId> {
        if self.policy == DuplicatePolicy::Reject {
            if let Some(existing) = self.find_identical(&fact) {
                return Err(Error::duplicate_fact(existing));
            }
        }

        let id = self.next_id;
        self.next_id = id.next();

        trace!(fact = %id, kind = %fact.kind(), "assert");
        self.by_kind
            .entry(fact.kind())
            .or_insert_with(im::OrdSet::new)
            .insert(id);
        self.facts.insert(id, fact);
        Ok(id)
    }

    /// Removes a fact and returns its content.
    ///
    /// # Errors
    /// Returns `UnknownHandle` if the handle was already retracted or never
    /// existed.
    pub fn retract(&mut self, id: FactId) -> Result<Fact> {
        let fact = self.facts.remove(&id).ok_or_else(|| Error::unknown_handle(id))?;
        if let Some(ids) = self.by_kind.get_mut(&fact.kind()) {
            ids.remove(&id);
        }
        trace!(fact = %id, kind = %fact.kind(), "retract");
        Ok(fact)
    }

    /// Returns all live facts of a kind whose fields equal the given literals.
    ///
    /// The returned query is lazy and can be iterated any number of times.
    /// Results come in insertion order.
    #[must_use]
    pub fn query<'a>(
        &'a self,
        kind: FactKind,
        constraints: &'a [FieldConstraint<'a>],
    ) -> FactQuery<'a> {
        FactQuery {
            store: self,
            kind,
            constraints,
        }
    }

    /// Gets a live fact by handle.
    #[must_use]
    pub fn get(&self, id: FactId) -> Option<&Fact> {
        self.facts.get(&id)
    }

    /// Returns true if the handle refers to a live fact.
    #[must_use]
    pub fn contains(&self, id: FactId) -> bool {
        self.facts.contains_key(&id)
    }

    /// Returns the number of live facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if there are no live facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Returns the number of live facts of a kind.
    #[must_use]
    pub fn count(&self, kind: FactKind) -> usize {
        self.by_kind.get(&kind).map_or(0, im::OrdSet::len)
    }

    /// Iterates all live facts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FactId, &Fact)> {
        self.facts.iter().map(|(id, fact)| (*id, fact))
    }

    /// Copies the live facts into an owned snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FactSnapshot {
        FactSnapshot::new(self.iter().map(|(id, fact)| (id, fact.clone())).collect())
    }

    /// Removes every fact.
    ///
    /// The handle counter is kept, so handles issued after a clear never
    /// collide with handles issued before it.
    pub fn clear(&mut self) {
        self.facts = im::OrdMap::new();
        self.by_kind = im::HashMap::new();
    }

    fn find_identical(&self, fact: &Fact) -> Option<FactId> {
        self.by_kind
            .get(&fact.kind())?
            .iter()
            .copied()
            .find(|id| self.facts.get(id) == Some(fact))
    }
}

// =============================================================================
// Query
// =============================================================================

/// A lazy, restartable lookup of live facts by kind and literal fields.
#[derive(Clone, Copy)]
pub struct FactQuery<'a> {
    store: &'a FactStore,
    kind: FactKind,
    constraints: &'a [FieldConstraint<'a>],
}

impl<'a> FactQuery<'a> {
    /// Starts a fresh pass over the matching facts.
    #[must_use]
    pub fn iter(&self) -> FactQueryIter<'a> {
        FactQueryIter {
            ids: self.store.by_kind.get(&self.kind).map(im::OrdSet::iter),
            facts: &self.store.facts,
            constraints: self.constraints,
        }
    }

    /// Returns the kind being queried.
    #[must_use]
    pub fn kind(&self) -> FactKind {
        self.kind
    }
}

impl<'a> IntoIterator for FactQuery<'a> {
    type Item = (FactId, &'a Fact);
    type IntoIter = FactQueryIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the results of a [`FactQuery`].
pub struct FactQueryIter<'a> {
    ids: Option<im::ordset::Iter<'a, FactId>>,
    facts: &'a im::OrdMap<FactId, Fact>,
    constraints: &'a [FieldConstraint<'a>],
}

impl<'a> Iterator for FactQueryIter<'a> {
    type Item = (FactId, &'a Fact);

    fn next(&mut self) -> Option<Self::Item> {
        let ids = self.ids.as_mut()?;
        for id in ids.by_ref() {
            let Some(fact) = self.facts.get(id) else {
                debug_assert!(false, "kind index references missing fact {id}");
                continue;
            };
            if self
                .constraints
                .iter()
                .all(|(field, value)| fact.field_equals(field, value))
            {
                return Some((*id, fact));
            }
        }
        None
    }
}

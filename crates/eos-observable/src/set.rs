//! Insertion-ordered collection of structurally distinct observables.

use crate::observable::ObservablePtr;

/// Observables deduplicated by [`crate::Observable::key`].
#[derive(Debug, Default, Clone)]
pub struct ObservableSet {
    observables: Vec<ObservablePtr>,
}

impl ObservableSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `observable` unless an identical one is present.
    ///
    /// Returns the index of the stored observable and whether it was inserted.
    pub fn add(&mut self, observable: ObservablePtr) -> (usize, bool) {
        let key = observable.key();
        match self.observables.iter().position(|existing| existing.key() == key) {
            Some(index) => (index, false),
            None => {
                self.observables.push(observable);
                (self.observables.len() - 1, true)
            }
        }
    }

    /// Observable at `index`.
    pub fn get(&self, index: usize) -> Option<&ObservablePtr> {
        self.observables.get(index)
    }

    /// Number of observables.
    pub fn len(&self) -> usize {
        self.observables.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.observables.is_empty()
    }

    /// Observables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ObservablePtr> {
        self.observables.iter()
    }
}

//! Pull-model cache of observable values over one parameter world.
//!
//! Writing a parameter never recomputes anything. The cache compares revision
//! stamps instead: an entry is stale when it was never evaluated, was
//! invalidated explicitly, one of its parameters was written after its last
//! evaluation, or its kinematics changed since then.

use std::fmt;

use eos_core::{EosError, ErrorInfo};
use eos_params::{ParameterId, Parameters};
use serde::Serialize;

use crate::observable::ObservablePtr;

/// Sequential index of an observable inside an [`ObservableCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CacheId(pub usize);

impl fmt::Display for CacheId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cached value together with its staleness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CachedValue {
    /// Last computed value, NaN before the first update.
    pub value: f64,
    /// Whether the value may be out of date.
    pub dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Stamp {
    parameters: u64,
    kinematics: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Slot {
    value: f64,
    invalidated: bool,
    evaluated: Option<Stamp>,
}

impl Slot {
    fn fresh() -> Self {
        Self {
            value: f64::NAN,
            invalidated: false,
            evaluated: None,
        }
    }
}

/// Observables over one world with their last evaluated values.
pub struct ObservableCache {
    parameters: Parameters,
    observables: Vec<ObservablePtr>,
    slots: Vec<Slot>,
    snapshot: Option<Vec<Slot>>,
}

impl fmt::Debug for ObservableCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableCache")
            .field("world", &self.parameters.world_id())
            .field("len", &self.observables.len())
            .finish()
    }
}

fn unknown_id(id: CacheId) -> EosError {
    EosError::Internal(
        ErrorInfo::new("eos_observable.unknown_cache_id", "cache has no entry with this id")
            .with_context("id", id.to_string()),
    )
}

impl ObservableCache {
    /// Empty cache over `parameters`.
    pub fn new(parameters: Parameters) -> Self {
        Self {
            parameters,
            observables: Vec::new(),
            slots: Vec::new(),
            snapshot: None,
        }
    }

    /// World the cache evaluates against.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Adds `observable` without evaluating it.
    ///
    /// A structurally identical observable returns its existing id. An
    /// observable bound to another world is an internal error.
    pub fn add(&mut self, observable: ObservablePtr) -> Result<CacheId, EosError> {
        if !observable.parameters().same_world(&self.parameters) {
            return Err(EosError::Internal(
                ErrorInfo::new("eos_observable.foreign_world", "observable is bound to another parameter world")
                    .with_context("name", observable.name().str())
                    .with_context("world", observable.parameters().world_id().to_string())
                    .with_context("cache_world", self.parameters.world_id().to_string()),
            ));
        }
        let key = observable.key();
        if let Some(index) = self.observables.iter().position(|existing| existing.key() == key) {
            return Ok(CacheId(index));
        }
        self.observables.push(observable);
        self.slots.push(Slot::fresh());
        Ok(CacheId(self.observables.len() - 1))
    }

    fn index(&self, id: CacheId) -> Result<usize, EosError> {
        if id.0 < self.observables.len() {
            Ok(id.0)
        } else {
            Err(unknown_id(id))
        }
    }

    fn is_stale(&self, index: usize) -> bool {
        let slot = &self.slots[index];
        let observable = &self.observables[index];
        match slot.evaluated {
            _ if slot.invalidated => true,
            None => true,
            Some(stamp) => {
                self.parameters.max_modified(observable.parameter_user()) > stamp.parameters
                    || observable.kinematics().revision() != stamp.kinematics
            }
        }
    }

    /// Recomputes `indices`; on failure nothing is changed.
    fn recompute(&mut self, indices: Vec<usize>) -> Result<(), EosError> {
        let parameters_revision = self.parameters.revision();
        let mut fresh = Vec::with_capacity(indices.len());
        for index in indices {
            let observable = &self.observables[index];
            let kinematics_revision = observable.kinematics().revision();
            let value = observable.evaluate()?;
            fresh.push((
                index,
                Slot {
                    value,
                    invalidated: false,
                    evaluated: Some(Stamp {
                        parameters: parameters_revision,
                        kinematics: kinematics_revision,
                    }),
                },
            ));
        }
        self.snapshot = Some(self.slots.clone());
        tracing::debug!(recomputed = fresh.len(), total = self.slots.len(), "observable cache updated");
        for (index, slot) in fresh {
            self.slots[index] = slot;
        }
        Ok(())
    }

    /// Recomputes every stale entry.
    pub fn update(&mut self) -> Result<(), EosError> {
        let stale: Vec<usize> = (0..self.slots.len()).filter(|&index| self.is_stale(index)).collect();
        self.recompute(stale)
    }

    /// Recomputes only the entries that depend on parameter `id`.
    pub fn update_parameter(&mut self, id: ParameterId) -> Result<(), EosError> {
        let dependent: Vec<usize> = self
            .observables
            .iter()
            .enumerate()
            .filter(|(_, observable)| observable.parameter_user().contains(id))
            .map(|(index, _)| index)
            .collect();
        self.recompute(dependent)
    }

    /// Restores values and states from before the latest update.
    pub fn reset(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            for (slot, previous) in self.slots.iter_mut().zip(snapshot) {
                *slot = previous;
            }
        }
    }

    /// Cached value of `id`; never recomputes.
    pub fn value(&self, id: CacheId) -> Result<f64, EosError> {
        Ok(self.slots[self.index(id)?].value)
    }

    /// Cached value of `id` with its staleness.
    pub fn get(&self, id: CacheId) -> Result<CachedValue, EosError> {
        let index = self.index(id)?;
        Ok(CachedValue {
            value: self.slots[index].value,
            dirty: self.is_stale(index),
        })
    }

    /// Whether the cached value of `id` may be out of date.
    pub fn is_dirty(&self, id: CacheId) -> Result<bool, EosError> {
        Ok(self.is_stale(self.index(id)?))
    }

    /// Marks `id` for recomputation on the next update.
    pub fn invalidate(&mut self, id: CacheId) -> Result<(), EosError> {
        let index = self.index(id)?;
        self.slots[index].invalidated = true;
        Ok(())
    }

    /// Marks every entry for recomputation.
    pub fn invalidate_all(&mut self) {
        for slot in &mut self.slots {
            slot.invalidated = true;
        }
    }

    /// Observable stored under `id`.
    pub fn observable(&self, id: CacheId) -> Result<&ObservablePtr, EosError> {
        Ok(&self.observables[self.index(id)?])
    }

    /// `(id, observable)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (CacheId, &ObservablePtr)> {
        self.observables.iter().enumerate().map(|(index, observable)| (CacheId(index), observable))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.observables.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.observables.is_empty()
    }

    /// Same ids in the same order, each observable cloned onto `parameters`,
    /// evaluated once.
    pub fn clone_with(&self, parameters: &Parameters) -> Result<ObservableCache, EosError> {
        let mut clone = ObservableCache::new(parameters.clone());
        for observable in &self.observables {
            clone.observables.push(observable.clone_with(parameters)?);
            clone.slots.push(Slot::fresh());
        }
        clone.update()?;
        Ok(clone)
    }
}

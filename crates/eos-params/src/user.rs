//! Dependency tracking between computations and the parameters they read.

use std::collections::BTreeSet;

use crate::parameters::{Parameter, ParameterId};

/// Set of parameter ids a computation reads.
///
/// Components register every id they read. Composite objects union the sets
/// of their parts, so an observable ends up knowing every parameter its value
/// can depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterUser {
    ids: BTreeSet<ParameterId>,
}

impl ParameterUser {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id`.
    pub fn uses(&mut self, id: ParameterId) {
        self.ids.insert(id);
    }

    /// Registers every id of `other`.
    pub fn uses_all(&mut self, other: &ParameterUser) {
        self.ids.extend(other.ids.iter().copied());
    }

    /// Unregisters `id`; returns whether it was present.
    pub fn drop_id(&mut self, id: ParameterId) -> bool {
        self.ids.remove(&id)
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> Vec<ParameterId> {
        self.ids.iter().copied().collect()
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: ParameterId) -> bool {
        self.ids.contains(&id)
    }

    /// Iterates over registered ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ParameterId> + '_ {
        self.ids.iter().copied()
    }

    /// Number of registered ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Extend<ParameterId> for ParameterUser {
    fn extend<T: IntoIterator<Item = ParameterId>>(&mut self, iter: T) {
        self.ids.extend(iter);
    }
}

/// Parameter handle that registered itself with a [`ParameterUser`].
#[derive(Debug, Clone)]
pub struct UsedParameter {
    parameter: Parameter,
}

impl UsedParameter {
    /// Wraps `parameter` and records its id in `user`.
    pub fn new(parameter: Parameter, user: &mut ParameterUser) -> Self {
        user.uses(parameter.id());
        Self { parameter }
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.parameter.value()
    }

    /// Id of the wrapped parameter.
    pub fn id(&self) -> ParameterId {
        self.parameter.id()
    }

    /// Wrapped handle.
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }
}

/// Anything that can report the parameters it reads.
pub trait UsesParameters {
    /// Dependency set.
    fn parameter_user(&self) -> &ParameterUser;
}

impl UsesParameters for ParameterUser {
    fn parameter_user(&self) -> &ParameterUser {
        self
    }
}

//! The evaluable object produced by every observable entry.
//!
//! An observable is bound to one parameter world and one kinematics handle at
//! construction. Evaluation reads the current parameter and kinematic values
//! every time; nothing is memoized here; caching is [`crate::ObservableCache`]'s job.

use std::fmt;
use std::sync::Arc;

use eos_core::{EosError, Kinematics, KinematicsSnapshot, Options, QualifiedName};
use eos_params::{ParameterUser, Parameters};
use serde::Serialize;

/// Shared handle on a type-erased observable.
pub type ObservablePtr = Arc<dyn Observable>;

/// Structural identity used by caches and sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObservableKey {
    /// `prefix::name[@suffix]` of the observable.
    pub name: String,
    /// Resolved options.
    pub options: Options,
    /// Kinematic values and aliases at the time the key was taken.
    pub kinematics: KinematicsSnapshot,
}

/// A computable prediction bound to a world, kinematics and options.
pub trait Observable: Send + Sync + fmt::Debug {
    /// Qualified name without options.
    fn name(&self) -> &QualifiedName;

    /// Value for the current parameters and kinematics.
    fn evaluate(&self) -> Result<f64, EosError>;

    /// Kinematics handle the observable reads.
    fn kinematics(&self) -> &Kinematics;

    /// World the observable is bound to.
    fn parameters(&self) -> &Parameters;

    /// Options after defaults and forced values were applied.
    fn options(&self) -> &Options;

    /// Ids of every parameter the value can depend on.
    fn parameter_user(&self) -> &ParameterUser;

    /// Rebuilds the observable on `parameters`, reading `kinematics`.
    fn rebind(&self, parameters: &Parameters, kinematics: &Kinematics) -> Result<ObservablePtr, EosError>;

    /// Copy on the same world with detached kinematics.
    fn clone_observable(&self) -> Result<ObservablePtr, EosError> {
        self.rebind(self.parameters(), &self.kinematics().deep_clone())
    }

    /// Copy bound to `parameters` with detached kinematics.
    fn clone_with(&self, parameters: &Parameters) -> Result<ObservablePtr, EosError> {
        self.rebind(parameters, &self.kinematics().deep_clone())
    }

    /// Structural identity: name, options and kinematics.
    fn key(&self) -> ObservableKey {
        ObservableKey {
            name: self.name().str(),
            options: self.options().clone(),
            kinematics: self.kinematics().snapshot(),
        }
    }
}

//! Observables that evaluate to a single parameter value.

use std::sync::Arc;

use eos_core::{EosError, Kinematics, Options, QualifiedName};
use eos_params::{Parameter, ParameterUser, Parameters};

use crate::observable::{Observable, ObservablePtr};

/// Exposes one parameter as an observable, e.g. `mass::mu`.
#[derive(Debug, Clone)]
pub struct ParameterObservable {
    name: QualifiedName,
    parameters: Parameters,
    kinematics: Kinematics,
    options: Options,
    parameter: Parameter,
    user: ParameterUser,
}

impl ParameterObservable {
    /// Binds the parameter `name` of `parameters`.
    pub fn new(parameters: &Parameters, kinematics: &Kinematics, name: &QualifiedName) -> Result<Self, EosError> {
        let parameter = parameters.get(&name.str())?;
        Ok(Self::from_parameter(name.without_options(), parameters, kinematics, parameter))
    }

    fn from_parameter(name: QualifiedName, parameters: &Parameters, kinematics: &Kinematics, parameter: Parameter) -> Self {
        let mut user = ParameterUser::new();
        user.uses(parameter.id());
        Self {
            name,
            parameters: parameters.clone(),
            kinematics: kinematics.clone(),
            options: Options::new(),
            parameter,
            user,
        }
    }
}

impl Observable for ParameterObservable {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn evaluate(&self) -> Result<f64, EosError> {
        Ok(self.parameter.value())
    }

    fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn options(&self) -> &Options {
        &self.options
    }

    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }

    fn rebind(&self, parameters: &Parameters, kinematics: &Kinematics) -> Result<ObservablePtr, EosError> {
        let parameter = parameters.by_id(self.parameter.id())?;
        Ok(Arc::new(Self::from_parameter(self.name.clone(), parameters, kinematics, parameter)))
    }
}

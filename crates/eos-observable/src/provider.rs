//! Glue between physics modules and the observable machinery.
//!
//! A physics module implements [`Provider`]: it is built once per observable
//! from a world and resolved options and registers every parameter it reads.
//! A [`ConcreteEntry`] pairs a provider type with one of its methods and the
//! kinematic variables that feed the method's arguments.

use std::fmt;
use std::sync::Arc;

use eos_core::{EosError, KinematicVariable, Kinematics, OptionSchema, Options, QualifiedName, Unit};
use eos_params::{ParameterUser, Parameters};

use crate::entry::{EntryMetadata, ObservableEntry};
use crate::observable::{Observable, ObservablePtr};
use crate::registry::ObservableRegistry;

/// A physics module that can back observables.
pub trait Provider: Send + Sync + Sized + 'static {
    /// Options the module recognizes.
    fn option_schema() -> OptionSchema;

    /// Builds the module from `parameters` and resolved `options`, calling
    /// [`ParameterUser::uses`] for every parameter it reads.
    fn new(parameters: &Parameters, options: &Options, user: &mut ParameterUser) -> Result<Self, EosError>;

    /// One-line description for listings.
    fn description() -> &'static str {
        ""
    }

    /// Literature references.
    fn references() -> &'static [&'static str] {
        &[]
    }
}

/// Provider method evaluated with the bound kinematic values as arguments.
pub type Method<P> = fn(&P, &[f64]) -> Result<f64, EosError>;

struct ConcreteBinding<P: Provider> {
    metadata: EntryMetadata,
    schema: OptionSchema,
    method: Method<P>,
}

/// Entry backed by a [`Provider`] method.
pub struct ConcreteEntry<P: Provider> {
    binding: Arc<ConcreteBinding<P>>,
}

impl<P: Provider> ConcreteEntry<P> {
    /// Entry `name` evaluating `method` over `kinematic_variables`.
    pub fn new(
        name: &str,
        latex: &str,
        unit: Unit,
        method: Method<P>,
        kinematic_variables: &[&str],
        forced_options: Options,
    ) -> Result<Self, EosError> {
        let mut metadata = EntryMetadata::new(QualifiedName::new(name)?, latex, unit, kinematic_variables, forced_options);
        metadata.description = P::description().to_string();
        metadata.references = P::references().iter().map(|r| r.to_string()).collect();
        Ok(Self {
            binding: Arc::new(ConcreteBinding {
                metadata,
                schema: P::option_schema(),
                method,
            }),
        })
    }
}

fn instantiate<P: Provider>(
    binding: &Arc<ConcreteBinding<P>>,
    parameters: &Parameters,
    kinematics: &Kinematics,
    options: &Options,
) -> Result<ConcreteObservable<P>, EosError> {
    let options = binding.schema.resolve(&binding.metadata.apply_forced(options))?;
    let variables = binding
        .metadata
        .kinematic_variables
        .iter()
        .map(|name| kinematics.variable(name))
        .collect::<Result<Vec<_>, _>>()?;
    let mut user = ParameterUser::new();
    let provider = P::new(parameters, &options, &mut user)?;
    Ok(ConcreteObservable {
        binding: Arc::clone(binding),
        parameters: parameters.clone(),
        kinematics: kinematics.clone(),
        options,
        variables,
        provider,
        user,
    })
}

impl<P: Provider> ObservableEntry for ConcreteEntry<P> {
    fn metadata(&self) -> &EntryMetadata {
        &self.binding.metadata
    }

    fn option_schema(&self) -> &OptionSchema {
        &self.binding.schema
    }

    fn make(
        &self,
        _registry: &ObservableRegistry,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
    ) -> Result<ObservablePtr, EosError> {
        Ok(Arc::new(instantiate(&self.binding, parameters, kinematics, options)?))
    }

    fn kind(&self) -> &'static str {
        "observable"
    }
}

/// Observable evaluating one provider method.
pub struct ConcreteObservable<P: Provider> {
    binding: Arc<ConcreteBinding<P>>,
    parameters: Parameters,
    kinematics: Kinematics,
    options: Options,
    variables: Vec<KinematicVariable>,
    provider: P,
    user: ParameterUser,
}

impl<P: Provider> ConcreteObservable<P> {
    /// The provider instance.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: Provider> fmt::Debug for ConcreteObservable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcreteObservable")
            .field("name", &self.binding.metadata.name.str())
            .field("options", &self.options.as_string())
            .field("kinematics", &self.kinematics.as_string())
            .field("parameters", &self.user.len())
            .finish()
    }
}

impl<P: Provider> Observable for ConcreteObservable<P> {
    fn name(&self) -> &QualifiedName {
        &self.binding.metadata.name
    }

    fn evaluate(&self) -> Result<f64, EosError> {
        let arguments: Vec<f64> = self.variables.iter().map(KinematicVariable::value).collect();
        (self.binding.method)(&self.provider, &arguments)
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
        Ok(Arc::new(instantiate(&self.binding, parameters, kinematics, &self.options)?))
    }
}

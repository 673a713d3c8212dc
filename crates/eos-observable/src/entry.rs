//! Registry entries: documentation metadata plus a factory for observables.

use eos_core::{EosError, Kinematics, OptionSchema, Options, QualifiedName, Unit};
use eos_params::Parameters;
use serde::Serialize;

use crate::observable::ObservablePtr;
use crate::registry::ObservableRegistry;

/// What every entry publishes about itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryMetadata {
    /// Name without options.
    pub name: QualifiedName,
    /// LaTeX label.
    pub latex: String,
    /// Unit of the value.
    pub unit: Unit,
    /// Free-form description.
    pub description: String,
    /// Kinematic variables the observable binds, in argument order.
    pub kinematic_variables: Vec<String>,
    /// Options applied on top of every request.
    pub forced_options: Options,
    /// Literature references.
    pub references: Vec<String>,
}

impl EntryMetadata {
    /// Metadata with empty description and references.
    pub fn new(name: QualifiedName, latex: &str, unit: Unit, kinematic_variables: &[&str], forced_options: Options) -> Self {
        Self {
            name: name.without_options(),
            latex: latex.to_string(),
            unit,
            description: String::new(),
            kinematic_variables: kinematic_variables.iter().map(|v| v.to_string()).collect(),
            forced_options,
            references: Vec::new(),
        }
    }

    /// Overlays the forced options onto `options`.
    pub fn apply_forced(&self, options: &Options) -> Options {
        for (key, forced) in self.forced_options.iter() {
            let requested = options.get(key, forced);
            if requested != forced {
                tracing::warn!(
                    name = %self.name,
                    key,
                    requested,
                    forced,
                    "forced option overrides requested value"
                );
            }
        }
        options.merge(&self.forced_options)
    }
}

/// Factory for one named observable.
pub trait ObservableEntry: Send + Sync {
    /// Published metadata.
    fn metadata(&self) -> &EntryMetadata;

    /// Options the entry recognizes.
    fn option_schema(&self) -> &OptionSchema;

    /// Builds an observable. `options` already contains the name-embedded
    /// options merged with the request.
    fn make(
        &self,
        registry: &ObservableRegistry,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
    ) -> Result<ObservablePtr, EosError>;

    /// Short label for listings.
    fn kind(&self) -> &'static str;

    /// Name without options.
    fn name(&self) -> &QualifiedName {
        &self.metadata().name
    }

    /// Kinematic variables in argument order.
    fn kinematic_variables(&self) -> &[String] {
        &self.metadata().kinematic_variables
    }
}

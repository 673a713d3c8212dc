//! Name-keyed observable registry and the process-wide installed instance.
//!
//! Registries are ordinary values: tests build private ones freely. A
//! physics bootstrap builds the full registry once and [`install`]s it; the
//! free [`make`] function resolves names against the installed instance.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use eos_core::{EosError, ErrorInfo, Kinematics, Options, QualifiedName, Unit};
use eos_params::Parameters;
use serde::Serialize;

use crate::entry::ObservableEntry;
use crate::expression::ExpressionEntry;
use crate::observable::ObservablePtr;
use crate::parameter::ParameterObservable;

/// Documentation group of related observables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservableGroup {
    /// Group title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Member names in listing order.
    pub names: Vec<QualifiedName>,
}

/// Documentation section holding groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservableSection {
    /// Section title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Groups in listing order.
    pub groups: Vec<ObservableGroup>,
}

/// Observable entries keyed by name, plus documentation structure.
#[derive(Default)]
pub struct ObservableRegistry {
    entries: BTreeMap<QualifiedName, Arc<dyn ObservableEntry>>,
    sections: Vec<ObservableSection>,
}

impl fmt::Debug for ObservableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableRegistry")
            .field("entries", &self.entries.len())
            .field("sections", &self.sections.len())
            .finish()
    }
}

fn unknown_observable(name: &QualifiedName) -> EosError {
    EosError::Name(
        ErrorInfo::new("eos_observable.unknown_observable", "no observable or parameter of that name")
            .with_context("name", name.full()),
    )
}

impl ObservableRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry`; an existing entry of the same name is an internal error.
    pub fn insert<E: ObservableEntry + 'static>(&mut self, entry: E) -> Result<(), EosError> {
        let name = entry.name().clone();
        if self.entries.contains_key(&name) {
            return Err(EosError::Internal(
                ErrorInfo::new("eos_observable.duplicate_entry", "observable is registered twice")
                    .with_context("name", name.str()),
            ));
        }
        self.entries.insert(name, Arc::new(entry));
        Ok(())
    }

    /// Adds `entry`, replacing an existing one of the same name.
    pub fn insert_or_assign<E: ObservableEntry + 'static>(&mut self, entry: E) {
        let name = entry.name().clone();
        if self.entries.insert(name.clone(), Arc::new(entry)).is_some() {
            tracing::warn!(name = %name, "observable entry replaced");
        }
    }

    /// Parses `expression` and registers it under `name`.
    pub fn insert_expression(
        &mut self,
        name: &str,
        latex: &str,
        unit: Unit,
        forced_options: Options,
        expression: &str,
    ) -> Result<(), EosError> {
        let entry = ExpressionEntry::new(self, name, latex, unit, forced_options, expression)?;
        self.insert(entry)
    }

    /// Appends a documentation section.
    pub fn add_section(&mut self, section: ObservableSection) {
        self.sections.push(section);
    }

    /// Entry registered under `name` (options ignored).
    pub fn get(&self, name: &QualifiedName) -> Option<&Arc<dyn ObservableEntry>> {
        self.entries.get(name)
    }

    /// Whether `name` parses and is registered.
    pub fn has(&self, name: &str) -> bool {
        QualifiedName::new(name).is_ok_and(|name| self.entries.contains_key(&name))
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&QualifiedName, &Arc<dyn ObservableEntry>)> {
        self.entries.iter()
    }

    /// Entries sorted by name, without keys.
    pub fn entries(&self) -> impl Iterator<Item = &Arc<dyn ObservableEntry>> {
        self.entries.values()
    }

    /// Documentation sections in insertion order.
    pub fn sections(&self) -> &[ObservableSection] {
        &self.sections
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses `name` and builds the observable.
    pub fn make(
        &self,
        name: &str,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
    ) -> Result<ObservablePtr, EosError> {
        self.make_qualified(&QualifiedName::new(name)?, parameters, kinematics, options)
    }

    /// Builds the observable `name`.
    ///
    /// The request options override the options embedded in `name`. A name
    /// without entry and without embedded options that names a parameter of
    /// `parameters` yields a [`ParameterObservable`].
    pub fn make_qualified(
        &self,
        name: &QualifiedName,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
    ) -> Result<ObservablePtr, EosError> {
        if let Some(entry) = self.entries.get(name) {
            let merged = name.options() + options;
            return entry.make(self, parameters, kinematics, &merged);
        }
        if name.options().is_empty() && parameters.has(&name.str()) {
            return Ok(Arc::new(ParameterObservable::new(parameters, kinematics, name)?));
        }
        Err(unknown_observable(name))
    }
}

static INSTALLED: RwLock<Option<Arc<ObservableRegistry>>> = RwLock::new(None);

/// Installs `registry` as the process-wide instance, replacing any previous one.
pub fn install(registry: ObservableRegistry) -> Arc<ObservableRegistry> {
    let registry = Arc::new(registry);
    let mut slot = INSTALLED.write().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        tracing::warn!("replacing the installed observable registry");
    }
    *slot = Some(Arc::clone(&registry));
    tracing::debug!(count = registry.len(), "observable registry installed");
    registry
}

/// Returns the installed instance, building and installing it with `build`
/// if nothing is installed yet.
pub fn install_with<F>(build: F) -> Result<Arc<ObservableRegistry>, EosError>
where
    F: FnOnce() -> Result<ObservableRegistry, EosError>,
{
    let mut slot = INSTALLED.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(registry) = slot.as_ref() {
        return Ok(Arc::clone(registry));
    }
    let registry = Arc::new(build()?);
    tracing::debug!(count = registry.len(), "observable registry installed");
    *slot = Some(Arc::clone(&registry));
    Ok(registry)
}

/// The installed instance.
pub fn instance() -> Result<Arc<ObservableRegistry>, EosError> {
    INSTALLED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or_else(|| {
            EosError::Internal(
                ErrorInfo::new("eos_observable.registry_not_installed", "no observable registry is installed")
                    .with_hint("call eos_physics::init() first"),
            )
        })
}

/// Whether an instance is installed.
pub fn is_installed() -> bool {
    INSTALLED.read().unwrap_or_else(PoisonError::into_inner).is_some()
}

/// Removes the installed instance; returns whether one was installed.
pub fn teardown() -> bool {
    INSTALLED.write().unwrap_or_else(PoisonError::into_inner).take().is_some()
}

/// Builds `name` through the installed registry.
pub fn make(
    name: &str,
    parameters: &Parameters,
    kinematics: &Kinematics,
    options: &Options,
) -> Result<ObservablePtr, EosError> {
    instance()?.make(name, parameters, kinematics, options)
}

//! Built-in constraint catalogue.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use eos_core::{EosError, ErrorInfo, Options, QualifiedName};
use eos_observable::{ObservableCache, ObservableRegistry};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::constraint::{unique_keys, Constraint, ConstraintEntry};

/// Embedded catalogue files.
pub const CATALOGUE_SOURCES: &[(&str, &str)] = &[("constraints.yaml", include_str!("../data/constraints.yaml"))];

#[derive(Deserialize)]
struct CatalogueFile(#[serde(deserialize_with = "unique_keys")] IndexMap<String, ConstraintEntry>);

/// Named constraint entries in file order.
#[derive(Debug, Clone, Default)]
pub struct ConstraintCatalogue {
    entries: IndexMap<QualifiedName, ConstraintEntry>,
}

impl ConstraintCatalogue {
    /// Process-wide catalogue built from [`CATALOGUE_SOURCES`] on first use.
    pub fn instance() -> Result<Arc<ConstraintCatalogue>, EosError> {
        static CATALOGUE: OnceLock<Result<Arc<ConstraintCatalogue>, EosError>> = OnceLock::new();
        CATALOGUE
            .get_or_init(|| Self::parse(CATALOGUE_SOURCES).map(Arc::new))
            .clone()
    }

    /// Builds a catalogue from `(file name, YAML text)` sources.
    ///
    /// A name defined twice, within or across files, is an error.
    pub fn parse(sources: &[(&str, &str)]) -> Result<ConstraintCatalogue, EosError> {
        let mut catalogue = ConstraintCatalogue::default();
        for (file, text) in sources {
            let CatalogueFile(entries) = serde_yaml::from_str(text).map_err(|err| {
                match EosError::yaml("eos_stats.catalogue_parse", err) {
                    EosError::Serde(info) => EosError::Serde(info.with_context("file", *file)),
                    other => other,
                }
            })?;
            for (name, entry) in entries {
                catalogue.insert(QualifiedName::new(&name)?, entry).map_err(|err| match err {
                    EosError::Internal(info) => EosError::Internal(info.with_context("file", *file)),
                    other => other,
                })?;
            }
        }
        tracing::debug!(count = catalogue.len(), "constraint catalogue parsed");
        Ok(catalogue)
    }

    /// Reads a catalogue file from disk.
    pub fn from_path(path: &Path) -> Result<ConstraintCatalogue, EosError> {
        let text = std::fs::read_to_string(path).map_err(|err| EosError::io("eos_stats.catalogue_read", path, err))?;
        let file = path.display().to_string();
        Self::parse(&[(file.as_str(), text.as_str())])
    }

    /// Adds `entry` after checking its shape.
    pub fn insert(&mut self, name: QualifiedName, entry: ConstraintEntry) -> Result<(), EosError> {
        if self.entries.contains_key(&name) {
            return Err(EosError::Internal(
                ErrorInfo::new("eos_stats.duplicate_constraint", "constraint name defined twice")
                    .with_context("name", name.to_string()),
            ));
        }
        entry.validate(&name)?;
        self.entries.insert(name, entry);
        Ok(())
    }

    /// Entry stored under `name`.
    pub fn get(&self, name: &QualifiedName) -> Result<&ConstraintEntry, EosError> {
        self.entries.get(name).ok_or_else(|| {
            EosError::Name(
                ErrorInfo::new("eos_stats.unknown_constraint", "no constraint with this name")
                    .with_context("name", name.to_string())
                    .with_hint("run `eos list-constraints` for the available names"),
            )
        })
    }

    /// Whether `name` is in the catalogue.
    pub fn has(&self, name: &QualifiedName) -> bool {
        self.entries.contains_key(name)
    }

    /// Builds constraint `name` into `cache`.
    pub fn make(
        &self,
        name: &QualifiedName,
        registry: &ObservableRegistry,
        cache: &mut ObservableCache,
        options: &Options,
    ) -> Result<Constraint, EosError> {
        self.get(name)?.make(name, registry, cache, options)
    }

    /// `(name, entry)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&QualifiedName, &ConstraintEntry)> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

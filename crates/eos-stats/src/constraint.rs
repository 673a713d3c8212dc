//! Constraint entries as written in YAML and their bound form.
//!
//! An entry names the predicted observables together with the measurement.
//! Building it against an [`ObservableCache`] adds the observables to the
//! cache and yields a [`Constraint`] whose blocks read them back by id.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use eos_core::{EosError, ErrorInfo, Kinematics, Options, QualifiedName};
use eos_observable::{CacheId, ObservableCache, ObservableRegistry};
use indexmap::IndexMap;
use nalgebra::{DMatrix, DVector};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::block::{GaussianBlock, LogLikelihoodBlock, MultivariateGaussianBlock, UniformBoundBlock};

struct UniqueKeys<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueKeys<V> {
    type Value = IndexMap<String, V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map with unique keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = IndexMap::new();
        while let Some((key, value)) = map.next_entry::<String, V>()? {
            if entries.contains_key(&key) {
                return Err(de::Error::custom(format!("key `{key}` encountered more than once")));
            }
            entries.insert(key, value);
        }
        Ok(entries)
    }
}

/// Deserialises a map, rejecting repeated keys.
pub(crate) fn unique_keys<'de, D, V>(deserializer: D) -> Result<IndexMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    deserializer.deserialize_map(UniqueKeys(PhantomData))
}

/// One predicted observable of a constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservableSpec {
    /// Qualified observable name.
    pub name: QualifiedName,
    /// Kinematic values.
    #[serde(default, deserialize_with = "unique_keys")]
    pub kinematics: IndexMap<String, f64>,
    /// Options preset by the constraint.
    #[serde(default, deserialize_with = "unique_keys")]
    pub options: IndexMap<String, String>,
}

/// Asymmetric uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sigma {
    /// Upward uncertainty.
    pub hi: f64,
    /// Downward uncertainty.
    pub lo: f64,
}

/// Single measurement with asymmetric statistical and systematic errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct GaussianEntry {
    /// Qualified observable name.
    pub observable: QualifiedName,
    /// Kinematic values.
    #[serde(default, deserialize_with = "unique_keys")]
    pub kinematics: IndexMap<String, f64>,
    /// Options preset by the constraint.
    #[serde(default, deserialize_with = "unique_keys")]
    pub options: IndexMap<String, String>,
    /// Measured central value.
    pub mean: f64,
    /// Statistical uncertainty.
    pub sigma_stat: Sigma,
    /// Systematic uncertainty.
    pub sigma_sys: Sigma,
    /// Bibliographic keys.
    #[serde(default)]
    pub references: Vec<String>,
}

/// Upper limit on the sum of predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UniformBoundEntry {
    /// Predictions summed against the bound.
    pub observables: Vec<ObservableSpec>,
    /// Upper limit.
    pub bound: f64,
    /// Width of the Gaussian penalty above the limit.
    pub uncertainty: f64,
    /// Bibliographic keys.
    #[serde(default)]
    pub references: Vec<String>,
}

/// Correlated measurements, e.g. a binned spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct MultivariateGaussianEntry {
    /// Predictions, one per measurement.
    pub observables: Vec<ObservableSpec>,
    /// Measured central values.
    pub means: Vec<f64>,
    /// Upward statistical uncertainties.
    pub sigma_stat_hi: Vec<f64>,
    /// Downward statistical uncertainties.
    pub sigma_stat_lo: Vec<f64>,
    /// Systematic uncertainties.
    pub sigma_sys: Vec<f64>,
    /// Correlation matrix.
    pub correlations: Vec<Vec<f64>>,
    /// Degrees of freedom; defaults to the number of measurements.
    #[serde(default)]
    pub dof: Option<usize>,
    /// Bibliographic keys.
    #[serde(default)]
    pub references: Vec<String>,
}

/// Catalogue entry, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConstraintEntry {
    /// See [`GaussianEntry`].
    Gaussian(GaussianEntry),
    /// See [`UniformBoundEntry`].
    UniformBound(UniformBoundEntry),
    /// See [`MultivariateGaussianEntry`].
    MultivariateGaussian(MultivariateGaussianEntry),
}

fn kinematics_of(values: &IndexMap<String, f64>) -> Kinematics {
    Kinematics::from_pairs(values.iter().map(|(name, value)| (name.as_str(), *value)))
}

fn options_of(values: &IndexMap<String, String>) -> Options {
    Options::from_pairs(values.iter().map(|(key, value)| (key.as_str(), value.as_str())))
}

fn malformed(name: &QualifiedName, message: &str) -> ErrorInfo {
    ErrorInfo::new("eos_stats.malformed_constraint", message).with_context("name", name.to_string())
}

struct Binder<'a> {
    constraint: &'a QualifiedName,
    registry: &'a ObservableRegistry,
    cache: &'a mut ObservableCache,
    options: &'a Options,
}

impl Binder<'_> {
    fn bind(
        &mut self,
        observable: &QualifiedName,
        kinematics: &IndexMap<String, f64>,
        preset: &IndexMap<String, String>,
    ) -> Result<CacheId, EosError> {
        for (key, value) in preset {
            if let Ok(requested) = self.options.value(key) {
                if requested != value {
                    tracing::debug!(
                        constraint = %self.constraint,
                        observable = %observable,
                        key = %key,
                        preset = %value,
                        requested,
                        "request overrides a constraint option"
                    );
                }
            }
        }
        let options = options_of(preset) + self.options.clone();
        let parameters = self.cache.parameters().clone();
        let made = self
            .registry
            .make_qualified(observable, &parameters, &kinematics_of(kinematics), &options)?;
        self.cache.add(made)
    }
}

impl ConstraintEntry {
    /// Names of the predicted observables.
    pub fn observable_names(&self) -> Vec<&QualifiedName> {
        match self {
            ConstraintEntry::Gaussian(entry) => vec![&entry.observable],
            ConstraintEntry::UniformBound(entry) => entry.observables.iter().map(|spec| &spec.name).collect(),
            ConstraintEntry::MultivariateGaussian(entry) => entry.observables.iter().map(|spec| &spec.name).collect(),
        }
    }

    /// Value of the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            ConstraintEntry::Gaussian(_) => "Gaussian",
            ConstraintEntry::UniformBound(_) => "UniformBound",
            ConstraintEntry::MultivariateGaussian(_) => "MultivariateGaussian",
        }
    }

    /// Bibliographic keys.
    pub fn references(&self) -> &[String] {
        match self {
            ConstraintEntry::Gaussian(entry) => &entry.references,
            ConstraintEntry::UniformBound(entry) => &entry.references,
            ConstraintEntry::MultivariateGaussian(entry) => &entry.references,
        }
    }

    /// Checks shapes and uncertainties without building anything.
    pub fn validate(&self, name: &QualifiedName) -> Result<(), EosError> {
        match self {
            ConstraintEntry::Gaussian(entry) => {
                let sigmas = [entry.sigma_stat.hi, entry.sigma_stat.lo, entry.sigma_sys.hi, entry.sigma_sys.lo];
                if sigmas.iter().any(|sigma| *sigma < 0.0) {
                    return Err(EosError::Internal(malformed(name, "uncertainties must be non-negative")));
                }
            }
            ConstraintEntry::UniformBound(entry) => {
                if entry.observables.is_empty() {
                    return Err(EosError::Internal(malformed(name, "a bound needs at least one observable")));
                }
            }
            ConstraintEntry::MultivariateGaussian(entry) => {
                let dim = entry.observables.len();
                let lengths = [
                    entry.means.len(),
                    entry.sigma_stat_hi.len(),
                    entry.sigma_stat_lo.len(),
                    entry.sigma_sys.len(),
                    entry.correlations.len(),
                ];
                if dim == 0
                    || lengths.iter().any(|len| *len != dim)
                    || entry.correlations.iter().any(|row| row.len() != dim)
                {
                    return Err(EosError::Internal(
                        malformed(name, "every list must have one entry per observable")
                            .with_context("observables", dim.to_string()),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Builds the observables into `cache` and returns the bound constraint.
    ///
    /// `options` override the options preset by the entry.
    pub fn make(
        &self,
        name: &QualifiedName,
        registry: &ObservableRegistry,
        cache: &mut ObservableCache,
        options: &Options,
    ) -> Result<Constraint, EosError> {
        self.validate(name)?;
        let mut binder = Binder {
            constraint: name,
            registry,
            cache,
            options,
        };
        let (ids, block): (Vec<CacheId>, Box<dyn LogLikelihoodBlock>) = match self {
            ConstraintEntry::Gaussian(entry) => {
                let id = binder.bind(&entry.observable, &entry.kinematics, &entry.options)?;
                let upper = entry.sigma_stat.hi.hypot(entry.sigma_sys.hi);
                let lower = entry.sigma_stat.lo.hypot(entry.sigma_sys.lo);
                let block: Box<dyn LogLikelihoodBlock> = Box::new(GaussianBlock::new(id, entry.mean, lower, upper)?);
                (vec![id], block)
            }
            ConstraintEntry::UniformBound(entry) => {
                let mut ids = Vec::with_capacity(entry.observables.len());
                for spec in &entry.observables {
                    ids.push(binder.bind(&spec.name, &spec.kinematics, &spec.options)?);
                }
                let block: Box<dyn LogLikelihoodBlock> =
                    Box::new(UniformBoundBlock::new(ids.clone(), entry.bound, entry.uncertainty)?);
                (ids, block)
            }
            ConstraintEntry::MultivariateGaussian(entry) => {
                let mut ids = Vec::with_capacity(entry.observables.len());
                for spec in &entry.observables {
                    ids.push(binder.bind(&spec.name, &spec.kinematics, &spec.options)?);
                }
                let dim = ids.len();
                let sigmas: Vec<f64> = (0..dim)
                    .map(|i| {
                        let sys = entry.sigma_sys[i] * entry.sigma_sys[i];
                        (entry.sigma_stat_hi[i].powi(2) + sys).max(entry.sigma_stat_lo[i].powi(2) + sys).sqrt()
                    })
                    .collect();
                let covariance =
                    DMatrix::from_fn(dim, dim, |i, j| sigmas[i] * sigmas[j] * entry.correlations[i][j]);
                let block: Box<dyn LogLikelihoodBlock> = Box::new(MultivariateGaussianBlock::new(
                    ids.clone(),
                    DVector::from_column_slice(&entry.means),
                    covariance,
                    entry.dof.unwrap_or(dim),
                )?);
                (ids, block)
            }
        };
        Ok(Constraint {
            name: name.clone(),
            observables: ids,
            blocks: vec![block],
        })
    }
}

/// Constraint bound to one [`ObservableCache`].
#[derive(Debug, Clone)]
pub struct Constraint {
    name: QualifiedName,
    observables: Vec<CacheId>,
    blocks: Vec<Box<dyn LogLikelihoodBlock>>,
}

impl Constraint {
    /// Assembles a constraint from blocks already bound to a cache.
    pub fn new(name: QualifiedName, blocks: Vec<Box<dyn LogLikelihoodBlock>>) -> Self {
        let mut observables: Vec<CacheId> = blocks.iter().flat_map(|block| block.observables().to_vec()).collect();
        observables.sort_unstable();
        observables.dedup();
        Self {
            name,
            observables,
            blocks,
        }
    }

    /// Catalogue name.
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Ids of the predictions in the owning cache.
    pub fn observables(&self) -> &[CacheId] {
        &self.observables
    }

    /// Likelihood blocks.
    pub fn blocks(&self) -> &[Box<dyn LogLikelihoodBlock>] {
        &self.blocks
    }

    /// Sum of the block log-likelihoods.
    pub fn evaluate(&self, cache: &ObservableCache) -> Result<f64, EosError> {
        let mut total = 0.0;
        for block in &self.blocks {
            total += block.evaluate(cache)?;
        }
        Ok(total)
    }

    /// Number of measurements across blocks.
    pub fn number_of_observations(&self) -> usize {
        self.blocks.iter().map(|block| block.number_of_observations()).sum()
    }

    /// Observable names with their kinematics, as bound in `cache`.
    pub fn describe_observables(&self, cache: &ObservableCache) -> Result<BTreeMap<CacheId, String>, EosError> {
        let mut described = BTreeMap::new();
        for id in &self.observables {
            let observable = cache.observable(*id)?;
            described.insert(*id, format!("{}[{}]", observable.name(), observable.kinematics().as_string()));
        }
        Ok(described)
    }
}

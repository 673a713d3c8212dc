//! Log-likelihood over a set of constraints sharing one observable cache.

use eos_core::{EosError, Options, QualifiedName};
use eos_observable::{ObservableCache, ObservableRegistry};
use eos_params::Parameters;

use crate::catalogue::ConstraintCatalogue;
use crate::constraint::Constraint;

/// Per-constraint significance.
#[derive(Debug, Clone, PartialEq)]
pub struct Significance {
    /// Constraint name.
    pub constraint: QualifiedName,
    /// Block summary.
    pub block: String,
    /// Deviation in Gaussian standard deviations.
    pub sigma: f64,
}

/// Sum of constraint log-likelihoods.
#[derive(Debug)]
pub struct LogLikelihood {
    cache: ObservableCache,
    constraints: Vec<Constraint>,
}

impl LogLikelihood {
    /// Empty likelihood over `parameters`.
    pub fn new(parameters: Parameters) -> Self {
        Self {
            cache: ObservableCache::new(parameters),
            constraints: Vec::new(),
        }
    }

    /// Cache holding every prediction.
    pub fn observable_cache(&self) -> &ObservableCache {
        &self.cache
    }

    /// Mutable cache, for adding constraints built elsewhere.
    pub fn observable_cache_mut(&mut self) -> &mut ObservableCache {
        &mut self.cache
    }

    /// World the likelihood evaluates against.
    pub fn parameters(&self) -> &Parameters {
        self.cache.parameters()
    }

    /// Adds a constraint already bound to this likelihood's cache.
    pub fn add(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Builds catalogue entry `name` into this likelihood.
    pub fn add_from_catalogue(
        &mut self,
        catalogue: &ConstraintCatalogue,
        registry: &ObservableRegistry,
        name: &QualifiedName,
        options: &Options,
    ) -> Result<(), EosError> {
        let constraint = catalogue.make(name, registry, &mut self.cache, options)?;
        tracing::debug!(
            name = %name,
            observables = constraint.observables().len(),
            cache = self.cache.len(),
            "constraint added"
        );
        self.constraints.push(constraint);
        Ok(())
    }

    /// Constraints in insertion order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Updates stale predictions, then sums the constraint log-likelihoods.
    pub fn evaluate(&mut self) -> Result<f64, EosError> {
        self.cache.update()?;
        let mut total = 0.0;
        for constraint in &self.constraints {
            total += constraint.evaluate(&self.cache)?;
        }
        Ok(total)
    }

    /// Significance of every block against the cached predictions.
    pub fn significances(&self) -> Result<Vec<Significance>, EosError> {
        let mut out = Vec::new();
        for constraint in &self.constraints {
            for block in constraint.blocks() {
                out.push(Significance {
                    constraint: constraint.name().clone(),
                    block: block.describe(),
                    sigma: block.significance(&self.cache)?,
                });
            }
        }
        Ok(out)
    }

    /// Number of measurements across constraints.
    pub fn number_of_observations(&self) -> usize {
        self.constraints.iter().map(Constraint::number_of_observations).sum()
    }

    /// Same constraints over a clone of the cache bound to `parameters`.
    pub fn clone_with(&self, parameters: &Parameters) -> Result<LogLikelihood, EosError> {
        Ok(LogLikelihood {
            cache: self.cache.clone_with(parameters)?,
            constraints: self.constraints.clone(),
        })
    }
}

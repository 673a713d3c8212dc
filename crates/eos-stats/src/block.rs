//! Likelihood blocks: the statistical model of one measurement.
//!
//! Blocks refer to their predictions by [`CacheId`]. Ids survive
//! [`ObservableCache::clone_with`], so a block stays valid for every clone of
//! the cache it was built against.

use std::f64::consts::PI;
use std::fmt;

use eos_core::{EosError, ErrorInfo};
use eos_observable::{CacheId, ObservableCache};
use nalgebra::{Cholesky, DMatrix, DVector};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// One term of a log-likelihood.
pub trait LogLikelihoodBlock: Send + Sync + fmt::Debug {
    /// Log-likelihood of the cached predictions.
    fn evaluate(&self, cache: &ObservableCache) -> Result<f64, EosError>;

    /// Deviation of the cached predictions from the measurement, in units of
    /// Gaussian standard deviations.
    fn significance(&self, cache: &ObservableCache) -> Result<f64, EosError>;

    /// Predictions this block reads.
    fn observables(&self) -> &[CacheId];

    /// Number of independent measurements.
    fn number_of_observations(&self) -> usize;

    /// Short human-readable summary.
    fn describe(&self) -> String;

    /// Boxed copy.
    fn clone_block(&self) -> Box<dyn LogLikelihoodBlock>;
}

impl Clone for Box<dyn LogLikelihoodBlock> {
    fn clone(&self) -> Self {
        self.clone_block()
    }
}

/// Measurement `mode (+sigma_upper, -sigma_lower)` of one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianBlock {
    id: [CacheId; 1],
    mode: f64,
    sigma_lower: f64,
    sigma_upper: f64,
    norm: f64,
}

impl GaussianBlock {
    /// Fails when either uncertainty is not strictly positive.
    pub fn new(id: CacheId, mode: f64, sigma_lower: f64, sigma_upper: f64) -> Result<Self, EosError> {
        if !(sigma_lower > 0.0 && sigma_upper > 0.0) {
            return Err(EosError::Internal(
                ErrorInfo::new("eos_stats.invalid_uncertainty", "Gaussian uncertainties must be positive")
                    .with_context("sigma_lower", sigma_lower.to_string())
                    .with_context("sigma_upper", sigma_upper.to_string()),
            ));
        }
        Ok(Self {
            id: [id],
            mode,
            sigma_lower,
            sigma_upper,
            norm: ((2.0 / PI).sqrt() / (sigma_upper + sigma_lower)).ln(),
        })
    }

    fn chi(&self, value: f64) -> f64 {
        let sigma = if value > self.mode { self.sigma_upper } else { self.sigma_lower };
        (value - self.mode) / sigma
    }
}

impl LogLikelihoodBlock for GaussianBlock {
    fn evaluate(&self, cache: &ObservableCache) -> Result<f64, EosError> {
        let chi = self.chi(cache.value(self.id[0])?);
        Ok(self.norm - chi * chi / 2.0)
    }

    fn significance(&self, cache: &ObservableCache) -> Result<f64, EosError> {
        Ok(self.chi(cache.value(self.id[0])?))
    }

    fn observables(&self) -> &[CacheId] {
        &self.id
    }

    fn number_of_observations(&self) -> usize {
        1
    }

    fn describe(&self) -> String {
        if self.sigma_upper == self.sigma_lower {
            format!("Gaussian: {} +- {}", self.mode, self.sigma_upper)
        } else {
            format!("Gaussian: {} +{} -{}", self.mode, self.sigma_upper, self.sigma_lower)
        }
    }

    fn clone_block(&self) -> Box<dyn LogLikelihoodBlock> {
        Box::new(self.clone())
    }
}

/// Upper bound on the sum of non-negative predictions, with a Gaussian
/// penalty beyond the bound.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBoundBlock {
    ids: Vec<CacheId>,
    bound: f64,
    uncertainty: f64,
}

impl UniformBoundBlock {
    /// `uncertainty == 0` turns the bound into a hard cut.
    pub fn new(ids: Vec<CacheId>, bound: f64, uncertainty: f64) -> Result<Self, EosError> {
        if ids.is_empty() || uncertainty < 0.0 {
            return Err(EosError::Internal(
                ErrorInfo::new("eos_stats.invalid_bound", "a bound needs predictions and a non-negative uncertainty")
                    .with_context("observables", ids.len().to_string())
                    .with_context("uncertainty", uncertainty.to_string()),
            ));
        }
        Ok(Self { ids, bound, uncertainty })
    }

    fn saturation(&self, cache: &ObservableCache) -> Result<f64, EosError> {
        let mut saturation = 0.0;
        for id in &self.ids {
            saturation += cache.value(*id)?;
        }
        if saturation < 0.0 {
            return Err(EosError::Numeric(
                ErrorInfo::new("eos_stats.negative_saturation", "contributions to a bound must be non-negative")
                    .with_context("saturation", saturation.to_string()),
            ));
        }
        Ok(saturation)
    }
}

impl LogLikelihoodBlock for UniformBoundBlock {
    fn evaluate(&self, cache: &ObservableCache) -> Result<f64, EosError> {
        let chi = self.significance(cache)?;
        Ok(-chi * chi / 2.0)
    }

    fn significance(&self, cache: &ObservableCache) -> Result<f64, EosError> {
        let saturation = self.saturation(cache)?;
        if saturation < self.bound {
            Ok(0.0)
        } else if self.uncertainty == 0.0 {
            Ok(f64::INFINITY)
        } else {
            Ok((saturation - self.bound) / self.uncertainty)
        }
    }

    fn observables(&self) -> &[CacheId] {
        &self.ids
    }

    fn number_of_observations(&self) -> usize {
        0
    }

    fn describe(&self) -> String {
        format!("UniformBound: {} +- {}", self.bound, self.uncertainty)
    }

    fn clone_block(&self) -> Box<dyn LogLikelihoodBlock> {
        Box::new(self.clone())
    }
}

/// Correlated Gaussian measurement of several predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct MultivariateGaussianBlock {
    ids: Vec<CacheId>,
    means: DVector<f64>,
    lower: DMatrix<f64>,
    norm: f64,
    observations: usize,
}

impl MultivariateGaussianBlock {
    /// Factorises `covariance`; fails unless it is symmetric positive definite
    /// with one row per prediction.
    pub fn new(
        ids: Vec<CacheId>,
        means: DVector<f64>,
        covariance: DMatrix<f64>,
        observations: usize,
    ) -> Result<Self, EosError> {
        let dim = ids.len();
        if dim == 0 || means.len() != dim || covariance.nrows() != dim || covariance.ncols() != dim {
            return Err(EosError::Internal(
                ErrorInfo::new("eos_stats.dimension_mismatch", "means and covariance must match the number of predictions")
                    .with_context("observables", dim.to_string())
                    .with_context("means", means.len().to_string())
                    .with_context("covariance", format!("{}x{}", covariance.nrows(), covariance.ncols())),
            ));
        }
        let asymmetry = (&covariance - covariance.transpose()).amax();
        if asymmetry > 1e-12 * covariance.amax() {
            return Err(EosError::Internal(
                ErrorInfo::new("eos_stats.covariance_not_symmetric", "covariance matrix is not symmetric")
                    .with_context("asymmetry", asymmetry.to_string()),
            ));
        }
        let cholesky = Cholesky::new(covariance).ok_or_else(|| {
            EosError::Numeric(ErrorInfo::new(
                "eos_stats.covariance_not_positive",
                "covariance matrix is not positive definite",
            ))
        })?;
        let lower = cholesky.l();
        let log_det: f64 = lower.diagonal().iter().map(|d| 2.0 * d.ln()).sum();
        Ok(Self {
            ids,
            means,
            lower,
            norm: -0.5 * (dim as f64 * (2.0 * PI).ln() + log_det),
            observations,
        })
    }

    fn chi_squared(&self, cache: &ObservableCache) -> Result<f64, EosError> {
        let mut residual = DVector::zeros(self.ids.len());
        for (slot, (id, mean)) in residual.iter_mut().zip(self.ids.iter().zip(self.means.iter())) {
            *slot = cache.value(*id)? - mean;
        }
        let whitened = self.lower.solve_lower_triangular(&residual).ok_or_else(|| {
            EosError::Numeric(ErrorInfo::new("eos_stats.singular_covariance", "Cholesky factor is singular"))
        })?;
        Ok(whitened.norm_squared())
    }
}

impl LogLikelihoodBlock for MultivariateGaussianBlock {
    fn evaluate(&self, cache: &ObservableCache) -> Result<f64, EosError> {
        Ok(self.norm - self.chi_squared(cache)? / 2.0)
    }

    /// Two-sided Gaussian significance with the same p-value as the block's
    /// chi-squared for its number of observations.
    fn significance(&self, cache: &ObservableCache) -> Result<f64, EosError> {
        let chi_squared = self.chi_squared(cache)?;
        let dof = self.observations.max(1) as f64;
        let statistics = |err: statrs::StatsError| {
            EosError::Numeric(ErrorInfo::new("eos_stats.significance", "cannot convert chi^2 to a significance").with_context("reason", err.to_string()))
        };
        let p_value = 1.0 - ChiSquared::new(dof).map_err(statistics)?.cdf(chi_squared);
        let normal = Normal::new(0.0, 1.0).map_err(statistics)?;
        Ok(normal.inverse_cdf(1.0 - p_value / 2.0))
    }

    fn observables(&self) -> &[CacheId] {
        &self.ids
    }

    fn number_of_observations(&self) -> usize {
        self.observations
    }

    fn describe(&self) -> String {
        format!("MultivariateGaussian: {} observables", self.ids.len())
    }

    fn clone_block(&self) -> Box<dyn LogLikelihoodBlock> {
        Box::new(self.clone())
    }
}

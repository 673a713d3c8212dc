//! One-dimensional log-priors on single parameters.
//!
//! A prior reads and writes its parameter through the world it was built
//! against. [`LogPrior::clone_with`] rebinds it to another world by name.

use std::f64::consts::PI;

use eos_core::{EosError, ErrorInfo};
use eos_params::{Parameter, ParameterUser, Parameters, UsesParameters};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use statrs::distribution::{ContinuousCDF, Normal};

fn invalid_prior(name: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new("eos_stats.invalid_prior", message).with_context("name", name)
}

fn normal(sigma: f64) -> Result<Normal, EosError> {
    Normal::new(0.0, sigma).map_err(|err| {
        EosError::Internal(
            ErrorInfo::new("eos_stats.invalid_prior", "cannot build a normal distribution")
                .with_context("sigma", sigma.to_string())
                .with_context("reason", err.to_string()),
        )
    })
}

/// Shape of a [`LogPrior`].
#[derive(Debug, Clone)]
pub enum PriorKind {
    /// Constant density on `[min, max]`.
    Flat {
        /// Lower edge.
        min: f64,
        /// Upper edge.
        max: f64,
    },
    /// Two half-Gaussians joined at `central`, truncated to `[min, max]`.
    ///
    /// The widths are `central - lower` and `upper - central`.
    Gaussian {
        /// Lower edge.
        min: f64,
        /// Upper edge.
        max: f64,
        /// One standard deviation below the mode.
        lower: f64,
        /// Mode.
        central: f64,
        /// One standard deviation above the mode.
        upper: f64,
    },
    /// Density proportional to `1/x` on `[mu_0 / lambda, mu_0 * lambda]`.
    Scale {
        /// Geometric centre.
        mu_0: f64,
        /// Scale factor, greater than one.
        lambda: f64,
    },
}

#[derive(Debug, Clone)]
struct Truncation {
    lower: Normal,
    upper: Normal,
    c_a: f64,
    c_b: f64,
    prob_lower: f64,
    norm_lower: f64,
    norm_upper: f64,
}

impl Truncation {
    fn new(min: f64, max: f64, lower: f64, central: f64, upper: f64) -> Result<Self, EosError> {
        let (sigma_lower, sigma_upper) = (central - lower, upper - central);
        let lower_normal = normal(sigma_lower)?;
        let upper_normal = normal(sigma_upper)?;
        let tail_lower = 0.5 - lower_normal.cdf(min - central);
        let tail_upper = upper_normal.cdf(max - central) - 0.5;
        let c_a = 1.0 / (sigma_lower / sigma_upper * tail_lower + tail_upper);
        let c_b = sigma_lower / sigma_upper * c_a;
        Ok(Self {
            lower: lower_normal,
            upper: upper_normal,
            c_a,
            c_b,
            prob_lower: c_b * tail_lower,
            norm_lower: (c_b / (2.0 * PI).sqrt() / sigma_lower).ln(),
            norm_upper: (c_a / (2.0 * PI).sqrt() / sigma_upper).ln(),
        })
    }
}

/// Log-prior on one parameter.
#[derive(Debug, Clone)]
pub struct LogPrior {
    parameter: Parameter,
    kind: PriorKind,
    truncation: Option<Truncation>,
    user: ParameterUser,
}

impl LogPrior {
    /// Binds `kind` to parameter `name` of `parameters`.
    pub fn new(parameters: &Parameters, name: &str, kind: PriorKind) -> Result<Self, EosError> {
        let truncation = match kind {
            PriorKind::Flat { min, max } => {
                if !(min < max) {
                    return Err(EosError::Internal(
                        invalid_prior(name, "flat prior needs min < max")
                            .with_context("min", min.to_string())
                            .with_context("max", max.to_string()),
                    ));
                }
                None
            }
            PriorKind::Gaussian {
                min,
                max,
                lower,
                central,
                upper,
            } => {
                if !(min < max && lower < central && central < upper && min <= central && central <= max) {
                    return Err(EosError::Internal(
                        invalid_prior(name, "Gaussian prior needs lower < central < upper inside [min, max]")
                            .with_context("min", min.to_string())
                            .with_context("max", max.to_string())
                            .with_context("central", central.to_string()),
                    ));
                }
                Some(Truncation::new(min, max, lower, central, upper)?)
            }
            PriorKind::Scale { mu_0, lambda } => {
                if !(mu_0 > 0.0 && lambda > 1.0) {
                    return Err(EosError::Internal(
                        invalid_prior(name, "scale prior needs mu_0 > 0 and lambda > 1")
                            .with_context("mu_0", mu_0.to_string())
                            .with_context("lambda", lambda.to_string()),
                    ));
                }
                None
            }
        };
        let parameter = parameters.get(name)?;
        let mut user = ParameterUser::new();
        user.uses(parameter.id());
        Ok(Self {
            parameter,
            kind,
            truncation,
            user,
        })
    }

    /// Flat prior on `[min, max]`.
    pub fn flat(parameters: &Parameters, name: &str, min: f64, max: f64) -> Result<Self, EosError> {
        Self::new(parameters, name, PriorKind::Flat { min, max })
    }

    /// Asymmetric Gaussian prior truncated to `[min, max]`.
    pub fn gaussian(
        parameters: &Parameters,
        name: &str,
        (min, max): (f64, f64),
        lower: f64,
        central: f64,
        upper: f64,
    ) -> Result<Self, EosError> {
        Self::new(
            parameters,
            name,
            PriorKind::Gaussian {
                min,
                max,
                lower,
                central,
                upper,
            },
        )
    }

    /// Scale prior around `mu_0`.
    pub fn scale(parameters: &Parameters, name: &str, mu_0: f64, lambda: f64) -> Result<Self, EosError> {
        Self::new(parameters, name, PriorKind::Scale { mu_0, lambda })
    }

    /// Parameter the prior acts on.
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// Shape of the prior.
    pub fn kind(&self) -> &PriorKind {
        &self.kind
    }

    /// Support of the prior.
    pub fn range(&self) -> (f64, f64) {
        match self.kind {
            PriorKind::Flat { min, max } | PriorKind::Gaussian { min, max, .. } => (min, max),
            PriorKind::Scale { mu_0, lambda } => (mu_0 / lambda, mu_0 * lambda),
        }
    }

    /// Log-density at the parameter's current value.
    ///
    /// Flat and Gaussian priors do not check the support; the scale prior
    /// yields negative infinity outside it.
    pub fn evaluate(&self) -> f64 {
        let x = self.parameter.value();
        match (&self.kind, &self.truncation) {
            (PriorKind::Flat { min, max }, _) => (1.0 / (max - min)).ln(),
            (PriorKind::Gaussian { central, lower, upper, .. }, Some(t)) => {
                if x < *central {
                    let chi = (x - central) / (central - lower);
                    t.norm_lower - chi * chi / 2.0
                } else {
                    let chi = (x - central) / (upper - central);
                    t.norm_upper - chi * chi / 2.0
                }
            }
            (PriorKind::Gaussian { .. }, None) => f64::NAN,
            (PriorKind::Scale { mu_0, lambda }, _) => {
                if x < mu_0 / lambda || x > mu_0 * lambda {
                    f64::NEG_INFINITY
                } else {
                    -(2.0 * lambda.ln() * x).ln()
                }
            }
        }
    }

    /// Draws a value, writes it to the parameter and returns it.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, EosError> {
        let value = match (&self.kind, &self.truncation) {
            (PriorKind::Flat { min, max }, _) => Uniform::new(*min, *max).sample(rng),
            (PriorKind::Gaussian { central, .. }, Some(t)) => {
                let p: f64 = rng.gen();
                if p < t.prob_lower {
                    let (min, _) = self.range();
                    central + t.lower.inverse_cdf(p / t.c_b + t.lower.cdf(min - central))
                } else {
                    central + t.upper.inverse_cdf(0.5 + (p - t.prob_lower) / t.c_a)
                }
            }
            (PriorKind::Gaussian { .. }, None) => {
                return Err(EosError::Internal(invalid_prior(
                    &self.parameter.name(),
                    "Gaussian prior lacks its normalisation",
                )))
            }
            (PriorKind::Scale { mu_0, lambda }, _) => {
                let p: f64 = rng.gen();
                mu_0 * ((2.0 * p - 1.0) * lambda.ln()).exp()
            }
        };
        self.parameter.set(value)?;
        Ok(value)
    }

    /// Same prior on the parameter of the same name in `parameters`.
    pub fn clone_with(&self, parameters: &Parameters) -> Result<LogPrior, EosError> {
        let parameter = parameters.get(&self.parameter.name())?;
        let mut user = ParameterUser::new();
        user.uses(parameter.id());
        Ok(LogPrior {
            parameter,
            kind: self.kind.clone(),
            truncation: self.truncation.clone(),
            user,
        })
    }
}

impl UsesParameters for LogPrior {
    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }
}

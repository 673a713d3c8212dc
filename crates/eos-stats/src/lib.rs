#![deny(missing_docs)]
#![doc = "Constraints, log-likelihoods, log-priors and prior-predictive sampling for the EOS engine."]

pub mod block;
pub mod catalogue;
pub mod constraint;
pub mod likelihood;
pub mod prior;
pub mod sampling;

pub use block::{GaussianBlock, LogLikelihoodBlock, MultivariateGaussianBlock, UniformBoundBlock};
pub use catalogue::{ConstraintCatalogue, CATALOGUE_SOURCES};
pub use constraint::{
    Constraint, ConstraintEntry, GaussianEntry, MultivariateGaussianEntry, ObservableSpec, Sigma, UniformBoundEntry,
};
pub use likelihood::{LogLikelihood, Significance};
pub use prior::{LogPrior, PriorKind};
pub use sampling::{prior_predictive, PriorPredictive, CHUNK_SIZE};

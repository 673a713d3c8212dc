use approx::assert_relative_eq;
use eos_core::{EosError, Options, QualifiedName};
use eos_params::Parameters;
use eos_physics::build_registry;
use eos_stats::{ConstraintCatalogue, LogLikelihood};

const CONSTRAINTS: [&str; 3] = [
    "B^0->pi^+lnu::BR@HFLAV:2019A",
    "B^0->pi^+lnu::BR@BaBar:2012D",
    "B^0->pi^+taunu::BR@Belle:2015A",
];

fn likelihood() -> Result<LogLikelihood, EosError> {
    let catalogue = ConstraintCatalogue::instance()?;
    let registry = build_registry()?;
    let mut llh = LogLikelihood::new(Parameters::defaults()?);
    for name in CONSTRAINTS {
        llh.add_from_catalogue(&catalogue, &registry, &QualifiedName::new(name)?, &Options::new())?;
    }
    Ok(llh)
}

#[test]
fn log_likelihood_sums_its_constraints() -> Result<(), EosError> {
    let mut llh = likelihood()?;
    let total = llh.evaluate()?;
    let mut sum = 0.0;
    for constraint in llh.constraints() {
        sum += constraint.evaluate(llh.observable_cache())?;
    }
    assert_relative_eq!(total, sum, max_relative = 1e-14);
    assert_eq!(llh.constraints().len(), 3);
    assert_eq!(llh.number_of_observations(), 1 + 3);
    assert_eq!(llh.observable_cache().len(), 1 + 3 + 1);

    let significances = llh.significances()?;
    assert_eq!(significances.len(), 3);
    assert!(significances[2].sigma >= 0.0);
    assert!(significances[2].block.starts_with("UniformBound"));
    Ok(())
}

#[test]
fn log_likelihood_follows_parameter_writes() -> Result<(), EosError> {
    let mut llh = likelihood()?;
    let before = llh.evaluate()?;
    llh.parameters().set("B->pi::f_+(0)@BCL2008", 0.3)?;
    let after = llh.evaluate()?;
    assert!(after != before);
    assert!(after.is_finite());
    Ok(())
}

#[test]
fn cloned_likelihoods_are_independent() -> Result<(), EosError> {
    let mut llh = likelihood()?;
    let reference = llh.evaluate()?;

    let other = llh.parameters().deep_clone();
    let mut clone = llh.clone_with(&other)?;
    assert_relative_eq!(clone.evaluate()?, reference, max_relative = 1e-14);

    other.set("B->pi::f_+(0)@BCL2008", 0.3)?;
    assert!(clone.evaluate()? != reference);
    assert_eq!(llh.evaluate()?, reference);
    Ok(())
}

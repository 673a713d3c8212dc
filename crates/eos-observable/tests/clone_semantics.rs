mod common;

use approx::assert_relative_eq;
use eos_core::{EosError, Kinematics, Options};
use eos_observable::{Observable, ObservableSet};
use eos_params::Parameters;

use common::{ratio_kinematics, registry, width_kinematics};

#[test]
fn clones_agree_until_either_side_changes() -> Result<(), EosError> {
    let registry = registry()?;
    let p = Parameters::defaults()?;
    let k = width_kinematics();
    let original = registry.make("test::width;quark=b", &p, &k, &Options::new())?;
    let clone = original.clone_observable()?;

    assert_eq!(clone.evaluate()?, original.evaluate()?);
    assert_eq!(clone.key(), original.key());
    assert_eq!(clone.options(), original.options());
    assert!(clone.parameters().same_world(original.parameters()));
    assert!(!clone.kinematics().shares_storage(original.kinematics()));

    // same world: parameter writes reach both
    p.set("mass::b(MSbar)", 4.1)?;
    assert_eq!(clone.evaluate()?, original.evaluate()?);

    // detached kinematics: only the original follows
    k.set("q2_max", 2.0)?;
    assert_relative_eq!(original.evaluate()?, 4.1, max_relative = 1e-14);
    assert_relative_eq!(clone.evaluate()?, 8.2, max_relative = 1e-14);
    Ok(())
}

#[test]
fn clone_with_rebinds_to_another_world() -> Result<(), EosError> {
    let registry = registry()?;
    let p = Parameters::defaults()?;
    let original = registry.make("test::width", &p, &width_kinematics(), &Options::new())?;

    let world = p.deep_clone();
    let moved = original.clone_with(&world)?;
    assert!(moved.parameters().same_world(&world));
    assert_eq!(moved.parameter_user().ids(), original.parameter_user().ids());

    world.set("mass::c(MSbar)", 1.2)?;
    assert_relative_eq!(moved.evaluate()?, 2.4, max_relative = 1e-14);
    assert_relative_eq!(original.evaluate()?, 2.54, max_relative = 1e-14);
    Ok(())
}

#[test]
fn parameter_observables_clone_by_id() -> Result<(), EosError> {
    let registry = registry()?;
    let p = Parameters::defaults()?;
    let mu = registry.make("mass::mu", &p, &Kinematics::new(), &Options::new())?;
    let world = p.deep_clone();
    let moved = mu.clone_with(&world)?;
    world.set("mass::mu", 0.10566)?;
    assert_eq!(moved.evaluate()?, 0.10566);
    assert_eq!(mu.evaluate()?, 0.1056583755);
    Ok(())
}

#[test]
fn expression_clones_keep_their_references_in_step() -> Result<(), EosError> {
    let registry = registry()?;
    let p = Parameters::defaults()?;
    let k = ratio_kinematics();
    let ratio = registry.make("test::ratio", &p, &k, &Options::new())?;
    let clone = ratio.clone_observable()?;
    assert_relative_eq!(clone.evaluate()?, ratio.evaluate()?, max_relative = 1e-14);

    // the clone's sub-observables read the clone's kinematics
    clone.kinematics().set("q2_b_max", 2.0)?;
    assert_relative_eq!(clone.evaluate()?, (4.18 * 2.0) / (1.27 * 2.0), max_relative = 1e-14);
    assert_relative_eq!(ratio.evaluate()?, (4.18 * 4.0) / (1.27 * 2.0), max_relative = 1e-14);

    let world = p.deep_clone();
    let moved = ratio.clone_with(&world)?;
    world.set("mass::b(MSbar)", 4.1)?;
    assert_relative_eq!(moved.evaluate()?, (4.1 * 4.0) / (1.27 * 2.0), max_relative = 1e-14);
    assert_eq!(moved.parameter_user().ids(), ratio.parameter_user().ids());
    Ok(())
}

#[test]
fn sets_keep_the_first_of_identical_observables() -> Result<(), EosError> {
    let registry = registry()?;
    let p = Parameters::defaults()?;
    let k = width_kinematics();
    let mut set = ObservableSet::new();
    assert!(set.is_empty());

    let (first, inserted) = set.add(registry.make("test::width", &p, &k, &Options::new())?);
    assert_eq!((first, inserted), (0, true));

    let (again, inserted) = set.add(registry.make("test::width;quark=c", &p, &k, &Options::new())?);
    assert_eq!((again, inserted), (0, false));

    let (other, inserted) = set.add(registry.make("test::width", &p, &k, &Options::from_pairs([("multiplier", "2")]))?);
    assert_eq!((other, inserted), (1, true));

    let shifted = Kinematics::from_pairs([("q2_min", 1.0), ("q2_max", 4.0)]);
    let (third, inserted) = set.add(registry.make("test::width", &p, &shifted, &Options::new())?);
    assert_eq!((third, inserted), (2, true));

    assert_eq!(set.len(), 3);
    let names: Vec<String> = set.iter().map(|o| o.name().str()).collect();
    assert_eq!(names, vec!["test::width"; 3]);
    assert!(set.get(3).is_none());
    Ok(())
}

mod common;

use eos_core::{EosError, ErrorKind, Kinematics, Options};
use eos_observable::{install, install_with, instance, is_installed, make, teardown, Observable, ObservableRegistry};
use eos_params::Parameters;

use common::{registry, width_kinematics};

// The installed slot is process-wide, so its whole lifecycle lives in one test.
#[test]
fn installed_registry_lifecycle() -> Result<(), EosError> {
    teardown();
    assert!(!is_installed());
    let err = instance().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.code(), "eos_observable.registry_not_installed");

    let p = Parameters::defaults()?;
    let err = make("test::width", &p, &width_kinematics(), &Options::new()).unwrap_err();
    assert_eq!(err.code(), "eos_observable.registry_not_installed");

    let first = install_with(registry)?;
    let second = install_with(|| Ok(ObservableRegistry::new()))?;
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(instance()?.len(), first.len());

    let width = make("test::width", &p, &width_kinematics(), &Options::new())?;
    assert_eq!(width.evaluate()?, 1.27 * 2.0);
    let mu = make("mass::mu", &p, &Kinematics::new(), &Options::new())?;
    assert_eq!(mu.evaluate()?, 0.1056583755);

    let replaced = install(ObservableRegistry::new());
    assert!(replaced.is_empty());
    assert!(instance()?.is_empty());

    assert!(teardown());
    assert!(!teardown());
    Ok(())
}

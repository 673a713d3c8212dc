mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use eos_core::{EngineConfig, EosError, ErrorKind, Kinematics, Options};
use eos_observable::{Observable, ObservableCache};
use eos_physics::{build_registry, init, init_with, integration_config, teardown};

use common::{bin, pilnu_options, pilnu_parameters};

#[test]
fn cache_reevaluates_only_after_relevant_writes() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    let options = pilnu_options("e", "d");
    let mut cache = ObservableCache::new(p.clone());
    let br = cache.add(registry.make("B->pilnu::BR", &p, &bin(0.01, 12.0), &options)?)?;
    let f_plus = cache.add(registry.make(
        "B->D::f_+(q2)",
        &p,
        &Kinematics::from_pairs([("q2", 0.0)]),
        &Options::new(),
    )?)?;
    cache.update()?;
    let before = cache.value(br)?;

    p.set("B->D::f_+(0)@BCL2008", 0.7)?;
    assert!(!cache.is_dirty(br)?);
    assert!(cache.is_dirty(f_plus)?);
    cache.update()?;
    assert_eq!(cache.value(br)?, before);
    assert_relative_eq!(cache.value(f_plus)?, 0.7, max_relative = 1e-14);

    p.set("CKM::abs(V_ub)", 4.0e-3)?;
    assert!(cache.is_dirty(br)?);
    cache.update()?;
    assert_relative_eq!(cache.value(br)?, before * (4.0 / 3.32f64).powi(2), max_relative = 1e-12);
    Ok(())
}

#[test]
fn clones_onto_another_world_evaluate_independently() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    let k = Kinematics::from_pairs([("q2_mu_min", 0.02), ("q2_mu_max", 12.0), ("q2_tau_min", 3.2), ("q2_tau_max", 12.0)]);
    let ratio = registry.make("B->pilnu::R_pi", &p, &k, &Options::from_pairs([("model", "CKM")]))?;
    let reference = ratio.evaluate()?;

    let other = p.deep_clone();
    let moved = ratio.clone_with(&other)?;
    assert_relative_eq!(moved.evaluate()?, reference, max_relative = 1e-14);

    other.set("B->pi::b_+^1@BCL2008", -1.0)?;
    assert!(moved.evaluate()? != reference);
    assert_eq!(ratio.evaluate()?, reference);

    // The lepton-universal CKM factor cancels.
    p.set("CKM::abs(V_ub)", 4.0e-3)?;
    assert_relative_eq!(ratio.evaluate()?, reference, max_relative = 1e-12);
    Ok(())
}

#[test]
fn installed_registry_lifecycle() -> Result<(), EosError> {
    teardown();
    assert!(eos_observable::instance().is_err());

    let config = EngineConfig::from_yaml_str("integration:\n  epsrel: 1.0e-8\n  max_depth: 30\n")?;
    let registry = init_with(&config)?;
    assert_eq!(integration_config().epsrel, 1.0e-8);
    assert_eq!(integration_config().max_depth, 30);
    assert!(Arc::ptr_eq(&registry, &init()?));

    assert!(registry.has("B->pilnu::BR"));
    assert!(registry.has("B_s->Klnu::R_K_0"));
    assert!(registry.has("B->pi::f_T(q2)"));
    let titles: Vec<&str> = registry.sections().iter().map(|section| section.title.as_str()).collect();
    assert_eq!(titles, ["Form factors", "Semileptonic B -> P decays"]);
    for section in registry.sections() {
        for group in &section.groups {
            for name in &group.names {
                assert!(registry.get(name).is_some(), "{name} is listed but not registered");
            }
        }
    }

    let p = pilnu_parameters()?;
    let observable = eos_observable::make("B->pilnu::BR", &p, &bin(0.01, 12.0), &pilnu_options("e", "d"))?;
    assert_relative_eq!(observable.evaluate()?, 8.29930e-5, max_relative = 1e-4);

    let invalid = EngineConfig {
        integration: eos_core::IntegrationConfig {
            max_depth: 0,
            ..Default::default()
        },
        ..Default::default()
    };
    assert_eq!(init_with(&invalid).unwrap_err().kind(), ErrorKind::Internal);

    assert!(teardown());
    assert!(!teardown());
    Ok(())
}

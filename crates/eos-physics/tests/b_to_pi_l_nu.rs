mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use eos_core::{EosError, ErrorKind, Kinematics, LeptonFlavor, OptionRecord, Options, QuarkFlavor};
use eos_observable::Observable;
use eos_physics::{build_registry, SemileptonicOptions};

use common::{bin, pilnu_options, pilnu_parameters, REFERENCE_BINS};

#[test]
fn branching_ratios_reproduce_reference_bins() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    let options = pilnu_options("e", "d");
    for (q2_min, q2_max, expected) in REFERENCE_BINS {
        let observable = registry.make("B->pilnu::BR", &p, &bin(q2_min, q2_max), &options)?;
        assert_abs_diff_eq!(observable.evaluate()?, expected, epsilon = 1e-8);
    }
    Ok(())
}

#[test]
fn branching_ratio_matches_published_value_to_quoted_precision() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    let options = Options::from_pairs([
        ("model", "CKMScan"),
        ("form-factors", "BCL2008"),
        ("U", "u"),
        ("q", "d"),
        ("l", "e"),
    ]);
    let observable = registry.make("B->pilnu::BR", &p, &bin(0.01, 2.0), &options)?;
    assert_relative_eq!(observable.evaluate()?, 1.44047e-5, max_relative = 1e-5);
    Ok(())
}

#[test]
fn option_record_fills_defaults_and_checks_values() -> Result<(), EosError> {
    let record = SemileptonicOptions::read(&Options::from_pairs([("P", "pi"), ("U", "u")]))?;
    assert_eq!(record.q, QuarkFlavor::Down);
    assert_eq!(record.final_state, "pi");
    assert_eq!(record.lepton, LeptonFlavor::Muon);
    assert!(!record.cp_conjugate);
    assert_eq!(record.model, "SM");
    assert_eq!(record.form_factors, "BCL2008");

    let explicit = SemileptonicOptions::read(&Options::from_pairs([
        ("P", "D"),
        ("q", "u"),
        ("l", "tau"),
        ("cp-conjugate", "true"),
        ("model", "WET"),
        ("form-factors", "BCL2008-4"),
    ]))?;
    assert_eq!(explicit.lepton, LeptonFlavor::Tauon);
    assert!(explicit.cp_conjugate);
    assert_eq!(explicit.form_factors, "BCL2008-4");

    let missing = SemileptonicOptions::read(&Options::from_pairs([("l", "e")])).unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::Option);
    assert_eq!(missing.code(), "eos_core.unspecified_option");

    let invalid = SemileptonicOptions::read(&Options::from_pairs([("P", "pi"), ("l", "nu")])).unwrap_err();
    assert_eq!(invalid.kind(), ErrorKind::Option);
    assert_eq!(invalid.code(), "eos_core.invalid_option_value");
    Ok(())
}

#[test]
fn charged_pion_channel_is_half_the_neutral_one() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    p.set("mass::B_u", 5.2793)?;
    p.set("mass::pi^0", 0.13498)?;
    p.set("life_time::B_u", 1.519e-12)?;
    let options = pilnu_options("e", "u");
    // Above q2 = 12 the lighter pi^0 opens visibly more phase space.
    for (q2_min, q2_max, expected) in &REFERENCE_BINS[..7] {
        let observable = registry.make("B->pilnu::BR", &p, &bin(*q2_min, *q2_max), &options)?;
        assert_abs_diff_eq!(observable.evaluate()?, *expected / 2.0, epsilon = 0.5e-8);
    }
    Ok(())
}

#[test]
fn adjacent_bins_add_up() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    let options = pilnu_options("e", "d");
    let k = bin(0.01, 12.0);
    let total = registry.make("B->pilnu::BR", &p, &k, &options)?.evaluate()?;

    let mut sum = 0.0;
    for (q2_min, q2_max, _) in &REFERENCE_BINS[..6] {
        sum += registry.make("B->pilnu::BR", &p, &bin(*q2_min, *q2_max), &options)?.evaluate()?;
    }
    assert_relative_eq!(sum, total, max_relative = 1e-9);
    Ok(())
}

#[test]
fn ratio_divides_tau_by_muon_branching_ratio() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    let options = Options::from_pairs([("model", "CKM")]);
    let k = Kinematics::from_pairs([
        ("q2_mu_min", 0.011),
        ("q2_mu_max", 10.0),
        ("q2_tau_min", 3.154),
        ("q2_tau_max", 10.0),
    ]);
    let ratio = registry.make("B->pilnu::R_pi", &p, &k, &options)?.evaluate()?;

    let tau = registry
        .make("B->pilnu::BR;l=tau", &p, &bin(3.154, 10.0), &options)?
        .evaluate()?;
    let mu = registry
        .make("B->pilnu::BR;l=mu", &p, &bin(0.011, 10.0), &options)?
        .evaluate()?;
    assert_relative_eq!(ratio, tau / mu, max_relative = 1e-10);
    assert!(ratio > 0.0 && ratio < 1.0);
    Ok(())
}

#[test]
fn normalised_observables_drop_the_ckm_factor() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    let options = pilnu_options("e", "d");
    let k = bin(0.01, 12.0);
    let br = registry.make("B->pilnu::BR", &p, &k, &options)?;
    let zeta = registry.make("B->pilnu::zeta", &p, &k, &options)?;
    assert_relative_eq!(br.evaluate()?, zeta.evaluate()? * 3.32e-3 * 3.32e-3, max_relative = 1e-12);

    p.set("CKM::abs(V_ub)", 4.0e-3)?;
    assert_relative_eq!(br.evaluate()?, zeta.evaluate()? * 16.0e-6, max_relative = 1e-12);
    Ok(())
}

#[test]
fn pdf_integrates_to_one_over_the_physical_region() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    let options = pilnu_options("mu", "d");
    let q2_min = 0.1056583755_f64.powi(2);
    let q2_max = (5.2796_f64 - 0.13957).powi(2);
    let pdf = registry.make("B->pilnu::P(q2_min,q2_max)", &p, &bin(q2_min, q2_max), &options)?;
    assert_relative_eq!(pdf.evaluate()? * (q2_max - q2_min), 1.0, max_relative = 1e-9);

    let density = registry.make("B->pilnu::P(q2)", &p, &Kinematics::from_pairs([("q2", 30.0)]), &options)?;
    assert_eq!(density.evaluate()?, 0.0);
    Ok(())
}

#[test]
fn angular_distribution_reduces_to_the_differential_rate() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    p.set("ubmunumu::Re{cT}", 0.1)?;
    p.set("ubmunumu::Re{cSL}", 0.2)?;
    let options = Options::from_pairs([("model", "WET"), ("l", "mu")]);

    let k = Kinematics::from_pairs([("q2", 4.5), ("cos(theta_l)", 0.0)]);
    let rate = registry.make("B->pilnu::dBR/dq2", &p, &k, &options)?;
    let angular = registry.make("B->pilnu::d^2BR/dq2/dcos(theta_l)", &p, &k, &options)?;
    let a_fb = registry.make("B->pilnu::A_FB(q2)", &p, &k, &options)?;

    let mut samples = [0.0; 3];
    for (slot, c) in samples.iter_mut().zip([-1.0, 0.0, 1.0]) {
        k.set("cos(theta_l)", c)?;
        *slot = angular.evaluate()?;
    }
    // Quadratic in cos(theta_l), so Simpson's rule is exact.
    let integral = (samples[0] + 4.0 * samples[1] + samples[2]) / 3.0;
    assert_relative_eq!(integral, rate.evaluate()?, max_relative = 1e-12);
    assert_relative_eq!((samples[2] - samples[0]) / 2.0 / integral, a_fb.evaluate()?, max_relative = 1e-10);
    Ok(())
}

#[test]
fn asymmetries_stay_bounded() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    for lepton in ["e", "mu", "tau"] {
        let options = pilnu_options(lepton, "d");
        let k = bin(3.2, 20.0);
        let a_fb = registry.make("B->pilnu::A_FB", &p, &k, &options)?.evaluate()?;
        let f_h = registry.make("B->pilnu::F_H", &p, &k, &options)?.evaluate()?;
        let a_l = registry.make("B->pilnu::A_l", &p, &k, &options)?.evaluate()?;
        // Positivity of the rate at cos(theta_l) = +-1.
        assert!(a_fb.abs() <= f_h / 2.0 + 1e-12, "{lepton}: A_FB = {a_fb}, F_H = {f_h}");
        assert!((0.0..=3.0).contains(&f_h), "{lepton}: F_H = {f_h}");
        assert!(a_l.abs() <= 1.0, "{lepton}: A_l = {a_l}");
    }
    Ok(())
}

#[test]
fn width_splits_into_helicity_parts() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    let options = pilnu_options("tau", "d");
    let k = bin(3.2, 20.0);
    let total = registry.make("B->pilnu::width", &p, &k, &options)?.evaluate()?;
    let longitudinal = registry.make("B->pilnu::width_p", &p, &k, &options)?.evaluate()?;
    let timelike = registry.make("B->pilnu::width_0", &p, &k, &options)?.evaluate()?;
    assert_relative_eq!(total, longitudinal + timelike, max_relative = 1e-9);
    Ok(())
}

#[test]
fn unsupported_channels_fail_on_construction() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    let err = registry
        .make("B->pilnu::BR;q=s", &p, &bin(0.01, 12.0), &Options::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Option);
    assert_eq!(err.code(), "eos_physics.unsupported_channel");

    let err = registry
        .make("B->pilnu::BR;l=nu", &p, &bin(0.01, 12.0), &Options::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Option);
    Ok(())
}

#[test]
fn strange_family_fixes_its_spectator() -> Result<(), EosError> {
    let registry = build_registry()?;
    let p = pilnu_parameters()?;
    let observable = registry.make("B_s->Klnu::BR", &p, &bin(0.1, 12.0), &Options::from_pairs([("q", "d")]))?;
    assert_eq!(observable.options().get("q", "?"), "s");
    assert_eq!(observable.options().get("P", "?"), "K");
    assert!(observable.evaluate()? > 0.0);
    Ok(())
}

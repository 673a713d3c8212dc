mod common;

use approx::assert_relative_eq;
use eos_core::{EosError, ErrorKind, Kinematics, Options, Unit};
use eos_observable::{Expression, Observable, ObservableRegistry};
use eos_params::Parameters;

use common::{ratio_kinematics, registry};

#[test]
fn arithmetic_follows_precedence() -> Result<(), EosError> {
    assert_eq!(Expression::parse("1+2*3")?.evaluate_constant()?, 7.0);
    assert_eq!(Expression::parse("1+2^2*3")?.evaluate_constant()?, 13.0);
    assert_relative_eq!(
        Expression::parse("2^(1+3.5)+3")?.evaluate_constant()?,
        25.627416998,
        epsilon = 1e-8
    );
    assert_eq!(Expression::parse("(1 - 3) * -2")?.evaluate_constant()?, 4.0);
    Ok(())
}

#[test]
fn malformed_expressions_are_syntax_errors() {
    for input in ["1 /* 2", "<<test::width>>[q2_min=>]", "<<test::width>>[q2_min]", "{q2", "2 +"] {
        let err = Expression::parse(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax, "{input}");
        assert_eq!(err.code(), "eos_observable.expression_syntax", "{input}");
    }
    let err = Expression::parse("<<test:width>>").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn references_are_parsed_with_their_kinematics() -> Result<(), EosError> {
    let parsed = Expression::parse("<<B->pilnu::BR;l=tau>>[q2_max=>q2_tau_max,q2_min=0.5] * [[mass::c(MSbar)]] - {s}")?;
    let mut observables = Vec::new();
    let mut parameters = Vec::new();
    let mut variables = Vec::new();
    parsed.walk(&mut |node| match node {
        Expression::Observable { name, kinematics } => observables.push((name.full(), kinematics.clone())),
        Expression::Parameter(name) => parameters.push(name.clone()),
        Expression::Kinematic(name) => variables.push(name.clone()),
        _ => {}
    });
    assert_eq!(observables.len(), 1);
    assert_eq!(observables[0].0, "B->pilnu::BR;l=tau");
    assert_eq!(observables[0].1.aliases, vec![("q2_max".to_string(), "q2_tau_max".to_string())]);
    assert_eq!(observables[0].1.values, vec![("q2_min".to_string(), 0.5)]);
    assert_eq!(parameters, vec!["mass::c(MSbar)"]);
    assert_eq!(variables, vec!["s"]);
    Ok(())
}

#[test]
fn kinematic_references_read_the_caller() -> Result<(), EosError> {
    let mut registry = ObservableRegistry::new();
    registry.insert_expression("test::difference", "", Unit::None, Options::new(), "{q2_mu} - {q2_e}")?;
    let p = Parameters::defaults()?;
    let k = Kinematics::from_pairs([("q2_mu", 4.0), ("q2_e", 3.0)]);
    let observable = registry.make("test::difference", &p, &k, &Options::new())?;
    assert_eq!(observable.evaluate()?, 1.0);
    k.set("q2_e", 1.5)?;
    assert_eq!(observable.evaluate()?, 2.5);
    Ok(())
}

#[test]
fn parameter_references_track_dependencies() -> Result<(), EosError> {
    let mut registry = ObservableRegistry::new();
    registry.insert_expression(
        "mass::ratio",
        r"m_c/m_b",
        Unit::None,
        Options::new(),
        "[[mass::c(MSbar)]] / [[mass::b(MSbar)]]",
    )?;
    let p = Parameters::defaults()?;
    let ratio = registry.make("mass::ratio", &p, &Kinematics::new(), &Options::new())?;
    assert_relative_eq!(ratio.evaluate()?, 1.27 / 4.18, max_relative = 1e-14);
    assert!(ratio.parameter_user().contains(p.get("mass::c(MSbar)")?.id()));
    assert!(ratio.parameter_user().contains(p.get("mass::b(MSbar)")?.id()));
    assert_eq!(ratio.parameter_user().len(), 2);
    Ok(())
}

#[test]
fn aliases_redirect_sub_observables() -> Result<(), EosError> {
    let registry = registry()?;
    let entry = registry.get(&"test::ratio".parse()?).expect("test::ratio is registered");
    assert_eq!(
        entry.kinematic_variables(),
        ["q2_b_min", "q2_b_max", "q2_c_min", "q2_c_max"].map(String::from).as_slice()
    );

    let p = Parameters::defaults()?;
    let k = ratio_kinematics();
    let ratio = registry.make("test::ratio", &p, &k, &Options::new())?;
    assert_relative_eq!(ratio.evaluate()?, (4.18 * 4.0) / (1.27 * 2.0), max_relative = 1e-14);

    k.set("q2_b_max", 2.0)?;
    assert_relative_eq!(ratio.evaluate()?, (4.18 * 2.0) / (1.27 * 2.0), max_relative = 1e-14);
    // aliases do not leak into the caller's handle
    assert!(k.aliases().is_empty());
    Ok(())
}

#[test]
fn pinned_values_do_not_touch_the_caller() -> Result<(), EosError> {
    let mut registry = registry()?;
    registry.insert_expression(
        "test::pinned",
        "",
        Unit::GeV,
        Options::new(),
        "<<test::width>>[q2_min=0.5]",
    )?;
    let entry = registry.get(&"test::pinned".parse()?).expect("registered");
    assert_eq!(entry.kinematic_variables(), ["q2_max".to_string()].as_slice());

    let p = Parameters::defaults()?;
    let k = Kinematics::from_pairs([("q2_min", 2.0), ("q2_max", 3.0)]);
    let pinned = registry.make("test::pinned", &p, &k, &Options::new())?;
    assert_relative_eq!(pinned.evaluate()?, 1.27 * 2.5, max_relative = 1e-14);
    assert_eq!(k.value("q2_min")?, 2.0);
    Ok(())
}

#[test]
fn expression_options_reach_sub_observables() -> Result<(), EosError> {
    let registry = registry()?;
    let p = Parameters::defaults()?;
    let k = ratio_kinematics();
    k.set("q2_b_max", 2.0)?;
    let ratio = registry.make("test::ratio", &p, &k, &Options::from_pairs([("multiplier", "2")]))?;
    // both references see multiplier=2, so the ratio is unchanged
    assert_relative_eq!(ratio.evaluate()?, 4.18 / 1.27, max_relative = 1e-14);
    Ok(())
}

#[test]
fn registration_checks_references() -> Result<(), EosError> {
    let mut registry = registry()?;

    let err = registry
        .insert_expression("test::bad", "", Unit::None, Options::new(), "<<test::missing>> + 1")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Name);
    assert_eq!(err.code(), "eos_observable.unknown_observable");

    let err = registry
        .insert_expression("test::bad", "", Unit::None, Options::new(), "[[mass::nothing]]")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Name);

    let err = registry
        .insert_expression(
            "test::bad",
            "",
            Unit::None,
            Options::new(),
            "<<test::width>>[q2_min=>q2_a] / <<test::point>>[q2=>q2_min]",
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.code(), "eos_observable.alias_conflict");

    let err = registry
        .insert_expression("test::bad", "", Unit::None, Options::new(), "<<test::width>> +")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);

    // parameters are valid observable references
    registry.insert_expression("test::mu", "", Unit::GeV, Options::new(), "2 * <<mass::mu>>")?;
    assert!(!registry.has("test::bad"));
    Ok(())
}

#[test]
fn nested_expressions_resolve_through_each_level() -> Result<(), EosError> {
    let mut registry = registry()?;
    registry.insert_expression(
        "test::double-ratio",
        "",
        Unit::None,
        Options::new(),
        "2 * <<test::ratio>>",
    )?;
    let p = Parameters::defaults()?;
    let k = ratio_kinematics();
    let double = registry.make("test::double-ratio", &p, &k, &Options::new())?;
    assert_relative_eq!(double.evaluate()?, 2.0 * (4.18 * 4.0) / (1.27 * 2.0), max_relative = 1e-14);
    Ok(())
}

#[test]
fn expression_entries_publish_the_options_of_their_references() -> Result<(), EosError> {
    let registry = registry()?;
    let entry = registry.get(&"test::ratio".parse()?).expect("test::ratio is registered");
    let quark = entry.option_schema().specification("quark").expect("quark is declared");
    assert_eq!(quark.allowed_values, vec!["c".to_string(), "b".to_string()]);
    assert!(entry.option_schema().specification("multiplier").is_some());

    let p = Parameters::defaults()?;
    let err = registry
        .make("test::ratio", &p, &ratio_kinematics(), &Options::from_pairs([("quark", "t")]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Option);
    assert_eq!(err.code(), "eos_core.invalid_option_value");

    let mut plain = ObservableRegistry::new();
    plain.insert_expression("test::constant", "", Unit::None, Options::new(), "2 * 3")?;
    let constant = plain.get(&"test::constant".parse()?).expect("test::constant is registered");
    assert!(constant.option_schema().is_empty());
    Ok(())
}

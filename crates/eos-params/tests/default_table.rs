use eos_core::{EosError, ErrorKind, Unit};
use eos_params::{DefaultTable, Parameters, DEFAULT_SOURCES};

#[test]
fn defaults_contain_the_core_inputs() -> Result<(), EosError> {
    let p = Parameters::defaults()?;
    for name in [
        "QM::hbar",
        "WET::G_Fermi",
        "mass::B_d",
        "mass::pi^+",
        "life_time::B_d",
        "CKM::abs(V_ub)",
        "ubenue::Re{cVL}",
        "B->pi::f_+(0)@BCL2008",
    ] {
        assert!(p.has(name), "missing default parameter {name}");
    }
    assert_eq!(p.get("life_time::B_d")?.value(), 1.519e-12);
    assert_eq!(p.get("mass::B_d")?.unit(), Unit::GeV);
    assert_eq!(p.get("ubmunumu::Re{cVL}")?.central(), 1.0);
    Ok(())
}

#[test]
fn templated_names_expand_over_the_matrix() -> Result<(), EosError> {
    let p = Parameters::defaults()?;
    for process in ["B->pi", "B->D", "B_s->K"] {
        for k in 1..=4 {
            assert!(p.has(&format!("{process}::b_+^{k}@BCL2008")));
            assert!(p.has(&format!("{process}::b_T^{k}@BCL2008")));
        }
        for k in 1..=5 {
            assert!(p.has(&format!("{process}::b_0^{k}@BCL2008")));
        }
        assert!(!p.has(&format!("{process}::b_+^5@BCL2008")));
    }
    let latex = p.get("cbtaunutau::Re{cSL}")?.latex();
    assert_eq!(latex, r"\mathrm{Re}\,\mathcal{C}_{cbtaunutau}^{S_L}");
    Ok(())
}

#[test]
fn aliases_resolve_to_the_same_storage() -> Result<(), EosError> {
    let p = Parameters::defaults()?;
    let plus = p.get("mass::pi^+")?;
    let minus = p.get("mass::pi^-")?;
    assert_eq!(plus.id(), minus.id());
    minus.set(0.1396)?;
    assert_eq!(plus.value(), 0.1396);
    assert_eq!(p.aliases_of(plus.id()), vec!["mass::pi^-".to_string()]);
    assert_eq!(minus.name(), "mass::pi^+");
    Ok(())
}

#[test]
fn sections_follow_the_data_files() -> Result<(), EosError> {
    let p = Parameters::defaults()?;
    let titles: Vec<&str> = p.sections().iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles.len(), DEFAULT_SOURCES.len());
    assert_eq!(titles[0], "Constants");
    let grouped: usize = p
        .sections()
        .iter()
        .flat_map(|s| s.groups.iter())
        .map(|g| g.ids.len())
        .sum();
    assert_eq!(grouped, p.len());
    Ok(())
}

#[test]
fn every_world_starts_from_central_values() -> Result<(), EosError> {
    let p = Parameters::defaults()?;
    p.set("mass::B_d", 5.2796)?;
    let q = Parameters::defaults()?;
    assert_eq!(q.get("mass::B_d")?.value(), 5.27966);
    assert_ne!(p.world_id(), q.world_id());
    Ok(())
}

const SECTION: &str = r#"
title: Test
groups:
  - title: first
    parameters:
      "a::x":
        central: 1.0
        min: 0.0
        max: 2.0
  - title: second
    parameters:
      "a::x":
        central: 1.5
        min: 0.0
        max: 2.0
"#;

#[test]
fn duplicate_names_are_internal_errors() {
    let err = DefaultTable::parse(&[("dup.yaml", SECTION)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.code(), "eos_params.duplicate_parameter");
    assert_eq!(err.info().context.get("name").map(String::as_str), Some("a::x"));
}

#[test]
fn duplicates_produced_by_templates_or_aliases_are_detected() {
    let templated = r#"
title: Test
groups:
  - title: g
    parameters:
      "a::x1":
        central: 0.0
        min: -1.0
        max: 1.0
      "a::x%s":
        central: 0.0
        min: -1.0
        max: 1.0
        matrix: [["1", "2"]]
"#;
    let err = DefaultTable::parse(&[("t.yaml", templated)]).unwrap_err();
    assert_eq!(err.code(), "eos_params.duplicate_parameter");

    let aliased = r#"
title: Test
groups:
  - title: g
    parameters:
      "a::x":
        central: 0.0
        min: -1.0
        max: 1.0
      "a::y":
        central: 0.0
        min: -1.0
        max: 1.0
        alias_of: ["a::z", "a::x"]
"#;
    let err = DefaultTable::parse(&[("a.yaml", aliased)]).unwrap_err();
    assert_eq!(err.code(), "eos_params.duplicate_parameter");
}

#[test]
fn malformed_templates_are_rejected() {
    let without_matrix = r#"
title: Test
groups:
  - title: g
    parameters:
      "a::x%s":
        central: 0.0
        min: -1.0
        max: 1.0
"#;
    let err = DefaultTable::parse(&[("m.yaml", without_matrix)]).unwrap_err();
    assert_eq!(err.code(), "eos_params.template_without_matrix");

    let arity = r#"
title: Test
groups:
  - title: g
    parameters:
      "a::x%s_%s":
        central: 0.0
        min: -1.0
        max: 1.0
        matrix: [["1", "2"]]
"#;
    let err = DefaultTable::parse(&[("m.yaml", arity)]).unwrap_err();
    assert_eq!(err.code(), "eos_params.template_arity");
}

#[test]
fn syntax_and_shape_errors_surface_with_their_family() {
    let bad_name = r#"
title: Test
groups:
  - title: g
    parameters:
      "no-prefix":
        central: 0.0
        min: -1.0
        max: 1.0
"#;
    let err = DefaultTable::parse(&[("n.yaml", bad_name)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);

    let missing_range = r#"
title: Test
groups:
  - title: g
    parameters:
      "a::x":
        central: 0.0
"#;
    let err = DefaultTable::parse(&[("r.yaml", missing_range)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serde);
    assert_eq!(err.info().context.get("file").map(String::as_str), Some("r.yaml"));

    let empty_range = r#"
title: Test
groups:
  - title: g
    parameters:
      "a::x":
        central: 0.0
        min: 1.0
        max: -1.0
"#;
    let err = DefaultTable::parse(&[("e.yaml", empty_range)]).unwrap_err();
    assert_eq!(err.code(), "eos_params.invalid_range");
}

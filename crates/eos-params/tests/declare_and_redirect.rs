use eos_core::{EosError, ErrorKind, Unit};
use eos_params::{ParameterId, Parameters};

#[test]
fn declared_parameters_live_in_one_world_only() -> Result<(), EosError> {
    let p = Parameters::defaults()?;
    let q = p.deep_clone();
    let x = p.declare_and_insert("test::x", "x", Unit::None, 0.5, 0.0, 1.0)?;
    assert_eq!(x.value(), 0.5);
    assert!(p.has("test::x"));
    assert!(!q.has("test::x"));
    assert!(!Parameters::defaults()?.has("test::x"));
    Ok(())
}

#[test]
fn redeclaring_returns_the_existing_parameter() -> Result<(), EosError> {
    let p = Parameters::defaults()?;
    let original = p.get("mass::B_d")?;
    let again = p.declare_and_insert("mass::B_d", "", Unit::GeV, 1.0, 0.0, 2.0)?;
    assert_eq!(original.id(), again.id());
    assert_eq!(again.value(), 5.27966);
    Ok(())
}

#[test]
fn declaration_validates_name_and_range() -> Result<(), EosError> {
    let p = Parameters::empty();
    let err = p.declare_and_insert("no_prefix", "", Unit::None, 0.0, 0.0, 1.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    let err = p.declare_and_insert("a::b", "", Unit::None, 0.0, 1.0, 0.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(p.is_empty());
    Ok(())
}

#[test]
fn redirect_points_an_existing_name_at_another_id() -> Result<(), EosError> {
    let p = Parameters::defaults()?;
    let target = p.get("mass::B_u")?.id();
    p.redirect("mass::B_d", target)?;
    assert_eq!(p.get("mass::B_d")?.id(), target);
    assert_eq!(p.get("mass::B_d")?.value(), p.get("mass::B_u")?.value());

    let err = p.redirect("mass::nothing", target).unwrap_err();
    assert_eq!(err.code(), "eos_params.unknown_parameter");
    let err = p.redirect("mass::B_s", ParameterId(u32::MAX)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    Ok(())
}

#[test]
fn unknown_lookups_name_the_missing_parameter() -> Result<(), EosError> {
    let p = Parameters::defaults()?;
    let err = p.get("mass::Q").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Name);
    assert_eq!(err.info().context.get("name").map(String::as_str), Some("mass::Q"));
    assert!(p.by_id(ParameterId(p.len() as u32)).is_err());
    Ok(())
}

#[test]
fn metadata_accessors_round_trip() -> Result<(), EosError> {
    let p = Parameters::defaults()?;
    let m = p.get("mass::B_s")?;
    assert!(!m.is_nuisance());
    m.set_nuisance(true);
    assert!(m.is_nuisance());
    m.set_generator_value(5.3671);
    assert_eq!(m.generator_value(), 5.3671);
    assert_eq!(m.value(), 5.36692);
    m.set_central(5.367);
    assert_eq!(m.central(), 5.367);
    assert_eq!(m.world_id(), p.world_id());
    Ok(())
}

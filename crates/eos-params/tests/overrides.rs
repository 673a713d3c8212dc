use std::io::Write;

use eos_core::{EosError, ErrorKind, Unit};
use eos_params::Parameters;

#[test]
fn overrides_update_known_and_declare_new_parameters() -> Result<(), EosError> {
    let p = Parameters::defaults()?;
    let before = p.len();
    p.override_from_str(
        r#"
"@metadata@":
  author: someone
"mass::B_d":
  central: 5.2796
  max: 5.2800
"mass::X":
  central: 3.0
  unit: GeV
  latex: "m_X"
"#,
    )?;
    let b = p.get("mass::B_d")?;
    assert_eq!(b.value(), 5.2796);
    assert_eq!(b.central(), 5.2796);
    assert_eq!(b.max(), 5.2800);
    assert_eq!(b.min(), 5.27);

    let x = p.get("mass::X")?;
    assert_eq!(p.len(), before + 1);
    assert_eq!((x.min(), x.value(), x.max()), (3.0, 3.0, 3.0));
    assert_eq!(x.unit(), Unit::GeV);
    assert_eq!(x.latex(), "m_X");
    assert!(!p.has("@metadata@"));
    Ok(())
}

#[test]
fn overrides_read_from_files() -> Result<(), EosError> {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "\"CKM::abs(V_ub)\":\n  central: 3.32e-3").unwrap();
    let p = Parameters::defaults()?;
    p.override_from_file(file.path())?;
    assert_eq!(p.get("CKM::abs(V_ub)")?.value(), 3.32e-3);
    Ok(())
}

#[test]
fn malformed_overrides_are_serde_errors() -> Result<(), EosError> {
    let p = Parameters::defaults()?;
    let err = p.override_from_str("\"mass::B_d\":\n  min: 1.0\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serde);
    assert_eq!(err.info().context.get("name").map(String::as_str), Some("mass::B_d"));

    let missing = std::path::Path::new("/nonexistent/overrides.yaml");
    let err = p.override_from_file(missing).unwrap_err();
    assert_eq!(err.code(), "eos_params.override_io");
    Ok(())
}

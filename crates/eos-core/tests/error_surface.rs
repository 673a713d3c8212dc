use eos_core::errors::{EosError, ErrorInfo, ErrorKind};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("name", "mass::B_d")
        .with_hint("check the parameter table")
}

#[test]
fn name_error_surface() {
    let err = EosError::Name(sample_info("eos_params.unknown_parameter", "unknown parameter"));
    assert_eq!(err.kind(), ErrorKind::Name);
    assert_eq!(err.code(), "eos_params.unknown_parameter");
    assert_eq!(err.info().context.get("name").map(String::as_str), Some("mass::B_d"));
}

#[test]
fn display_lists_context_and_hint() {
    let err = EosError::Range(sample_info("eos_params.out_of_range", "value outside range"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("range error: value outside range"));
    assert!(rendered.contains("name=mass::B_d"));
    assert!(rendered.contains("hint: check the parameter table"));
}

#[test]
fn every_family_reports_its_kind() {
    let families = [
        (EosError::Name(sample_info("a", "a")), ErrorKind::Name),
        (EosError::Syntax(sample_info("b", "b")), ErrorKind::Syntax),
        (EosError::Option(sample_info("c", "c")), ErrorKind::Option),
        (EosError::Kinematic(sample_info("d", "d")), ErrorKind::Kinematic),
        (EosError::Range(sample_info("e", "e")), ErrorKind::Range),
        (EosError::Numeric(sample_info("f", "f")), ErrorKind::Numeric),
        (EosError::Internal(sample_info("g", "g")), ErrorKind::Internal),
        (EosError::Serde(sample_info("h", "h")), ErrorKind::Serde),
    ];
    for (err, kind) in families {
        assert_eq!(err.kind(), kind);
    }
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = EosError::Option(sample_info("eos_core.invalid_option_value", "bad value"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Option");
    assert_eq!(json["detail"]["code"], "eos_core.invalid_option_value");
    let back: EosError = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
}

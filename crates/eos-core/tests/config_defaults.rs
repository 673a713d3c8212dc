use std::io::Write;

use eos_core::{EngineConfig, ErrorKind, RangePolicy};

#[test]
fn empty_document_yields_defaults() {
    let config = EngineConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.range_policy, RangePolicy::Strict);
    assert!(config.effective_threads() >= 1);
}

#[test]
fn partial_document_overrides_fields() {
    let yaml = "range_policy: clamp\nmax_threads: 2\nintegration:\n  epsrel: 1.0e-6\n";
    let config = EngineConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.range_policy, RangePolicy::Clamp);
    assert_eq!(config.max_threads, Some(2));
    assert_eq!(config.integration.epsrel, 1.0e-6);
    assert_eq!(config.integration.max_depth, 40);
    assert!(config.effective_threads() <= 2);
}

#[test]
fn invalid_tolerances_are_rejected() {
    let err = EngineConfig::from_yaml_str("integration:\n  epsrel: 0.0\n").unwrap_err();
    assert_eq!(err.code(), "eos_core.integration_config");
}

#[test]
fn malformed_yaml_is_a_serde_error() {
    let err = EngineConfig::from_yaml_str("range_policy: [").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serde);
}

#[test]
fn config_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "range_policy: permissive").unwrap();
    let config = EngineConfig::from_path(file.path()).unwrap();
    assert_eq!(config.range_policy, RangePolicy::Permissive);

    let missing = EngineConfig::from_path(std::path::Path::new("/nonexistent/eos.yaml")).unwrap_err();
    assert_eq!(missing.code(), "eos_core.config_io");
}

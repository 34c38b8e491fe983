use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_parse_minimal_config() {
    let config = Config::from_yaml("identifiers: {}").unwrap();
    assert_eq!(config.identifiers.block_prefix, "T");
    assert_eq!(config.identifiers.from_prefix, "_from");
    assert!(config.identifiers.reserved.is_empty());
    assert_eq!(config.output.format, OutputFormat::Esql);
    assert!(config.output.top_level);
}

#[test]
fn test_empty_file_uses_defaults() {
    let config = Config::from_yaml("  \n").unwrap();
    assert_eq!(config.identifiers.block_prefix, "T");
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
identifiers:
  block_prefix: Blk
  from_prefix: _cell
  reserved:
    - Blk1
    - Orders
output:
  format: cqt
  top_level: false
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.identifiers.block_prefix, "Blk");
    assert_eq!(config.identifiers.reserved.len(), 2);
    assert_eq!(config.output.format, OutputFormat::Cqt);
    assert!(!config.output.top_level);
}

#[test]
fn test_unknown_field_rejected() {
    let result = Config::from_yaml("identifers: {}");
    assert!(matches!(result, Err(CoreError::YamlParse(_))));
}

#[test]
fn test_invalid_prefix_rejected() {
    let result = Config::from_yaml("identifiers:\n  block_prefix: \"my block\"");
    match result {
        Err(CoreError::ConfigInvalid { message }) => {
            assert!(message.contains("identifiers.block_prefix"));
        }
        other => panic!("expected ConfigInvalid, got {other:?}"),
    }
}

#[test]
fn test_prefixes_must_differ() {
    let result = Config::from_yaml("identifiers:\n  block_prefix: X\n  from_prefix: x");
    assert!(matches!(result, Err(CoreError::ConfigInvalid { .. })));
}

#[test]
fn test_prefix_may_not_extend_the_other() {
    // T10 would be both block alias 10 and from variable 0
    for yaml in [
        "identifiers:\n  block_prefix: T\n  from_prefix: T1",
        "identifiers:\n  block_prefix: Blk1\n  from_prefix: blk",
    ] {
        match Config::from_yaml(yaml) {
            Err(CoreError::ConfigInvalid { message }) => {
                assert!(message.contains("neither may start with the other"), "{message}");
            }
            other => panic!("expected ConfigInvalid for {yaml:?}, got {other:?}"),
        }
    }
    assert!(Config::from_yaml("identifiers:\n  block_prefix: T\n  from_prefix: _from").is_ok());
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = Config::load(&dir.path().join("vg.yml"));
    assert!(matches!(result, Err(CoreError::ConfigNotFound { .. })));
}

#[test]
fn test_load_from_dir_prefers_yml() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("vg.yml"), "output:\n  format: json\n").unwrap();
    fs::write(dir.path().join("vg.yaml"), "output:\n  format: cqt\n").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.output.format, OutputFormat::Json);
}

#[test]
fn test_load_from_dir_without_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.output.format, OutputFormat::Esql);
}

#[test]
fn test_output_format_display() {
    assert_eq!(OutputFormat::Esql.to_string(), "esql");
    assert_eq!(OutputFormat::Json.to_string(), "json");
}

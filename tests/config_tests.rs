/// Config loading tests: file format dispatch and validation
use qsfuzz::config::{ConfigError, FuzzConfig};
use qsfuzz::engine::inject_url;
use qsfuzz::enumerator::RenderMode;
use std::fs;
use std::path::PathBuf;

fn write_temp(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("qsfuzz_{}_{}", std::process::id(), name));
    fs::write(&path, content).expect("write temp config");
    path
}

#[test]
fn test_load_yaml_file() {
    let path = write_temp(
        "rules.yaml",
        "rules:\n  redirect:\n    injections:\n      - \"https://evil.example/[[path]]\"\n",
    );
    let cfg = FuzzConfig::load(&path).expect("YAML config should load");
    assert_eq!(cfg.rules["redirect"].injections, vec!["https://evil.example/[[path]]"]);
    let _ = fs::remove_file(&path);
}

#[test]
fn test_load_json_file() {
    let path = write_temp("rules.json", r#"{"rules":{"sqli":{"injections":["'", "\""]}}}"#);
    let cfg = FuzzConfig::load(&path).expect("JSON config should load");
    assert_eq!(cfg.injection_count(), 2);
    let _ = fs::remove_file(&path);
}

#[test]
fn test_unsupported_extension() {
    let path = write_temp("rules.txt", "rules: {}");
    assert!(matches!(
        FuzzConfig::load(&path),
        Err(ConfigError::UnsupportedFormat(_))
    ));
    let _ = fs::remove_file(&path);
}

#[test]
fn test_missing_file() {
    let path = std::env::temp_dir().join("qsfuzz_does_not_exist.yaml");
    assert!(matches!(FuzzConfig::load(&path), Err(ConfigError::Read { .. })));
}

#[test]
fn test_malformed_yaml() {
    let path = write_temp("broken.yml", "rules: [unclosed");
    assert!(matches!(FuzzConfig::load(&path), Err(ConfigError::Yaml { .. })));
    let _ = fs::remove_file(&path);
}

#[test]
fn test_no_rules_rejected() {
    let path = write_temp("empty.yaml", "slack:\n  channel: alerts\n");
    assert!(matches!(FuzzConfig::load(&path), Err(ConfigError::NoRules)));
    let _ = fs::remove_file(&path);
}

#[test]
fn test_loaded_rules_drive_enumeration() {
    let path = write_temp(
        "drive.yaml",
        "rules:\n  ssrf:\n    injections:\n      - \"http://[[domain]].oob.example\"\n      - \"x[[fullurl]]\"\n",
    );
    let cfg = FuzzConfig::load(&path).unwrap();
    let injections = inject_url("https://shop.example/item?id=5&ref=home", &cfg, RenderMode::Encoded);
    // 2 injections x 2 parameters
    assert_eq!(injections.len(), 4);
    assert_eq!(
        injections[0].candidate.url,
        "https://shop.example/item?id=http%3A%2F%2Fshop.example.oob.example&ref=home"
    );
    assert_eq!(
        injections[2].candidate.payload,
        "xhttps%3A%2F%2Fshop.example%2Fitem%3Fid%3D5%26ref%3Dhome"
    );
    let _ = fs::remove_file(&path);
}

use std::fs;
use std::path::Path;

use super::*;

#[test]
fn test_defaults() {
    let config = CheckConfig::default();
    assert_eq!(config.prefix, "CHECK");
    assert_eq!(config.arch, None);
    assert!(!config.debuggable);
    assert_eq!(config.policy, FailurePolicy::FailFast);
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_toml() {
    let config = CheckConfig::from_toml(
        r#"
prefix = "CHECK2"
arch = "arm64"
policy = "keep-going"
extensions = [".java"]
"#,
    )
    .unwrap();
    assert_eq!(config.prefix, "CHECK2");
    assert_eq!(config.arch.as_deref(), Some("arm64"));
    assert_eq!(config.policy, FailurePolicy::KeepGoing);
    assert_eq!(config.extensions, vec![".java".to_string()]);
    assert!(!config.debuggable);
}

#[test]
fn test_unknown_arch_rejected() {
    let err = CheckConfig::from_toml("arch = \"riscv\"").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Config);
    assert!(err.message.contains("riscv"));
}

#[test]
fn test_unknown_key_rejected() {
    let err = CheckConfig::from_toml("colour = true").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Config);
}

#[test]
fn test_overrides_win() {
    let mut config = CheckConfig::from_toml("arch = \"ARM\"\nprefix = \"FOO\"").unwrap();
    config.apply(Overrides {
        prefix: None,
        arch: Some("X86".to_string()),
        debuggable: true,
        keep_going: true,
    });
    assert_eq!(config.prefix, "FOO");
    assert_eq!(config.arch.as_deref(), Some("X86"));
    assert!(config.debuggable);
    assert_eq!(config.policy, FailurePolicy::KeepGoing);
}

#[test]
fn test_resolve_finds_file_in_ancestor() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "prefix = \"CHK\"\n").unwrap();
    let nested = dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();

    assert_eq!(
        CheckConfig::find(&nested),
        Some(dir.path().join(CONFIG_FILE_NAME))
    );
    let config = CheckConfig::resolve(&nested, Overrides::default()).unwrap();
    assert_eq!(config.prefix, "CHK");
}

#[test]
fn test_resolve_rejects_unknown_override_arch() {
    let dir = tempfile::tempdir().unwrap();
    let overrides = Overrides {
        arch: Some("sparc".to_string()),
        ..Overrides::default()
    };
    let err = CheckConfig::resolve(dir.path(), overrides).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Config);
    assert!(err.help.is_some());
}

#[test]
fn test_load_reports_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "debuggable = \"yes\"").unwrap();
    let err = CheckConfig::load(&path).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Config);
    assert_eq!(err.location.file, Some(path.display().to_string()));
}

#[test]
fn test_is_source_file() {
    let config = CheckConfig::default();
    assert!(config.is_source_file(Path::new("src/Main.java")));
    assert!(config.is_source_file(Path::new("smali/Test.smali")));
    assert!(!config.is_source_file(Path::new("Main.kt")));
}

use super::{write, DUMP};
use crate::api::*;
use crate::config::{CheckConfig, FailurePolicy};
use crate::diagnostic::ErrorKind;

const MAIN_JAVA: &str = r#"
public class Main {
  /// CHECK-START: Main.foo() gvn (before)
  /// CHECK: <<Add1:i\d+>> Add
  /// CHECK: <<Add2:i\d+>> Add
  /// CHECK: Return [<<Add2>>]

  /// CHECK-START: Main.foo() gvn (after)
  /// CHECK: <<Add:i\d+>> Add
  /// CHECK-NOT: Add
  /// CHECK: Return [<<Add>>]
  public static int foo(int a, int b) {
    return (a + b) + (a + b);
  }
}
"#;

const FAILING_SMALI: &str = "\
## CHECK-START: Main.foo() gvn (after)
## CHECK: Sub
";

#[test]
fn test_evaluate_parsed_inputs() {
    let dump = parse_dump("main.cfg", DUMP).unwrap();
    let checker = parse_annotations("Main.java", "CHECK", MAIN_JAVA, None).unwrap();
    let report = evaluate(&checker, &dump, None, false).unwrap();
    assert_eq!(report.passed(), 2);
    assert!(report.is_success());
}

#[test]
fn test_run_checks_walks_directory() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.cfg", DUMP);
    write(dir.path(), "src/Main.java", MAIN_JAVA);
    write(dir.path(), "src/smali/Test.smali", FAILING_SMALI);
    // Neither of these is a checker source.
    write(dir.path(), "src/notes.txt", "/// CHECK: orphan\n");
    write(dir.path(), "src/.hidden/Broken.java", "/// CHECK: orphan\n");

    let config = CheckConfig::default();
    let files = find_checker_files(&dir.path().join("src"), &config).unwrap();
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("Main.java"));
    assert!(files[1].ends_with("Test.smali"));

    let report = run_checks(&dir.path().join("main.cfg"), &dir.path().join("src"), &config).unwrap();
    assert_eq!(report.passed(), 2);
    assert_eq!(report.failed(), 1);
    let failure = report.failures().next().unwrap();
    assert!(failure.location.file.as_deref().unwrap().ends_with("Test.smali"));
    assert_eq!(failure.location.line, Some(2));
}

#[test]
fn test_run_checks_policy() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.cfg", DUMP);
    write(dir.path(), "src/a/A.smali", FAILING_SMALI);
    write(dir.path(), "src/b/B.smali", FAILING_SMALI);

    let mut config = CheckConfig::default();
    let report = run_checks(&dir.path().join("main.cfg"), &dir.path().join("src"), &config).unwrap();
    assert_eq!(report.failed(), 1);

    config.policy = FailurePolicy::KeepGoing;
    let report = run_checks(&dir.path().join("main.cfg"), &dir.path().join("src"), &config).unwrap();
    assert_eq!(report.failed(), 2);
}

#[test]
fn test_run_checks_single_file_with_arch() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.cfg", DUMP);
    write(
        dir.path(),
        "Arch.java",
        "/// CHECK-START-{ARM,ARM64}: Main.foo() gvn (after)\n/// CHECK: Return\n",
    );

    let mut config = CheckConfig::default();
    let report = run_checks(&dir.path().join("main.cfg"), &dir.path().join("Arch.java"), &config).unwrap();
    assert_eq!(report.skipped(), 1);

    config.arch = Some("arm64".to_string());
    let report = run_checks(&dir.path().join("main.cfg"), &dir.path().join("Arch.java"), &config).unwrap();
    assert_eq!(report.passed(), 1);
    assert_eq!(report.results[0].arch.as_deref(), Some("ARM64"));
}

#[test]
fn test_run_checks_fatal_errors() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.cfg", DUMP);
    write(
        dir.path(),
        "Missing.java",
        "/// CHECK-START: Main.bar() gvn (after)\n/// CHECK: Return\n",
    );

    let config = CheckConfig::default();
    let err = run_checks(&dir.path().join("main.cfg"), &dir.path().join("Missing.java"), &config).unwrap_err();
    assert_eq!(err.kind, ErrorKind::PassNotFound);
    assert!(err.location.file.as_deref().unwrap().ends_with("Missing.java"));

    let err = run_checks(&dir.path().join("main.cfg"), &dir.path().join("nowhere"), &config).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Io);
}

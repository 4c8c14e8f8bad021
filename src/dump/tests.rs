use super::*;
use crate::diagnostic::ErrorKind;

fn parse(source: &str) -> Result<DumpFile, Diagnostic> {
    parse_dump("<dump>", source)
}

#[test]
fn test_empty_dump() {
    let dump = parse("").unwrap();
    assert!(dump.passes.is_empty());
}

#[test]
fn test_single_pass() {
    let dump = parse(
        r#"
begin_compilation
  method "MyMethod"
end_compilation
begin_cfg
  name "pass1"
  foo
  bar
end_cfg
"#,
    )
    .unwrap();
    assert_eq!(dump.passes.len(), 1);
    let pass = &dump.passes[0];
    assert_eq!(pass.name, "MyMethod pass1");
    assert_eq!(pass.body, vec!["foo", "bar"]);
    assert_eq!(pass.start_line, 6);
    assert_eq!(pass.line_number(0), 7);
    assert_eq!(pass.line_number(1), 8);
    assert_eq!(pass.line_number(2), 9);
}

#[test]
fn test_multiple_methods_and_passes() {
    let dump = parse(
        r#"
begin_compilation
  method "MyMethod1"
end_compilation
begin_cfg
  name "pass1"
  foo
end_cfg
begin_cfg
  name "pass2"
  abc
end_cfg
begin_compilation
  method "MyMethod2"
end_compilation
begin_cfg
  name "pass1"
  xyz
end_cfg
"#,
    )
    .unwrap();
    let names: Vec<&str> = dump.pass_names().collect();
    assert_eq!(names, vec!["MyMethod1 pass1", "MyMethod1 pass2", "MyMethod2 pass1"]);
    assert_eq!(dump.find_pass("MyMethod2 pass1").unwrap().body, vec!["xyz"]);
}

#[test]
fn test_duplicate_pass_finds_first() {
    let dump = parse(
        r#"
begin_compilation
  method "M"
end_compilation
begin_cfg
  name "p"
  first
end_cfg
begin_cfg
  name "p"
  second
end_cfg
"#,
    )
    .unwrap();
    assert_eq!(dump.passes.len(), 2);
    assert_eq!(dump.find_pass("M p").unwrap().body, vec!["first"]);
}

#[test]
fn test_method_line_trailing_text_ignored() {
    let dump = parse(
        "begin_compilation\nmethod \"M\" 12345\nend_compilation\nbegin_cfg\nname \"p\"\nx\nend_cfg\n",
    )
    .unwrap();
    assert_eq!(dump.passes[0].name, "M p");
}

#[test]
fn test_body_lines_are_trimmed_and_blank_lines_skipped() {
    let dump = parse(
        "begin_compilation\nmethod \"M\"\nend_compilation\nbegin_cfg\nname \"p\"\n   a  b   \n\n  c\nend_cfg\n",
    )
    .unwrap();
    let pass = &dump.passes[0];
    assert_eq!(pass.body, vec!["a  b", "c"]);
    assert_eq!(pass.line_number(1), 8);
}

#[test]
fn test_cfg_without_method_fails() {
    let err = parse("begin_cfg\nname \"p\"\nfoo\nend_cfg\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Parse);
    assert_eq!(err.message, "Expected method header");
    assert_eq!(err.location.line, Some(1));
    assert_eq!(err.location.file.as_deref(), Some("<dump>"));
}

#[test]
fn test_missing_pass_name_fails() {
    let err = parse("begin_compilation\nmethod \"M\"\nend_compilation\nbegin_cfg\nfoo\nend_cfg\n")
        .unwrap_err();
    assert_eq!(err.message, "Expected output group name");
    assert_eq!(err.location.line, Some(5));
}

#[test]
fn test_line_outside_block_fails() {
    let err = parse("foo\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Parse);
    assert_eq!(err.location.line, Some(1));
}

#[test]
fn test_empty_method_name_fails() {
    let err = parse("begin_compilation\nmethod \"  \"\nend_compilation\n").unwrap_err();
    assert_eq!(err.message, "Empty method name in output");
}

#[test]
fn test_empty_pass_fails() {
    let err = parse("begin_compilation\nmethod \"M\"\nend_compilation\nbegin_cfg\nname \"p\"\nend_cfg\n")
        .unwrap_err();
    assert!(err.message.starts_with("A pass must not be empty"));
    assert_eq!(err.location.line, Some(5));
}

#[test]
fn test_quoted_argument() {
    assert_eq!(quoted_argument("name \"abc\"", "name"), Some("abc"));
    assert_eq!(quoted_argument("name   \"a b\" rest", "name"), Some("a b"));
    assert_eq!(quoted_argument("name\"abc\"", "name"), None);
    assert_eq!(quoted_argument("names \"abc\"", "name"), None);
    assert_eq!(quoted_argument("name \"abc", "name"), None);
}

#[test]
fn test_numbered_body() {
    let dump = parse(
        "begin_compilation\nmethod \"M\"\nend_compilation\nbegin_cfg\nname \"p\"\nfoo\nbar baz\nend_cfg\n",
    )
    .unwrap();
    insta::assert_snapshot!(dump.passes[0].numbered_body().trim_end(), @r###"
    6: foo
    7: bar baz
    "###);
}

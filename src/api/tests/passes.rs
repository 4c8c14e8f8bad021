use super::DUMP;
use crate::api::*;
use crate::diagnostic::ErrorKind;

#[test]
fn test_list_passes() {
    let dump = parse_dump("main.cfg", DUMP).unwrap();
    assert_eq!(
        list_passes(&dump),
        vec!["Main.foo() gvn (before)", "Main.foo() gvn (after)"]
    );
}

#[test]
fn test_dump_pass_numbers_lines() {
    let dump = parse_dump("main.cfg", DUMP).unwrap();
    let text = dump_pass(&dump, "Main.foo() gvn (after)").unwrap();
    insta::assert_snapshot!(text.trim_end(), @r###"
    12: i1 Add [i2,i3]
    13: i5 Return [i1]
    "###);

    let text = dump_pass(&dump, "Main.foo() gvn (before)").unwrap();
    assert!(text.starts_with("6: i1 Add [i2,i3]\n"));
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn test_dump_pass_missing() {
    let dump = parse_dump("main.cfg", DUMP).unwrap();
    let err = dump_pass(&dump, "Main.foo() licm").unwrap_err();
    assert_eq!(err.kind, ErrorKind::PassNotFound);
    assert_eq!(err.location.file.as_deref(), Some("main.cfg"));
    assert!(err.help.is_some());
}

#[test]
fn test_load_dump_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_dump(&dir.path().join("absent.cfg")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Io);
}

//! Tests for loading submissions from a folder.

use std::fs;

use rubricate::{
    GradingError,
    code::Dialect,
    submission::{Submission, load_folder, split_by_kind},
    types::SubmissionKind,
};

#[test]
fn supported_files_are_loaded_in_name_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("bob.txt"), "Line one\r\nLine two\r\n").expect("write");
    fs::write(dir.path().join("alice.py"), "print('hi')\n").expect("write");
    fs::write(dir.path().join("carol.cpp"), "int main() {}\n").expect("write");
    fs::write(dir.path().join("slides.pdf"), [0x25, 0x50, 0x44, 0x46]).expect("write");
    fs::create_dir(dir.path().join("nested.py")).expect("mkdir");

    let submissions = load_folder(dir.path()).expect("load");
    let names: Vec<&str> = submissions.iter().map(|s| s.filename.as_str()).collect();
    assert_eq!(names, vec!["alice.py", "bob.txt", "carol.cpp"]);

    let bob = &submissions[1];
    assert_eq!(bob.identifier, "bob_Result");
    assert_eq!(bob.kind, SubmissionKind::Content);
    assert_eq!(bob.content, "Line one\nLine two");
    assert_eq!(bob.language_hint, None);

    assert_eq!(submissions[0].language_hint, Some(Dialect::Python));
    assert_eq!(submissions[2].language_hint, Some(Dialect::Cpp));
}

#[test]
fn invalid_utf8_is_replaced() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("dave.txt"), [b'o', b'k', 0xff, b'!']).expect("write");

    let submissions = load_folder(dir.path()).expect("load");
    assert_eq!(submissions.len(), 1);
    assert!(submissions[0].content.starts_with("ok"));
    assert!(submissions[0].content.ends_with('!'));
}

#[test]
fn missing_folder_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_folder(dir.path().join("absent")).expect_err("should fail");
    assert!(matches!(err, GradingError::Io { .. }));
}

#[test]
fn split_separates_code_from_text() {
    let submissions = [
        Submission::new("alice.py", "x = 1").expect("supported"),
        Submission::new("alice.md", "# Notes").expect("supported"),
        Submission::new("bob.h", "int f();").expect("supported"),
    ];
    assert!(Submission::new("bob.docx", "").is_none());

    let split = split_by_kind(submissions);
    assert_eq!(split.code.len(), 2);
    assert_eq!(split.text.len(), 1);
    assert_eq!(split.text["alice.md"], "# Notes");
}

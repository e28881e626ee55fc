//! Run the `tegoc` binary on fixture programs

use std::path::PathBuf;
use std::process::{Command, Output};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn tegoc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tegoc"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tegoc")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_compile_writes_classes() {
    let out = tempfile::tempdir().unwrap();
    let input = fixtures_dir().join("twice.aterm");
    let output = tegoc(&["compile", input.to_str().unwrap(), "-o", out.path().to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("org/example/twiceStrategy"));

    let class = out.path().join("org/example/twiceStrategy.class");
    let bytes = std::fs::read(&class).unwrap();
    assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
    // major version 52 by default
    assert_eq!(u16::from_be_bytes([bytes[6], bytes[7]]), 52);

    let listing = tegoc(&["disasm", class.to_str().unwrap()]);
    assert!(listing.status.success());
    let text = stdout(&listing);
    assert!(text.contains("class org/example/twiceStrategy extends java/lang/Object"));
    assert!(text.contains("method getInstance()Lorg/example/twiceStrategy;"));
}

#[test]
fn test_compile_with_class_version() {
    let out = tempfile::tempdir().unwrap();
    let input = fixtures_dir().join("twice.aterm");
    let output = tegoc(&[
        "compile",
        input.to_str().unwrap(),
        "-o",
        out.path().to_str().unwrap(),
        "--class-version",
        "49",
    ]);
    assert!(output.status.success());
    let bytes = std::fs::read(out.path().join("org/example/twiceStrategy.class")).unwrap();
    assert_eq!(u16::from_be_bytes([bytes[6], bytes[7]]), 49);
}

#[test]
fn test_compile_error_fails() {
    let out = tempfile::tempdir().unwrap();
    let input = fixtures_dir().join("broken.aterm");
    let output = tegoc(&["compile", input.to_str().unwrap(), "-o", out.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unresolved symbol"));
}

#[test]
fn test_parse_prints_normalized_body() {
    let input = fixtures_dir().join("twice.aterm");
    let output = tegoc(&["parse", input.to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("module org/example"));
    assert!(text.contains("def org/example::twice(s) input ="));
    assert!(text.contains("let var_0: State = eval(s, input);"));
    assert!(text.contains("eval(s, var_0)"));
}

#[test]
fn test_signature() {
    let output = tegoc(&["signature", "Ljava/util/List<+Ljava/lang/String;>;"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("java.util.List<? extends java.lang.String>"));
    assert!(text.contains("descriptor: Ljava/util/List;"));

    let bad = tegoc(&["signature", "Ljava/util/List"]);
    assert!(!bad.status.success());
}

//! End-to-end runs of the `tychoc check` subcommand: exit codes, stderr
//! rendering, and the machine-readable report formats.

mod common;
use common::tychoc;

use std::path::PathBuf;

fn write_source(dir: &tempfile::TempDir, source: &str) -> PathBuf {
    let path = dir.path().join("main.ty");
    std::fs::write(&path, source).unwrap();
    path
}

const CLEAN: &str = "function add(a: number, b: number): number {\n    return a + b;\n}\n\nfunction main() {\n    print(add(1, 2));\n}\n";

#[test]
fn clean_file_exits_zero_with_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, CLEAN);

    let output = tychoc().arg("check").arg(&path).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty());
}

#[test]
fn errors_render_to_stderr_and_exit_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(
        &dir,
        "function main() {\n    let x: number = \"asd\";\n    print(x);\n}\n",
    );

    let output = tychoc().arg("check").arg(&path).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("type mismatch: expected number, found string"),
        "stderr was: {stderr}"
    );
}

#[test]
fn warnings_alone_do_not_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "function main() {\n    let x = 42;\n}\n");

    let output = tychoc().arg("check").arg(&path).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unused variable 'x'"), "stderr was: {stderr}");
}

#[test]
fn missing_file_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.ty");

    let output = tychoc().arg("check").arg(&path).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error ["), "stderr was: {stderr}");
}

#[test]
fn syntax_errors_exit_two() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "function main( {\n");

    let output = tychoc().arg("check").arg(&path).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("syntax error"), "stderr was: {stderr}");
}

#[test]
fn json_report_lists_diagnostics_and_call_types() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(
        &dir,
        "function main() {\n    let x: number = \"asd\";\n    print(x);\n}\n",
    );

    let output = tychoc().arg("check").arg(&path).arg("--json").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    let diagnostics = report["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["kind"], "type_mismatch");
    assert_eq!(diagnostics[0]["severity"], "error");
    assert_eq!(diagnostics[0]["span"]["line"], 2);
    assert_eq!(
        diagnostics[0]["message"],
        "type mismatch: expected number, found string"
    );

    let call_types = report["call_types"].as_array().unwrap();
    assert_eq!(call_types.len(), 1);
    assert_eq!(call_types[0]["type"], "void");
}

#[test]
fn json_report_for_a_clean_file_is_empty_of_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, CLEAN);

    let output = tychoc().arg("check").arg(&path).arg("--json").output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["diagnostics"].as_array().unwrap().is_empty());
    assert_eq!(report["call_types"].as_array().unwrap().len(), 2);
}

#[test]
fn types_flag_prints_call_sites_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, CLEAN);

    let output = tychoc().arg("check").arg(&path).arg("--types").output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "6:5: void\n6:11: number\n");
}

//! End-to-end tests driving the rillc binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn rillc() -> Command {
    Command::cargo_bin("rillc").expect("rillc binary")
}

fn write_source(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn minimal_program_compiles_and_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        &dir,
        "prog.rill",
        "the program p is define body finish program\n",
    );
    let output = dir.path().join("prog.c");

    rillc()
        .arg(&source)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("// Generated by rillc."));
    assert!(text.contains("p_1:"));
    assert!(text.contains("p_1_body:"));
    assert!(text.trim_end().ends_with('}'));
}

#[test]
fn default_output_is_source_with_c_extension() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        &dir,
        "prog.rill",
        "the program p is define body finish program\n",
    );

    rillc().arg(&source).assert().success();

    assert!(dir.path().join("prog.c").exists());
}

#[test]
fn type_error_fails_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        &dir,
        "prog.rill",
        "the program p is\ndefine\nint x;\nbody\nx = \"hello\";\nfinish program\n",
    );
    let output = dir.path().join("prog.c");

    rillc()
        .arg(&source)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("line 5"))
        .stderr(predicate::str::contains("compilation failed with 1 error(s)"));

    assert!(!output.exists());
}

#[test]
fn undeclared_name_reports_its_line() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        &dir,
        "prog.rill",
        "the program p is\ndefine\nbody\ny = 4;\nfinish program\n",
    );

    rillc()
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 4"))
        .stderr(predicate::str::contains("not declared in this scope"));
}

#[test]
fn hanging_string_is_a_warning_not_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        &dir,
        "prog.rill",
        "the program p is\ndefine\nstr s;\nbody\ns = \"hello\n;\nfinish program\n",
    );
    let output = dir.path().join("prog.c");

    rillc()
        .arg(&source)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning:"))
        .stderr(predicate::str::contains("No closing quotation in string"));

    assert!(output.exists());
}

#[test]
fn out_parameter_call_links_caller_and_callee() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        &dir,
        "prog.rill",
        "the program p is\n\
         define\n\
         int y;\n\
         function f(int r out) is\n\
         body\n\
         r = 2;\n\
         finish function;\n\
         body\n\
         f(y);\n\
         finish program\n",
    );
    let output = dir.path().join("prog.c");

    rillc()
        .arg(&source)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("f_2:"));
    assert!(text.contains("goto f_2;"));
    assert!(text.contains("R[2] = MM[R[SP] - 1];"));
    assert!(text.contains("MM[R[SP] + 0] = R[2];"));
}

#[test]
fn debug_flag_interleaves_comments() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        &dir,
        "prog.rill",
        "the program p is\ndefine\nint x;\nbody\nx = 3;\nfinish program\n",
    );
    let plain = dir.path().join("plain.c");
    let debug = dir.path().join("debug.c");

    rillc().arg(&source).arg("-o").arg(&plain).assert().success();
    rillc()
        .arg(&source)
        .arg("-o")
        .arg(&debug)
        .arg("--debug")
        .assert()
        .success();

    assert!(!fs::read_to_string(&plain).unwrap().contains("// store x"));
    assert!(fs::read_to_string(&debug).unwrap().contains("// store x"));
}

#[test]
fn emitted_code_is_byte_identical_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        &dir,
        "prog.rill",
        "the program p is\ndefine\nint x;\nbody\nx = 3 * 4 + 1;\nfinish program\n",
    );
    let first = dir.path().join("first.c");
    let second = dir.path().join("second.c");

    rillc().arg(&source).arg("-o").arg(&first).assert().success();
    rillc().arg(&source).arg("-o").arg(&second).assert().success();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn missing_source_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    rillc()
        .arg(dir.path().join("absent.rill"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn config_file_supplies_debug_default() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        &dir,
        "prog.rill",
        "the program p is\ndefine\nint x;\nbody\nx = 3;\nfinish program\n",
    );
    fs::write(dir.path().join("rillc.toml"), "debug = true\n").unwrap();
    let output = dir.path().join("prog.c");

    rillc()
        .arg(&source)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert!(fs::read_to_string(&output).unwrap().contains("// store x"));
}

#[test]
fn malformed_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        &dir,
        "prog.rill",
        "the program p is define body finish program\n",
    );
    fs::write(dir.path().join("rillc.toml"), "optimize = 3\n").unwrap();

    rillc()
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

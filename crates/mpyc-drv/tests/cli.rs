//! End-to-end CLI tests: run the `mpyc` binary against a real source
//! file in an isolated temp directory and inspect its exit code and
//! generated `output/` artifacts.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn mpyc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mpyc"))
}

fn write_source(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn parse_only_stops_before_type_checking() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "prog.mpy", "x = 1\n");

    Command::new(mpyc_bin())
        .current_dir(dir.path())
        .arg(&source)
        .arg("-p")
        .assert()
        .success();

    assert!(!dir.path().join("output").exists(), "parse-only must not reach code generation");
}

#[test]
fn typecheck_only_stops_before_codegen() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "prog.mpy", "x = 1\n");

    Command::new(mpyc_bin())
        .current_dir(dir.path())
        .arg(&source)
        .arg("--typecheck-only")
        .assert()
        .success();

    assert!(!dir.path().join("output").exists());
}

#[test]
fn full_pipeline_writes_ir_and_java_files() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "prog.mpy", "x = 1 + 2 * 3\nprint(x)\n");

    Command::new(mpyc_bin()).current_dir(dir.path()).arg(&source).assert().success();

    let ir = std::fs::read_to_string(dir.path().join("output/prog_ir.out")).unwrap();
    assert!(ir.contains("x <- 7"));

    let java = std::fs::read_to_string(dir.path().join("output/Prog.java")).unwrap();
    assert!(java.contains("public class Prog"));
    assert!(java.contains("int x = 7;"));
}

#[test]
fn a_type_mismatch_is_reported_and_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "bad.mpy", "x = 1\nx = \"s\"\n");

    Command::new(mpyc_bin())
        .current_dir(dir.path())
        .arg(&source)
        .assert()
        .failure();

    assert!(!dir.path().join("output").exists());
}

#[test]
fn reference_to_an_undefined_name_is_reported_and_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "bad.mpy", "print(undefined_name)\n");

    Command::new(mpyc_bin()).current_dir(dir.path()).arg(&source).assert().failure();
}

#[test]
fn missing_file_argument_is_a_usage_error() {
    Command::new(mpyc_bin()).arg("-v").assert().failure();
}

#[test]
fn verbose_flag_writes_progress_to_stderr() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "prog.mpy", "x = 1\n");

    Command::new(mpyc_bin())
        .current_dir(dir.path())
        .arg(&source)
        .arg("-v")
        .assert()
        .success()
        .stderr(predicate::str::contains("lexing"));
}

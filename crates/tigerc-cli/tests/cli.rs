//! End-to-end tests for the `tigerc` binary: writing a source file to a
//! temp directory, invoking the compiled binary, and checking its output
//! and exit code.

use std::io::Write;
use std::process::Command;

fn tigerc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tigerc"))
}

fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn emit_ir_prints_the_textual_module_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(&dir, "main.tig", "42");

    let output = tigerc().arg(&src).arg("--emit-ir").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("define i64 @main() {"));
    assert!(stdout.contains("ret 42"));
}

#[test]
fn without_emit_ir_the_module_is_written_to_the_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(&dir, "main.tig", "1 + 2");
    let out_path = dir.path().join("main.ir");

    let status = tigerc()
        .arg(&src)
        .arg("-o")
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    let written = std::fs::read_to_string(&out_path).unwrap();
    assert!(written.contains("add 1, 2"));
}

#[test]
fn a_semantic_error_exits_nonzero_and_reports_a_position() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(&dir, "main.tig", "1 + \"oops\"");

    let output = tigerc().arg(&src).arg("--emit-ir").output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("row:"));
}

#[test]
fn missing_output_flag_without_emit_ir_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(&dir, "main.tig", "42");

    let status = tigerc().arg(&src).status().unwrap();

    assert!(!status.success());
}

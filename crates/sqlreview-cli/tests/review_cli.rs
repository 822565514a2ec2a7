use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::{tempdir, TempDir};

const SQL_CLEAN: &str = "SELECT id FROM users WHERE id = 1;";
/// Triggers statement.where.require at the built-in warning level.
const SQL_NO_WHERE: &str = "UPDATE users SET active = 0;";
const SQL_INVALID: &str = "SELEC 1;";

fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write file");
    path.to_str().expect("utf-8 path").to_string()
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sqlreview"))
        .args(args)
        .output()
        .expect("run CLI")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_clean_file_passes() {
    let dir = tempdir().expect("temp dir");
    let sql = write_file(&dir, "clean.sql", SQL_CLEAN);

    let output = run_cli(&["-d", "mysql", &sql]);

    let stdout = stdout_of(&output);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    assert!(stdout.contains("PASS"), "Expected PASS in output: {stdout}");
    assert!(stdout.contains("0 findings"), "Expected 0 findings: {stdout}");
}

#[test]
fn test_warnings_pass_below_default_threshold() {
    let dir = tempdir().expect("temp dir");
    let sql = write_file(&dir, "update.sql", SQL_NO_WHERE);

    let output = run_cli(&["-d", "postgres", &sql]);

    let stdout = stdout_of(&output);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    assert!(stdout.contains("WARN"), "Expected WARN in output: {stdout}");
    assert!(
        stdout.contains("requires WHERE clause"),
        "Expected WHERE finding: {stdout}"
    );
}

#[test]
fn test_fail_on_warning_fails() {
    let dir = tempdir().expect("temp dir");
    let sql = write_file(&dir, "update.sql", SQL_NO_WHERE);

    let output = run_cli(&["-d", "postgres", "--fail-on", "warning", &sql]);

    let stdout = stdout_of(&output);
    assert_eq!(output.status.code(), Some(1), "Expected exit 1, got: {stdout}");
    assert!(stdout.contains("FAIL"), "Expected FAIL in output: {stdout}");
    assert!(stdout.contains("1 file failed"), "{stdout}");
}

#[test]
fn test_syntax_error_fails() {
    let dir = tempdir().expect("temp dir");
    let sql = write_file(&dir, "invalid.sql", SQL_INVALID);

    let output = run_cli(&["-d", "mysql", &sql]);

    let stdout = stdout_of(&output);
    assert_eq!(
        output.status.code(),
        Some(1),
        "Expected exit 1 for invalid SQL, got: {stdout}"
    );
    assert!(stdout.contains("| 201 |"), "Expected syntax error code: {stdout}");
}

#[test]
fn test_rule_set_file_raises_level() {
    let dir = tempdir().expect("temp dir");
    let sql = write_file(&dir, "drop.sql", "DROP TABLE orders;");
    let rules = write_file(
        &dir,
        "rules.toml",
        r#"
[[rules]]
type = "table.drop-naming-convention"
level = "error"
payload = { format = "_del$" }
"#,
    );

    let output = run_cli(&["-d", "mssql", "-r", &rules, &sql]);

    let stdout = stdout_of(&output);
    assert_eq!(output.status.code(), Some(1), "Expected exit 1, got: {stdout}");
    assert!(
        stdout.contains("[orders] mismatches drop table naming convention"),
        "Expected drop naming finding: {stdout}"
    );
}

#[test]
fn test_invalid_payload_is_config_error() {
    let dir = tempdir().expect("temp dir");
    let sql = write_file(&dir, "clean.sql", SQL_CLEAN);
    let rules = write_file(
        &dir,
        "rules.json",
        r#"{"rules":[{"type":"statement.maximum-limit-value","payload":{"number":-1}}]}"#,
    );

    let output = run_cli(&["-d", "mysql", "-r", &rules, &sql]);

    assert_eq!(output.status.code(), Some(66));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("misconfigured"), "stderr: {stderr}");
}

#[test]
fn test_unsupported_rule_policy_fail() {
    let dir = tempdir().expect("temp dir");
    let sql = write_file(&dir, "select.sql", "SELECT TOP 10 id FROM users;");

    // The built-in policy includes the limit rule, which has no MSSQL advisor.
    let output = run_cli(&["-d", "mssql", "--unsupported", "fail", &sql]);

    assert_eq!(output.status.code(), Some(66));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("not supported for dialect mssql"), "stderr: {stderr}");
}

#[test]
fn test_unsupported_rule_policy_report() {
    let dir = tempdir().expect("temp dir");
    let sql = write_file(&dir, "select.sql", "SELECT id FROM users;");

    let output = run_cli(&["-d", "mssql", "--unsupported", "report", &sql]);

    let stdout = stdout_of(&output);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    assert!(stdout.contains("L:   - |   3 | warning"), "{stdout}");
}

#[test]
fn test_missing_file_is_config_error() {
    let output = run_cli(&["-d", "mysql", "/nonexistent/input.sql"]);

    assert_eq!(output.status.code(), Some(66));
    assert!(stderr_of(&output).contains("Failed to read file"));
}

#[test]
fn test_unknown_rule_set_extension_is_config_error() {
    let dir = tempdir().expect("temp dir");
    let sql = write_file(&dir, "clean.sql", SQL_CLEAN);
    let rules = write_file(&dir, "rules.yaml", "rules: []");

    let output = run_cli(&["-d", "mysql", "-r", &rules, &sql]);

    assert_eq!(output.status.code(), Some(66));
}

#[test]
fn test_missing_dialect_is_usage_error() {
    let dir = tempdir().expect("temp dir");
    let sql = write_file(&dir, "update.sql", SQL_NO_WHERE);

    let output = run_cli(&[&sql]);

    assert_eq!(output.status.code(), Some(66));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("--dialect"), "stderr: {stderr}");
}

#[test]
fn test_dialect_without_advisors_is_config_error() {
    let dir = tempdir().expect("temp dir");
    let sql = write_file(&dir, "update.sql", SQL_NO_WHERE);

    let output = run_cli(&["-d", "generic", &sql]);

    assert_eq!(output.status.code(), Some(66));
    assert!(output.stdout.is_empty());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("dialect generic has no registered advisors"), "stderr: {stderr}");
}

#[test]
fn test_timed_out_review_fails() {
    let dir = tempdir().expect("temp dir");
    let sql = write_file(&dir, "clean.sql", SQL_CLEAN);

    let output = run_cli(&["-d", "mysql", "--timeout-ms", "0", &sql]);

    let stdout = stdout_of(&output);
    assert_eq!(output.status.code(), Some(1), "Expected exit 1, got: {stdout}");
    assert!(stdout.contains("FAIL"), "Expected FAIL in output: {stdout}");
    assert!(stdout.contains("Review stopped before checking"), "{stdout}");
}

#[test]
fn test_json_output() {
    let dir = tempdir().expect("temp dir");
    let first = write_file(&dir, "a.sql", SQL_CLEAN);
    let second = write_file(&dir, "b.sql", SQL_NO_WHERE);

    let output = run_cli(&["-d", "mysql", "-f", "json", "-c", &first, &second]);

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON output");
    let files = value.as_array().expect("array of file reports");
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["report"]["advices"][0]["code"], 0);
    assert_eq!(files[1]["report"]["advices"][0]["code"], 202);
    assert_eq!(files[1]["report"]["summary"]["highestStatus"], "warning");
}

#[test]
fn test_output_file() {
    let dir = tempdir().expect("temp dir");
    let sql = write_file(&dir, "clean.sql", SQL_CLEAN);
    let out_path = dir.path().join("report.json");

    let output = run_cli(&[
        "-d",
        "postgres",
        "-f",
        "json",
        "-o",
        out_path.to_str().expect("utf-8 path"),
        &sql,
    ]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let written = std::fs::read_to_string(Path::new(&out_path)).expect("report written");
    assert!(written.contains("\"complete\": true"), "{written}");
}

#[test]
fn test_reads_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sqlreview"))
        .args(["-d", "postgres", "--fail-on", "warning"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn CLI");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"DELETE FROM sessions;")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait CLI");

    let stdout = stdout_of(&output);
    assert_eq!(output.status.code(), Some(1), "{stdout}");
    assert!(stdout.contains("== [<stdin>] FAIL"), "{stdout}");
}

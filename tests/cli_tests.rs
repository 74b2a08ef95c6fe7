mod common;

use assert_cmd::Command;
use common::*;
use tempfile::TempDir;

fn write_dumps(dir: &TempDir, primary: &SchemaDump, comparison: &SchemaDump) -> (String, String) {
    let a = dir.path().join("primary.json");
    let b = dir.path().join("comparison.json");
    primary.save(&a).unwrap();
    comparison.save(&b).unwrap();
    (a.display().to_string(), b.display().to_string())
}

fn drifted() -> (SchemaDump, SchemaDump) {
    let a = SchemaDump::new("shop", Platform::MySql)
        .with_table(with_column(table("users"), "email", string(255)));
    let b = SchemaDump::new("shop_replica", Platform::MySql)
        .with_table(with_column(table("users"), "email", string(100)));
    (a, b)
}

fn dbdiff() -> Command {
    let mut cmd = Command::cargo_bin("dbdiff").unwrap();
    cmd.env_remove("DBDIFF_PRIMARY_URL")
        .env_remove("DBDIFF_COMPARISON_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn console_report_lists_failures_only() {
    let dir = TempDir::new().unwrap();
    let (a, b) = drifted();
    let (a, b) = write_dumps(&dir, &a, &b);

    let output = dbdiff()
        .args(["diff", "--primary-file", a.as_str(), "--comparison-file", b.as_str()])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "FAIL [shop.users.email] [column_structure:length]\n    shop:users:email:255 vs shop_replica:users:email:100\n"
    );
}

#[test]
fn fail_on_diff_sets_exit_code() {
    let dir = TempDir::new().unwrap();
    let (a, b) = drifted();
    let (a, b) = write_dumps(&dir, &a, &b);

    dbdiff()
        .args([
            "diff",
            "--primary-file",
            a.as_str(),
            "--comparison-file",
            b.as_str(),
            "--fail-on-diff",
        ])
        .assert()
        .code(1);

    dbdiff()
        .args([
            "diff",
            "--primary-file",
            a.as_str(),
            "--comparison-file",
            a.as_str(),
            "--fail-on-diff",
        ])
        .assert()
        .success();
}

#[test]
fn json_report_written_to_file() {
    let dir = TempDir::new().unwrap();
    let (a, b) = drifted();
    let (a, b) = write_dumps(&dir, &a, &b);
    let report = dir.path().join("report.jsonl");

    dbdiff()
        .args(["diff", "--primary-file", a.as_str(), "--comparison-file", b.as_str()])
        .args(["--format", "json", "--output"])
        .arg(&report)
        .assert()
        .success();

    let text = std::fs::read_to_string(&report).unwrap();
    let records: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    // 2 table, 2 column existence, 6 structure
    assert_eq!(records.len(), 10);
    assert_eq!(records[0]["diff_type"], "table_exists_in_comparison");
    assert_eq!(records[5]["field"], "length");
    assert_eq!(records[5]["passed"], false);
}

#[test]
fn csv_report_has_header() {
    let dir = TempDir::new().unwrap();
    let (a, b) = drifted();
    let (a, b) = write_dumps(&dir, &a, &b);

    let output = dbdiff()
        .args(["diff", "--primary-file", a.as_str(), "--comparison-file", b.as_str()])
        .args(["--format", "csv"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[0], "database,table,column,diff_type,field,passed,message");
}

#[test]
fn unreadable_dump_is_fatal() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");

    let output = dbdiff()
        .args(["diff", "--primary-file"])
        .arg(&missing)
        .args(["--comparison-file"])
        .arg(&missing)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("missing.json"));
}

#[test]
fn interactive_prompt_fails_cleanly_without_input() {
    let dir = TempDir::new().unwrap();
    let (a, _) = drifted();
    let (a, _) = write_dumps(&dir, &a, &a);

    dbdiff()
        .args(["diff", "--primary-file", a.as_str()])
        .write_stdin("")
        .assert()
        .code(2);
}

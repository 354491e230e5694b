mod common;
use assert_cmd::Command;
use common::*;

fn polymold() -> Command {
    let mut command = Command::cargo_bin("polymold").unwrap();
    command
        .env_remove("POLYMOLD_DIALECT")
        .env_remove("POLYMOLD_DEFAULT_SCHEMA")
        .env_remove("POLYMOLD_STRICT")
        .env_remove("POLYMOLD_PROD");
    command
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn types_lists_the_dialect_table() {
    let output = polymold().args(["types", "--dialect", "sqlite"]).output().unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("boolean\t-\tINTEGER"));
}

#[test]
fn new_creates_numbered_files() {
    let dir = tempdir().unwrap();
    let migrations = dir.path().join("migrations");

    let output = polymold()
        .args(["new", "add users", "--dir"])
        .arg(&migrations)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).trim().ends_with("0001_add_users.json"));
    assert!(migrations.join("0001_add_users.json").exists());
}

#[test]
fn generate_prints_the_script() {
    let dir = users_migrations();
    let output = polymold()
        .arg("generate")
        .arg(dir.path())
        .args(["--dialect", "sqlserver"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let script = stdout(&output);
    assert!(script.contains("CREATE TABLE [dbo].[users]"));
    assert!(script.contains("GO"));
}

#[test]
fn dialect_comes_from_the_environment() {
    let dir = users_migrations();
    let output = polymold()
        .env("POLYMOLD_DIALECT", "oracle")
        .arg("generate")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("GENERATED BY DEFAULT ON NULL AS IDENTITY"));
}

#[test]
fn generate_writes_to_a_file() {
    let dir = users_migrations();
    let out = tempdir().unwrap();
    let path = out.path().join("script.sql");

    let output = polymold()
        .arg("generate")
        .arg(dir.path())
        .arg("--output")
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(fs::read_to_string(&path).unwrap().contains("CREATE TABLE \"users\""));
}

#[test]
fn validate_fails_on_destructive_down() {
    let dir = users_migrations();

    let ok = polymold().arg("validate").arg(dir.path()).output().unwrap();
    assert!(ok.status.success());
    assert!(stdout(&ok).contains("OK"));

    let down = polymold()
        .arg("validate")
        .arg(dir.path())
        .arg("--down")
        .output()
        .unwrap();
    assert!(!down.status.success());
    assert!(stdout(&down).contains("deny_drop_table"));
}

#[test]
fn unknown_dialect_is_rejected() {
    let output = polymold().args(["types", "--dialect", "db2"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown dialect"));
}

#[test]
fn validate_honours_strict() {
    let dir = tempdir().unwrap();
    write_migration(
        dir.path(),
        "0001_described.json",
        r#"{"up": [{"op": "alter_table", "name": "users", "description": "People"}]}"#,
    );

    let loose = polymold()
        .arg("validate")
        .arg(dir.path())
        .args(["--dialect", "sqlite"])
        .output()
        .unwrap();
    assert!(loose.status.success());

    let strict = polymold()
        .env("POLYMOLD_STRICT", "1")
        .arg("validate")
        .arg(dir.path())
        .args(["--dialect", "sqlite"])
        .output()
        .unwrap();
    assert!(!strict.status.success());
    assert!(stdout(&strict).contains("0001 error: #0 alter_table"));
}

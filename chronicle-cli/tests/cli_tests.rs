//! Integration tests for the Chronicle CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get the chronicle binary
#[allow(deprecated)]
fn chronicle_cmd() -> Command {
    let mut cmd = Command::cargo_bin("chronicle").unwrap();
    cmd.env_remove("CHRONICLE_ENV")
        .env_remove("CHRONICLE_PATH")
        .env_remove("CHRONICLE_DEBUG");
    cmd
}

/// Initialize a project in `dir`
fn init_project(dir: &Path) {
    chronicle_cmd()
        .arg("--path")
        .arg(dir)
        .arg("init")
        .assert()
        .success();
}

/// Create the project database, optionally with a changelog holding `applied` ids
fn create_database(dir: &Path, applied: Option<&[u32]>) {
    let conn = rusqlite::Connection::open(dir.join("chronicle.db")).unwrap();
    conn.execute_batch("PRAGMA user_version = 1").unwrap();
    if let Some(ids) = applied {
        conn.execute_batch(
            "CREATE TABLE CHANGELOG (ID NUMERIC(20,0) NOT NULL, APPLIED_AT VARCHAR(25) NOT NULL, DESCRIPTION VARCHAR(255) NOT NULL)",
        )
        .unwrap();
        for id in ids {
            conn.execute(
                "INSERT INTO CHANGELOG VALUES (?1, '2024-01-01 00:00:00.000', 'applied')",
                [id],
            )
            .unwrap();
        }
    }
}

fn write_scripts(dir: &Path) {
    let scripts = dir.join("scripts");
    fs::write(
        scripts.join("1_create_users.sql"),
        "CREATE TABLE users (id INT);\n",
    )
    .unwrap();
    fs::write(
        scripts.join("2_add_email.sql"),
        "ALTER TABLE users ADD email TEXT;\n-- //@UNDO\nALTER TABLE users DROP email;\n",
    )
    .unwrap();
    fs::write(
        scripts.join("3_add_index.sql"),
        "CREATE INDEX idx_email ON users (email);\n",
    )
    .unwrap();
}

#[test]
fn test_help_command() {
    chronicle_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chronicle CLI"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("script"));
}

#[test]
fn test_version_command() {
    chronicle_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_script_help() {
    chronicle_cmd()
        .args(["script", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("merged up-script"))
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn test_init_creates_layout() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());

    assert!(dir.path().join("scripts").is_dir());
    let env = fs::read_to_string(dir.path().join("environments/development.toml")).unwrap();
    assert!(env.contains("sqlite:./chronicle.db"));
    assert!(env.contains("CHANGELOG"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());

    chronicle_cmd()
        .arg("--path")
        .arg(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    chronicle_cmd()
        .arg("--path")
        .arg(dir.path())
        .args(["init", "--force", "--url", "sqlite:./other.db"])
        .assert()
        .success();

    let env = fs::read_to_string(dir.path().join("environments/development.toml")).unwrap();
    assert!(env.contains("sqlite:./other.db"));
}

#[test]
fn test_new_with_sequence() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());

    chronicle_cmd()
        .arg("--path")
        .arg(dir.path())
        .args(["new", "--sequence", "create", "users"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1_create_users.sql"));

    chronicle_cmd()
        .arg("--path")
        .arg(dir.path())
        .args(["new", "--sequence", "add email"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2_add_email.sql"));

    let script = fs::read_to_string(dir.path().join("scripts/2_add_email.sql")).unwrap();
    assert!(script.contains("-- //@UNDO"));
}

#[test]
fn test_status_lists_pending() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    write_scripts(dir.path());
    create_database(dir.path(), Some(&[1]));

    chronicle_cmd()
        .arg("--path")
        .arg(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Migration Status (development)"))
        .stdout(predicate::str::contains("2024-01-01 00:00:00.000"))
        .stdout(predicate::str::contains("...pending..."))
        .stdout(predicate::str::contains("add_index"))
        .stdout(predicate::str::contains("1 applied, 2 pending"));
}

#[test]
fn test_script_writes_pending_changes_to_stdout() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    write_scripts(dir.path());
    create_database(dir.path(), Some(&[1]));

    let output = chronicle_cmd()
        .arg("--path")
        .arg(dir.path())
        .arg("script")
        .assert()
        .success()
        .stderr(predicate::str::contains("Merged 2 pending migrations"))
        .get_output()
        .stdout
        .clone();
    let sql = String::from_utf8(output).unwrap();

    assert!(!sql.contains("1_create_users.sql"));
    let second = sql.find("-- 2_add_email.sql\n").unwrap();
    let third = sql.find("-- 3_add_index.sql\n").unwrap();
    assert!(second < third);

    // The full file is merged, undo section included
    assert!(sql.contains("-- //@UNDO"));
    assert!(sql.contains(
        "INSERT INTO CHANGELOG (ID, APPLIED_AT, DESCRIPTION) VALUES (2, '"
    ));
    assert!(sql.contains("', 'add_email');\n\n"));
    assert!(sql.contains("', 'add_index');\n\n"));
}

#[test]
fn test_script_without_changelog_merges_everything() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    write_scripts(dir.path());
    create_database(dir.path(), None);

    let out = dir.path().join("up.sql");
    chronicle_cmd()
        .arg("--path")
        .arg(dir.path())
        .arg("script")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let sql = fs::read_to_string(&out).unwrap();
    assert!(sql.starts_with("-- 1_create_users.sql\nCREATE TABLE users (id INT);\n\n"));
    assert_eq!(sql.matches("INSERT INTO CHANGELOG").count(), 3);
}

#[test]
fn test_script_up_to_date_is_empty() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    write_scripts(dir.path());
    create_database(dir.path(), Some(&[1, 2, 3]));

    chronicle_cmd()
        .arg("--path")
        .arg(dir.path())
        .arg("script")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("up to date"));
}

#[test]
fn test_script_uses_environment_delimiter() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    write_scripts(dir.path());
    create_database(dir.path(), Some(&[1, 2]));

    fs::write(
        dir.path().join("environments/staging.toml"),
        "changelog = \"CHANGELOG\"\ndelimiter = \"GO\"\nfull_line_delimiter = true\n\n[database]\nurl = \"sqlite:./chronicle.db\"\n",
    )
    .unwrap();

    chronicle_cmd()
        .arg("--path")
        .arg(dir.path())
        .args(["--env", "staging", "script"])
        .assert()
        .success()
        .stdout(predicate::str::contains("', 'add_index')\nGO\n\n"));
}

#[test]
fn test_script_without_environment_fails() {
    let dir = TempDir::new().unwrap();

    chronicle_cmd()
        .arg("--path")
        .arg(dir.path())
        .arg("script")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Environment file not found"));
}

#[test]
fn test_script_missing_database_is_wrapped() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    write_scripts(dir.path());

    chronicle_cmd()
        .arg("--path")
        .arg(dir.path())
        .arg("script")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error executing command. Cause:"));
}

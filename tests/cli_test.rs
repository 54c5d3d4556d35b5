//! End-to-end tests of the `pydev` binary: output and exit codes

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `pydev` isolated from the caller's config and credentials.
fn pydev(project: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pydev").unwrap();
    cmd.env("PYDEV_PROJECT_DIR", project.path())
        .env("XDG_CONFIG_HOME", project.path().join(".config"))
        .env_remove("PYDEV_PACKAGE")
        .env_remove("PYDEV_PUBLISH__TOOL__PROGRAM")
        .env_remove("PYPI_USERNAME")
        .env_remove("PYPI_PASSWORD")
        .env_remove("RUST_LOG")
        .env_remove("CLICOLOR_FORCE");
    cmd
}

#[test]
fn given_help_target_when_run_then_lists_targets_sorted() {
    let project = TempDir::new().unwrap();

    let output = pydev(&project).arg("help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let names: Vec<&str> = stdout
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .collect();
    assert_eq!(names, vec!["config", "help", "imports", "lint", "publish"]);
    assert!(stdout.contains(&format!("{:<30}Show this help", "help")));
}

#[test]
fn given_no_target_when_run_then_shows_help() {
    let project = TempDir::new().unwrap();

    pydev(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("lint"));
}

#[test]
fn given_unknown_target_when_run_then_exit_2_and_lists_targets() {
    let project = TempDir::new().unwrap();

    pydev(&project)
        .arg("foo")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown target 'foo'"))
        .stderr(predicate::str::contains("config, help, imports, lint, publish"));
}

#[test]
fn given_unknown_target_and_broken_config_when_run_then_still_exit_2() {
    let project = TempDir::new().unwrap();
    std::fs::write(project.path().join("pydev.toml"), "package = [\n").unwrap();

    pydev(&project).arg("foo").assert().code(2);
}

#[test]
fn given_broken_config_when_help_then_exit_0() {
    let project = TempDir::new().unwrap();
    std::fs::write(project.path().join("pydev.toml"), "package = [\n").unwrap();

    pydev(&project)
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("publish"));
    pydev(&project).assert().success();
}

#[test]
fn given_help_target_when_run_then_one_line_per_target() {
    let project = TempDir::new().unwrap();

    let output = pydev(&project).arg("help").output().unwrap();

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 5);
    assert!(stdout.starts_with("config "));
}

#[test]
fn given_broken_config_when_lint_then_exit_78() {
    let project = TempDir::new().unwrap();
    std::fs::write(project.path().join("pydev.toml"), "package = [\n").unwrap();

    pydev(&project).arg("lint").assert().code(78);
}

#[test]
fn given_no_credentials_when_publish_then_exit_1() {
    let project = TempDir::new().unwrap();

    pydev(&project)
        .arg("publish")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("PYPI_USERNAME"));
}

#[test]
fn given_missing_package_when_lint_then_exit_66() {
    let project = TempDir::new().unwrap();

    pydev(&project)
        .arg("lint")
        .assert()
        .code(66)
        .stderr(predicate::str::contains("import_checker"));
}

#[test]
fn given_extra_argument_when_lint_then_exit_2() {
    let project = TempDir::new().unwrap();

    pydev(&project).args(["lint", "--fix"]).assert().code(2);
}

#[test]
fn given_python_file_when_imports_then_prints_json() {
    let project = TempDir::new().unwrap();
    let main = project.path().join("main.py");
    std::fs::write(&main, "import os\nfrom json import dumps\n").unwrap();

    pydev(&project)
        .args(["imports", "-p", main.to_str().unwrap(), "-i"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"library_dependencies\": []"))
        .stdout(predicate::str::contains("\"json.dumps\""));
}

#[test]
fn given_imports_help_when_run_then_exit_0() {
    let project = TempDir::new().unwrap();

    pydev(&project)
        .args(["imports", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--depth"));
}

#[test]
fn given_config_template_when_run_then_prints_template() {
    let project = TempDir::new().unwrap();

    pydev(&project)
        .args(["config", "template"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# pydev configuration"));
}

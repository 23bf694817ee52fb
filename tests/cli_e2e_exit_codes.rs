//! End-to-end tests for CLI exit codes.
//!
//! - Exit code 0: Success (including runs where some targets were skipped)
//! - Exit code 1: Fatal error (configuration, authentication, schema fetch)
//! - Exit code 2: Invalid command-line usage (handled by clap)

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

const CONFIG: &str = r#"
base_url: http://127.0.0.1:9/v3/
source:
  name: Stylish Outdoor Gear
  key: blt2e8819a463338e6b
targets:
  - name: Goal-Oriented Bicycling
    key: blt38fde950b30192d4
"#;

/// Exit code 0 is returned for --help.
#[test]
fn test_exit_code_help() {
    cargo_bin_cmd!("stack-schema-copy")
        .arg("--help")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("--ct <UID>"))
        .stdout(predicate::str::contains("content-type"));
}

/// Exit code 0 is returned for --version.
#[test]
fn test_exit_code_version() {
    cargo_bin_cmd!("stack-schema-copy")
        .arg("--version")
        .assert()
        .code(0);
}

/// Exit code 2 and the usage banner when the content type flag is missing.
#[test]
fn test_exit_code_missing_content_type() {
    cargo_bin_cmd!("stack-schema-copy")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage: stack-schema-copy --ct <UID>"));
}

/// Exit code 2 for an unknown flag.
#[test]
fn test_exit_code_unknown_flag() {
    cargo_bin_cmd!("stack-schema-copy")
        .args(["--ct", "blog_post", "--not-a-flag"])
        .assert()
        .code(2);
}

/// Exit code 2 for a zero request timeout.
#[test]
fn test_exit_code_zero_timeout() {
    cargo_bin_cmd!("stack-schema-copy")
        .args(["--ct", "blog_post", "--timeout", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--timeout"));
}

/// Exit code 1 when the configuration file does not exist.
#[test]
fn test_exit_code_config_not_found() {
    let temp = assert_fs::TempDir::new().unwrap();

    cargo_bin_cmd!("stack-schema-copy")
        .current_dir(temp.path())
        .args(["--ct", "blog_post"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"))
        .stderr(predicate::str::contains(".stack-schema-copy.yaml"));
}

/// Exit code 1 for a configuration without targets.
#[test]
fn test_exit_code_invalid_config() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child(".stack-schema-copy.yaml")
        .write_str("source: {name: A, key: k1}\ntargets: []\n")
        .unwrap();

    cargo_bin_cmd!("stack-schema-copy")
        .current_dir(temp.path())
        .args(["--ct", "blog_post"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No target stacks configured"));
}

/// Exit code 1 when no credentials are available and there is no terminal.
#[test]
fn test_exit_code_missing_credentials() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child(".stack-schema-copy.yaml").write_str(CONFIG).unwrap();

    cargo_bin_cmd!("stack-schema-copy")
        .current_dir(temp.path())
        .env_remove("USER_EMAIL")
        .env_remove("USER_PASSWORD")
        .args(["--ct", "blog_post"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not log in."))
        .stderr(predicate::str::contains("USER_EMAIL"));
}

/// Exit code 1 when the API cannot be reached: the cached token cannot be
/// validated and the password login fails too.
#[test]
fn test_exit_code_unreachable_api() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child(".stack-schema-copy.yaml").write_str(CONFIG).unwrap();
    temp.child(".authtoken").write_str("cached").unwrap();

    cargo_bin_cmd!("stack-schema-copy")
        .current_dir(temp.path())
        .env("USER_EMAIL", "ops@example.com")
        .env("USER_PASSWORD", "hunter2")
        .args(["--ct", "blog_post", "--timeout", "5"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not log in."))
        .stderr(predicate::str::contains("--base-url"));

    // The cached token is left alone
    temp.child(".authtoken").assert("cached");
}

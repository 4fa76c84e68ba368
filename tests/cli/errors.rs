//! Tests for error handling and CLI flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    t.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("groups"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    t.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kubegate"));
}

#[test]
fn test_completions_bash_outputs_script() {
    let t = Test::new();

    let output = t.cmd().args(["completions", "bash"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "_kubegate");
}

#[test]
fn test_completions_zsh() {
    let t = Test::new();

    let output = t.cmd().args(["completions", "zsh"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "#compdef kubegate");
}

#[test]
fn test_completions_need_no_config() {
    let t = Test::new();

    let output = t.cmd().args(["completions", "fish"]).output().unwrap();
    assert_success(&output);
    assert!(!t.config_path().exists());
}

#[test]
fn test_missing_config_suggests_fix() {
    let t = Test::new();

    let output = t.cmd().arg("login").output().unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "config file not found");
    assert_stderr_contains(&output, "pass --config");
}

#[test]
fn test_missing_config_hint_names_default_location() {
    let t = Test::new();

    let output = t.groups();
    assert_failure(&output);
    assert_stderr_contains(
        &output,
        &format!("create {} or pass --config", t.config_path().display()),
    );
}

#[test]
fn test_missing_explicit_config_hint_names_that_path() {
    let t = Test::new();
    let path = t.dir.path().join("nowhere.toml");

    let output = t
        .cmd()
        .args(["--config", path.to_str().unwrap(), "groups"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, &format!("create {} or pass --config", path.display()));
    assert!(!stderr(&output).contains(".kubegate/config.toml"));
}

#[test]
fn test_invalid_config_reports_parse_error() {
    let t = Test::with_config("targets = 3\n");

    let output = t.groups();
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config");
}

#[test]
fn test_unknown_config_key_rejected() {
    let t = Test::with_config("kubeconfig = \"{kubeconfig}\"\ncolour = true\n");

    let output = t.groups();
    assert_failure(&output);
    assert_stderr_contains(&output, "colour");
}

#[test]
fn test_unknown_group_fails_before_any_retrieval() {
    let t = Test::with_config(NO_DEFAULT_CONFIG);

    let output = t.login(Some("staging"));
    assert_failure(&output);
    assert_stderr_contains(&output, "group not found: \"staging\"");
    assert_stderr_contains(&output, "run: kubegate groups");
    assert!(!t.kubeconfig_path().exists());
}

#[test]
fn test_no_group_and_no_default_fails() {
    let t = Test::with_config(NO_DEFAULT_CONFIG);

    let output = t.login(None);
    assert_failure(&output);
    assert_stderr_contains(&output, "no default group");
    assert_stderr_contains(&output, "pass --group");
}

#[test]
fn test_interactive_flag_takes_a_value() {
    let t = Test::with_config(NO_DEFAULT_CONFIG);

    let output = t
        .cmd()
        .args(["login", "--group", "nope", "--interactive", "false"])
        .output()
        .unwrap();
    // Parsed fine; fails on the group, not the flag.
    assert_failure(&output);
    assert_stderr_contains(&output, "group not found");
}

#[test]
fn test_default_no_log_output() {
    let t = Test::with_config(NO_DEFAULT_CONFIG);

    let output = t.groups();
    assert_success(&output);
    let err = stderr(&output);
    assert!(
        !err.contains("DEBUG") && !err.contains("TRACE"),
        "Default mode should not show debug/trace output: {}",
        err
    );
}

#[test]
fn test_verbose_flag_shows_debug_output() {
    let t = Test::with_config(NO_DEFAULT_CONFIG);

    let output = t.cmd().args(["--verbose", "groups"]).output().unwrap();
    assert_success(&output);
    assert_stderr_contains(&output, "config loaded");
}

#[test]
fn test_log_env_var_overrides_verbosity() {
    let t = Test::with_config(NO_DEFAULT_CONFIG);

    let output = t
        .cmd()
        .env("KUBEGATE_LOG", "kubegate=debug")
        .arg("groups")
        .output()
        .unwrap();
    assert_success(&output);
    assert_stderr_contains(&output, "DEBUG");
}

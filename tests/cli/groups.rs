//! Tests for `kubegate groups`.

use crate::support::*;

#[test]
fn test_groups_lists_targets_with_aliases() {
    let t = Test::with_config(&with_gateway(GATEWAY_CONFIG, "https://osprey.invalid"));

    let output = t.groups();
    assert_success(&output);
    assert_stdout_contains(&output, "dev (default)");
    assert_stdout_contains(&output, "prod | p | production [osprey]");
    assert_stdout_contains(&output, "dev-a | a [osprey]");
}

#[test]
fn test_groups_in_name_order() {
    let t = Test::with_config(&with_gateway(GATEWAY_CONFIG, "https://osprey.invalid"));

    let out = stdout(&t.groups());
    let all = out.find("all").unwrap();
    let dev = out.find("dev (default)").unwrap();
    let prod = out.rfind("prod\n").unwrap();
    assert!(all < dev && dev < prod, "unexpected order: {}", out);
}

#[test]
fn test_groups_without_targets() {
    let t = Test::with_config("kubeconfig = \"{kubeconfig}\"\n");

    let output = t.groups();
    assert_success(&output);
    assert_stdout_contains(&output, "no groups configured");
}

#[test]
fn test_config_flag_overrides_default_location() {
    let t = Test::new();
    let path = t.dir.path().join("elsewhere.toml");
    std::fs::write(
        &path,
        NO_DEFAULT_CONFIG.replace("{kubeconfig}", "/tmp/unused-kubeconfig"),
    )
    .unwrap();

    let output = t
        .cmd()
        .args(["--config", path.to_str().unwrap(), "groups"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "prod-x | x");
}

#[test]
fn test_config_env_var() {
    let t = Test::new();
    let path = t.dir.path().join("env.toml");
    std::fs::write(
        &path,
        NO_DEFAULT_CONFIG.replace("{kubeconfig}", "/tmp/unused-kubeconfig"),
    )
    .unwrap();

    let output = t
        .cmd()
        .env("KUBEGATE_CONFIG", &path)
        .arg("groups")
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "dev-a");
}

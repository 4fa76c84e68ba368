//! End-to-end `kubegate login` against a mock gateway.

use crate::support::*;
use kubegate::Kubeconfig;

fn gateway_test(gateway: &Gateway) -> Test {
    Test::with_config(&with_gateway(GATEWAY_CONFIG, &gateway.uri()))
}

#[tokio::test]
async fn test_login_default_group() {
    let gateway = Gateway::start().await;
    gateway.accept("dev-a").await;
    gateway.accept("dev-b").await;
    let t = gateway_test(&gateway);

    let output = t.login(None);
    assert_success(&output);
    assert_stdout_contains(&output, "Active group (default): dev");
    assert_stdout_contains(&output, "Logged in to: dev-a | a");
    assert_stdout_contains(&output, "Logged in to: dev-b");
    assert_stdout_excludes(&output, "prod");

    let kubeconfig = Kubeconfig::load(t.kubeconfig_path()).unwrap();
    assert_eq!(
        kubeconfig.server("dev-a"),
        Some("https://dev-a.example:6443")
    );
    assert_eq!(kubeconfig.context_cluster("a"), Some("dev-a"));
    assert_eq!(kubeconfig.context_cluster("dev-b"), Some("dev-b"));
    let user = kubeconfig.user("dev-a").unwrap();
    assert_eq!(user["auth-provider"]["name"].as_str(), Some("oidc"));
    assert_eq!(
        user["auth-provider"]["config"]["id-token"].as_str(),
        Some("id-dev-a")
    );
    assert_eq!(gateway.requested().await, vec!["dev-a", "dev-b"]);

    let raw = t.kubeconfig();
    assert!(raw.contains("auth-provider:"), "{}", raw);
    assert!(!raw.contains('!'), "kubeconfig carries yaml tags:\n{}", raw);
}

#[tokio::test]
async fn test_login_named_group_with_aliases() {
    let gateway = Gateway::start().await;
    gateway.accept("prod").await;
    let t = gateway_test(&gateway);

    let output = t.login(Some("prod"));
    assert_success(&output);
    assert_stdout_contains(&output, "Active group: prod");
    assert_stdout_contains(&output, "Logged in to: prod | p | production");

    let kubeconfig = Kubeconfig::load(t.kubeconfig_path()).unwrap();
    for context in ["prod", "p", "production"] {
        assert_eq!(kubeconfig.context_cluster(context), Some("prod"));
    }
}

#[tokio::test]
async fn test_bad_password_aborts_run() {
    let gateway = Gateway::start().await;
    gateway.accept("dev-a").await;
    gateway.accept("dev-b").await;
    let t = gateway_test(&gateway);

    let output = t.login_as(None, USERNAME, "wrong");
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to log in to dev-a");
    assert_stderr_contains(&output, "invalid username or password");
    assert_stdout_excludes(&output, "Logged in to");
    assert!(!t.kubeconfig_path().exists());
    assert_eq!(gateway.requested().await, vec!["dev-a"]);
}

#[tokio::test]
async fn test_unavailable_target_does_not_stop_the_rest() {
    let gateway = Gateway::start().await;
    gateway.accept("dev-a").await;
    gateway.down("dev-b").await;
    gateway.accept("prod").await;
    let t = gateway_test(&gateway);

    let output = t.login(Some("all"));
    assert_failure(&output);
    assert_stdout_contains(&output, "Logged in to: dev-a | a");
    assert_stdout_contains(&output, "Logged in to: prod | p | production");
    assert_stderr_contains(&output, "Failed to log in to dev-b");
    assert_stderr_contains(&output, "failed to update credentials for some targets: dev-b");

    let kubeconfig = Kubeconfig::load(t.kubeconfig_path()).unwrap();
    assert!(kubeconfig.server("dev-a").is_some());
    assert!(kubeconfig.server("dev-b").is_none());
    assert!(kubeconfig.server("prod").is_some());
    assert_eq!(gateway.requested().await, vec!["dev-a", "dev-b", "prod"]);
}

#[tokio::test]
async fn test_malformed_gateway_answer_is_not_fatal() {
    let gateway = Gateway::start().await;
    gateway.garbled("dev-a").await;
    gateway.accept("dev-b").await;
    let t = gateway_test(&gateway);

    let output = t.login(None);
    assert_failure(&output);
    assert_stderr_contains(&output, "malformed gateway response");
    assert_stdout_contains(&output, "Logged in to: dev-b");
}

#[tokio::test]
async fn test_unsupported_provider_stops_at_target() {
    let gateway = Gateway::start().await;
    gateway.accept("first").await;
    gateway.accept("third").await;
    let t = Test::with_config(&with_gateway(UNSUPPORTED_PROVIDER_CONFIG, &gateway.uri()));

    let output = t.login(Some("mixed"));
    assert_failure(&output);
    assert_stdout_contains(&output, "Logged in to: first");
    assert_stderr_contains(&output, "no retriever configured for provider 'oidc'");
    assert_stderr_contains(&output, "[providers.oidc]");
    assert_eq!(gateway.requested().await, vec!["first"]);
}

#[tokio::test]
async fn test_login_preserves_unrelated_kubeconfig_entries() {
    let gateway = Gateway::start().await;
    gateway.accept("dev-a").await;
    gateway.accept("dev-b").await;
    let t = gateway_test(&gateway);
    t.write_kubeconfig(EXISTING_KUBECONFIG);

    assert_success(&t.login(None));

    let kubeconfig = Kubeconfig::load(t.kubeconfig_path()).unwrap();
    assert_eq!(kubeconfig.server("local"), Some("https://127.0.0.1:6443"));
    assert_eq!(kubeconfig.context_cluster("local"), Some("local"));
    assert_eq!(kubeconfig.current_context(), Some("local"));
    assert!(t.kubeconfig().contains("preferences"));
}

#[tokio::test]
async fn test_relogin_replaces_entries() {
    let gateway = Gateway::start().await;
    gateway.accept("dev-a").await;
    gateway.accept("dev-b").await;
    let t = gateway_test(&gateway);

    assert_success(&t.login(None));
    let first = t.kubeconfig();
    assert_success(&t.login(None));

    assert_eq!(t.kubeconfig(), first);
    let kubeconfig = Kubeconfig::load(t.kubeconfig_path()).unwrap();
    assert_eq!(
        kubeconfig.contexts().iter().filter(|c| **c == "dev-a").count(),
        1
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_kubeconfig_written_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let gateway = Gateway::start().await;
    gateway.accept("dev-a").await;
    gateway.accept("dev-b").await;
    let t = gateway_test(&gateway);

    assert_success(&t.login(None));

    let mode = std::fs::metadata(t.kubeconfig_path())
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

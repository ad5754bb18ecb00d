//! Build, deploy and kubectl tests against fake docker and kubectl scripts

#![cfg(unix)]

mod common;

use common::TestWorkspace;
use predicates::prelude::*;

const DOCKER: &str = r#"echo "docker $*" >> "$CALLS_LOG"
case "$*" in
  "buildx imagetools inspect"*)
    echo '{"mediaType":"application/vnd.oci.image.index.v1+json","digest":"sha256:1111","size":856}'
    ;;
  push*)
    echo "The push refers to repository [eu.gcr.io/acme/web]"
    echo "latest: digest: sha256:2222 size: 1234"
    ;;
esac
exit "${DOCKER_EXIT:-0}"
"#;

const KUBECTL: &str = r#"echo "kubectl $*" >> "$CALLS_LOG"
case "$1" in
  apply) cat > "$CALLS_LOG.applied" ;;
  get) echo '{"items":[]}' ;;
esac
exit "${KUBECTL_EXIT:-0}"
"#;

fn workspace() -> TestWorkspace {
    let workspace = TestWorkspace::with_manifests();
    workspace.fake_tool("docker", DOCKER);
    workspace.fake_tool("kubectl", KUBECTL);
    workspace
}

fn applied(workspace: &TestWorkspace) -> String {
    std::fs::read_to_string(workspace.bin_dir().join("calls.log.applied")).unwrap_or_default()
}

#[test]
fn test_dry_run_prints_pinned_manifests() {
    let workspace = workspace();
    workspace
        .kd()
        .args(["deploy", "--dry-run", "acc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kind: Namespace"))
        .stdout(predicate::str::contains("name: web-acc"))
        .stdout(predicate::str::contains("image: eu.gcr.io/acme/web@sha256:1111"))
        .stdout(predicate::str::contains("replicas: 1"))
        .stdout(predicate::str::contains("image: web\n").not());

    let calls = workspace.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("docker buildx imagetools inspect eu.gcr.io/acme/web:latest"));
}

#[test]
fn test_dry_run_output_is_reproducible() {
    let workspace = workspace();
    let first = workspace
        .kd()
        .args(["deploy", "--dry-run", "production"])
        .output()
        .unwrap();
    let second = workspace
        .kd()
        .args(["deploy", "--dry-run", "production"])
        .output()
        .unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_deploy_applies_then_tags() {
    let workspace = workspace();
    workspace
        .kd()
        .args(["deploy", "web:v2", "prd"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Successfully deployed"));

    let calls = workspace.calls();
    assert_eq!(
        calls,
        [
            "docker buildx imagetools inspect eu.gcr.io/acme/web:v2 --format {{json .Manifest}}",
            "kubectl apply -f - --context prod-cluster --namespace web-prd",
            "docker buildx imagetools create --tag eu.gcr.io/acme/web:production eu.gcr.io/acme/web@sha256:1111",
        ]
    );

    let manifests = applied(&workspace);
    assert!(manifests.contains("name: web-prd"));
    assert!(manifests.contains("replicas: 3"));
    assert!(manifests.contains("image: eu.gcr.io/acme/web@sha256:1111"));
}

#[test]
fn test_failed_apply_propagates_status_and_skips_tag() {
    let workspace = workspace();
    workspace
        .kd()
        .env("KUBECTL_EXIT", "5")
        .args(["deploy", "acceptance"])
        .assert()
        .failure()
        .code(5);

    let calls = workspace.calls();
    assert!(calls.iter().any(|call| call.starts_with("kubectl apply")));
    assert!(!calls.iter().any(|call| call.contains("imagetools create")));
}

#[test]
fn test_missing_overlay_fails_before_apply() {
    let workspace = workspace();
    std::fs::remove_dir_all(workspace.path.join("config/deploy/acceptance")).unwrap();
    workspace
        .kd()
        .args(["deploy", "acc"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Manifest directory not found"));
    assert!(!workspace.calls().iter().any(|call| call.starts_with("kubectl")));
}

#[test]
fn test_deploy_with_build_uses_pushed_digest() {
    let workspace = workspace();
    workspace
        .kd()
        .args(["deploy", "--build", "--cache-tag", "ci", "acc"])
        .assert()
        .success();

    let calls = workspace.calls();
    assert!(calls[0].starts_with("docker buildx build --platform linux/amd64"));
    assert!(calls[0].contains("--cache-from type=registry,ref=eu.gcr.io/acme/web:cache-ci"));
    assert!(calls[0].contains("--cache-from type=registry,ref=eu.gcr.io/acme/web:cache-main"));
    assert_eq!(calls[1], "docker push --platform linux/amd64 eu.gcr.io/acme/web:latest");
    assert!(!calls.iter().any(|call| call.contains("imagetools inspect")));
    assert!(applied(&workspace).contains("image: eu.gcr.io/acme/web@sha256:2222"));
}

#[test]
fn test_build_runs_hooks_around_image() {
    let workspace = workspace();
    workspace.write_file(
        "kdeploy.conf",
        &common::CONFIG.replace(
            "  path: .\n",
            "  path: .\n  preBuild: echo pre-build >> \"$CALLS_LOG\"\n  postBuild: echo post-build >> \"$CALLS_LOG\"\n",
        ),
    );
    workspace
        .kd()
        .args(["build", "--cache-tag", "main"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Successfully built eu.gcr.io/acme/web:latest"));

    let calls = workspace.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], "pre-build");
    assert!(calls[1].starts_with("docker buildx build"));
    assert_eq!(calls[1].matches("--cache-from").count(), 1);
    assert!(calls[2].starts_with("docker push"));
    assert_eq!(calls[3], "post-build");
}

#[test]
fn test_failing_post_build_hook_is_reported() {
    let workspace = workspace();
    workspace.write_file(
        "kdeploy.conf",
        &common::CONFIG.replace("  path: .\n", "  path: .\n  postBuild: exit 4\n"),
    );
    workspace
        .kd()
        .args(["build"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Post-build command failed"));
}

#[test]
fn test_failed_image_build_propagates_docker_status() {
    let workspace = workspace();
    workspace
        .kd()
        .env("DOCKER_EXIT", "7")
        .args(["build"])
        .assert()
        .failure()
        .code(7);
    assert_eq!(workspace.calls().len(), 1);
}

#[test]
fn test_kubectl_passthrough_scopes_to_target() {
    let workspace = workspace();
    workspace
        .kd()
        .args(["ctl", "prd", "get", "pods", "-o", "wide"])
        .assert()
        .success();
    assert_eq!(
        workspace.calls(),
        ["kubectl --context prod-cluster --namespace web-prd get pods -o wide"]
    );
}

#[test]
fn test_kubectl_passthrough_propagates_exit_code() {
    let workspace = workspace();
    workspace
        .kd()
        .env("KUBECTL_EXIT", "3")
        .args(["kubectl", "acc", "rollout", "status", "deployment/web"])
        .assert()
        .failure()
        .code(3);
}

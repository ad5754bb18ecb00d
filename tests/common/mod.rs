//! Common test utilities for kd integration tests

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// A minimal single-app workspace with two targets
#[allow(dead_code)]
pub const CONFIG: &str = "version: 2
registry: eu.gcr.io/acme
apps:
- name: web
  path: .
targets:
- name: acceptance
  alias: [acc, test]
  context: dev-cluster
  namespace: web-acc
  path: config/deploy/acceptance
- name: production
  alias: prd
  context: prod-cluster
  namespace: web-prd
  path: config/deploy/production
";

/// A test workspace for integration tests
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new, empty test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// A workspace with `CONFIG` and a base plus two overlays for `web`
    pub fn with_manifests() -> Self {
        let workspace = Self::new();
        workspace.write_file("kdeploy.conf", CONFIG);
        workspace.write_file(
            "config/deploy/_base/kustomization.yaml",
            "resources:\n- deployment.yaml\n- service.yaml\n",
        );
        workspace.write_file(
            "config/deploy/_base/deployment.yaml",
            "apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  replicas: 1
  template:
    spec:
      containers:
      - name: web
        image: web
",
        );
        workspace.write_file(
            "config/deploy/_base/service.yaml",
            "apiVersion: v1\nkind: Service\nmetadata:\n  name: web\n",
        );
        for (target, replicas) in [("acceptance", 1), ("production", 3)] {
            workspace.write_file(
                &format!("config/deploy/{target}/kustomization.yaml"),
                "resources:\n- ../_base\npatches:\n- deployment.yaml\n",
            );
            workspace.write_file(
                &format!("config/deploy/{target}/deployment.yaml"),
                &format!(
                    "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\nspec:\n  replicas: {replicas}\n"
                ),
            );
        }
        workspace
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Directory holding fake tools, outside the workspace root
    pub fn bin_dir(&self) -> PathBuf {
        self.path.join(".bin")
    }

    /// Install an executable shell script named `name` in `bin_dir`
    #[cfg(unix)]
    pub fn fake_tool(&self, name: &str, script: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = self.bin_dir().join(name);
        std::fs::create_dir_all(self.bin_dir()).expect("Failed to create bin directory");
        std::fs::write(&path, format!("#!/bin/sh\n{script}"))
            .expect("Failed to write fake tool");
        let mut permissions = std::fs::metadata(&path)
            .expect("Failed to stat fake tool")
            .permissions();
        permissions.set_mode(0o755);
        std::fs::set_permissions(&path, permissions).expect("Failed to make fake tool executable");
    }

    /// Every invocation the fake tools appended to `calls.log`
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.bin_dir().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// `kd` run in this workspace, with fake tools first on PATH
    pub fn kd(&self) -> Command {
        let mut cmd = kd_cmd();
        cmd.current_dir(&self.path);
        let path = std::env::var("PATH").unwrap_or_default();
        cmd.env("PATH", format!("{}:{}", self.bin_dir().display(), path));
        cmd.env("CALLS_LOG", self.bin_dir().join("calls.log"));
        cmd
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// The kd binary, ignoring any developer KD_WORKSPACE override
#[allow(deprecated)]
pub fn kd_cmd() -> Command {
    let mut cmd = Command::cargo_bin("kd").expect("kd binary should be built");
    cmd.env_remove("KD_WORKSPACE");
    cmd.env_remove("SSH_AUTH_SOCK");
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_file_operations() {
        let workspace = TestWorkspace::new();
        workspace.write_file("test/file.txt", "hello");
        assert!(workspace.file_exists("test/file.txt"));
        assert_eq!(workspace.read_file("test/file.txt"), "hello");
    }

    #[test]
    fn test_workspace_with_manifests() {
        let workspace = TestWorkspace::with_manifests();
        assert!(workspace.file_exists("kdeploy.conf"));
        assert!(workspace.file_exists("config/deploy/production/deployment.yaml"));
        assert!(workspace.calls().is_empty());
    }
}

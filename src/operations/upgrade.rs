//! Upgrade operation: migrate a version 1 workspace to the current layout
//!
//! Version 1 kept the shared manifests directly in the target group directory
//! and described each target in `kube-manifest.yaml`. The current layout moves
//! the shared manifests into `_base` and uses `kustomization.yaml` files.

use std::path::{Path, PathBuf};

use crate::config::{self, CONFIG_NAME, Config, LATEST_VERSION, LEGACY_VERSION};
use crate::error::{self, KdError, Result};
use crate::manifest::BASE_DIR;
use crate::ui::Logger;

const LEGACY_MANIFEST: &str = "kube-manifest.yaml";
const KUSTOMIZATION: &str = "kustomization.yaml";
const NAMESPACE_MANIFEST: &str = "namespace.yaml";

/// Migrates configuration and manifests in place
pub struct UpgradeOperation<'a> {
    root: &'a Path,
    log: &'a Logger,
}

impl<'a> UpgradeOperation<'a> {
    pub fn new(root: &'a Path, log: &'a Logger) -> Self {
        Self { root, log }
    }

    pub fn execute(&self) -> Result<()> {
        let text = config::loader::read(self.root)?;
        let config = Config::parse(&text, CONFIG_NAME)?;

        if config.api_version == LATEST_VERSION {
            self.log.success(format!(
                "Configuration already at version {}",
                config.api_version
            ));
            return Ok(());
        }
        if config.api_version != LEGACY_VERSION {
            return Err(error::config::upgrade_failed(format!(
                "unsupported version {}, unable to upgrade to {}",
                config.api_version, LATEST_VERSION
            )));
        }

        let groups = group_dirs(&config);
        for app in &config.apps {
            let app_dir = self.root.join(&app.path);
            for group in &groups {
                self.move_base_files(&app_dir.join(group))?;
            }
            for target in &config.targets {
                let target_dir = app_dir.join(&target.path);
                self.rename_target_manifest(&target_dir);
                self.delete_namespace(&target_dir);
            }
        }

        self.update_version(&text)?;
        self.log.success(format!(
            "Successfully upgraded configuration to version {LATEST_VERSION}"
        ));
        Ok(())
    }

    fn move_base_files(&self, group_dir: &Path) -> Result<()> {
        let entries = std::fs::read_dir(group_dir).map_err(|e| {
            error::config::upgrade_failed(format!(
                "cannot read {}: {}",
                group_dir.display(),
                e
            ))
        })?;
        let base_dir = group_dir.join(BASE_DIR);
        std::fs::create_dir_all(&base_dir)?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "yaml"))
            .collect();
        files.sort();

        for old in files {
            let Some(name) = old.file_name() else {
                continue;
            };
            let new = if name == LEGACY_MANIFEST {
                base_dir.join(KUSTOMIZATION)
            } else {
                base_dir.join(name)
            };
            match std::fs::rename(&old, &new) {
                Ok(()) => self.log.note(format!(
                    "Renamed: {} -> {}",
                    self.relative(&old),
                    self.relative(&new)
                )),
                Err(e) => self.log.error(format!("Could not rename: {e}")),
            }
        }
        Ok(())
    }

    fn rename_target_manifest(&self, target_dir: &Path) {
        let old = target_dir.join(LEGACY_MANIFEST);
        let new = target_dir.join(KUSTOMIZATION);

        if new.exists() {
            self.log
                .warn(format!("File exists: {}", self.relative(&new)));
            return;
        }
        if !old.exists() {
            self.log
                .warn(format!("Could not find: {}", self.relative(&old)));
            return;
        }

        if let Err(e) = std::fs::rename(&old, &new) {
            self.log.error(format!("Could not rename: {e}"));
            return;
        }
        self.log.note(format!(
            "Renamed: {} -> {}",
            self.relative(&old),
            self.relative(&new)
        ));

        let rewritten = std::fs::read_to_string(&new)
            .map(|text| rewrite_target_kustomization(&text))
            .and_then(|text| std::fs::write(&new, text));
        if let Err(e) = rewritten {
            self.log.error(format!("Could not modify: {e}"));
        }
    }

    fn delete_namespace(&self, target_dir: &Path) {
        let path = target_dir.join(NAMESPACE_MANIFEST);
        if !path.is_file() {
            return;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => self.log.note(format!("Removed: {}", self.relative(&path))),
            Err(e) => self.log.error(format!("Could not remove: {e}")),
        }
    }

    fn update_version(&self, text: &str) -> Result<()> {
        let path = self.root.join(CONFIG_NAME);
        std::fs::write(&path, set_latest_version(text)).map_err(|e| KdError::IoError {
            message: format!("Failed to write {}: {}", path.display(), e),
        })?;
        self.log.note(format!("Updated: {CONFIG_NAME}"));
        Ok(())
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

/// Distinct parent directories of the target paths, in configured order
fn group_dirs(config: &Config) -> Vec<PathBuf> {
    let mut groups: Vec<PathBuf> = Vec::new();
    for target in &config.targets {
        let group = Path::new(&target.path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    groups
}

/// Point a target kustomization at `../_base` and drop its namespace manifest
fn rewrite_target_kustomization(text: &str) -> String {
    text.replace("- ..\n", &format!("- ../{BASE_DIR}\n"))
        .replace(&format!("- {NAMESPACE_MANIFEST}\n"), "")
}

fn set_latest_version(text: &str) -> String {
    let legacy = format!("version: {LEGACY_VERSION}\n");
    if text.contains(&legacy) {
        text.replace(&legacy, &format!("version: {LATEST_VERSION}\n"))
    } else {
        format!("version: {LATEST_VERSION}\n{text}")
    }
}

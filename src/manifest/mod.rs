//! Manifest composition for a target
//!
//! This module handles:
//! - Building the target overlay on top of its `_base` directory
//! - Adding the target Namespace object
//! - Ordering and serializing resources deterministically
//! - Pinning the app image placeholder to the deployed digest
//!
//! Layout, relative to the app path:
//!
//! ```text
//! config/deploy/_base/kustomization.yaml
//! config/deploy/acceptance/kustomization.yaml   (resources: [../_base])
//! config/deploy/production/kustomization.yaml
//! ```

pub mod image;
pub mod kustomize;
pub mod namespace;
pub mod patch;
pub mod resource;
pub mod transform;

use std::path::{Path, PathBuf};

use crate::config::{ResolvedApp, ResolvedTarget};
use crate::error::{self, Result};
use crate::ui::Logger;

pub use image::substitute_image;
pub use kustomize::KustomizeBuilder;
pub use resource::{ResourceDoc, ResourceKey, ResourceSet};

/// Name of the directory holding the manifests shared by a group of targets
pub const BASE_DIR: &str = "_base";

/// Builds the resources of an overlay directory
pub trait OverlayBuilder {
    fn build(&self, overlay_dir: &Path) -> Result<Vec<ResourceDoc>>;
}

/// Base and overlay directories of an app for a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDirs {
    pub base: PathBuf,
    pub overlay: PathBuf,
}

impl ManifestDirs {
    pub fn new(root: &Path, app: &ResolvedApp, target: &ResolvedTarget) -> Self {
        let app_dir = root.join(&app.app.path);
        let target_path = Path::new(target.path());
        let group = target_path.parent().unwrap_or(Path::new(""));
        Self {
            base: app_dir.join(group).join(BASE_DIR),
            overlay: app_dir.join(target_path),
        }
    }

    fn check(&self) -> Result<()> {
        for dir in [&self.base, &self.overlay] {
            if !dir.is_dir() {
                return Err(error::compose::directory_not_found(dir));
            }
        }
        Ok(())
    }
}

/// Compose the manifest stream of `app` for `target`, pinned to `digest`.
///
/// The result is byte-identical for identical inputs. Nothing is sent to the
/// cluster.
pub fn compose_manifests(
    root: &Path,
    app: &ResolvedApp,
    target: &ResolvedTarget,
    digest: &str,
    builder: &dyn OverlayBuilder,
    log: &Logger,
) -> Result<String> {
    let dirs = ManifestDirs::new(root, app, target);
    dirs.check()?;
    if target.namespace().is_empty() {
        return Err(error::config::invalid(format!(
            "target '{}' has no namespace",
            target.name()
        )));
    }

    log.debug(format!("Building overlay {}", dirs.overlay.display()));
    let mut resources = ResourceSet::from_docs(builder.build(&dirs.overlay)?)?;
    resources.insert(namespace::namespace_document(target.namespace())?)?;
    log.debug(format!("Composed {} resources", resources.len()));

    let yaml = resources.to_yaml()?;
    Ok(substitute_image(
        &yaml,
        app.name(),
        &app.repository_with_digest(digest),
    ))
}

//! Deploy operation
//!
//! Per app: obtain the image digest (by building or by registry lookup),
//! compose the target manifests, apply them, tag the image with the target
//! name and flush the CDN cache of GKE targets. Apps are deployed one after
//! another; the first failure stops the run.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use super::Toolbox;
use super::build::{BuildOperation, BuildOptions};
use crate::cli::DeployArgs;
use crate::config::{ResolvedApp, ResolvedTarget};
use crate::error::Result;
use crate::manifest;
use crate::tools::Annotations;
use crate::ui::Logger;

const BACKENDS_ANNOTATION: &str = "ingress.kubernetes.io/backends";
const URL_MAP_ANNOTATION: &str = "ingress.kubernetes.io/url-map";

/// Options for deploying
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Build and push before deploying, instead of looking up the tag
    pub build: bool,
    /// Print the composed manifests instead of applying them
    pub dry_run: bool,
    pub cache_tag: Option<String>,
}

impl From<&DeployArgs> for DeployOptions {
    fn from(args: &DeployArgs) -> Self {
        Self {
            build: args.build,
            dry_run: args.dry_run,
            cache_tag: args.cache_tag.clone(),
        }
    }
}

/// Deploys apps to one target
pub struct DeployOperation<'a> {
    root: &'a Path,
    tools: &'a Toolbox<'a>,
    log: &'a Logger,
}

impl<'a> DeployOperation<'a> {
    pub fn new(root: &'a Path, tools: &'a Toolbox<'a>, log: &'a Logger) -> Self {
        Self { root, tools, log }
    }

    /// Deploy every app in order. Dry-run manifests are written to `out`.
    pub fn execute(
        &self,
        apps: &[ResolvedApp],
        target: &ResolvedTarget,
        options: &DeployOptions,
        out: &mut dyn Write,
    ) -> Result<()> {
        for (index, app) in apps.iter().enumerate() {
            if options.dry_run && index > 0 {
                out.write_all(b"---\n")?;
            }
            self.deploy_app(app, target, options, out)?;
        }
        Ok(())
    }

    fn deploy_app(
        &self,
        app: &ResolvedApp,
        target: &ResolvedTarget,
        options: &DeployOptions,
        out: &mut dyn Write,
    ) -> Result<()> {
        let digest = if options.build {
            let build_options = BuildOptions {
                cache_tag: options.cache_tag.clone(),
            };
            BuildOperation::new(self.root, self.tools, self.log).build_app(app, &build_options)?
        } else {
            self.log
                .note(format!("Retrieving image {}:{}", app.name(), app.tag));
            self.tools.registry.digest(&app.repository(), self.log)?
        };
        self.log.debug(format!("Deploying digest {digest}"));

        let manifests = manifest::compose_manifests(
            self.root,
            app,
            target,
            &digest,
            self.tools.overlays,
            self.log,
        )?;

        if options.dry_run {
            out.write_all(manifests.as_bytes())?;
            out.flush()?;
            self.log.note(format!(
                "Dry run, not applying {} to {}",
                app.name(),
                target.name()
            ));
            return Ok(());
        }

        self.log
            .note(format!("Applying configuration to {}", target.name()));
        self.tools
            .cluster
            .apply(target, manifests.as_bytes(), self.log)?;

        self.log
            .note(format!("Tagging image {}:{}", app.name(), target.name()));
        self.tools.registry.retag(
            &app.repository_with_digest(&digest),
            &app.repository_with_tag(target.name()),
            self.log,
        )?;

        self.flush_cdn(target)?;

        self.log.success(format!(
            "Successfully deployed {} to {}",
            app.repository(),
            target.name()
        ));
        Ok(())
    }

    /// Invalidate the CDN cache behind the target's ingresses, if any use a CDN
    fn flush_cdn(&self, target: &ResolvedTarget) -> Result<()> {
        let Some(project) = target.target.gcp_project() else {
            self.log.debug(format!(
                "Context {} is not a GKE cluster, skipping CDN cache flush",
                target.context()
            ));
            return Ok(());
        };

        for annotations in self.tools.cluster.ingress_annotations(target, self.log)? {
            let (backends, url_map) = match cdn_candidates(&annotations) {
                Ok(Some(candidates)) => candidates,
                Ok(None) => continue,
                Err(e) => {
                    self.log.warn(format!(
                        "Skipping CDN cache flush, unreadable {BACKENDS_ANNOTATION} annotation: {e}"
                    ));
                    continue;
                }
            };

            let mut has_cdn = false;
            for backend in &backends {
                if self.tools.cdn.cdn_enabled(project, backend, self.log)? {
                    has_cdn = true;
                    break;
                }
            }

            if has_cdn {
                self.log
                    .note(format!("Scheduling CDN cache flush for {url_map}"));
                self.tools.cdn.invalidate(project, url_map, self.log)?;
            }
        }
        Ok(())
    }
}

/// Backend services and URL map of an ingress managed by the GCE controller
fn cdn_candidates(
    annotations: &Annotations,
) -> std::result::Result<Option<(Vec<String>, &str)>, serde_json::Error> {
    let (Some(backends), Some(url_map)) = (
        annotations.get(BACKENDS_ANNOTATION),
        annotations.get(URL_MAP_ANNOTATION),
    ) else {
        return Ok(None);
    };
    if backends.is_empty() || url_map.is_empty() {
        return Ok(None);
    }
    let backends: BTreeMap<String, serde_json::Value> = serde_json::from_str(backends)?;
    Ok(Some((backends.into_keys().collect(), url_map.as_str())))
}

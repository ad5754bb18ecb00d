//! Recording stand-ins for the external tools

use std::cell::RefCell;
use std::path::Path;

use serde_yaml::Value;

use super::Toolbox;
use crate::config::{ResolvedApp, ResolvedTarget};
use crate::error::{self, HookStage, Result};
use crate::manifest::{OverlayBuilder, ResourceDoc};
use crate::tools::{
    Annotations, CdnInvalidator, ClusterApplier, HookRunner, ImageBuilder, ImagePusher,
    ImageRegistry,
};
use crate::ui::Logger;

const OVERLAY: [&str; 2] = [
    "apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  template:
    spec:
      containers:
      - name: web
        image: web
",
    "apiVersion: v1
kind: Service
metadata:
  name: web
",
];

/// Records every call as a line of text; calls starting with a registered
/// prefix fail with exit status 2
#[derive(Default)]
pub(crate) struct Fakes {
    calls: RefCell<Vec<String>>,
    failures: RefCell<Vec<String>>,
    pub annotations: RefCell<Vec<Annotations>>,
    pub cdn_backends: RefCell<Vec<String>>,
    pub applied: RefCell<Vec<String>>,
}

impl Fakes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toolbox(&self) -> Toolbox<'_> {
        Toolbox {
            builder: self,
            pusher: self,
            registry: self,
            cluster: self,
            cdn: self,
            hooks: self,
            overlays: self,
        }
    }

    pub fn fail_on(&self, prefix: &str) {
        self.failures.borrow_mut().push(prefix.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        let failing = self
            .failures
            .borrow()
            .iter()
            .any(|prefix| call.starts_with(prefix.as_str()));
        self.calls.borrow_mut().push(call.clone());
        if failing {
            return Err(error::tool::failed("fake", Some(2), call));
        }
        Ok(())
    }
}

impl ImageBuilder for Fakes {
    fn build(&self, app: &ResolvedApp, cache_tag: &str, _log: &Logger) -> Result<()> {
        self.record(format!("build {} cache={}", app.repository(), cache_tag))
    }
}

impl ImagePusher for Fakes {
    fn push(&self, app: &ResolvedApp, _log: &Logger) -> Result<String> {
        self.record(format!("push {}", app.repository()))?;
        Ok("sha256:pushed".to_string())
    }
}

impl ImageRegistry for Fakes {
    fn digest(&self, image: &str, _log: &Logger) -> Result<String> {
        self.record(format!("digest {image}"))?;
        Ok("sha256:current".to_string())
    }

    fn retag(&self, source: &str, new_ref: &str, _log: &Logger) -> Result<()> {
        self.record(format!("retag {source} {new_ref}"))
    }
}

impl ClusterApplier for Fakes {
    fn apply(&self, target: &ResolvedTarget, manifest: &[u8], _log: &Logger) -> Result<()> {
        self.record(format!("apply {}/{}", target.context(), target.namespace()))?;
        self.applied
            .borrow_mut()
            .push(String::from_utf8_lossy(manifest).into_owned());
        Ok(())
    }

    fn ingress_annotations(
        &self,
        target: &ResolvedTarget,
        _log: &Logger,
    ) -> Result<Vec<Annotations>> {
        self.record(format!("ingress {}", target.namespace()))?;
        Ok(self.annotations.borrow().clone())
    }
}

impl CdnInvalidator for Fakes {
    fn cdn_enabled(&self, project: &str, backend: &str, _log: &Logger) -> Result<bool> {
        self.record(format!("describe {project} {backend}"))?;
        Ok(self.cdn_backends.borrow().iter().any(|b| b == backend))
    }

    fn invalidate(&self, project: &str, url_map: &str, _log: &Logger) -> Result<()> {
        self.record(format!("invalidate {project} {url_map}"))
    }
}

impl HookRunner for Fakes {
    fn run_hook(&self, stage: HookStage, command: &str, _dir: &Path, _log: &Logger) -> Result<()> {
        self.record(format!("hook {stage} {command}"))
            .map_err(|e| error::tool::hook_failed(stage, command, e.to_string()))
    }
}

impl OverlayBuilder for Fakes {
    fn build(&self, _overlay_dir: &Path) -> Result<Vec<ResourceDoc>> {
        OVERLAY
            .iter()
            .map(|text| {
                let value: Value = serde_yaml::from_str(text)
                    .map_err(|e| error::compose::failed(Path::new("fake"), e.to_string()))?;
                ResourceDoc::from_value(value, Path::new("fake"))
            })
            .collect()
    }
}

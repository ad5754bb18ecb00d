//! Cluster access through the kubectl CLI

use serde::Deserialize;

use super::exec::Invocation;
use super::{Annotations, ClusterApplier};
use crate::config::ResolvedTarget;
use crate::error::{self, Result};
use crate::ui::Logger;

const KUBECTL: &str = "kubectl";

/// kubectl scoped to the context and namespace of a target
#[derive(Debug, Default)]
pub struct Kubectl;

impl Kubectl {
    /// Run kubectl attached to the terminal and return its exit code
    pub fn run_for_target<S: AsRef<str>>(
        &self,
        target: &ResolvedTarget,
        args: &[S],
        log: &Logger,
    ) -> Result<i32> {
        passthrough_invocation(target, args).run_interactive(log)
    }
}

impl ClusterApplier for Kubectl {
    fn apply(&self, target: &ResolvedTarget, manifest: &[u8], log: &Logger) -> Result<()> {
        apply_invocation(target).run_with_input(manifest, log)
    }

    fn ingress_annotations(
        &self,
        target: &ResolvedTarget,
        log: &Logger,
    ) -> Result<Vec<Annotations>> {
        let captured = ingress_invocation(target).capture(log)?;
        parse_ingress_annotations(&captured.stdout)
    }
}

fn with_target(invocation: Invocation, target: &ResolvedTarget) -> Invocation {
    invocation
        .args(["--context", target.context()])
        .args(["--namespace", target.namespace()])
}

/// `kubectl apply` reading the manifest stream from stdin
pub fn apply_invocation(target: &ResolvedTarget) -> Invocation {
    with_target(Invocation::new(KUBECTL).args(["apply", "-f", "-"]), target)
}

/// Every Ingress in the target namespace, as JSON
pub fn ingress_invocation(target: &ResolvedTarget) -> Invocation {
    with_target(
        Invocation::new(KUBECTL).args(["get", "ingress", "--output", "json"]),
        target,
    )
}

/// Arbitrary kubectl arguments; target flags go first so a trailing `--` stays last
pub fn passthrough_invocation<S: AsRef<str>>(target: &ResolvedTarget, args: &[S]) -> Invocation {
    with_target(Invocation::new(KUBECTL), target).args(args.iter().map(|arg| arg.as_ref()))
}

#[derive(Deserialize)]
struct ObjectList {
    #[serde(default)]
    items: Vec<Object>,
}

#[derive(Deserialize)]
struct Object {
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Deserialize, Default)]
struct Metadata {
    #[serde(default)]
    annotations: Annotations,
}

fn parse_ingress_annotations(json: &str) -> Result<Vec<Annotations>> {
    let list: ObjectList = serde_json::from_str(json).map_err(|e| {
        error::tool::failed(KUBECTL, None, format!("unexpected ingress list: {e}"))
    })?;
    Ok(list
        .items
        .into_iter()
        .map(|item| item.metadata.annotations)
        .collect())
}

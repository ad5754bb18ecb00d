//! External collaborators: docker, kubectl, gcloud and build hooks
//!
//! The deploy and build pipelines only see the capability traits below. The
//! real implementations shell out to the respective command-line tools; tests
//! substitute recording fakes.

pub mod docker;
pub mod exec;
pub mod gcloud;
pub mod hooks;
pub mod kubectl;

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{ResolvedApp, ResolvedTarget};
use crate::error::{HookStage, Result};
use crate::ui::Logger;

pub use docker::Docker;
pub use exec::Invocation;
pub use gcloud::Gcloud;
pub use hooks::ShellHooks;
pub use kubectl::Kubectl;

/// Annotations of one Ingress object in a target namespace
pub type Annotations = BTreeMap<String, String>;

/// Builds the container image of an app
pub trait ImageBuilder {
    /// Build `registry/name:tag`, using `cache_tag` for registry cache import/export
    fn build(&self, app: &ResolvedApp, cache_tag: &str, log: &Logger) -> Result<()>;
}

/// Publishes a built image
pub trait ImagePusher {
    /// Push `registry/name:tag` and return the pushed digest
    fn push(&self, app: &ResolvedApp, log: &Logger) -> Result<String>;
}

/// Reads and writes image references in the registry
pub trait ImageRegistry {
    /// Digest currently referenced by `image`, e.g. `sha256:...`
    fn digest(&self, image: &str, log: &Logger) -> Result<String>;

    /// Point `new_ref` at the image identified by `source`, without re-uploading
    fn retag(&self, source: &str, new_ref: &str, log: &Logger) -> Result<()>;
}

/// Applies manifests to a cluster
pub trait ClusterApplier {
    fn apply(&self, target: &ResolvedTarget, manifest: &[u8], log: &Logger) -> Result<()>;

    /// Annotations of every Ingress in the target namespace
    fn ingress_annotations(&self, target: &ResolvedTarget, log: &Logger)
    -> Result<Vec<Annotations>>;
}

/// Flushes a cloud CDN cache in front of a cluster's load balancers
pub trait CdnInvalidator {
    /// Whether the backend service has CDN enabled
    fn cdn_enabled(&self, project: &str, backend: &str, log: &Logger) -> Result<bool>;

    /// Schedule invalidation of every path behind `url_map`
    fn invalidate(&self, project: &str, url_map: &str, log: &Logger) -> Result<()>;
}

/// Runs user-supplied pre-build and post-build commands
pub trait HookRunner {
    fn run_hook(&self, stage: HookStage, command: &str, dir: &Path, log: &Logger) -> Result<()>;
}

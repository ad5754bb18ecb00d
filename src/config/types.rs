//! Data structures for `kdeploy.conf`

use serde::{Deserialize, Deserializer};

/// Maximum configuration version accepted by this version of kd.
/// Increment this version on API incompatible changes.
pub const LATEST_VERSION: u32 = 2;

/// The one obsolete configuration version that `kd upgrade` can migrate
pub const LEGACY_VERSION: u32 = 1;

/// File name of the configuration, relative to the workspace directory
pub const CONFIG_NAME: &str = "kdeploy.conf";

/// Image tag used when no tag is selected
pub const DEFAULT_TAG: &str = "latest";

/// Build platform used when an app does not set one
pub const DEFAULT_PLATFORM: &str = "linux/amd64";

/// Root of `kdeploy.conf`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Schema version. Configurations without a version predate versioning.
    #[serde(rename = "version", alias = "apiVersion", default = "legacy_version")]
    pub api_version: u32,

    /// Container registry host and path prefix
    #[serde(default)]
    pub registry: String,

    /// Applications to build, in configured order
    #[serde(default)]
    pub apps: Vec<App>,

    /// Deployment targets, in configured order
    #[serde(default)]
    pub targets: Vec<Target>,
}

fn legacy_version() -> u32 {
    LEGACY_VERSION
}

/// An application with its own Dockerfile and manifests
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    #[serde(default)]
    pub name: String,

    /// Location of the Dockerfile and the manifest directories
    #[serde(default)]
    pub path: String,

    /// Docker build context
    #[serde(default)]
    pub root: String,

    #[serde(default)]
    pub default: bool,

    #[serde(default)]
    pub platform: String,

    #[serde(default)]
    pub pre_build: Option<String>,

    #[serde(default)]
    pub post_build: Option<String>,
}

/// A deployment environment in a cluster
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Target {
    pub name: String,

    /// Alternative names; a single string is accepted as a one-element list
    #[serde(default, deserialize_with = "string_or_list")]
    pub alias: Vec<String>,

    /// kubectl context
    #[serde(default)]
    pub context: String,

    #[serde(default)]
    pub namespace: String,

    /// Overlay directory, relative to the app path
    #[serde(default)]
    pub path: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(alias)) => vec![alias],
        Some(OneOrMany::Many(aliases)) => aliases,
    })
}

impl Target {
    /// Whether this target is addressed by the given selector
    pub fn matches(&self, selector: &str) -> bool {
        self.name == selector || self.alias.iter().any(|alias| alias == selector)
    }

    /// Google Cloud project of a GKE context (`gke_<project>_<zone>_<cluster>`)
    pub fn gcp_project(&self) -> Option<&str> {
        let rest = self.context.strip_prefix("gke_")?;
        let (project, _) = rest.split_once('_')?;
        (!project.is_empty()).then_some(project)
    }
}

/// An app selected for this invocation, with the image tag to use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedApp {
    pub app: App,
    pub tag: String,
    pub registry: String,
}

impl ResolvedApp {
    pub fn name(&self) -> &str {
        &self.app.name
    }

    /// Image reference for the resolved tag, e.g. `eu.gcr.io/proj/web:latest`.
    ///
    /// The tag is always rendered, including the default tag.
    pub fn repository(&self) -> String {
        self.repository_with_tag(&self.tag)
    }

    pub fn repository_with_tag(&self, tag: &str) -> String {
        format!("{}/{}:{}", self.registry, self.app.name, tag)
    }

    /// Digest-pinned image reference, e.g. `eu.gcr.io/proj/web@sha256:...`
    pub fn repository_with_digest(&self, digest: &str) -> String {
        format!("{}/{}@{}", self.registry, self.app.name, digest)
    }
}

/// A target selected for this invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub target: Target,
}

impl ResolvedTarget {
    pub fn name(&self) -> &str {
        &self.target.name
    }

    pub fn context(&self) -> &str {
        &self.target.context
    }

    pub fn namespace(&self) -> &str {
        &self.target.namespace
    }

    pub fn path(&self) -> &str {
        &self.target.path
    }
}

//! Image build, push and registry access through the docker CLI

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::exec::Invocation;
use super::{ImageBuilder, ImagePusher, ImageRegistry};
use crate::config::ResolvedApp;
use crate::error::{self, Result};
use crate::git::MAIN_BRANCH;
use crate::ui::{Logger, Spinner};

const DOCKER: &str = "docker";

/// docker CLI running in the workspace directory
pub struct Docker {
    root: PathBuf,
    ssh_forwarding: bool,
}

impl Docker {
    /// SSH agent forwarding is enabled when `SSH_AUTH_SOCK` is set
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ssh_forwarding: std::env::var_os("SSH_AUTH_SOCK").is_some(),
        }
    }
}

impl ImageBuilder for Docker {
    fn build(&self, app: &ResolvedApp, cache_tag: &str, log: &Logger) -> Result<()> {
        build_invocation(app, cache_tag, self.ssh_forwarding)
            .current_dir(&self.root)
            .run(log)
    }
}

impl ImagePusher for Docker {
    fn push(&self, app: &ResolvedApp, log: &Logger) -> Result<String> {
        let spinner = Spinner::start(format!("Pushing {}", app.repository()));
        let captured = push_invocation(app).current_dir(&self.root).capture(log)?;
        spinner.finish();

        for line in captured.stdout.lines().filter(|line| !is_advisory(line)) {
            log.debug(line);
        }

        parse_push_digest(&captured.stdout).ok_or_else(|| {
            error::tool::failed(
                DOCKER,
                None,
                format!("no digest reported when pushing {}", app.repository()),
            )
        })
    }
}

impl ImageRegistry for Docker {
    fn digest(&self, image: &str, log: &Logger) -> Result<String> {
        let spinner = Spinner::start(format!("Retrieving {image}"));
        let captured = inspect_invocation(image).capture(log)?;
        spinner.finish();
        parse_inspect_digest(&captured.stdout, image)
    }

    fn retag(&self, source: &str, new_ref: &str, log: &Logger) -> Result<()> {
        retag_invocation(source, new_ref).capture(log).map(|_| ())
    }
}

fn cache_ref(app: &ResolvedApp, cache_tag: &str) -> String {
    format!(
        "type=registry,ref={}",
        app.repository_with_tag(&format!("cache-{cache_tag}"))
    )
}

/// `docker buildx build` for an app, with registry cache import and export
pub fn build_invocation(app: &ResolvedApp, cache_tag: &str, ssh_forwarding: bool) -> Invocation {
    let dockerfile = Path::new(&app.app.path).join("Dockerfile");

    let mut invocation = Invocation::new(DOCKER).args(["buildx", "build"]);
    if ssh_forwarding {
        invocation = invocation.args(["--ssh", "default"]);
    }
    invocation = invocation
        .args(["--platform", app.app.platform.as_str()])
        .arg("--file")
        .arg(dockerfile.to_string_lossy())
        .args(["--tag".to_string(), app.repository()])
        .args(["--cache-from".to_string(), cache_ref(app, cache_tag)]);
    if cache_tag != MAIN_BRANCH {
        invocation = invocation.args(["--cache-from".to_string(), cache_ref(app, MAIN_BRANCH)]);
    }
    invocation
        .arg("--cache-to")
        .arg(format!("{},mode=max", cache_ref(app, cache_tag)))
        .arg("--load")
        .arg(app.app.root.as_str())
}

/// `docker push` of the platform-specific image
pub fn push_invocation(app: &ResolvedApp) -> Invocation {
    Invocation::new(DOCKER)
        .arg("push")
        .args(["--platform", app.app.platform.as_str()])
        .arg(app.repository())
}

/// Registry lookup of the manifest descriptor of `image`
pub fn inspect_invocation(image: &str) -> Invocation {
    Invocation::new(DOCKER).args([
        "buildx",
        "imagetools",
        "inspect",
        image,
        "--format",
        "{{json .Manifest}}",
    ])
}

/// Registry-side tag of an existing image
pub fn retag_invocation(source: &str, new_ref: &str) -> Invocation {
    Invocation::new(DOCKER).args(["buildx", "imagetools", "create", "--tag", new_ref, source])
}

/// Hints docker appends to push output that are not part of the result
fn is_advisory(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("WARNING")
        || line.starts_with("What's next")
        || line.starts_with("View a summary of image vulnerabilities")
        || line.starts_with("Learn more at")
}

/// Digest from the final `<tag>: digest: sha256:<hex> size: <n>` line of a push
fn parse_push_digest(output: &str) -> Option<String> {
    output.lines().rev().find_map(|line| {
        let (_, rest) = line.split_once("digest: ")?;
        let digest = rest.split_whitespace().next()?;
        digest.starts_with("sha256:").then(|| digest.to_string())
    })
}

#[derive(Deserialize)]
struct Descriptor {
    digest: String,
}

fn parse_inspect_digest(output: &str, image: &str) -> Result<String> {
    let descriptor: Descriptor = serde_json::from_str(output.trim()).map_err(|e| {
        error::tool::failed(
            DOCKER,
            None,
            format!("unexpected manifest descriptor for {image}: {e}"),
        )
    })?;
    Ok(descriptor.digest)
}

//! Operations behind the kd commands
//!
//! This module provides high-level operations that coordinate:
//! - BuildOperation: hooks, image build and push per app
//! - DeployOperation: image lookup, composition, apply, tag and CDN flush
//! - UpgradeOperation: migration of legacy configuration and manifests
//! - InitOperation: scaffolding of a new configuration
//!
//! Operations never talk to external programs directly; they go through the
//! capability traits collected in a [`Toolbox`].

pub mod build;
pub mod deploy;
pub mod init;
pub mod upgrade;

#[cfg(test)]
pub(crate) mod fakes;

use crate::manifest::{KustomizeBuilder, OverlayBuilder};
use crate::tools::{
    CdnInvalidator, ClusterApplier, Docker, Gcloud, HookRunner, ImageBuilder, ImagePusher,
    ImageRegistry, Kubectl, ShellHooks,
};

pub use build::{BuildOperation, BuildOptions};
pub use deploy::{DeployOperation, DeployOptions};
pub use init::{InitOperation, InitOptions};
pub use upgrade::UpgradeOperation;

/// The external collaborators an operation may use
pub struct Toolbox<'a> {
    pub builder: &'a dyn ImageBuilder,
    pub pusher: &'a dyn ImagePusher,
    pub registry: &'a dyn ImageRegistry,
    pub cluster: &'a dyn ClusterApplier,
    pub cdn: &'a dyn CdnInvalidator,
    pub hooks: &'a dyn HookRunner,
    pub overlays: &'a dyn OverlayBuilder,
}

/// Real command-line tools for a workspace
pub struct SystemTools {
    pub docker: Docker,
    pub kubectl: Kubectl,
    pub gcloud: Gcloud,
    pub hooks: ShellHooks,
    pub overlays: KustomizeBuilder,
}

impl SystemTools {
    pub fn new(root: &std::path::Path) -> Self {
        Self {
            docker: Docker::new(root),
            kubectl: Kubectl,
            gcloud: Gcloud,
            hooks: ShellHooks,
            overlays: KustomizeBuilder,
        }
    }

    pub fn toolbox(&self) -> Toolbox<'_> {
        Toolbox {
            builder: &self.docker,
            pusher: &self.docker,
            registry: &self.docker,
            cluster: &self.kubectl,
            cdn: &self.gcloud,
            hooks: &self.hooks,
            overlays: &self.overlays,
        }
    }
}

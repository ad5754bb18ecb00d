//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - build: Build command arguments
//! - deploy: Deploy command arguments
//! - kubectl: Kubectl pass-through arguments
//! - list: List command arguments
//! - init: Init command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod build;
pub mod completions;
pub mod deploy;
pub mod init;
pub mod kubectl;
pub mod list;

pub use build::BuildArgs;
pub use completions::CompletionsArgs;
pub use deploy::DeployArgs;
pub use init::InitArgs;
pub use kubectl::KubectlArgs;
pub use list::{ListArgs, ListKind, OutputFormat};

/// kd - build and deploy apps to Kubernetes clusters
#[derive(Parser, Debug)]
#[command(
    name = "kd",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Build and deploy apps to Kubernetes clusters",
    long_about = "kd builds container images for the applications in kdeploy.conf, pushes them \
                  to a registry and deploys them to configured targets. Manifests are composed \
                  from a shared base and a per-target overlay, and always refer to the exact \
                  image digest that was deployed.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  kd build                        \x1b[90m# Build the default app\x1b[0m\n   \
                  kd deploy my-app:v2 production  \x1b[90m# Deploy a tag to production\x1b[0m\n   \
                  kd deploy --build acc           \x1b[90m# Build, then deploy to acceptance\x1b[0m\n   \
                  kd ctl prd get pods             \x1b[90m# Run kubectl against a target\x1b[0m\n   \
                  kd list targets                 \x1b[90m# Show configured targets\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Workspace directory (defaults to current directory)
    #[arg(long, short = 'w', global = true, env = "KD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build container images for applications
    #[command(visible_alias = "bld")]
    Build(BuildArgs),

    /// Configure and deploy applications to a target
    #[command(visible_alias = "dep")]
    Deploy(DeployArgs),

    /// Invoke kubectl with the context and namespace of a target
    #[command(visible_alias = "ctl")]
    Kubectl(KubectlArgs),

    /// List configured targets or applications
    List(ListArgs),

    /// Generate initial configuration files
    Init(InitArgs),

    /// Upgrade configuration and manifests to the latest version
    Upgrade,

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

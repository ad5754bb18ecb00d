//! kd - build and deploy apps to Kubernetes clusters
//!
//! Builds container images for the applications described in `kdeploy.conf`,
//! pushes them to a registry and deploys them to configured targets with
//! manifests composed from a shared base and a per-target overlay.

use clap::Parser;
use miette::Diagnostic;

mod cli;
mod commands;
mod config;
mod error;
mod git;
mod manifest;
mod operations;
mod tools;
mod ui;

use cli::{Cli, Commands};
use ui::{Level, Logger};

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::Debug } else { Level::Info };
    let log = Logger::new("kd", level);

    let result = match cli.command {
        Commands::Build(args) => commands::build::run(cli.workspace, args, &log),
        Commands::Deploy(args) => commands::deploy::run(cli.workspace, args, &log),
        Commands::Kubectl(args) => match commands::kubectl::run(cli.workspace, args, &log) {
            Ok(0) => Ok(()),
            Ok(code) => std::process::exit(code),
            Err(e) => Err(e),
        },
        Commands::List(args) => commands::list::run(cli.workspace, args),
        Commands::Init(args) => commands::init::run(cli.workspace, args, &log),
        Commands::Upgrade => commands::upgrade::run(cli.workspace, &log),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        log.error(&e);
        if let Some(help) = e.help() {
            log.note(help);
        }
        std::process::exit(e.exit_code());
    }
}

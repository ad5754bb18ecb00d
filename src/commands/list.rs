//! List command implementation
//!
//! Prints configured apps or targets, as a table or as bare names.

use std::path::PathBuf;

use super::helpers::load_workspace;
use crate::cli::{ListArgs, ListKind, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::ui::table;

/// Run list command
pub fn run(workspace: Option<PathBuf>, args: ListArgs) -> Result<()> {
    let (_, config) = load_workspace(workspace)?;
    print!("{}", render(&config, args.kind, args.output));
    Ok(())
}

fn render(config: &Config, kind: ListKind, output: OutputFormat) -> String {
    match (kind, output) {
        (ListKind::Apps, OutputFormat::Name) => names(&config.app_names()),
        (ListKind::Targets, OutputFormat::Name) => names(&config.target_names()),
        (ListKind::Apps, OutputFormat::Table) => {
            let rows: Vec<Vec<String>> = config
                .apps
                .iter()
                .map(|app| vec![app.name.clone(), app.path.clone(), app.root.clone()])
                .collect();
            table::render(&["NAME", "PATH", "ROOT"], &rows)
        }
        (ListKind::Targets, OutputFormat::Table) => {
            let rows: Vec<Vec<String>> = config
                .targets
                .iter()
                .map(|target| {
                    vec![
                        target.name.clone(),
                        target.alias.join(", "),
                        target.context.clone(),
                        target.namespace.clone(),
                    ]
                })
                .collect();
            table::render(&["NAME", "ALIASES", "CONTEXT", "NAMESPACE"], &rows)
        }
    }
}

fn names(names: &[&str]) -> String {
    names.iter().map(|name| format!("{name}\n")).collect()
}

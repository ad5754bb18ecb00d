//! Build command implementation

use std::path::PathBuf;

use super::helpers::load_workspace;
use crate::cli::BuildArgs;
use crate::error::Result;
use crate::operations::{BuildOperation, BuildOptions, SystemTools};
use crate::ui::Logger;

/// Run build command
pub fn run(workspace: Option<PathBuf>, args: BuildArgs, log: &Logger) -> Result<()> {
    let (root, config) = load_workspace(workspace)?;
    let tag = args.tag.as_deref().unwrap_or_default();
    let apps = if args.all {
        config.resolve_all_apps(tag)
    } else {
        config.resolve_apps(args.apps.as_slice(), tag)?
    };

    let system = SystemTools::new(&root);
    let tools = system.toolbox();
    let options = BuildOptions::from(&args);
    BuildOperation::new(&root, &tools, log).execute(&apps, &options)?;
    Ok(())
}

//! Deploy command implementation

use std::path::PathBuf;

use super::helpers::load_workspace;
use crate::cli::DeployArgs;
use crate::error::Result;
use crate::operations::{DeployOperation, DeployOptions, SystemTools};
use crate::ui::Logger;

/// Run deploy command
pub fn run(workspace: Option<PathBuf>, args: DeployArgs, log: &Logger) -> Result<()> {
    let (root, config) = load_workspace(workspace)?;
    let target = config.resolve_target(&args.target)?;
    let tag = args.tag.as_deref().unwrap_or_default();
    let apps = if args.all {
        config.resolve_all_apps(tag)
    } else {
        config.resolve_apps(args.apps.as_slice(), tag)?
    };

    let system = SystemTools::new(&root);
    let tools = system.toolbox();
    let options = DeployOptions::from(&args);
    let mut stdout = std::io::stdout().lock();
    DeployOperation::new(&root, &tools, log).execute(&apps, &target, &options, &mut stdout)
}

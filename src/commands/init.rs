//! Init command implementation

use std::path::PathBuf;

use super::helpers::resolve_workspace_path;
use crate::cli::InitArgs;
use crate::error::Result;
use crate::operations::{InitOperation, InitOptions};
use crate::ui::Logger;

/// Run init command
pub fn run(workspace: Option<PathBuf>, args: InitArgs, log: &Logger) -> Result<()> {
    let root = resolve_workspace_path(workspace)?;
    InitOperation::new(&root, log).execute(&InitOptions::from(&args))
}

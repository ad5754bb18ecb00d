//! Upgrade command implementation

use std::path::PathBuf;

use super::helpers::resolve_workspace_path;
use crate::error::Result;
use crate::operations::UpgradeOperation;
use crate::ui::Logger;

/// Run upgrade command
pub fn run(workspace: Option<PathBuf>, log: &Logger) -> Result<()> {
    let root = resolve_workspace_path(workspace)?;
    UpgradeOperation::new(&root, log).execute()
}

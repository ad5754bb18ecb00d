//! Kubectl pass-through command

use std::path::PathBuf;

use super::helpers::load_workspace;
use crate::cli::KubectlArgs;
use crate::error::Result;
use crate::tools::Kubectl;
use crate::ui::Logger;

/// Run kubectl for a target and return its exit code
pub fn run(workspace: Option<PathBuf>, args: KubectlArgs, log: &Logger) -> Result<i32> {
    let (_, config) = load_workspace(workspace)?;
    let target = config.resolve_target(&args.target)?;
    Kubectl.run_for_target(&target, args.args.as_slice(), log)
}

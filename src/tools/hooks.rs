//! Pre-build and post-build commands

use std::path::Path;

use super::HookRunner;
use super::exec::Invocation;
use crate::error::{self, HookStage, KdError, Result};
use crate::ui::Logger;

/// Runs hooks with `sh -c`, attached to the terminal
#[derive(Debug, Default)]
pub struct ShellHooks;

impl HookRunner for ShellHooks {
    fn run_hook(&self, stage: HookStage, command: &str, dir: &Path, log: &Logger) -> Result<()> {
        hook_invocation(command, dir).run(log).map_err(|e| {
            let reason = match e {
                KdError::ToolFailed { message, .. } => message,
                other => other.to_string(),
            };
            error::tool::hook_failed(stage, command, reason)
        })
    }
}

pub fn hook_invocation(command: &str, dir: &Path) -> Invocation {
    Invocation::new("sh").args(["-c", command]).current_dir(dir)
}

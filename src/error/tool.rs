//! External tool and hook errors

use super::{HookStage, KdError};

/// Creates a tool failure from an exit status and captured stderr
pub fn failed(tool: impl Into<String>, status: Option<i32>, message: impl Into<String>) -> KdError {
    KdError::ToolFailed {
        tool: tool.into(),
        status,
        message: message.into(),
    }
}

/// Creates an error for a tool that could not be started at all
pub fn spawn_failed(tool: impl Into<String>, err: &std::io::Error) -> KdError {
    let tool = tool.into();
    let message = if err.kind() == std::io::ErrorKind::NotFound {
        format!("'{tool}' not found in PATH")
    } else {
        err.to_string()
    };
    KdError::ToolFailed {
        tool,
        status: None,
        message,
    }
}

/// Creates a build hook failure
pub fn hook_failed(
    stage: HookStage,
    command: impl Into<String>,
    reason: impl Into<String>,
) -> KdError {
    KdError::HookFailed {
        stage,
        command: command.into(),
        reason: reason.into(),
    }
}

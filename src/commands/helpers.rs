//! Command helper utilities

use std::path::PathBuf;

use crate::config::Config;
use crate::error::{KdError, Result};

/// Resolve workspace path from optional argument
///
/// If a workspace path is provided, use it. Otherwise,
/// resolve to the current directory.
pub fn resolve_workspace_path(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => Ok(path),
        None => std::env::current_dir().map_err(|e| KdError::IoError {
            message: format!("Failed to get current directory: {}", e),
        }),
    }
}

/// Resolve the workspace and load its configuration
pub fn load_workspace(workspace: Option<PathBuf>) -> Result<(PathBuf, Config)> {
    let root = resolve_workspace_path(workspace)?;
    let config = Config::load(&root)?;
    Ok((root, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_workspace_is_kept() {
        let path = PathBuf::from("/tmp/some-workspace");
        assert_eq!(resolve_workspace_path(Some(path.clone())).unwrap(), path);
    }

    #[test]
    fn test_load_workspace_without_config() {
        let temp = TempDir::new().unwrap();
        let err = load_workspace(Some(temp.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, KdError::ConfigNotFound { .. }));
    }
}

//! Manifest composition errors

use std::path::Path;

use super::KdError;

/// Creates a directory not found error
pub fn directory_not_found(path: &Path) -> KdError {
    KdError::DirectoryNotFound {
        path: path.display().to_string(),
    }
}

/// Creates a composition failed error for the given kustomization directory
pub fn failed(path: &Path, reason: impl Into<String>) -> KdError {
    KdError::CompositionFailed {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

/// Creates a serialization failed error
pub fn serialization_failed(reason: impl Into<String>) -> KdError {
    KdError::SerializationFailed {
        reason: reason.into(),
    }
}

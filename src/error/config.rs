//! Configuration errors

use super::KdError;

/// Creates a config not found error
pub fn not_found(path: impl Into<String>) -> KdError {
    KdError::ConfigNotFound { path: path.into() }
}

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> KdError {
    KdError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config error
pub fn invalid(message: impl Into<String>) -> KdError {
    KdError::ConfigInvalid {
        message: message.into(),
    }
}

/// Creates an upgrade failed error
pub fn upgrade_failed(message: impl Into<String>) -> KdError {
    KdError::UpgradeFailed {
        message: message.into(),
    }
}

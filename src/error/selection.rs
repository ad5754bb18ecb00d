//! Selector resolution errors

use super::KdError;

/// Creates a conflicting tag error
pub fn conflicting_tag(embedded: impl Into<String>, explicit: impl Into<String>) -> KdError {
    KdError::ConflictingTag {
        embedded: embedded.into(),
        explicit: explicit.into(),
    }
}

/// Creates an unknown app error
pub fn unknown_app(name: impl Into<String>) -> KdError {
    KdError::UnknownApp { name: name.into() }
}

/// Creates an unknown target error
pub fn unknown_target(name: impl Into<String>) -> KdError {
    KdError::UnknownTarget { name: name.into() }
}

//! Error types and handling for kd
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`config`]: Loading and validating `kdeploy.conf`
//! - [`selection`]: Resolving app and target selectors
//! - [`compose`]: Manifest overlay composition
//! - [`tool`]: External tools and build hooks

pub mod compose;
pub mod config;
pub mod selection;
pub mod tool;


use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Build hook stage, used to tell the operator which user command failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    PreBuild,
    PostBuild,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::PreBuild => f.write_str("Pre-build"),
            HookStage::PostBuild => f.write_str("Post-build"),
        }
    }
}

/// Coarse error taxonomy, for callers that only need to know where a
/// command went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Selection,
    Composition,
    ExternalTool,
    Io,
}

/// Main error type for kd operations
#[derive(Error, Diagnostic, Debug)]
pub enum KdError {
    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(kd::config::not_found),
        help("Run 'kd init' to create an initial configuration")
    )]
    ConfigNotFound { path: String },

    #[error("Config error in {path}: {reason}")]
    #[diagnostic(code(kd::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(kd::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Unsupported configuration version {version}, please get the latest version of kd")]
    #[diagnostic(
        code(kd::config::unsupported_version),
        help("This version of kd supports configuration versions up to {latest}")
    )]
    UnsupportedVersion { version: u32, latest: u32 },

    #[error("Configuration version {version} is obsolete and must be upgraded")]
    #[diagnostic(
        code(kd::config::requires_upgrade),
        help("Run 'kd upgrade' to migrate the configuration and manifests")
    )]
    RequiresUpgrade { version: u32 },

    // Selection errors
    #[error("Conflicting tags '{embedded}' and '{explicit}', specify the tag only once")]
    #[diagnostic(code(kd::selection::conflicting_tag))]
    ConflictingTag { embedded: String, explicit: String },

    #[error("Selecting default requires exactly 1 application ({count} configured)")]
    #[diagnostic(
        code(kd::selection::ambiguous_default),
        help("Name the application explicitly or mark one app with 'default: true'")
    )]
    AmbiguousDefault { count: usize },

    #[error("No applications configured")]
    #[diagnostic(
        code(kd::selection::no_apps),
        help("Add at least one entry to 'apps' in kdeploy.conf")
    )]
    NoAppsConfigured,

    #[error("Unknown application '{name}'")]
    #[diagnostic(
        code(kd::selection::unknown_app),
        help("Run 'kd list apps' to see configured applications")
    )]
    UnknownApp { name: String },

    #[error("Unknown target '{name}'")]
    #[diagnostic(
        code(kd::selection::unknown_target),
        help("Run 'kd list targets' to see configured targets")
    )]
    UnknownTarget { name: String },

    // Composition errors
    #[error("Manifest directory not found: {path}")]
    #[diagnostic(code(kd::compose::directory_not_found))]
    DirectoryNotFound { path: String },

    #[error("Failed to compose manifests in {path}: {reason}")]
    #[diagnostic(code(kd::compose::failed))]
    CompositionFailed { path: String, reason: String },

    #[error("Duplicate resource {kind} '{name}' (group '{group}')")]
    #[diagnostic(
        code(kd::compose::duplicate_resource),
        help("Each resource may be defined only once across base and overlay")
    )]
    DuplicateResource {
        group: String,
        kind: String,
        name: String,
    },

    #[error("Failed to serialize manifests: {reason}")]
    #[diagnostic(code(kd::compose::serialization_failed))]
    SerializationFailed { reason: String },

    // External tool errors
    #[error("{tool} failed: {message}")]
    #[diagnostic(code(kd::tool::failed))]
    ToolFailed {
        tool: String,
        status: Option<i32>,
        message: String,
    },

    #[error("{stage} command failed: {reason}")]
    #[diagnostic(
        code(kd::tool::hook_failed),
        help("Check the preBuild/postBuild command of this app in kdeploy.conf")
    )]
    HookFailed {
        stage: HookStage,
        command: String,
        reason: String,
    },

    #[error("Upgrade failed: {message}")]
    #[diagnostic(code(kd::config::upgrade_failed))]
    UpgradeFailed { message: String },

    // File system errors
    #[error("IO error: {message}")]
    #[diagnostic(code(kd::fs::io_error))]
    IoError { message: String },
}

impl KdError {
    /// Which part of the pipeline produced this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            KdError::ConfigNotFound { .. }
            | KdError::ConfigParseFailed { .. }
            | KdError::ConfigInvalid { .. }
            | KdError::UnsupportedVersion { .. }
            | KdError::RequiresUpgrade { .. }
            | KdError::UpgradeFailed { .. } => ErrorCategory::Config,
            KdError::ConflictingTag { .. }
            | KdError::AmbiguousDefault { .. }
            | KdError::NoAppsConfigured
            | KdError::UnknownApp { .. }
            | KdError::UnknownTarget { .. } => ErrorCategory::Selection,
            KdError::DirectoryNotFound { .. }
            | KdError::CompositionFailed { .. }
            | KdError::DuplicateResource { .. }
            | KdError::SerializationFailed { .. } => ErrorCategory::Composition,
            KdError::ToolFailed { .. } | KdError::HookFailed { .. } => ErrorCategory::ExternalTool,
            KdError::IoError { .. } => ErrorCategory::Io,
        }
    }

    /// Process exit status for this error.
    ///
    /// An external tool's own exit status is passed through verbatim.
    pub fn exit_code(&self) -> i32 {
        match self {
            KdError::ToolFailed {
                status: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for KdError {
    fn from(err: std::io::Error) -> Self {
        KdError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for KdError {
    fn from(err: serde_yaml::Error) -> Self {
        KdError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for KdError {
    fn from(err: serde_json::Error) -> Self {
        KdError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for KdError {
    fn from(err: git2::Error) -> Self {
        KdError::ToolFailed {
            tool: "git".to_string(),
            status: None,
            message: err.message().to_string(),
        }
    }
}

impl From<inquire::InquireError> for KdError {
    fn from(err: inquire::InquireError) -> Self {
        KdError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, KdError>;

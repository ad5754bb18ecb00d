//! Configuration handling for kd
//!
//! This module contains:
//! - `types` - Data structures of `kdeploy.conf`
//! - `loader` - Reading, defaulting and validating the file
//! - `resolve` - Resolving app and target selectors

pub mod loader;
pub mod resolve;
pub mod types;


// Re-export commonly used types
pub use types::{
    App, CONFIG_NAME, Config, DEFAULT_TAG, LATEST_VERSION, LEGACY_VERSION, ResolvedApp,
    ResolvedTarget, Target,
};

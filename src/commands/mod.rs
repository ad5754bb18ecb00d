//! Command implementations for the kd CLI

pub mod build;
pub mod completions;
pub mod deploy;
pub mod helpers;
pub mod init;
pub mod kubectl;
pub mod list;
pub mod upgrade;
pub mod version;

//! Terminal presentation layer
//!
//! This module handles:
//! - Prefixed status logging with explicit verbosity (`logger`)
//! - Spinners for long-running quiet steps using indicatif (`progress`)
//! - Table rendering for `kd list` (`table`)

pub mod logger;
pub mod progress;
pub mod table;

pub use logger::{Level, Logger};
pub use progress::Spinner;

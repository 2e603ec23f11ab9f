//! # dllwatch - Copy changed files, retry locked ones
//!
//! Polls a list of `source > destination` file pairs, copies a source over
//! its destination whenever the source's modification time moves past the
//! previous cycle, and keeps retrying copies that failed (typically because
//! a running program holds the destination open) until they succeed.

// Module declarations
pub mod commands;
pub mod config;
pub mod diff;
pub mod executor;
pub mod pending;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use types::{CopyFailure, PathPair, WatchError};
pub use config::Config;
pub use commands::watch::{CycleReport, WatchLoop};
pub use executor::{Copier, FsCopier};
pub use pending::PendingSet;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Core type definitions for dllwatch

mod error;
mod pair;

pub use error::{CopyFailure, WatchError};
pub use pair::PathPair;

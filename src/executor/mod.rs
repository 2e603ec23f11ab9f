//! Executor module for file operations

pub mod copy;

pub use copy::{attempt_copy, Copier, FsCopier};

//! File copy primitive

use crate::types::{CopyFailure, PathPair};
use std::fs;
use std::io;
use std::path::Path;

/// Overwrites a destination file with a source file's contents.
///
/// The watch loop only talks to this trait, so a platform copy can be
/// swapped for one that simulates locked files.
pub trait Copier {
    /// Copy `src` over `dest`, returning the number of bytes written
    fn copy(&self, src: &Path, dest: &Path) -> io::Result<u64>;
}

/// Platform copy backed by [`std::fs::copy`].
///
/// Atomicity is whatever the platform call provides; no temporary file is
/// written, so a locked destination is reported instead of worked around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsCopier {
    create_dirs: bool,
}

impl FsCopier {
    pub fn new(create_dirs: bool) -> Self {
        Self { create_dirs }
    }
}

impl Default for FsCopier {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Copier for FsCopier {
    fn copy(&self, src: &Path, dest: &Path) -> io::Result<u64> {
        if self.create_dirs {
            if let Some(parent) = dest.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }

        // fs::copy truncates the destination before reading the source.
        if same_file(src, dest) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "source and destination are the same file",
            ));
        }

        fs::copy(src, dest)
    }
}

/// True when both paths name one existing file (hard links included on unix).
#[cfg(unix)]
fn same_file(src: &Path, dest: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(src), fs::metadata(dest)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(src: &Path, dest: &Path) -> bool {
    match (fs::canonicalize(src), fs::canonicalize(dest)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Attempt one copy for a pair whose source was just seen on disk.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(CopyFailure)` - The platform's reason for refusing the copy
pub fn attempt_copy<C: Copier + ?Sized>(copier: &C, pair: &PathPair) -> Result<u64, CopyFailure> {
    copier
        .copy(&pair.source, &pair.destination)
        .map_err(CopyFailure::from)
}

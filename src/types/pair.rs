//! PathPair - One source/destination association from the pair list

use std::path::PathBuf;

/// A source file and the destination it is mirrored to.
///
/// `index` is the pair's position among the surviving (non-blank,
/// non-comment) lines of the pair list and is the identity used by
/// [`crate::pending::PendingSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPair {
    /// Dense position in the loaded pair list (0..N-1)
    pub index: usize,

    /// File that is watched for changes
    pub source: PathBuf,

    /// File that is overwritten with the source's contents
    pub destination: PathBuf,
}

impl PathPair {
    /// Create a new PathPair
    pub fn new(index: usize, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            index,
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Short name of the source file, used for copied notices.
    ///
    /// Both `/` and `\` count as separators so Windows-style entries render
    /// the same on every platform.
    pub fn file_name(&self) -> String {
        let full = self.source.to_string_lossy();
        full.rsplit(|c: char| c == '/' || c == '\\')
            .find(|part| !part.is_empty())
            .unwrap_or(&*full)
            .to_string()
    }
}

//! Timestamp-based change detection

use filetime::FileTime;
use std::fs;
use std::path::Path;
use tracing::debug;

/// What the watch loop can see of a source path right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Regular file with its last modification time
    Present(FileTime),

    /// Nothing usable at the path. Not an error, the pair is skipped.
    Missing,
}

/// Look up a source file's modification time.
///
/// Anything that is not a readable regular file counts as missing.
pub fn source_state(path: &Path) -> SourceState {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => {
            SourceState::Present(FileTime::from_last_modification_time(&metadata))
        }
        Ok(_) => {
            debug!(path = %path.display(), "source is not a regular file");
            SourceState::Missing
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "source unavailable");
            SourceState::Missing
        }
    }
}

/// Decide whether a copy attempt is warranted.
///
/// Always true on the first iteration. Otherwise the source must have been
/// modified strictly after `baseline`, the instant the previous cycle began.
/// A write landing exactly on the baseline is picked up by the next change
/// at the latest.
pub fn should_copy(first_iteration: bool, modified: FileTime, baseline: FileTime) -> bool {
    first_iteration || modified > baseline
}

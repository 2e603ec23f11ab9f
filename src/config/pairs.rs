//! Pair list loading
//!
//! The pair list is a plain text file with one `source > destination` entry
//! per line. Blank lines and lines starting with `_` are ignored.

use crate::types::{PathPair, WatchError};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing::debug;

/// Splits a line into source (left) and destination (right).
pub const SEPARATOR: char = '>';

/// Lines starting with this character are comments.
pub const COMMENT_PREFIX: char = '_';

/// Parse raw pair list lines into an ordered list of path pairs.
///
/// Indices are assigned densely over the surviving lines, so a pair's
/// identity does not depend on how many blank or comment lines precede it.
/// The first `>` on a line is the separator; whitespace around each side is
/// trimmed.
///
/// # Errors
/// * [`WatchError::MissingSeparator`] - a non-blank, non-comment line has no `>`
/// * [`WatchError::EmptyPath`] - one side of the separator is empty
/// * [`WatchError::SamePath`] - source and destination are the same path
pub fn parse_pairs<I, S>(lines: I) -> Result<Vec<PathPair>, WatchError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut pairs = Vec::new();

    for (offset, raw) in lines.into_iter().enumerate() {
        let line = raw.as_ref().trim_start_matches('\u{feff}');
        let line_number = offset + 1;

        if line.trim().is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }

        let (source, destination) = line.split_once(SEPARATOR).ok_or_else(|| {
            WatchError::MissingSeparator {
                line_number,
                line: line.to_string(),
            }
        })?;

        let (source, destination) = (source.trim(), destination.trim());
        if source.is_empty() || destination.is_empty() {
            return Err(WatchError::EmptyPath {
                line_number,
                line: line.to_string(),
            });
        }

        if Path::new(source) == Path::new(destination) {
            return Err(WatchError::SamePath {
                line_number,
                line: line.to_string(),
            });
        }

        pairs.push(PathPair::new(pairs.len(), source, destination));
    }

    Ok(pairs)
}

/// Read the pair list at `path`, creating an empty file first if it is missing.
///
/// Bytes that are not valid UTF-8 (e.g. a file saved in a legacy code page)
/// are replaced rather than rejected.
pub fn load_pairs(path: &Path) -> Result<Vec<PathPair>, WatchError> {
    OpenOptions::new().create(true).append(true).open(path)?;

    let bytes = fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    let pairs = parse_pairs(content.lines())?;
    debug!(path = %path.display(), pairs = pairs.len(), "loaded pair list");

    Ok(pairs)
}

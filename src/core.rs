use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by path translation, the sync tool and the local filesystem.
#[derive(Debug, Error)]
pub enum Error {
    /// The path claims a root it does not descend from, or escapes the project root.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// `copy` exited non-zero or wrote to stderr.
    #[error("transfer failed: `{command}` exited with {code:?}: {stderr}")]
    TransferFailure {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// `list` failed for a reason other than "not found".
    #[error("listing failed: `{command}` exited with {code:?}: {stderr}")]
    ListingFailure {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The sync tool binary could not be started at all.
    #[error("unable to run {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Filesystem(#[from] std::io::Error),

    #[error("invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    pub(crate) fn invalid_path<P: Into<PathBuf>>(path: P, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub mod utils {
    use std::path::{Component, Path, PathBuf};

    use regex::Regex;

    use super::Result;

    /// Lexically resolves `.` and `..` and drops trailing separators.
    /// Leading `..` of a relative path are kept, so callers can tell that it escapes its base.
    pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
        let mut result = PathBuf::new();
        for component in path.as_ref().components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => match result.components().next_back() {
                    Some(Component::Normal(_)) => {
                        result.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => result.push(".."),
                },
                other => result.push(other),
            }
        }
        result
    }

    /// True if a normalized relative path climbs above its base.
    pub fn escapes_base<P: AsRef<Path>>(path: P) -> bool {
        matches!(path.as_ref().components().next(), Some(Component::ParentDir))
    }

    /// True if the first component is written like an rclone remote (`name:`).
    pub fn looks_remote<P: AsRef<Path>>(path: P) -> bool {
        match path.as_ref().components().next() {
            Some(Component::Normal(first)) => first.to_string_lossy().ends_with(':'),
            _ => false,
        }
    }

    /// `base / rel`, without the trailing separator `join("")` would leave.
    pub fn join_rel(base: &Path, rel: &Path) -> PathBuf {
        if rel.as_os_str().is_empty() {
            base.to_path_buf()
        } else {
            base.join(rel)
        }
    }

    /// All dot-separated extensions of a file name, outermost last.
    /// Leading dots (hidden files) and a trailing dot do not start a suffix.
    pub fn suffixes(name: &str) -> Vec<&str> {
        if name.ends_with('.') {
            return Vec::new();
        }
        let trimmed = name.trim_start_matches('.');
        trimmed.split('.').skip(1).collect()
    }

    /// Compiles `pattern` so that it must match a whole name.
    pub fn full_match(pattern: &str) -> Result<Regex> {
        Ok(Regex::new(&format!("^(?:{pattern})$"))?)
    }

    /// Listing entry without the directory marker.
    pub fn strip_dir_marker(entry: &str) -> &str {
        entry.trim_end_matches('/')
    }
}

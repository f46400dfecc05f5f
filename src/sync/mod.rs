//! The seam to the external cloud-sync utility.
//!
//! Only three invocation shapes are needed: `list`, `list --dirs-only` and `copy`.
//! Every invocation returns a [`ToolOutput`] carrying the exit code, stdout and stderr,
//! and the caller (see [`crate::Context`]) decides what an empty or failed result means.

mod rclone;

#[cfg(test)]
pub(crate) mod fake;

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

pub use rclone::Rclone;

/// rclone exit code for "directory not found".
pub const EXIT_DIR_NOT_FOUND: i32 = 3;
/// rclone exit code for "file not found".
pub const EXIT_FILE_NOT_FOUND: i32 = 4;

pub trait SyncTool {
    /// Lists the immediate entries of `path`, one per line, directories marked with a trailing `/`.
    fn list(&self, path: &Path, dirs_only: bool) -> Result<ToolOutput>;

    /// Copies `source` into the directory `dest`.
    fn copy(&self, source: &Path, dest: &Path) -> Result<ToolOutput>;
}

impl<T: SyncTool + ?Sized> SyncTool for Arc<T> {
    fn list(&self, path: &Path, dirs_only: bool) -> Result<ToolOutput> {
        (**self).list(path, dirs_only)
    }

    fn copy(&self, source: &Path, dest: &Path) -> Result<ToolOutput> {
        (**self).copy(source, dest)
    }
}

/// What came back from one finished invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub command: String,
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// The listed path does not exist on the remote.
    pub fn is_not_found(&self) -> bool {
        matches!(self.code, Some(EXIT_DIR_NOT_FOUND) | Some(EXIT_FILE_NOT_FOUND))
    }

    /// A transfer counts as clean only with a zero exit code and a silent stderr.
    pub fn is_clean_transfer(&self) -> bool {
        self.success() && self.stderr.trim().is_empty()
    }

    /// Non-empty stdout lines. Only the line terminator is removed: spaces belong to the name.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.stdout
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty())
    }

    pub fn to_listing_error(&self) -> Error {
        Error::ListingFailure {
            command: self.command.clone(),
            code: self.code,
            stderr: self.stderr.trim().to_string(),
        }
    }

    pub fn to_transfer_error(&self) -> Error {
        Error::TransferFailure {
            command: self.command.clone(),
            code: self.code,
            stderr: self.stderr.trim().to_string(),
        }
    }
}

/// How tool failures are reported.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Failed listings and transfers are returned as errors.
    #[default]
    Strict,
    /// Failures are logged and absorbed: listings come back empty, transfers return their output.
    Lenient,
}

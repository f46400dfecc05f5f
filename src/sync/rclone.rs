use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::{SyncTool, ToolOutput};
use crate::core::{Error, Result};

/// [`SyncTool`] backed by the `rclone` command line utility.
///
/// `list` maps to `rclone lsf [--dirs-only] <path>` and `copy` to `rclone copy <source> <dest>`.
/// Calls block until the process exits; there is no timeout.
#[derive(Debug, Clone)]
pub struct Rclone {
    program: PathBuf,
    flags: Vec<String>,
}

impl Rclone {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            flags: Vec::new(),
        }
    }

    /// Extra flags placed right after the subcommand of every invocation (e.g. `--config`).
    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags = flags.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, subcommand: &str, args: &[&OsStr]) -> Result<ToolOutput> {
        let mut command = Command::new(&self.program);
        command.arg(subcommand).args(&self.flags).args(args);

        let line = self.render(subcommand, args);
        debug!(command = %line, "running sync tool");

        let output = command.output().map_err(|source| Error::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let result = ToolOutput {
            command: line,
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(command = %result.command, code = ?result.code, "sync tool finished");
        Ok(result)
    }

    fn render(&self, subcommand: &str, args: &[&OsStr]) -> String {
        let mut parts = vec![self.program.display().to_string(), subcommand.to_string()];
        parts.extend(self.flags.iter().cloned());
        parts.extend(args.iter().map(|arg| arg.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

impl Default for Rclone {
    fn default() -> Self {
        Self::new("rclone")
    }
}

impl SyncTool for Rclone {
    fn list(&self, path: &Path, dirs_only: bool) -> Result<ToolOutput> {
        if dirs_only {
            self.run("lsf", &[OsStr::new("--dirs-only"), path.as_os_str()])
        } else {
            self.run("lsf", &[path.as_os_str()])
        }
    }

    fn copy(&self, source: &Path, dest: &Path) -> Result<ToolOutput> {
        self.run("copy", &[source.as_os_str(), dest.as_os_str()])
    }
}

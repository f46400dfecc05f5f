use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::{Config, Roots};
use crate::core::Result;
use crate::sync::{FailurePolicy, SyncTool, ToolOutput};

/// Everything a [`crate::DualPath`] needs besides its own relative path:
/// the pair of roots, the sync tool and the failure policy.
///
/// Shared behind an `Arc`; nothing in it changes after construction, so several
/// contexts (projects, environments, test fixtures) can coexist in one process.
pub struct Context {
    roots: Roots,
    tool: Box<dyn SyncTool + Send + Sync>,
    policy: FailurePolicy,
}

impl Context {
    pub fn new<T>(roots: Roots, tool: T) -> Self
    where
        T: SyncTool + Send + Sync + 'static,
    {
        Self {
            roots,
            tool: Box::new(tool),
            policy: FailurePolicy::default(),
        }
    }

    /// Context talking to rclone as described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.roots(), config.tool.build()).with_policy(config.policy)
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Raw listing entries of a cloud path, directory markers included.
    ///
    /// "Not found" is an empty listing. Any other failure is a `ListingFailure`,
    /// or an empty listing under the lenient policy.
    pub(crate) fn list(&self, cloud: &Path, dirs_only: bool) -> Result<Vec<String>> {
        let out = self.tool.list(cloud, dirs_only)?;
        if out.success() {
            return Ok(out.entries().map(str::to_string).collect());
        }
        if out.is_not_found() {
            debug!(path = %cloud.display(), "nothing listed on remote");
            return Ok(Vec::new());
        }
        match self.policy {
            FailurePolicy::Strict => Err(out.to_listing_error()),
            FailurePolicy::Lenient => {
                warn!(command = %out.command, code = ?out.code, stderr = %out.stderr.trim(), "listing failed, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    pub(crate) fn copy(&self, source: &Path, dest: &Path) -> Result<ToolOutput> {
        let out = self.tool.copy(source, dest)?;
        if out.is_clean_transfer() {
            debug!(source = %source.display(), dest = %dest.display(), "copied");
            return Ok(out);
        }
        match self.policy {
            FailurePolicy::Strict => Err(out.to_transfer_error()),
            FailurePolicy::Lenient => {
                warn!(command = %out.command, code = ?out.code, stderr = %out.stderr.trim(), "transfer reported a failure");
                Ok(out)
            }
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("roots", &self.roots)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

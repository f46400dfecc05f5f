//! Paths that live in two places at once: on a local disk and on an rclone remote.
//!
//! ### Overview
//!
//! `dualpath-kit` names one logical resource by its path relative to a project root and
//! translates it to and from a local path (`local_root / relative`) and a cloud path
//! (`cloud_root / relative`). On top of that translation it classifies resources, lists them,
//! moves them with the external sync tool and builds empty local skeletons of the remote tree.
//!
//! **Key ideas**:
//! - **Explicit roots**: the two roots live in a [`Context`], not in globals, so several
//!   projects or test fixtures can coexist.
//! - **Pure translation**: constructing a [`DualPath`] never touches the disk or the network.
//! - **Honest shell-out**: every sync tool call yields exit code, stdout and stderr, and a
//!   failed listing is never confused with an empty one (unless you ask for the lenient policy).
//! - **Housekeeping**: [`remove_empty_dirs`] prunes what transfers leave behind.

mod config;
mod core;
mod fs;
mod sync;
mod vfs;

pub use config::{Config, Roots, ToolConfig};
pub use crate::core::{Error, Result, utils};
pub use crate::fs::remove_empty_dirs;
pub use sync::{
    EXIT_DIR_NOT_FOUND, EXIT_FILE_NOT_FOUND, FailurePolicy, Rclone, SyncTool, ToolOutput,
};
pub use vfs::{Classification, Context, DualPath, Kind, ProjectMap, RESERVED_NAMES, is_reserved};

//! A resource that exists (or may exist) in two places at once.
//!
//! ### Key ideas:
//! - **One identity**: a resource is its path relative to the project root. The local path is
//!   `local_root / relative`, the cloud path is `cloud_root / relative`. Both are derived, never
//!   set independently.
//! - **Any form in**: construct from a local path, a cloud path or a bare relative path; the
//!   other two forms are derived by pure prefix substitution, without touching the disk.
//! - **Blocking shell-out**: everything that looks at the remote runs the sync tool and waits
//!   for it to exit.

use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::{Classification, Context, Kind};
use crate::core::{Error, Result, utils};
use crate::sync::ToolOutput;

/// A path addressable both on the local filesystem and on the remote.
///
/// Two `DualPath`s are equal iff their relative paths are equal.
///
/// ### Example:
/// ```no_run
/// use std::sync::Arc;
/// use dualpath_kit::{Context, DualPath, Rclone, Roots};
///
/// let roots = Roots::new("/home/lab/proj", "remote:/proj");
/// let ctx = Arc::new(Context::new(roots, Rclone::default()));
///
/// let clip = DualPath::new(&ctx, "remote:/proj/videos/clip.mp4").unwrap();
/// assert_eq!(clip.local(), std::path::Path::new("/home/lab/proj/videos/clip.mp4"));
/// clip.download().unwrap();
/// ```
#[derive(Clone)]
pub struct DualPath {
    ctx: Arc<Context>,
    relative: PathBuf,
    local: PathBuf,
    cloud: PathBuf,
}

impl DualPath {
    /// Builds a `DualPath` from any of its three forms.
    ///
    /// A path under the local root is taken as local, else a path under the cloud root as
    /// cloud, else the input is the relative path itself. `.` and `..` are resolved lexically.
    /// Errors with `InvalidPath` for an absolute path (or a remote path) outside both roots
    /// and for a relative path that climbs above the project root.
    pub fn new<P: AsRef<Path>>(ctx: &Arc<Context>, path: P) -> Result<Self> {
        let path = path.as_ref();
        let normalized = utils::normalize(path);
        let roots = ctx.roots();

        let relative = if normalized.starts_with(roots.local()) {
            roots.local_to_rel(&normalized)?
        } else if normalized.starts_with(roots.cloud()) {
            roots.cloud_to_rel(&normalized)?
        } else if normalized.has_root() {
            return Err(Error::invalid_path(path, "absolute path outside both roots"));
        } else if utils::looks_remote(&normalized) {
            return Err(Error::invalid_path(path, "remote path outside the cloud root"));
        } else if utils::escapes_base(&normalized) {
            return Err(Error::invalid_path(path, "climbs above the project root"));
        } else {
            normalized
        };

        Ok(Self::from_relative(ctx, relative))
    }

    /// The project root itself.
    pub fn root(ctx: &Arc<Context>) -> Self {
        Self::from_relative(ctx, PathBuf::new())
    }

    fn from_relative(ctx: &Arc<Context>, relative: PathBuf) -> Self {
        let roots = ctx.roots();
        Self {
            local: roots.rel_to_local(&relative),
            cloud: roots.rel_to_cloud(&relative),
            relative,
            ctx: Arc::clone(ctx),
        }
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }

    pub fn relative(&self) -> &Path {
        &self.relative
    }

    pub fn local(&self) -> &Path {
        &self.local
    }

    pub fn cloud(&self) -> &Path {
        &self.cloud
    }

    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }

    /// Final component of the local path. For the project root this is the local root's name.
    pub fn name(&self) -> Option<&str> {
        self.local.file_name().and_then(|name| name.to_str())
    }

    /// Name without its final suffix; the whole name when there is no suffix (`odd.` stays `odd.`).
    pub fn stem(&self) -> Option<&str> {
        if self.suffix().is_none() {
            return self.name();
        }
        self.local.file_stem().and_then(|stem| stem.to_str())
    }

    /// Final extension, without the dot. A trailing dot is not a suffix.
    pub fn suffix(&self) -> Option<&str> {
        self.local
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
    }

    /// Every extension, outermost last: `a.tar.gz` gives `["tar", "gz"]`.
    pub fn suffixes(&self) -> Vec<&str> {
        self.name().map(utils::suffixes).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<DualPath> {
        if self.is_root() {
            return None;
        }
        let parent = self.relative.parent().unwrap_or(Path::new(""));
        Some(Self::from_relative(&self.ctx, parent.to_path_buf()))
    }

    /// Child resource. `segment` is relative to this one and may not leave the project root.
    pub fn join<P: AsRef<Path>>(&self, segment: P) -> Result<DualPath> {
        let segment = segment.as_ref();
        if segment.has_root() {
            return Err(Error::invalid_path(segment, "segment must be relative"));
        }
        Self::new(&self.ctx, self.relative.join(segment))
    }

    pub fn exists_local(&self) -> bool {
        self.local.exists()
    }

    /// One blocking `list` round trip: the resource exists iff something is listed.
    pub fn exists_cloud(&self) -> Result<bool> {
        Ok(!self.ctx.list(&self.cloud, false)?.is_empty())
    }

    /// Local file type when the local path exists, otherwise the suffix heuristic.
    /// Sockets, FIFOs and devices present locally are [`Kind::Other`]: neither file nor directory.
    ///
    /// Known limitation: a file without an extension that is not present locally is reported
    /// as a directory. Use [`DualPath::classify`] with [`Classification::Authoritative`] when
    /// that matters.
    pub fn kind(&self) -> Kind {
        match fs::metadata(&self.local) {
            Ok(meta) if meta.is_dir() => Kind::Directory,
            Ok(meta) if meta.is_file() => Kind::File,
            Ok(_) => Kind::Other,
            Err(_) => self.guess_kind(),
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind().is_file()
    }

    pub fn is_dir(&self) -> bool {
        self.kind().is_dir()
    }

    /// `None` only in authoritative mode, when the resource exists on neither side.
    pub fn classify(&self, mode: Classification) -> Result<Option<Kind>> {
        if mode == Classification::Heuristic || self.exists_local() {
            return Ok(Some(self.kind()));
        }
        self.probe_cloud_kind()
    }

    fn guess_kind(&self) -> Kind {
        let has_suffix = self
            .relative
            .extension()
            .is_some_and(|ext| !ext.is_empty());
        if has_suffix {
            Kind::File
        } else {
            Kind::Directory
        }
    }

    /// Reads the directory marker from the parent's listing.
    fn probe_cloud_kind(&self) -> Result<Option<Kind>> {
        if self.is_root() {
            return Ok(self.exists_cloud()?.then_some(Kind::Directory));
        }
        let (Some(parent), Some(name)) = (self.cloud.parent(), self.cloud.file_name()) else {
            return Ok(None);
        };
        let name = name.to_string_lossy();
        for entry in self.ctx.list(parent, false)? {
            if utils::strip_dir_marker(&entry) != name {
                continue;
            }
            let kind = if entry.ends_with('/') {
                Kind::Directory
            } else {
                Kind::File
            };
            return Ok(Some(kind));
        }
        Ok(None)
    }

    /// Copies the local resource to the remote.
    ///
    /// A directory is copied onto its own cloud path; a file is copied into its cloud parent,
    /// so it keeps its name.
    pub fn upload(&self) -> Result<ToolOutput> {
        let dest = if self.is_dir() {
            self.cloud.as_path()
        } else {
            self.cloud.parent().unwrap_or(self.cloud.as_path())
        };
        self.ctx.copy(&self.local, dest)
    }

    /// Copies the cloud resource down, creating the local destination directory first.
    pub fn download(&self) -> Result<ToolOutput> {
        let dest = if self.is_dir() {
            self.local.as_path()
        } else {
            self.local.parent().unwrap_or(self.local.as_path())
        };
        if !dest.exists() {
            fs::create_dir_all(dest)?;
            debug!(path = %dest.display(), "created local directory");
        }
        self.ctx.copy(&self.cloud, dest)
    }

    /// Immediate children of the local directory.
    /// `pattern` must match a child's whole name. Fails if the directory cannot be read.
    pub fn ls_local(&self, pattern: Option<&str>) -> Result<Vec<DualPath>> {
        let filter = pattern.map(utils::full_match).transpose()?;
        let mut children = Vec::new();
        for entry in fs::read_dir(&self.local)? {
            let name = entry?.file_name();
            if let Some(re) = &filter {
                if !re.is_match(&name.to_string_lossy()) {
                    continue;
                }
            }
            children.push(Self::from_relative(&self.ctx, self.relative.join(name)));
        }
        Ok(children)
    }

    /// Immediate children on the remote, optionally directories only and filtered by a
    /// whole-name `pattern`. A missing cloud directory lists as empty.
    pub fn ls_cloud(&self, dirs_only: bool, pattern: Option<&str>) -> Result<Vec<DualPath>> {
        let filter = pattern.map(utils::full_match).transpose()?;
        let mut children = Vec::new();
        for entry in self.ctx.list(&self.cloud, dirs_only)? {
            let name = utils::strip_dir_marker(&entry);
            if name.is_empty() {
                continue;
            }
            if let Some(re) = &filter {
                if !re.is_match(name) {
                    continue;
                }
            }
            children.push(Self::new(&self.ctx, self.cloud.join(name))?);
        }
        Ok(children)
    }

    /// Creates the local directory if it is missing and the resource is a directory.
    /// With `recursive`, does the same for every directory found under it on the remote,
    /// which builds an empty local skeleton of the cloud tree.
    ///
    /// Returns how many resources were materialised; `0` when the local path already existed.
    pub fn materialize_local(&self, recursive: bool) -> Result<usize> {
        if self.exists_local() || !self.is_dir() {
            return Ok(0);
        }
        fs::create_dir_all(&self.local)?;
        debug!(path = %self.local.display(), "materialised local directory");

        let mut created = 1;
        if recursive {
            for child in self.ls_cloud(true, None)? {
                created += child.materialize_local(true)?;
            }
        }
        Ok(created)
    }
}

impl PartialEq for DualPath {
    fn eq(&self, other: &Self) -> bool {
        self.relative == other.relative
    }
}

impl Eq for DualPath {}

impl Hash for DualPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.relative.hash(state);
    }
}

impl fmt::Debug for DualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DualPath")
            .field("relative", &self.relative)
            .field("local", &self.local)
            .field("cloud", &self.cloud)
            .finish()
    }
}

/// Shows the local path.
impl fmt::Display for DualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.local.display())
    }
}

impl AsRef<Path> for DualPath {
    fn as_ref(&self) -> &Path {
        &self.local
    }
}

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::core::Result;

/// Removes every empty directory below `dir`, bottom-up.
///
/// A directory is removed once all of its subdirectories have been pruned and nothing is
/// left in it, so a directory that (transitively) holds a file always survives, together
/// with all of its ancestors. `dir` itself is removed only when `remove_root` is set.
/// Symlinks are neither followed nor removed, and they keep their parent alive.
///
/// Does nothing if `dir` is not a directory. Returns the number of directories removed.
pub fn remove_empty_dirs<P: AsRef<Path>>(dir: P, remove_root: bool) -> Result<usize> {
    let dir = dir.as_ref();
    let meta = match fs::symlink_metadata(dir) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    if !meta.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        removed += remove_empty_dirs(entry?.path(), true)?;
    }

    if remove_root && fs::read_dir(dir)?.next().is_none() {
        fs::remove_dir(dir)?;
        debug!(path = %dir.display(), "removed empty directory");
        removed += 1;
    }
    Ok(removed)
}

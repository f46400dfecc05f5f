use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

use tracing::warn;

use super::{Context, DualPath};
use crate::core::Result;

/// Names a top-level area may not take, because `ProjectMap` derefs to the root `DualPath`
/// and these already mean something there.
pub const RESERVED_NAMES: &[&str] = &[
    "classify",
    "cloud",
    "context",
    "download",
    "exists_cloud",
    "exists_local",
    "is_dir",
    "is_file",
    "is_root",
    "join",
    "kind",
    "local",
    "ls_cloud",
    "ls_local",
    "materialize_local",
    "name",
    "parent",
    "relative",
    "root",
    "stem",
    "suffix",
    "suffixes",
    "upload",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.binary_search(&name).is_ok()
}

/// Snapshot of the project's top-level areas on the remote.
///
/// Built once by listing the cloud root; later changes on the remote are not seen.
/// Areas are looked up by name with [`ProjectMap::get`]. A cloud directory whose name is in
/// [`RESERVED_NAMES`] is skipped with a warning and recorded in [`ProjectMap::skipped`].
#[derive(Debug, Clone)]
pub struct ProjectMap {
    root: DualPath,
    areas: BTreeMap<String, DualPath>,
    skipped: Vec<String>,
}

impl ProjectMap {
    /// Lists the cloud root once. With `dirs_only` false, top-level files become areas too.
    pub fn build(ctx: &Arc<Context>, dirs_only: bool) -> Result<Self> {
        let root = DualPath::root(ctx);
        let mut areas = BTreeMap::new();
        let mut skipped = Vec::new();

        for child in root.ls_cloud(dirs_only, None)? {
            let Some(name) = child.name().map(str::to_string) else {
                warn!(
                    cloud = %child.cloud().display(),
                    "directory name is not valid UTF-8 and is skipped"
                );
                continue;
            };
            if is_reserved(&name) {
                warn!(
                    cloud = %child.cloud().display(),
                    name = %name,
                    "directory shares its name with a reserved path accessor and is skipped; rename it"
                );
                skipped.push(name);
                continue;
            }
            areas.insert(name, child);
        }

        Ok(Self {
            root,
            areas,
            skipped,
        })
    }

    pub fn root(&self) -> &DualPath {
        &self.root
    }

    pub fn get(&self, name: &str) -> Option<&DualPath> {
        self.areas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.areas.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.areas.keys().map(String::as_str)
    }

    pub fn areas(&self) -> impl Iterator<Item = (&str, &DualPath)> {
        self.areas.iter().map(|(name, path)| (name.as_str(), path))
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

impl Deref for ProjectMap {
    type Target = DualPath;

    fn deref(&self) -> &DualPath {
        &self.root
    }
}

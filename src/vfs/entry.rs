/// What a resource is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    File,
    Directory,
    /// A local socket, FIFO or device node.
    Other,
}

impl Kind {
    pub fn is_file(&self) -> bool {
        *self == Kind::File
    }

    pub fn is_dir(&self) -> bool {
        *self == Kind::Directory
    }
}

/// How hard to look when the resource is not present locally.
///
/// Both modes trust the local filesystem when the local path exists.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Guess from the name: a suffix means a file, no suffix means a directory.
    /// No subprocess is spawned. Wrong for extension-less files and dotted directory names.
    #[default]
    Heuristic,
    /// Ask the remote by listing the parent directory. One blocking round trip.
    Authoritative,
}

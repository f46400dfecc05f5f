mod prune;

pub use prune::remove_empty_dirs;

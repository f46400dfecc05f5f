mod context;
mod dual_path;
mod entry;
mod project_map;

pub use context::Context;
pub use dual_path::DualPath;
pub use entry::{Classification, Kind};
pub use project_map::{ProjectMap, RESERVED_NAMES, is_reserved};

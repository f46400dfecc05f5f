use std::path::PathBuf;
use std::sync::Arc;

use dualpath_kit::{Config, Context, ProjectMap, remove_empty_dirs};
use tracing_subscriber::EnvFilter;

// usage: mirror_skeleton [config.yaml] [--prune]
//
// Without `--prune`: builds an empty local directory for every directory on the remote.
// With `--prune`: removes every empty directory below the local root instead.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let prune = args.iter().any(|arg| arg == "--prune");
    let config_path = args
        .iter()
        .find(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dualpath.yaml"));

    let config = Config::load(&config_path)?;
    let ctx = Arc::new(Context::from_config(&config));

    if prune {
        let removed = remove_empty_dirs(ctx.roots().local(), false)?;
        println!("Pruned {removed} empty directories");
        return Ok(());
    }

    let map = ProjectMap::build(&ctx, true)?;
    println!(
        "Project root: {} <-> {}",
        map.local().display(),
        map.cloud().display()
    );
    for name in map.skipped() {
        println!("  skipped reserved name: {name}");
    }
    for (name, area) in map.areas() {
        let created = area.materialize_local(true)?;
        println!("  {name}: {created} directories created");
    }
    Ok(())
}

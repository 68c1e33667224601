//! Resolve command - maps one dependency name to its provider.

use anyhow::Result;

use crate::config::Config;
use crate::deps::{DependencyManager, GemTable};
use crate::naming;
use crate::pkginfo::NamedDependency;

use super::load_resolution;

/// Execute the resolve command.
///
/// Workspace package names resolve with their build type; anything else is
/// treated as a gem name.
pub fn cmd_resolve(config: &Config, name: &str) -> Result<()> {
    let ctx = load_resolution(config)?;
    let gems = GemTable::new();
    let manager = DependencyManager::new(&ctx.packager, &ctx.workspace, &ctx.policy, &gems);

    let dep = match ctx.workspace.get(name) {
        Some(info) => NamedDependency::Package(info),
        None => NamedDependency::Plain(name),
    };

    let (resolved, is_osdep) = manager.native_dependency_name(dep, None);
    if is_osdep {
        println!("{} -> {} (provided natively)", name, resolved);
        return Ok(());
    }

    let provider = ctx.packager.release_platform().and_then(|release| {
        release
            .ancestors()
            .iter()
            .find(|ancestor| resolved.starts_with(naming::release_prefix(ancestor).as_str()))
    });
    match provider {
        Some(ancestor) => println!("{} -> {} (released in {})", name, resolved, ancestor),
        None => println!("{} -> {} (to build)", name, resolved),
    }
    Ok(())
}

//! Deps command - prints a package's resolved dependencies.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::deps::DependencyManager;

use super::{gem_resolver, load_resolution};

/// Execute the deps command.
pub fn cmd_deps(
    config: &Config,
    package: &str,
    recursive: bool,
    no_release_prefix: bool,
    gem_table: Option<&Path>,
) -> Result<()> {
    let ctx = load_resolution(config)?;
    let gems = gem_resolver(gem_table)?;
    let manager = DependencyManager::new(&ctx.packager, &ctx.workspace, &ctx.policy, gems.as_ref());

    let pkg = ctx.workspace.require(package)?;

    if recursive {
        let all = manager.recursive_dependencies(pkg)?;
        println!("{} requires {} packages:", pkg.name, all.len());
        for name in all {
            println!("  {}", name);
        }
        return Ok(());
    }

    let filtered = manager.filtered_dependencies(pkg, !no_release_prefix)?;
    println!("Dependencies of {}:", pkg.name);
    if filtered.rock.is_empty() && filtered.osdeps.is_empty() && filtered.nonnative.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    if !filtered.rock.is_empty() {
        println!("  Rock packages:");
        for name in &filtered.rock {
            println!("    {}", name);
        }
    }
    if !filtered.osdeps.is_empty() {
        println!("  OS packages:");
        for name in &filtered.osdeps {
            println!("    {}", name);
        }
    }
    if !filtered.nonnative.is_empty() {
        println!("  Gems:");
        for gem in &filtered.nonnative {
            match &gem.version {
                Some(version) => println!("    {} ({})", gem.name, version),
                None => println!("    {}", gem.name),
            }
        }
    }
    Ok(())
}

//! Show command - displays information.

use anyhow::Result;

use crate::config::Config;
use crate::pkginfo::Workspace;
use crate::platform::Packager;

/// Show target for the show command.
pub enum ShowTarget {
    /// Show configuration
    Config,
    /// Show resolution platforms and index contents
    Platform,
    /// Show workspace manifest contents
    Workspace,
}

/// Execute the show command.
pub fn cmd_show(config: &Config, target: ShowTarget) -> Result<()> {
    match target {
        ShowTarget::Config => {
            config.print();
        }
        ShowTarget::Platform => {
            let packager = Packager::from_config(config)?;
            packager.print_status();
        }
        ShowTarget::Workspace => {
            let workspace = Workspace::load(&config.workspace_manifest)?;
            println!(
                "Workspace manifest {} ({} packages):",
                config.workspace_manifest.display(),
                workspace.len()
            );
            for info in workspace.packages() {
                let deps = &info.dependencies;
                println!(
                    "  {} [{}] rock:{} osdeps:{} gems:{}",
                    info.name,
                    info.build_type.as_str(),
                    deps.rock.len(),
                    deps.osdeps.len(),
                    deps.nonnative.len() + deps.extra_gems.len()
                );
            }
        }
    }
    Ok(())
}

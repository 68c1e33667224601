//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `deps` - Print a package's direct or transitive dependencies
//! - `resolve` - Resolve one name to its provider
//! - `filter` - Drop ancestor-provided entries from a build selection
//! - `import` - Ingest package lists into the index
//! - `fetch` - Download release package lists from the archive
//! - `show` - Display configuration and platform state

pub mod deps;
pub mod fetch;
pub mod filter;
pub mod import;
pub mod resolve;
pub mod show;

pub use deps::cmd_deps;
pub use fetch::cmd_fetch;
pub use filter::cmd_filter;
pub use import::cmd_import;
pub use resolve::cmd_resolve;
pub use show::cmd_show;

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::deps::gems::{GemResolver, GemTable, SystemGemResolver};
use crate::deps::FilterPolicy;
use crate::pkginfo::Workspace;
use crate::platform::Packager;

/// Everything the resolution commands need, loaded once per invocation.
pub(crate) struct ResolutionContext {
    pub packager: Packager,
    pub workspace: Workspace,
    pub policy: FilterPolicy,
}

pub(crate) fn load_resolution(config: &Config) -> Result<ResolutionContext> {
    let packager = Packager::from_config(config)?;
    let workspace = Workspace::load(&config.workspace_manifest)
        .with_context(|| "Failed to load the workspace manifest (set ROCK_WORKSPACE or create workspace.json)")?;
    let policy = FilterPolicy::new(&config.packages_optional, &config.packages_excluded)?;
    Ok(ResolutionContext {
        packager,
        workspace,
        policy,
    })
}

/// Pick the gem resolver: a JSON table when given, the system `gem`
/// command otherwise.
pub(crate) fn gem_resolver(table: Option<&Path>) -> Result<Box<dyn GemResolver>> {
    match table {
        Some(path) => Ok(Box::new(GemTable::from_file(path)?)),
        None => Ok(Box::new(SystemGemResolver::new())),
    }
}

//! Dependency resolution across the three package namespaces.
//!
//! Every dependency a package declares lives in one of three namespaces:
//! rock (built from source in the workspace), osdep (installed from the OS
//! distribution), or nonnative (a gem). The manager filters and renames
//! direct dependencies, walks rock build edges for transitive closures,
//! and decides for each name which release or platform provides it.
//!
//! # Example
//!
//! ```no_run
//! use rockdeb::config::Config;
//! use rockdeb::deps::{DependencyManager, FilterPolicy, GemTable};
//! use rockdeb::pkginfo::Workspace;
//! use rockdeb::platform::Packager;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let packager = Packager::from_config(&config)?;
//! let workspace = Workspace::load(&config.workspace_manifest)?;
//! let policy = FilterPolicy::new(&config.packages_optional, &config.packages_excluded)?;
//! let gems = GemTable::new();
//!
//! let manager = DependencyManager::new(&packager, &workspace, &policy, &gems);
//! let pkg = workspace.require("base/types")?;
//! let deps = manager.filtered_dependencies(pkg, true)?;
//! println!("{:?}", deps.osdeps);
//! # Ok(())
//! # }
//! ```

pub mod gems;
pub mod manager;
pub mod policy;

pub use gems::{GemResolver, GemTable, SystemGemResolver};
pub use manager::{BuildSelection, DependencyManager, FilteredDependencies};
pub use policy::FilterPolicy;

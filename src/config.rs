//! Configuration management for rockdeb.
//!
//! Settings come from an optional JSON config file plus environment
//! variables; environment variables take precedence. `main` loads `.env`
//! first, so a checked-in `.env` behaves like exported variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default package archive serving per-release Packages lists.
pub const DEFAULT_ARCHIVE_URL: &str = "https://packages.rock-robotics.org/releases";

/// Default OS distribution to resolve native packages against.
pub const DEFAULT_DISTRIBUTION: &str = "bookworm";

/// Default debian architecture.
pub const DEFAULT_ARCHITECTURE: &str = "amd64";

/// rockdeb configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Rock release being built, or None for a detached build.
    pub release_name: Option<String>,
    /// Debian architecture (amd64, arm64, ...).
    pub architecture: String,
    /// OS distribution codename native packages come from.
    pub distribution: String,
    /// Ancestor chains per release, declaration order, own name excluded.
    pub hierarchy: BTreeMap<String, Vec<String>>,
    /// Regex patterns for osdeps kept only when the target provides them.
    pub packages_optional: Vec<String>,
    /// Regex patterns for osdeps dropped unconditionally.
    pub packages_excluded: Vec<String>,
    /// Directory holding the persisted `.list` package indices.
    pub index_dir: PathBuf,
    /// Path of the workspace manifest (workspace.json).
    pub workspace_manifest: PathBuf,
    /// Cache directory for downloaded package lists (~/.cache/rockdeb/).
    pub cache_dir: PathBuf,
    /// Base URL of the rock package archive.
    pub archive_url: String,
}

/// On-disk shape of rockdeb.json; every field optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    release_name: Option<String>,
    architecture: Option<String>,
    distribution: Option<String>,
    #[serde(default)]
    hierarchy: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    packages_optional: Vec<String>,
    #[serde(default)]
    packages_excluded: Vec<String>,
    index_dir: Option<PathBuf>,
    workspace_manifest: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    archive_url: Option<String>,
}

impl Config {
    /// Load configuration from rockdeb.json and the environment.
    ///
    /// The config file path comes from `ROCK_CONFIG` and defaults to
    /// `rockdeb.json` in the current directory; a missing file just means
    /// defaults. A file that exists but does not parse is an error.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("ROCK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("rockdeb.json"));

        let file = if config_path.exists() {
            let json = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config {}", config_path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Malformed config {}", config_path.display()))?
        } else {
            ConfigFile::default()
        };

        let release_name = std::env::var("ROCK_RELEASE").ok().or(file.release_name);
        let architecture = std::env::var("ROCK_ARCHITECTURE")
            .ok()
            .or(file.architecture)
            .unwrap_or_else(|| DEFAULT_ARCHITECTURE.to_string());
        let distribution = std::env::var("ROCK_DISTRIBUTION")
            .ok()
            .or(file.distribution)
            .unwrap_or_else(|| DEFAULT_DISTRIBUTION.to_string());
        let index_dir = std::env::var("ROCK_INDEX_DIR")
            .ok()
            .map(PathBuf::from)
            .or(file.index_dir)
            .unwrap_or_else(|| PathBuf::from("index"));
        let workspace_manifest = std::env::var("ROCK_WORKSPACE")
            .ok()
            .map(PathBuf::from)
            .or(file.workspace_manifest)
            .unwrap_or_else(|| PathBuf::from("workspace.json"));
        let archive_url = std::env::var("ROCK_ARCHIVE_URL")
            .ok()
            .or(file.archive_url)
            .unwrap_or_else(|| DEFAULT_ARCHIVE_URL.to_string());

        let cache_dir = file.cache_dir.unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join("rockdeb")
        });

        Ok(Self {
            release_name,
            architecture,
            distribution,
            hierarchy: file.hierarchy,
            packages_optional: file.packages_optional,
            packages_excluded: file.packages_excluded,
            index_dir,
            workspace_manifest,
            cache_dir,
            archive_url,
        })
    }

    /// Declared ancestors of a release, empty when undeclared.
    pub fn ancestors_of(&self, release: &str) -> Vec<String> {
        self.hierarchy.get(release).cloned().unwrap_or_default()
    }

    /// The ancestor chain of the configured release, own name first.
    pub fn release_chain(&self) -> Vec<String> {
        match &self.release_name {
            Some(release) => {
                let mut chain = vec![release.clone()];
                for ancestor in self.ancestors_of(release) {
                    if !chain.contains(&ancestor) {
                        chain.push(ancestor);
                    }
                }
                chain
            }
            None => Vec::new(),
        }
    }

    /// Check if the workspace manifest is present.
    pub fn has_workspace_manifest(&self) -> bool {
        self.workspace_manifest.exists()
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!(
            "  ROCK_RELEASE: {}",
            self.release_name.as_deref().unwrap_or("(detached)")
        );
        println!("  ROCK_ARCHITECTURE: {}", self.architecture);
        println!("  ROCK_DISTRIBUTION: {}", self.distribution);
        println!("  ROCK_INDEX_DIR: {}", self.index_dir.display());
        println!("  ROCK_ARCHIVE_URL: {}", self.archive_url);
        println!("  Cache dir: {}", self.cache_dir.display());
        println!("  Workspace manifest: {}", self.workspace_manifest.display());
        if self.has_workspace_manifest() {
            println!("  Workspace: FOUND");
        } else {
            println!("  Workspace: NOT FOUND (create workspace.json or set ROCK_WORKSPACE)");
        }
        if self.hierarchy.is_empty() {
            println!("  Hierarchy: (none)");
        } else {
            println!("  Hierarchy:");
            for (release, ancestors) in &self.hierarchy {
                println!("    {} -> {}", release, ancestors.join(" -> "));
            }
        }
        println!("  Optional patterns: {}", self.packages_optional.len());
        println!("  Excluded patterns: {}", self.packages_excluded.len());
    }
}

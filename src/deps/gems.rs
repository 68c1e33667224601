//! Gem dependency expansion.
//!
//! The gem ecosystem resolves its own transitive graphs; we only consume
//! the result. [`GemResolver`] is the seam: resolution hands over the
//! accumulated gem list once and gets back a map whose keys are the full
//! gem closure. [`GemTable`] answers from a fixed table (fixtures, offline
//! builds); [`SystemGemResolver`] asks the installed `gem` command.

use anyhow::{bail, Context, Result};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;
use std::process::Command;

use crate::pkginfo::GemDependency;

/// Expands gem names to their full transitive closure.
///
/// Only the returned map's keys matter to the resolution core; the values
/// (per-gem runtime dependencies) are kept for inspection output.
pub trait GemResolver {
    fn resolve_all(&self, gems: &[GemDependency]) -> Result<BTreeMap<String, Vec<String>>>;
}

/// A fixed gem-to-dependencies table.
#[derive(Debug, Default)]
pub struct GemTable {
    deps: BTreeMap<String, Vec<String>>,
}

impl GemTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, gem: &str, deps: &[&str]) {
        self.deps
            .insert(gem.to_string(), deps.iter().map(|d| d.to_string()).collect());
    }

    /// Load a table from JSON: `{"gem": ["dep", ...], ...}`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read gem table {}", path.display()))?;
        let deps: BTreeMap<String, Vec<String>> = serde_json::from_str(&json)
            .with_context(|| format!("Malformed gem table {}", path.display()))?;
        Ok(Self { deps })
    }
}

impl GemResolver for GemTable {
    fn resolve_all(&self, gems: &[GemDependency]) -> Result<BTreeMap<String, Vec<String>>> {
        let mut resolved = BTreeMap::new();
        let mut queue: VecDeque<String> = gems.iter().map(|g| g.name.clone()).collect();

        while let Some(name) = queue.pop_front() {
            if resolved.contains_key(&name) {
                continue;
            }
            // Unknown gems terminate the walk with no further deps.
            let deps = self.deps.get(&name).cloned().unwrap_or_default();
            for dep in &deps {
                if !resolved.contains_key(dep) {
                    queue.push_back(dep.clone());
                }
            }
            resolved.insert(name, deps);
        }

        Ok(resolved)
    }
}

/// Resolves through the installed `gem` command.
#[derive(Debug, Default)]
pub struct SystemGemResolver;

impl SystemGemResolver {
    pub fn new() -> Self {
        Self
    }

    /// Run `gem dependency` for one gem and return (name, runtime deps)
    /// pairs for every matching gem.
    fn query(&self, gem: &GemDependency) -> Result<Vec<(String, Vec<String>)>> {
        let gem_cmd = which::which("gem")
            .context("Failed to find 'gem'. Install rubygems to resolve gem dependencies")?;

        let mut cmd = Command::new(gem_cmd);
        // Exact-name regexp, otherwise `gem dependency rake` also matches rake-compiler.
        cmd.arg("dependency").arg(format!("^{}$", gem.name));
        if let Some(version) = &gem.version {
            cmd.args(["-v", version]);
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to run gem dependency for '{}'", gem.name))?;
        if !output.status.success() {
            bail!(
                "gem dependency failed for '{}': {}",
                gem.name,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(parse_gem_dependency_output(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }
}

impl GemResolver for SystemGemResolver {
    fn resolve_all(&self, gems: &[GemDependency]) -> Result<BTreeMap<String, Vec<String>>> {
        let mut resolved = BTreeMap::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut queue: VecDeque<GemDependency> = gems.iter().cloned().collect();

        while let Some(gem) = queue.pop_front() {
            if !seen.insert(gem.name.clone()) {
                continue;
            }

            let entries = self.query(&gem)?;
            if entries.is_empty() {
                eprintln!("  [WARN] gem '{}' is not installed, assuming no dependencies", gem.name);
                resolved.insert(gem.name.clone(), Vec::new());
                continue;
            }

            for (name, deps) in entries {
                for dep in &deps {
                    if !seen.contains(dep) {
                        queue.push_back(GemDependency::new(dep));
                    }
                }
                resolved.insert(name, deps);
            }
        }

        Ok(resolved)
    }
}

/// Parse `gem dependency` output.
///
/// Example:
/// ```text
/// Gem rspec-3.12.0
///   rspec-core (~> 3.12.0)
///   rspec-mocks (~> 3.12.0)
///   rake (>= 10.0, development)
/// ```
/// Development-only dependencies are skipped.
pub fn parse_gem_dependency_output(output: &str) -> Vec<(String, Vec<String>)> {
    let mut entries: Vec<(String, Vec<String>)> = Vec::new();

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("Gem ") {
            entries.push((strip_gem_version(rest.trim()), Vec::new()));
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some((_, deps)) = entries.last_mut() {
            let name = trimmed.split_whitespace().next().unwrap_or(trimmed);
            if let Some(requirement) = trimmed.strip_prefix(name) {
                if requirement.contains("development") {
                    continue;
                }
            }
            deps.push(name.to_string());
        }
    }

    entries
}

/// Drop the trailing version from `name-1.2.3`.
fn strip_gem_version(versioned: &str) -> String {
    if let Some((name, version)) = versioned.rsplit_once('-') {
        if version.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return name.to_string();
        }
    }
    versioned.to_string()
}

//! In-memory package index backing all platform lookups.
//!
//! Every release or distribution we can resolve against has a package list
//! keyed by (release name, architecture). Lists are persisted as plain
//! `.list` files under the index directory (one package name per line,
//! `#` starts a comment) so they stay diffable and editable by hand.
//! Resolution never touches the filesystem; everything is loaded up front.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Package lists for every known (release, architecture) pair.
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    lists: BTreeMap<(String, String), BTreeSet<String>>,
}

impl PackageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single package name for a release/architecture pair.
    pub fn insert(&mut self, release: &str, arch: &str, name: &str) {
        self.lists
            .entry((release.to_string(), arch.to_string()))
            .or_default()
            .insert(name.to_string());
    }

    /// Register a whole package list, replacing nothing that is already there.
    pub fn extend<I, S>(&mut self, release: &str, arch: &str, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self
            .lists
            .entry((release.to_string(), arch.to_string()))
            .or_default();
        entry.extend(names.into_iter().map(Into::into));
    }

    /// True if `name` is listed verbatim for this release/architecture.
    ///
    /// An unknown release is not an error; it simply provides nothing.
    pub fn contains(&self, release: &str, arch: &str, name: &str) -> bool {
        self.lists
            .get(&(release.to_string(), arch.to_string()))
            .is_some_and(|names| names.contains(name))
    }

    /// All package names registered for a release/architecture, if any.
    pub fn packages(&self, release: &str, arch: &str) -> Option<&BTreeSet<String>> {
        self.lists.get(&(release.to_string(), arch.to_string()))
    }

    /// The (release, architecture) pairs this index knows about.
    pub fn known_platforms(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lists
            .keys()
            .map(|(release, arch)| (release.as_str(), arch.as_str()))
    }

    /// Total number of package names across all lists.
    pub fn len(&self) -> usize {
        self.lists.values().map(|names| names.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Path of the persisted list for a release/architecture pair.
    ///
    /// Release names cannot contain `_` (the release-name pattern forbids
    /// it), so everything after the first underscore is the architecture.
    /// Architectures carry no such guarantee: `x86_64` must survive.
    pub fn list_path(dir: &Path, release: &str, arch: &str) -> PathBuf {
        dir.join(format!("{}_{}.list", release, arch))
    }

    /// Load every `.list` file found directly under `dir`.
    ///
    /// A missing directory is treated as an empty index so a fresh checkout
    /// works before any import has run.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut index = Self::new();
        if !dir.exists() {
            return Ok(index);
        }

        for entry in fs::read_dir(dir)
            .with_context(|| format!("Failed to read index directory {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("list") {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem,
                None => continue,
            };
            let Some((release, arch)) = stem.split_once('_') else {
                eprintln!("  [WARN] Skipping index file without release_arch name: {}", path.display());
                continue;
            };
            let names = read_list_file(&path)?;
            index.extend(release, arch, names);
        }

        Ok(index)
    }

    /// Write one release/architecture list back as a `.list` file.
    pub fn save_list(&self, dir: &Path, release: &str, arch: &str) -> Result<PathBuf> {
        let path = Self::list_path(dir, release, arch);
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create index directory {}", dir.display()))?;

        let mut contents = String::new();
        if let Some(names) = self.packages(release, arch) {
            for name in names {
                contents.push_str(name);
                contents.push('\n');
            }
        }
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write package list {}", path.display()))?;
        Ok(path)
    }
}

/// Read a plain package list: one name per line, `#` comments, blanks ignored.
pub fn read_list_file(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read package list {}", path.display()))?;

    let mut names = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        names.push(line.to_string());
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_contains_and_unknown_release() {
        let mut index = PackageIndex::new();
        index.insert("bookworm", "amd64", "libboost-dev");

        assert!(index.contains("bookworm", "amd64", "libboost-dev"));
        assert!(!index.contains("bookworm", "amd64", "libfoo-dev"));
        assert!(!index.contains("bookworm", "arm64", "libboost-dev"));
        assert!(!index.contains("trixie", "amd64", "libboost-dev"));
    }

    #[test]
    fn test_list_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut index = PackageIndex::new();
        index.extend("master-24.01", "amd64", ["rock-master-24.01-base-types", "rock-master-24.01-base-cmake"]);

        let path = index.save_list(dir.path(), "master-24.01", "amd64").unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "master-24.01_amd64.list"
        );

        let loaded = PackageIndex::load_dir(dir.path()).unwrap();
        assert!(loaded.contains("master-24.01", "amd64", "rock-master-24.01-base-types"));
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_list_file_comments_and_blanks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookworm_amd64.list");
        fs::write(&path, "# OS packages\n\nlibboost-dev\n  ruby-rice  \n").unwrap();

        let names = read_list_file(&path).unwrap();
        assert_eq!(names, vec!["libboost-dev", "ruby-rice"]);
    }

    #[test]
    fn test_load_dir_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let index = PackageIndex::load_dir(&dir.path().join("nope")).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_release_arch_split_keeps_dashes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("master-24.01_amd64.list"), "rock-master-24.01-base-types\n").unwrap();

        let index = PackageIndex::load_dir(dir.path()).unwrap();
        assert!(index.contains("master-24.01", "amd64", "rock-master-24.01-base-types"));
    }
}

//! The workspace manifest: every package the build system knows how to build.
//!
//! Rock dependency names in descriptors refer to other entries of this
//! manifest. Lookups that miss are reported when the offending package is
//! resolved, so one bad entry only fails its own package, not the batch.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::PackageInfo;

/// On-disk shape of `workspace.json`.
#[derive(Debug, Serialize, Deserialize)]
struct WorkspaceManifest {
    packages: Vec<PackageInfo>,
}

/// All known package descriptors, keyed by logical name.
#[derive(Debug, Default)]
pub struct Workspace {
    packages: BTreeMap<String, PackageInfo>,
}

impl Workspace {
    /// Build a workspace from descriptors, rejecting duplicate names.
    pub fn new(packages: Vec<PackageInfo>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for info in packages {
            if map.contains_key(&info.name) {
                bail!("Duplicate package '{}' in workspace manifest", info.name);
            }
            map.insert(info.name.clone(), info);
        }
        Ok(Self { packages: map })
    }

    /// Load and validate `workspace.json`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read workspace manifest {}", path.display()))?;
        let manifest: WorkspaceManifest = serde_json::from_str(&json)
            .with_context(|| format!("Malformed workspace manifest {}", path.display()))?;
        Self::new(manifest.packages)
    }

    pub fn get(&self, name: &str) -> Option<&PackageInfo> {
        self.packages.get(name)
    }

    /// Look up a package, failing with a configuration error when missing.
    pub fn require(&self, name: &str) -> Result<&PackageInfo> {
        self.packages
            .get(name)
            .with_context(|| format!("Package '{}' is not in the workspace manifest", name))
    }

    pub fn packages(&self) -> impl Iterator<Item = &PackageInfo> {
        self.packages.values()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkginfo::BuildType;

    #[test]
    fn test_duplicate_names_rejected() {
        let packages = vec![
            PackageInfo::new("base/types", BuildType::Cmake),
            PackageInfo::new("base/types", BuildType::Autotools),
        ];
        let err = Workspace::new(packages).unwrap_err();
        assert!(err.to_string().contains("Duplicate package 'base/types'"));
    }

    #[test]
    fn test_require_reports_missing_package() {
        let workspace = Workspace::new(vec![PackageInfo::new("base/types", BuildType::Cmake)]).unwrap();
        assert!(workspace.get("base/types").is_some());

        let err = workspace.require("base/logging").unwrap_err();
        assert!(err.to_string().contains("'base/logging'"));
    }

    #[test]
    fn test_load_from_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("workspace.json");
        std::fs::write(
            &path,
            r#"{"packages": [{"name": "base/types", "build_type": "cmake"}]}"#,
        )
        .unwrap();

        let workspace = Workspace::load(&path).unwrap();
        assert_eq!(workspace.len(), 1);
        assert_eq!(workspace.require("base/types").unwrap().build_type, BuildType::Cmake);
    }

    #[test]
    fn test_load_rejects_malformed_manifest() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("workspace.json");
        std::fs::write(&path, "{\"packages\": [{\"name\": 42}]}").unwrap();

        let err = Workspace::load(&path).unwrap_err();
        assert!(err.to_string().contains("Malformed workspace manifest"));
    }
}

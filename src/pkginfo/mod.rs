//! Package descriptors: what a package is and what it directly depends on.
//!
//! Descriptors are plain data. They are loaded from the workspace manifest
//! before resolution starts and never carry resolved results; every
//! resolution call computes fresh output from these inputs.

pub mod workspace;

use serde::{Deserialize, Serialize};

pub use workspace::Workspace;

/// How a package is built, which decides its debian name family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildType {
    Cmake,
    Autotools,
    Orogen,
    Ruby,
    ArchiveImporter,
    ImporterPackage,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Cmake => "cmake",
            BuildType::Autotools => "autotools",
            BuildType::Orogen => "orogen",
            BuildType::Ruby => "ruby",
            BuildType::ArchiveImporter => "archive_importer",
            BuildType::ImporterPackage => "importer_package",
        }
    }
}

/// A gem dependency: name plus optional version requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemDependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl GemDependency {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: None,
        }
    }

    pub fn with_version(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: Some(version.to_string()),
        }
    }
}

/// Direct dependencies of a package, pre-split by namespace.
///
/// `rock` names other workspace packages, `osdeps` names OS distribution
/// packages, `nonnative` names gems. The `extra_*` lists are per-package
/// configuration supplements merged into their namespace before filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencySets {
    #[serde(default)]
    pub rock: Vec<String>,
    #[serde(default)]
    pub osdeps: Vec<String>,
    #[serde(default)]
    pub nonnative: Vec<GemDependency>,
    #[serde(default)]
    pub extra_gems: Vec<GemDependency>,
    #[serde(default)]
    pub extra_osdeps: Vec<String>,
}

/// A source-built package as declared in the workspace manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub build_type: BuildType,
    #[serde(default)]
    pub dependencies: DependencySets,
}

impl PackageInfo {
    pub fn new(name: &str, build_type: BuildType) -> Self {
        Self {
            name: name.to_string(),
            build_type,
            dependencies: DependencySets::default(),
        }
    }
}

/// A dependency handed to name resolution: either a bare name or a full
/// descriptor. Matching is exhaustive, so every caller states which case
/// it is handling.
#[derive(Debug, Clone, Copy)]
pub enum NamedDependency<'a> {
    Plain(&'a str),
    Package(&'a PackageInfo),
}

impl NamedDependency<'_> {
    pub fn name(&self) -> &str {
        match self {
            NamedDependency::Plain(name) => name,
            NamedDependency::Package(info) => &info.name,
        }
    }
}

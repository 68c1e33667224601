//! Shared test utilities for rockdeb tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use rockdeb::pkginfo::{BuildType, GemDependency, PackageInfo};
use rockdeb::platform::index::PackageIndex;
use rockdeb::platform::{Packager, TargetPlatform};

/// Test environment with a temporary index directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Index directory (where .list files land)
    pub index_dir: PathBuf,
}

impl TestEnv {
    /// Create a new test environment with a temporary index directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let index_dir = temp_dir.path().join("index");
        fs::create_dir_all(&index_dir).expect("Failed to create index dir");

        Self {
            _temp_dir: temp_dir,
            index_dir,
        }
    }

    /// Write a raw `.list` file the way the index store lays them out.
    pub fn write_list(&self, release: &str, arch: &str, names: &[&str]) -> PathBuf {
        let path = self.index_dir.join(format!("{}_{}.list", release, arch));
        let mut contents = String::new();
        for name in names {
            contents.push_str(name);
            contents.push('\n');
        }
        fs::write(&path, contents).expect("Failed to write list file");
        path
    }

    /// Write a Debian `Packages` file naming `packages`.
    pub fn packages_file(&self, file_name: &str, packages: &[&str]) -> PathBuf {
        let path = self._temp_dir.path().join(file_name);
        let mut contents = String::new();
        for name in packages {
            contents.push_str(&format!(
                "Package: {}\nVersion: 1.0-1\nArchitecture: amd64\n\n",
                name
            ));
        }
        fs::write(&path, contents).expect("Failed to write Packages file");
        path
    }
}

/// Build an index from OS packages (bookworm/amd64) plus released
/// (release, package) pairs on amd64.
pub fn index_with(os: &[&str], released: &[(&str, &str)]) -> PackageIndex {
    let mut index = PackageIndex::new();
    for name in os {
        index.insert("bookworm", "amd64", name);
    }
    for (release, name) in released {
        index.insert(release, "amd64", name);
    }
    index
}

/// The standard test platforms: OS bookworm/amd64, rock release
/// master-24.01 with ancestor master-23.06.
pub fn packager_with(index: PackageIndex) -> Packager {
    let target = TargetPlatform::new("bookworm", "amd64").expect("valid distribution name");
    let release = TargetPlatform::new("master-24.01", "amd64")
        .expect("valid release name")
        .with_ancestors(&["master-23.06".to_string()])
        .expect("valid ancestor name");
    Packager::new(target, Some(release), index)
}

/// Same OS platform without a rock release: detached resolution.
pub fn detached_packager(index: PackageIndex) -> Packager {
    let target = TargetPlatform::new("bookworm", "amd64").expect("valid distribution name");
    Packager::new(target, None, index)
}

/// Package descriptor with rock, osdep and gem dependencies.
pub fn pkg_with_deps(
    name: &str,
    build_type: BuildType,
    rock: &[&str],
    osdeps: &[&str],
    gems: &[&str],
) -> PackageInfo {
    let mut info = PackageInfo::new(name, build_type);
    info.dependencies.rock = rock.iter().map(|s| s.to_string()).collect();
    info.dependencies.osdeps = osdeps.iter().map(|s| s.to_string()).collect();
    info.dependencies.nonnative = gems.iter().map(|s| GemDependency::new(s)).collect();
    info
}

/// Assert that a file contains expected content.
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content =
        fs::read_to_string(path).expect(&format!("Failed to read file: {}", path.display()));
    assert!(
        content.contains(expected),
        "File {} does not contain expected content.\nExpected to find: {}\nActual content: {}",
        path.display(),
        expected,
        content
    );
}

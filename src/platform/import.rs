//! Package index ingestion.
//!
//! Three source formats feed the index: Debian `Packages` files (one
//! `Package:` stanza per package), dpkg status files (only installed
//! entries count), and directories of built `.deb` artifacts. Every import
//! normalizes into a `.list` file under the index directory with a `.hash`
//! sidecar, so unchanged sources are never parsed twice.

use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::index::{read_list_file, PackageIndex};
use crate::cache;

/// What kind of file an import reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Debian repository `Packages` file.
    Packages,
    /// dpkg `/var/lib/dpkg/status` file.
    DpkgStatus,
    /// Plain list, one package name per line.
    PlainList,
}

/// Extract package names from a Debian `Packages` file.
pub fn parse_packages_file(contents: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in contents.lines() {
        if let Some(name) = line.strip_prefix("Package:") {
            names.push(name.trim().to_string());
        }
    }
    names
}

/// Extract installed package names from a dpkg status file.
///
/// dpkg keeps stanzas for removed packages too ("deinstall ok
/// config-files"); only entries whose status ends in `installed` count.
pub fn parse_status_file(contents: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut current: Option<String> = None;

    for line in contents.lines() {
        if let Some(name) = line.strip_prefix("Package:") {
            current = Some(name.trim().to_string());
        } else if let Some(status) = line.strip_prefix("Status:") {
            if status.split_whitespace().last() == Some("installed") {
                if let Some(name) = current.take() {
                    names.push(name);
                }
            }
        } else if line.is_empty() {
            current = None;
        }
    }
    names
}

/// Scan a directory of built `.deb` files for package names.
///
/// Filenames follow `<name>_<version>_<arch>.deb`; packages for other
/// architectures are skipped, `all` always counts.
pub fn scan_deb_dir(dir: &Path, arch: &str) -> Result<Vec<String>> {
    if !dir.exists() {
        bail!("Artifact directory {} does not exist", dir.display());
    }

    let mut names = BTreeSet::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("deb") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let mut parts = stem.split('_');
        let Some(name) = parts.next() else { continue };
        let _version = parts.next();
        if let Some(file_arch) = parts.next() {
            if file_arch != arch && file_arch != "all" {
                continue;
            }
        }
        names.insert(name.to_string());
    }
    Ok(names.into_iter().collect())
}

/// Import one source into the index directory, replacing the release's list.
///
/// Returns the number of packages in the resulting list. When the source
/// hash matches the `.hash` sidecar the existing list is kept as-is.
pub fn import_source(
    index_dir: &Path,
    release: &str,
    arch: &str,
    source: &Path,
    format: SourceFormat,
) -> Result<usize> {
    let list_path = PackageIndex::list_path(index_dir, release, arch);
    let hash_path = list_path.with_extension("hash");

    let source_hash = cache::hash_source(source)
        .with_context(|| format!("Import source {} is not readable", source.display()))?;

    if !cache::needs_import(&source_hash, &hash_path, &list_path) {
        let existing = read_list_file(&list_path)?;
        println!(
            "  {} ({}) is up to date: {} packages",
            release,
            arch,
            existing.len()
        );
        return Ok(existing.len());
    }

    let names = match format {
        SourceFormat::Packages => {
            let contents = fs::read_to_string(source)
                .with_context(|| format!("Failed to read {}", source.display()))?;
            parse_packages_file(&contents)
        }
        SourceFormat::DpkgStatus => {
            let contents = fs::read_to_string(source)
                .with_context(|| format!("Failed to read {}", source.display()))?;
            parse_status_file(&contents)
        }
        SourceFormat::PlainList => read_list_file(source)?,
    };

    let mut index = PackageIndex::new();
    index.extend(release, arch, names);
    index.save_list(index_dir, release, arch)?;
    cache::write_cached_hash(&hash_path, &source_hash)?;

    let count = index.len();
    println!("  Imported {} packages for {} ({})", count, release, arch);
    Ok(count)
}

/// Register a release's built `.deb` artifacts in the index directory.
pub fn import_deb_dir(index_dir: &Path, release: &str, arch: &str, dir: &Path) -> Result<usize> {
    let names = scan_deb_dir(dir, arch)?;
    let mut index = PackageIndex::new();
    index.extend(release, arch, names);
    index.save_list(index_dir, release, arch)?;

    // No single source file to hash; drop any stale sidecar.
    let hash_path = PackageIndex::list_path(index_dir, release, arch).with_extension("hash");
    if hash_path.exists() {
        let _ = fs::remove_file(&hash_path);
    }

    let count = index.len();
    println!("  Registered {} built packages for {} ({})", count, release, arch);
    Ok(count)
}

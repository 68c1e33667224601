//! Import caching - hash-based re-parse detection.
//!
//! Imported package lists keep a `.hash` sidecar recording the SHA256 of
//! the source they were parsed from; re-running an import against an
//! unchanged Packages or status file skips the parse and leaves the
//! written `.list` alone. Hashes compare content, so a source that was
//! touched but not changed does not trigger a re-parse.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// SHA256 of an import source file, as lowercase hex.
///
/// None when the source is missing or unreadable; the importer decides
/// whether that is fatal.
pub fn hash_source(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(content) => Some(format!("{:x}", Sha256::digest(&content))),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            eprintln!(
                "  [WARN] Failed to read import source {} for hashing: {}",
                path.display(),
                e
            );
            None
        }
    }
}

/// The hash recorded by the previous import of a list, if any.
pub fn read_cached_hash(hash_file: &Path) -> Option<String> {
    match fs::read_to_string(hash_file) {
        Ok(recorded) => Some(recorded.trim().to_string()),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            eprintln!(
                "  [WARN] Failed to read import hash sidecar {}: {} (will re-import)",
                hash_file.display(),
                e
            );
            None
        }
    }
}

/// Record the source hash next to the imported list, newline-terminated.
pub fn write_cached_hash(hash_file: &Path, hash: &str) -> Result<()> {
    if let Some(parent) = hash_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create sidecar directory {}", parent.display()))?;
    }
    fs::write(hash_file, format!("{}\n", hash))
        .with_context(|| format!("Failed to record import hash {}", hash_file.display()))
}

/// Check if an import source needs re-parsing.
///
/// Returns true if:
/// - The imported list doesn't exist
/// - The source hash differs from the cached hash
///
/// If the sidecar is missing but the list exists, establishes the hash
/// (trusts the existing list as a valid baseline).
pub fn needs_import(source_hash: &str, hash_file: &Path, list_file: &Path) -> bool {
    if !list_file.exists() {
        return true;
    }

    match read_cached_hash(hash_file) {
        Some(cached) => cached != source_hash,
        None => {
            // No sidecar but the list exists - trust it and establish a baseline
            let _ = write_cached_hash(hash_file, source_hash);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hash_source_missing_and_sidecar_round_trip() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("Packages");

        assert_eq!(hash_source(&source), None);

        fs::write(&source, "Package: libboost-dev\n").unwrap();
        let hash = hash_source(&source).unwrap();
        let sidecar = dir.path().join("bookworm_amd64.hash");
        write_cached_hash(&sidecar, &hash).unwrap();
        assert_eq!(read_cached_hash(&sidecar).as_deref(), Some(hash.as_str()));
    }

    #[test]
    fn test_needs_import_decisions() {
        let dir = TempDir::new().unwrap();
        let sidecar = dir.path().join("bookworm_amd64.hash");
        let list = dir.path().join("bookworm_amd64.list");

        // No list yet: always import.
        assert!(needs_import("aa", &sidecar, &list));

        // List without sidecar: trusted, and the hash is established.
        fs::write(&list, "libboost-dev\n").unwrap();
        assert!(!needs_import("aa", &sidecar, &list));
        assert_eq!(read_cached_hash(&sidecar).as_deref(), Some("aa"));

        // Source changed since: import again.
        assert!(needs_import("bb", &sidecar, &list));
    }
}

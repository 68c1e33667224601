//! Integration tests for rockdeb dependency resolution.
//!
//! These tests run whole resolution scenarios against in-memory indexes:
//! direct filtering, transitive closures and build selection filtering.

mod helpers;

use helpers::{detached_packager, index_with, packager_with, pkg_with_deps};
use rockdeb::deps::{BuildSelection, DependencyManager, FilterPolicy, GemTable};
use rockdeb::pkginfo::{BuildType, Workspace};
use rockdeb::platform::{Packager, TargetPlatform};

// =============================================================================
// Direct dependency filtering
// =============================================================================

#[test]
fn test_direct_dependencies_against_released_ancestor() {
    // tools/p depends on a rock package an ancestor already released, an
    // OS package, and a gem nobody provides.
    let index = index_with(
        &["libfoo-dev"],
        &[("master-23.06", "rock-master-23.06-tools-q")],
    );
    let packager = packager_with(index);
    let workspace = Workspace::new(vec![
        pkg_with_deps(
            "tools/p",
            BuildType::Cmake,
            &["tools/q"],
            &["libfoo-dev"],
            &["rice"],
        ),
        pkg_with_deps("tools/q", BuildType::Cmake, &[], &[], &[]),
    ])
    .unwrap();
    let policy = FilterPolicy::empty();
    let gems = GemTable::new();
    let manager = DependencyManager::new(&packager, &workspace, &policy, &gems);

    let p = workspace.require("tools/p").unwrap();
    let filtered = manager.filtered_dependencies(p, true).unwrap();

    // The ancestor provides tools/q, so its debian name is rewritten.
    assert_eq!(filtered.rock, vec!["rock-master-23.06-tools-q"]);
    // The gem has no provider, so the self-contained list converts it to
    // an own-release package.
    assert_eq!(
        filtered.osdeps,
        vec!["libfoo-dev", "rock-master-24.01-ruby-rice"]
    );
    assert!(filtered.nonnative.is_empty());
}

#[test]
fn test_unprovided_rock_dependency_builds_in_own_release() {
    let index = index_with(&["libboost-dev"], &[]);
    let packager = packager_with(index);
    let workspace = Workspace::new(vec![
        pkg_with_deps(
            "base/p",
            BuildType::Cmake,
            &["base/q"],
            &["libboost-dev", "ruby2.5"],
            &[],
        ),
        pkg_with_deps("base/q", BuildType::Cmake, &[], &[], &[]),
    ])
    .unwrap();
    let policy = FilterPolicy::empty();
    let gems = GemTable::new();
    let manager = DependencyManager::new(&packager, &workspace, &policy, &gems);

    let p = workspace.require("base/p").unwrap();
    let filtered = manager.filtered_dependencies(p, true).unwrap();

    assert_eq!(filtered.osdeps, vec!["libboost-dev"]);
    assert_eq!(filtered.rock, vec!["rock-master-24.01-base-q"]);
}

#[test]
fn test_optional_pattern_kept_only_when_provided() {
    let workspace = Workspace::new(Vec::new()).unwrap();
    let policy = FilterPolicy::new(&["^libqwt.*".to_string()], &[]).unwrap();
    let gems = GemTable::new();
    let pkg = pkg_with_deps(
        "gui/plotting",
        BuildType::Cmake,
        &[],
        &["libqwt-dev", "libbase-dev"],
        &[],
    );

    let provided = packager_with(index_with(&["libqwt-dev"], &[]));
    let manager = DependencyManager::new(&provided, &workspace, &policy, &gems);
    let filtered = manager.filtered_dependencies(&pkg, true).unwrap();
    assert_eq!(filtered.osdeps, vec!["libqwt-dev", "libbase-dev"]);

    let missing = packager_with(index_with(&[], &[]));
    let manager = DependencyManager::new(&missing, &workspace, &policy, &gems);
    let filtered = manager.filtered_dependencies(&pkg, true).unwrap();
    assert_eq!(filtered.osdeps, vec!["libbase-dev"]);
}

#[test]
fn test_excluded_pattern_drops_even_provided_packages() {
    let workspace = Workspace::new(Vec::new()).unwrap();
    let policy = FilterPolicy::new(&[], &["^nvidia-".to_string()]).unwrap();
    let gems = GemTable::new();
    let packager = packager_with(index_with(&["nvidia-cuda-toolkit", "libeigen3-dev"], &[]));
    let manager = DependencyManager::new(&packager, &workspace, &policy, &gems);

    let pkg = pkg_with_deps(
        "perception/depth",
        BuildType::Cmake,
        &[],
        &["nvidia-cuda-toolkit", "libeigen3-dev"],
        &[],
    );
    let filtered = manager.filtered_dependencies(&pkg, true).unwrap();
    assert_eq!(filtered.osdeps, vec!["libeigen3-dev"]);
}

#[test]
fn test_dangling_rock_reference_fails_only_that_package() {
    let packager = packager_with(index_with(&[], &[]));
    let workspace = Workspace::new(vec![
        pkg_with_deps("tools/p", BuildType::Cmake, &["missing/pkg"], &[], &[]),
        pkg_with_deps("base/types", BuildType::Cmake, &[], &["libeigen3-dev"], &[]),
    ])
    .unwrap();
    let policy = FilterPolicy::empty();
    let gems = GemTable::new();
    let manager = DependencyManager::new(&packager, &workspace, &policy, &gems);

    let err = manager
        .filtered_dependencies(workspace.require("tools/p").unwrap(), true)
        .unwrap_err();
    assert!(format!("{:#}", err).contains("missing/pkg"));
    assert!(format!("{:#}", err).contains("tools/p"));

    let ok = manager
        .filtered_dependencies(workspace.require("base/types").unwrap(), true)
        .unwrap();
    assert_eq!(ok.osdeps, vec!["libeigen3-dev"]);
}

// =============================================================================
// Transitive closure
// =============================================================================

#[test]
fn test_recursive_closure_order_and_gem_expansion() {
    let index = index_with(&["libeigen3-dev"], &[]);
    let packager = packager_with(index);
    let workspace = Workspace::new(vec![
        pkg_with_deps(
            "drivers/iodrivers_base",
            BuildType::Cmake,
            &["base/types"],
            &[],
            &[],
        ),
        pkg_with_deps(
            "base/types",
            BuildType::Cmake,
            &[],
            &["libeigen3-dev"],
            &["rice"],
        ),
    ])
    .unwrap();
    let policy = FilterPolicy::empty();
    let mut gems = GemTable::new();
    gems.insert("rice", &["rake"]);
    gems.insert("rake", &[]);
    let manager = DependencyManager::new(&packager, &workspace, &policy, &gems);

    let root = workspace.require("drivers/iodrivers_base").unwrap();
    let all = manager.recursive_dependencies(root).unwrap();

    // Rock names first, then osdeps, then the expanded gem closure.
    assert_eq!(
        all,
        vec!["rock-base-types", "libeigen3-dev", "rake", "rice"]
    );
}

#[test]
fn test_ancestor_declaration_order_is_authoritative() {
    let index = index_with(
        &[],
        &[
            ("master-23.06", "rock-master-23.06-tools-q"),
            ("master-22.11", "rock-master-22.11-tools-q"),
        ],
    );
    let workspace = Workspace::new(vec![
        pkg_with_deps("tools/p", BuildType::Cmake, &["tools/q"], &[], &[]),
        pkg_with_deps("tools/q", BuildType::Cmake, &[], &[], &[]),
    ])
    .unwrap();
    let policy = FilterPolicy::empty();
    let gems = GemTable::new();

    let target = TargetPlatform::new("bookworm", "amd64").unwrap();
    let release = TargetPlatform::new("master-24.01", "amd64")
        .unwrap()
        .with_ancestors(&["master-23.06".to_string(), "master-22.11".to_string()])
        .unwrap();
    let packager = Packager::new(target, Some(release), index.clone());
    let manager = DependencyManager::new(&packager, &workspace, &policy, &gems);
    let filtered = manager
        .filtered_dependencies(workspace.require("tools/p").unwrap(), true)
        .unwrap();
    assert_eq!(filtered.rock, vec!["rock-master-23.06-tools-q"]);

    // Flip the declaration order: the other ancestor now wins.
    let target = TargetPlatform::new("bookworm", "amd64").unwrap();
    let release = TargetPlatform::new("master-24.01", "amd64")
        .unwrap()
        .with_ancestors(&["master-22.11".to_string(), "master-23.06".to_string()])
        .unwrap();
    let packager = Packager::new(target, Some(release), index);
    let manager = DependencyManager::new(&packager, &workspace, &policy, &gems);
    let filtered = manager
        .filtered_dependencies(workspace.require("tools/p").unwrap(), true)
        .unwrap();
    assert_eq!(filtered.rock, vec!["rock-master-22.11-tools-q"]);
}

// =============================================================================
// Build selection filtering
// =============================================================================

#[test]
fn test_selection_filter_drops_released_packages_and_gems() {
    let index = index_with(
        &[],
        &[
            ("master-23.06", "rock-master-23.06-tools-q"),
            ("master-23.06", "rock-master-23.06-ruby-rice"),
        ],
    );
    let packager = packager_with(index);
    let workspace = Workspace::new(vec![
        pkg_with_deps("tools/q", BuildType::Cmake, &[], &[], &[]),
        pkg_with_deps("base/types", BuildType::Cmake, &[], &[], &[]),
    ])
    .unwrap();
    let policy = FilterPolicy::empty();
    let gems = GemTable::new();
    let manager = DependencyManager::new(&packager, &workspace, &policy, &gems);

    let selection = BuildSelection {
        packages: vec!["tools/q".to_string(), "base/types".to_string()],
        gems: vec!["rice".to_string(), "rake".to_string()],
        gem_versions: [
            ("rice".to_string(), ">= 4.0".to_string()),
            ("rake".to_string(), ">= 13.0".to_string()),
        ]
        .into_iter()
        .collect(),
        extra_gems: Vec::new(),
        extra_osdeps: vec!["cmake".to_string()],
    };

    let filtered = manager.filter_all_required_packages(&selection);

    assert_eq!(filtered.packages, vec!["base/types"]);
    assert_eq!(filtered.gems, vec!["rake"]);
    // The dropped gem takes its version pin with it.
    assert!(!filtered.gem_versions.contains_key("rice"));
    assert_eq!(filtered.gem_versions["rake"], ">= 13.0");
    assert_eq!(filtered.extra_osdeps, vec!["cmake"]);
}

#[test]
fn test_selection_filter_is_identity_when_detached() {
    let packager = detached_packager(index_with(&[], &[]));
    let workspace = Workspace::new(Vec::new()).unwrap();
    let policy = FilterPolicy::empty();
    let gems = GemTable::new();
    let manager = DependencyManager::new(&packager, &workspace, &policy, &gems);

    let selection = BuildSelection {
        packages: vec!["tools/q".to_string()],
        gems: vec!["rice".to_string()],
        gem_versions: [("rice".to_string(), ">= 4.0".to_string())]
            .into_iter()
            .collect(),
        extra_gems: vec!["rake".to_string()],
        extra_osdeps: vec!["cmake".to_string()],
    };

    let filtered = manager.filter_all_required_packages(&selection);
    assert_eq!(filtered, selection);
}

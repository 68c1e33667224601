//! Direct and transitive dependency resolution.
//!
//! The manager computes dependency lists fresh on every call: nothing is
//! cached on descriptors and no package context is stashed between calls.
//! All lookup state (platforms, index, workspace, policy, gem resolver)
//! comes in by reference when the manager is built.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::naming;
use crate::pkginfo::{GemDependency, NamedDependency, PackageInfo, Workspace};
use crate::platform::{Packager, TargetPlatform};

use super::gems::GemResolver;
use super::policy::{FilterPolicy, INTROSPECTION_BACKENDS};

/// Per-namespace output of direct dependency filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredDependencies {
    /// Debian names of rock dependencies, release-qualified and sorted.
    pub rock: Vec<String>,
    /// OS package names, declaration order, after policy filtering.
    pub osdeps: Vec<String>,
    /// Gem dependencies left for external resolution.
    pub nonnative: Vec<GemDependency>,
}

/// A flat batch of packages and gems selected for building.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSelection {
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub gems: Vec<String>,
    #[serde(default)]
    pub gem_versions: BTreeMap<String, String>,
    #[serde(default)]
    pub extra_gems: Vec<String>,
    #[serde(default)]
    pub extra_osdeps: Vec<String>,
}

/// Resolves package dependencies against the configured platforms.
pub struct DependencyManager<'a> {
    packager: &'a Packager,
    workspace: &'a Workspace,
    policy: &'a FilterPolicy,
    gems: &'a dyn GemResolver,
}

impl<'a> DependencyManager<'a> {
    pub fn new(
        packager: &'a Packager,
        workspace: &'a Workspace,
        policy: &'a FilterPolicy,
        gems: &'a dyn GemResolver,
    ) -> Self {
        Self {
            packager,
            workspace,
            policy,
            gems,
        }
    }

    pub fn packager(&self) -> &Packager {
        self.packager
    }

    /// Compute a package's direct dependencies, filtered and renamed.
    ///
    /// Operates on copies of the declared sets; calling twice with the same
    /// arguments yields the same result. With `with_release_prefix` the
    /// output is fully self-contained: every gem is converted to a debian
    /// name and moved into osdeps.
    pub fn filtered_dependencies(
        &self,
        pkg: &PackageInfo,
        with_release_prefix: bool,
    ) -> Result<FilteredDependencies> {
        let target = self.packager.target_platform();
        let index = self.packager.index();

        let mut rock = pkg.dependencies.rock.clone();
        let mut osdeps = pkg.dependencies.osdeps.clone();
        osdeps.extend(pkg.dependencies.extra_osdeps.iter().cloned());
        let mut nonnative = pkg.dependencies.nonnative.clone();
        nonnative.extend(pkg.dependencies.extra_gems.iter().cloned());

        // Typelib packages name an introspection backend as a rock
        // dependency, but the backend always comes from the OS.
        if self.policy.needs_introspection_backend(&pkg.name) {
            rock.retain(|name| !self.policy.is_introspection_backend(name));
            osdeps.push(self.introspection_backend(&pkg.name)?);
        }

        let mut kept = Vec::new();
        for name in osdeps {
            if self.policy.is_optional(&name) && !target.contains(index, &name) {
                continue;
            }
            if self.policy.is_excluded(&name) {
                continue;
            }
            if self.policy.is_ruby_interpreter(&name) {
                continue;
            }
            kept.push(name);
        }
        let mut osdeps = kept;

        // Gems that the OS or an ancestor already provides become osdeps.
        // A self-contained list converts the rest as well; otherwise they
        // stay behind as gem name/version pairs.
        let mut remaining = Vec::new();
        for gem in nonnative {
            let (resolved, is_osdep) =
                self.native_dependency_name(NamedDependency::Plain(&gem.name), None);
            if is_osdep || with_release_prefix {
                osdeps.push(resolved);
            } else {
                remaining.push(gem);
            }
        }
        let nonnative = remaining;

        let mut rock_named = Vec::new();
        for name in &rock {
            let info = self
                .workspace
                .require(name)
                .with_context(|| format!("While resolving rock dependencies of '{}'", pkg.name))?;
            let debian = self.packager.debian_name(info, with_release_prefix);
            rock_named.push(self.packager.package_release_name(&debian));
        }
        rock_named.sort();

        Ok(FilteredDependencies {
            rock: rock_named,
            osdeps,
            nonnative,
        })
    }

    /// Pick the introspection backend the target platform provides.
    fn introspection_backend(&self, package_name: &str) -> Result<String> {
        let target = self.packager.target_platform();
        let index = self.packager.index();

        for backend in INTROSPECTION_BACKENDS {
            if target.contains(index, backend) {
                return Ok(backend.to_string());
            }
        }
        bail!(
            "Package '{}' needs a C++ introspection backend, but platform '{}' provides neither of: {}",
            package_name,
            target.release_name(),
            INTROSPECTION_BACKENDS.join(", ")
        )
    }

    /// Resolve a dependency to the debian name of whoever provides it.
    ///
    /// Returns the name and whether it is natively available. An exact OS
    /// or ancestor-released match wins over any rock-built interpretation.
    /// Failing that, an ancestor that ships the release-qualified rock
    /// package provides it. Failing that too, the name is qualified to the
    /// current release: the package gets built here. This never fails.
    pub fn native_dependency_name(
        &self,
        dep: NamedDependency,
        platform: Option<&TargetPlatform>,
    ) -> (String, bool) {
        let platform = platform.unwrap_or_else(|| self.packager.target_platform());
        let index = self.packager.index();
        let release_platform = self.packager.release_platform();

        let verbatim = dep.name().to_string();
        let debianized = match dep {
            NamedDependency::Plain(name) => self.packager.debian_ruby_name(name, false, None),
            NamedDependency::Package(info) => self.packager.debian_name(info, false),
        };

        let mut candidates = vec![verbatim.clone()];
        if debianized != verbatim {
            candidates.push(debianized);
        }

        for candidate in &candidates {
            let native = platform.ancestor_contains(index, candidate)
                || release_platform
                    .is_some_and(|release| release.released_in_ancestor(index, candidate).is_some());
            if native {
                return (candidate.clone(), true);
            }
        }

        if let Some(release) = release_platform {
            for ancestor in release.ancestors() {
                let qualified = match dep {
                    NamedDependency::Plain(name) => {
                        self.packager.debian_ruby_name(name, true, Some(ancestor))
                    }
                    NamedDependency::Package(info) => {
                        self.packager.debian_name_in(info, Some(ancestor))
                    }
                };
                if index.contains(ancestor, release.architecture(), &qualified) {
                    return (qualified, false);
                }
            }
        }

        let own = match dep {
            NamedDependency::Plain(name) => self.packager.debian_ruby_name(name, true, None),
            NamedDependency::Package(info) => self.packager.debian_name(info, true),
        };
        (own, false)
    }

    /// The rock-to-rock build edges of a package, as descriptors.
    ///
    /// For typelib packages the introspection backends are dropped from
    /// the edge list; filtering satisfies them natively instead.
    pub fn required_rock_packages(&self, pkg: &PackageInfo) -> Result<Vec<&PackageInfo>> {
        let substitute = self.policy.needs_introspection_backend(&pkg.name);
        let mut result = Vec::new();
        for name in &pkg.dependencies.rock {
            if substitute && self.policy.is_introspection_backend(name) {
                continue;
            }
            let info = self
                .workspace
                .require(name)
                .with_context(|| format!("While resolving rock dependencies of '{}'", pkg.name))?;
            result.push(info);
        }
        Ok(result)
    }

    /// Every package name a package ultimately requires.
    ///
    /// Walks rock-to-rock build edges, accumulating each visited package's
    /// filtered dependencies per namespace with first-seen order. A
    /// non-empty gem list is expanded once through the gem resolver. The
    /// flattened result is deduplicated; namespace tags are discarded.
    ///
    /// Each package is expanded at most once per traversal, and a cycle
    /// among rock dependencies is a hard error naming the chain.
    pub fn recursive_dependencies(&self, pkg: &PackageInfo) -> Result<Vec<String>> {
        let mut collected = Collected::default();
        let mut done = BTreeSet::new();
        let mut in_progress = Vec::new();
        self.collect(pkg, &mut done, &mut in_progress, &mut collected)?;

        let gem_names: Vec<String> = if collected.nonnative.is_empty() {
            Vec::new()
        } else {
            self.gems
                .resolve_all(&collected.nonnative)
                .with_context(|| format!("While expanding gem dependencies of '{}'", pkg.name))?
                .into_keys()
                .collect()
        };

        let mut seen = BTreeSet::new();
        let mut all = Vec::new();
        for name in collected
            .rock
            .into_iter()
            .chain(collected.osdeps)
            .chain(gem_names)
        {
            if seen.insert(name.clone()) {
                all.push(name);
            }
        }
        Ok(all)
    }

    fn collect(
        &self,
        pkg: &PackageInfo,
        done: &mut BTreeSet<String>,
        in_progress: &mut Vec<String>,
        collected: &mut Collected,
    ) -> Result<()> {
        if in_progress.iter().any(|name| name == &pkg.name) {
            bail!(
                "Rock dependency cycle detected: {} -> {}",
                in_progress.join(" -> "),
                pkg.name
            );
        }
        if done.contains(&pkg.name) {
            return Ok(());
        }

        in_progress.push(pkg.name.clone());
        // Not self-contained: gems lacking a native provider must stay in
        // the nonnative set so the closure can expand them through the gem
        // resolver afterwards.
        let filtered = self.filtered_dependencies(pkg, false)?;
        collected.add(filtered);

        for dep in self.required_rock_packages(pkg)? {
            self.collect(dep, done, in_progress, collected)?;
        }
        in_progress.pop();
        done.insert(pkg.name.clone());
        Ok(())
    }

    /// Drop everything from a build selection that an ancestor release
    /// already provides.
    ///
    /// Each rock package and gem is tried under its plain debian name, its
    /// ruby-prefixed name, and each ancestor's release-qualified name. Gem
    /// version pins follow their gems out. `extra_osdeps` pass through.
    /// Without a release platform this is the identity.
    pub fn filter_all_required_packages(&self, selection: &BuildSelection) -> BuildSelection {
        let Some(release) = self.packager.release_platform() else {
            return selection.clone();
        };
        let index = self.packager.index();

        let mut result = selection.clone();

        result.packages.retain(|name| {
            let Some(info) = self.workspace.get(name) else {
                eprintln!(
                    "  [WARN] Package '{}' is not in the workspace manifest, keeping it in the selection",
                    name
                );
                return true;
            };

            let mut candidates = vec![self.packager.debian_name(info, false)];
            let ruby_form = naming::ruby_name(&info.name);
            if !candidates.contains(&ruby_form) {
                candidates.push(ruby_form);
            }
            for ancestor in release.ancestors() {
                candidates.push(self.packager.debian_name_in(info, Some(ancestor)));
            }

            !candidates
                .iter()
                .any(|candidate| release.released_in_ancestor(index, candidate).is_some())
        });

        let mut dropped_gems = BTreeSet::new();
        let mut keep_gem = |gem: &String| {
            let mut candidates = vec![gem.clone(), naming::ruby_name(gem)];
            for ancestor in release.ancestors() {
                candidates.push(naming::ruby_release_name(ancestor, gem));
            }
            let provided = candidates
                .iter()
                .any(|candidate| release.released_in_ancestor(index, candidate).is_some());
            if provided {
                dropped_gems.insert(gem.clone());
            }
            !provided
        };
        result.gems.retain(&mut keep_gem);
        result.extra_gems.retain(&mut keep_gem);
        result
            .gem_versions
            .retain(|gem, _| !dropped_gems.contains(gem));

        result
    }
}

/// Namespace lists accumulated over a traversal, first-seen order.
#[derive(Default)]
struct Collected {
    rock: Vec<String>,
    rock_seen: BTreeSet<String>,
    osdeps: Vec<String>,
    osdeps_seen: BTreeSet<String>,
    nonnative: Vec<GemDependency>,
    nonnative_seen: BTreeSet<String>,
}

impl Collected {
    fn add(&mut self, filtered: FilteredDependencies) {
        for name in filtered.rock {
            if self.rock_seen.insert(name.clone()) {
                self.rock.push(name);
            }
        }
        for name in filtered.osdeps {
            if self.osdeps_seen.insert(name.clone()) {
                self.osdeps.push(name);
            }
        }
        for gem in filtered.nonnative {
            if self.nonnative_seen.insert(gem.name.clone()) {
                self.nonnative.push(gem);
            }
        }
    }
}

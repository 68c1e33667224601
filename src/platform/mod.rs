//! Target platforms and the release ancestor chain.
//!
//! A platform is a (release name, architecture) pair: either an OS
//! distribution like `bookworm` or a Rock release like `master-24.01`.
//! A Rock release additionally declares an ordered list of ancestor
//! releases whose already-built packages it reuses instead of rebuilding.
//! Declaration order is authoritative: the first ancestor that provides a
//! package wins, no matter what later ancestors ship.

pub mod import;
pub mod index;

use anyhow::{bail, Result};
use regex::Regex;

use crate::config::Config;
use crate::naming;
use crate::pkginfo::{BuildType, PackageInfo};
use index::PackageIndex;

/// Pattern a release or distribution name must match.
const RELEASE_NAME_PATTERN: &str = "^[A-Za-z][A-Za-z0-9.-]*$";

/// A (release, architecture) pair plus its declared ancestor chain.
///
/// Lookup state lives in the [`PackageIndex`]; the platform itself is a
/// lightweight identity that is threaded through each call together with
/// the index, so nothing is stashed between calls.
#[derive(Debug, Clone)]
pub struct TargetPlatform {
    release_name: String,
    architecture: String,
    ancestors: Vec<String>,
}

impl TargetPlatform {
    /// Create a platform, validating the release name.
    ///
    /// Names must start with a letter and may contain letters, digits,
    /// dashes and dots. Anything else is a configuration error.
    pub fn new(release_name: &str, architecture: &str) -> Result<Self> {
        validate_release_name(release_name)?;
        Ok(Self {
            release_name: release_name.to_string(),
            architecture: architecture.to_string(),
            ancestors: Vec::new(),
        })
    }

    /// Attach the declared ancestor chain.
    ///
    /// The platform's own name is dropped if the configuration listed it
    /// first; ancestry lookups always check self before the chain anyway.
    pub fn with_ancestors(mut self, ancestors: &[String]) -> Result<Self> {
        for ancestor in ancestors {
            validate_release_name(ancestor)?;
        }
        self.ancestors = ancestors
            .iter()
            .filter(|a| a.as_str() != self.release_name)
            .cloned()
            .collect();
        Ok(self)
    }

    pub fn release_name(&self) -> &str {
        &self.release_name
    }

    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    /// Declared ancestors, own name excluded, declaration order preserved.
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    /// True if this platform's own index lists `name` verbatim.
    ///
    /// A release the index has never heard of simply provides nothing.
    pub fn contains(&self, index: &PackageIndex, name: &str) -> bool {
        index.contains(&self.release_name, &self.architecture, name)
    }

    /// True if this platform or any ancestor lists `name` verbatim.
    ///
    /// Checks self first, then ancestors in declaration order, and stops at
    /// the first match.
    pub fn ancestor_contains(&self, index: &PackageIndex, name: &str) -> bool {
        if self.contains(index, name) {
            return true;
        }
        self.released_in_ancestor(index, name).is_some()
    }

    /// The first declared ancestor whose index lists `name`, if any.
    ///
    /// Self is never considered; declaration order decides ties.
    pub fn released_in_ancestor<'a>(&'a self, index: &PackageIndex, name: &str) -> Option<&'a str> {
        self.ancestors
            .iter()
            .map(String::as_str)
            .find(|ancestor| index.contains(ancestor, &self.architecture, name))
    }

    /// Re-qualify a debian name to whichever release actually ships it.
    ///
    /// A name this release already provides is returned as-is. A name
    /// qualified to this release that an ancestor provides (under the
    /// ancestor's own prefix) is rewritten to the ancestor form. Everything
    /// else comes back unchanged, which for the usual own-release-qualified
    /// input means "build it here".
    pub fn package_release_name(&self, index: &PackageIndex, name: &str) -> String {
        if self.contains(index, name) {
            return name.to_string();
        }

        let own_prefix = naming::release_prefix(&self.release_name);
        if let Some(suffix) = name.strip_prefix(own_prefix.as_str()) {
            for ancestor in &self.ancestors {
                let candidate = format!("{}{}", naming::release_prefix(ancestor), suffix);
                if index.contains(ancestor, &self.architecture, &candidate) {
                    return candidate;
                }
            }
        }

        name.to_string()
    }
}

fn validate_release_name(name: &str) -> Result<()> {
    let pattern = Regex::new(RELEASE_NAME_PATTERN).expect("release name pattern is valid");
    if !pattern.is_match(name) {
        bail!(
            "Invalid release name '{}': must match {}",
            name,
            RELEASE_NAME_PATTERN
        );
    }
    Ok(())
}

/// The naming authority for generated packages.
///
/// Owns the package index, the OS distribution platform we resolve native
/// packages against, and (unless running detached) the Rock release
/// platform with its ancestor chain.
#[derive(Debug)]
pub struct Packager {
    target_platform: TargetPlatform,
    release_platform: Option<TargetPlatform>,
    index: PackageIndex,
}

impl Packager {
    pub fn new(
        target_platform: TargetPlatform,
        release_platform: Option<TargetPlatform>,
        index: PackageIndex,
    ) -> Self {
        Self {
            target_platform,
            release_platform,
            index,
        }
    }

    /// Assemble platforms and index from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let index = PackageIndex::load_dir(&config.index_dir)?;

        let target_platform = TargetPlatform::new(&config.distribution, &config.architecture)?;

        let release_platform = match &config.release_name {
            Some(release) => {
                let ancestors = config.ancestors_of(release);
                Some(TargetPlatform::new(release, &config.architecture)?.with_ancestors(&ancestors)?)
            }
            None => None,
        };

        Ok(Self::new(target_platform, release_platform, index))
    }

    /// The OS distribution platform native packages come from.
    pub fn target_platform(&self) -> &TargetPlatform {
        &self.target_platform
    }

    /// The Rock release platform, or None when building detached.
    pub fn release_platform(&self) -> Option<&TargetPlatform> {
        self.release_platform.as_ref()
    }

    pub fn rock_release_name(&self) -> Option<&str> {
        self.release_platform.as_ref().map(|p| p.release_name())
    }

    pub fn index(&self) -> &PackageIndex {
        &self.index
    }

    pub fn architecture(&self) -> &str {
        self.target_platform.architecture()
    }

    /// Debian name of a source-built package, build type aware.
    ///
    /// Gem-built packages get the ruby form; everything else the rock form.
    /// With `with_prefix` the name is qualified to the current release when
    /// one is configured.
    pub fn debian_name(&self, info: &PackageInfo, with_prefix: bool) -> String {
        self.debian_name_in(info, self.prefix_release(with_prefix))
    }

    /// Debian name of a source-built package qualified to a specific release.
    pub fn debian_name_in(&self, info: &PackageInfo, release: Option<&str>) -> String {
        match info.build_type {
            BuildType::Ruby => match release {
                Some(release) => naming::ruby_release_name(release, &info.name),
                None => naming::ruby_name(&info.name),
            },
            _ => match release {
                Some(release) => naming::rock_release_name(release, &info.name),
                None => naming::rock_name(&info.name),
            },
        }
    }

    /// Debian name of a gem.
    ///
    /// `release` overrides the current release; pass None with `with_prefix`
    /// to qualify to the current release, which in detached mode degrades to
    /// the unqualified ruby form.
    pub fn debian_ruby_name(&self, name: &str, with_prefix: bool, release: Option<&str>) -> String {
        let release = release.or_else(|| self.prefix_release(with_prefix));
        match release {
            Some(release) => naming::ruby_release_name(release, name),
            None => naming::ruby_name(name),
        }
    }

    /// Re-qualify a debian name to the release that actually ships it.
    ///
    /// Identity when no release platform is configured.
    pub fn package_release_name(&self, name: &str) -> String {
        match &self.release_platform {
            Some(platform) => platform.package_release_name(&self.index, name),
            None => name.to_string(),
        }
    }

    fn prefix_release(&self, with_prefix: bool) -> Option<&str> {
        if with_prefix {
            self.rock_release_name()
        } else {
            None
        }
    }

    /// Print the resolution setup in a human-readable form.
    pub fn print_status(&self) {
        println!("Target platform:");
        println!(
            "  Distribution:   {} ({})",
            self.target_platform.release_name(),
            self.target_platform.architecture()
        );
        match &self.release_platform {
            Some(platform) => {
                println!("  Rock release:   {}", platform.release_name());
                if platform.ancestors().is_empty() {
                    println!("  Ancestors:      (none)");
                } else {
                    println!("  Ancestors:      {}", platform.ancestors().join(" -> "));
                }
            }
            None => println!("  Rock release:   (detached)"),
        }
        println!("  Indexed names:  {}", self.index.len());
        for (release, arch) in self.index.known_platforms() {
            let count = self
                .index
                .packages(release, arch)
                .map(|names| names.len())
                .unwrap_or(0);
            println!("    {} ({}): {} packages", release, arch, count);
        }
    }
}

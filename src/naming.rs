//! Debian package name construction.
//!
//! Every package that leaves the build system gets a Debian-compatible name
//! derived from its logical name: lowercased, with path separators and
//! underscores flattened to dashes. Source-built packages carry a `rock-`
//! prefix, gem-built packages a `ruby-` prefix, and both can additionally be
//! qualified with the release that ships them ("rock-master-24.01-...").

/// Flatten a logical package name into its Debian-safe form.
///
/// Lowercases and replaces `/` and `_` with `-`, so
/// `drivers/iodrivers_base` becomes `drivers-iodrivers-base`.
pub fn canonize(name: &str) -> String {
    name.to_lowercase().replace(['/', '_'], "-")
}

/// Debian name of a source-built package without a release qualifier.
pub fn rock_name(name: &str) -> String {
    format!("rock-{}", canonize(name))
}

/// Debian name of a source-built package qualified to a release.
pub fn rock_release_name(release: &str, name: &str) -> String {
    format!("{}{}", release_prefix(release), canonize(name))
}

/// Debian name of a gem package without a release qualifier.
pub fn ruby_name(name: &str) -> String {
    format!("ruby-{}", canonize(name))
}

/// Debian name of a gem package qualified to a release.
pub fn ruby_release_name(release: &str, name: &str) -> String {
    format!("{}ruby-{}", release_prefix(release), canonize(name))
}

/// The name prefix shared by all packages a release ships.
pub fn release_prefix(release: &str) -> String {
    format!("rock-{}-", release)
}

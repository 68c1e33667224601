//! Filtering policy applied to OS dependencies.
//!
//! Pattern lists come from the configuration as regular expressions and are
//! compiled exactly once, when the policy is built. A pattern that does not
//! compile is a configuration error at load time, not a surprise during
//! resolution.

use anyhow::{Context, Result};
use regex::Regex;

/// Mutually exclusive C++ introspection backends, preferred order first.
///
/// Typelib packages name these as rock dependencies, but they are always
/// satisfied by the OS: exactly one of them moves to the osdeps set.
pub const INTROSPECTION_BACKENDS: [&str; 2] = ["castxml", "gccxml"];

/// Name suffix marking packages that need an introspection backend.
pub const TYPELIB_SUFFIX: &str = "typelib";

/// Matches ruby interpreter packages (ruby2.5, ruby1.9.3, ...).
///
/// The build environment ships every interpreter version, so these are
/// dropped from osdeps wherever build servers report them.
const RUBY_INTERPRETER_PATTERN: &str = "^ruby[0-9][0-9.]*$";

/// Compiled filter tables consulted by dependency resolution.
#[derive(Debug)]
pub struct FilterPolicy {
    optional: Vec<Regex>,
    excluded: Vec<Regex>,
    interpreter: Regex,
}

impl FilterPolicy {
    /// Compile the configured pattern lists.
    pub fn new(optional: &[String], excluded: &[String]) -> Result<Self> {
        Ok(Self {
            optional: compile_patterns(optional, "optional")?,
            excluded: compile_patterns(excluded, "excluded")?,
            interpreter: Regex::new(RUBY_INTERPRETER_PATTERN)
                .context("Failed to compile ruby interpreter pattern")?,
        })
    }

    /// A policy with empty pattern lists.
    pub fn empty() -> Self {
        Self {
            optional: Vec::new(),
            excluded: Vec::new(),
            interpreter: Regex::new(RUBY_INTERPRETER_PATTERN)
                .expect("ruby interpreter pattern is valid"),
        }
    }

    /// True if the name matches one of the "keep only if the target
    /// platform provides it" patterns.
    pub fn is_optional(&self, name: &str) -> bool {
        self.optional.iter().any(|pattern| pattern.is_match(name))
    }

    /// True if the name matches one of the unconditional drop patterns.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.iter().any(|pattern| pattern.is_match(name))
    }

    /// True for ruby interpreter packages like `ruby2.5`.
    pub fn is_ruby_interpreter(&self, name: &str) -> bool {
        self.interpreter.is_match(name)
    }

    /// True for packages that need an introspection backend substituted.
    pub fn needs_introspection_backend(&self, package_name: &str) -> bool {
        package_name.ends_with(TYPELIB_SUFFIX)
    }

    /// True for the backend names themselves.
    pub fn is_introspection_backend(&self, name: &str) -> bool {
        INTROSPECTION_BACKENDS.contains(&name)
    }
}

fn compile_patterns(patterns: &[String], kind: &str) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern)
                .with_context(|| format!("Invalid {} package pattern '{}'", kind, pattern))
        })
        .collect()
}

//! Fetch command - downloads release package lists from the archive.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::fetch::{self, FetchOptions};

/// Execute the fetch command.
///
/// With no explicit releases, fetches the configured release and its
/// whole ancestor chain so lookups see every layer.
pub fn cmd_fetch(config: &Config, releases: Vec<String>, quiet: bool) -> Result<()> {
    let releases = if releases.is_empty() {
        config.release_chain()
    } else {
        releases
    };
    if releases.is_empty() {
        bail!("No release configured. Set ROCK_RELEASE or pass release names to fetch");
    }

    let options = if quiet {
        FetchOptions::quiet()
    } else {
        FetchOptions::default()
    };

    for release in &releases {
        println!("Fetching package list for {}...", release);
        fetch::fetch_and_import(config, release, &options)?;
    }
    Ok(())
}

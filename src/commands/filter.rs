//! Filter command - drops ancestor-provided entries from a build selection.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::deps::{BuildSelection, DependencyManager, GemTable};

use super::load_resolution;

/// Execute the filter command.
///
/// The filtered selection goes to stdout (or `output`) as JSON; the
/// one-line summary goes to stderr so the output stays pipeable.
pub fn cmd_filter(config: &Config, selection_path: &Path, output: Option<&Path>) -> Result<()> {
    let json = std::fs::read_to_string(selection_path)
        .with_context(|| format!("Failed to read build selection {}", selection_path.display()))?;
    let selection: BuildSelection = serde_json::from_str(&json)
        .with_context(|| format!("Malformed build selection {}", selection_path.display()))?;

    let ctx = load_resolution(config)?;
    let gems = GemTable::new();
    let manager = DependencyManager::new(&ctx.packager, &ctx.workspace, &ctx.policy, &gems);

    let filtered = manager.filter_all_required_packages(&selection);

    let dropped_packages = selection.packages.len() - filtered.packages.len();
    let dropped_gems = selection.gems.len() + selection.extra_gems.len()
        - filtered.gems.len()
        - filtered.extra_gems.len();
    eprintln!(
        "Kept {} packages and {} gems ({} packages, {} gems already released)",
        filtered.packages.len(),
        filtered.gems.len() + filtered.extra_gems.len(),
        dropped_packages,
        dropped_gems
    );

    let rendered = serde_json::to_string_pretty(&filtered)?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

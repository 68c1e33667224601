//! Import command - ingests package lists into the index.

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::platform::import::{self, SourceFormat};

/// What to import.
pub enum ImportTarget {
    /// The OS distribution's package list (Packages or dpkg status file).
    Os { source: PathBuf, dpkg_status: bool },
    /// A rock release's package list (Packages file or plain list).
    Release {
        release: String,
        source: PathBuf,
        plain: bool,
    },
    /// Locally built .deb artifacts for a release.
    Debs { release: String, dir: PathBuf },
}

/// Execute the import command.
pub fn cmd_import(config: &Config, target: ImportTarget) -> Result<()> {
    match target {
        ImportTarget::Os { source, dpkg_status } => {
            let format = if dpkg_status {
                SourceFormat::DpkgStatus
            } else {
                SourceFormat::Packages
            };
            import::import_source(
                &config.index_dir,
                &config.distribution,
                &config.architecture,
                &source,
                format,
            )?;
        }
        ImportTarget::Release {
            release,
            source,
            plain,
        } => {
            let format = if plain {
                SourceFormat::PlainList
            } else {
                SourceFormat::Packages
            };
            import::import_source(
                &config.index_dir,
                &release,
                &config.architecture,
                &source,
                format,
            )?;
        }
        ImportTarget::Debs { release, dir } => {
            import::import_deb_dir(&config.index_dir, &release, &config.architecture, &dir)?;
        }
    }
    Ok(())
}

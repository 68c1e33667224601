//! Rockdeb - Debian package dependency resolution for layered Rock releases.
//!
//! Resolves workspace package dependencies into Debian package names,
//! reusing packages that ancestor releases already ship:
//! - Direct dependency filtering (policies, typelib backends, gems)
//! - Transitive closures over rock build edges
//! - Build selection filtering against released ancestors
#![allow(dead_code, unused_imports)]

mod cache;
mod commands;
mod config;
mod deps;
mod fetch;
mod naming;
mod pkginfo;
mod platform;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::Config;

#[derive(Parser)]
#[command(name = "rockdeb")]
#[command(about = "Debian package dependency resolution for layered Rock releases")]
#[command(
    after_help = "QUICK START:\n  rockdeb fetch              Download the configured release chain\n  rockdeb deps base/types    Show a package's dependencies\n  rockdeb deps -r base/types Show the transitive closure\n  rockdeb show platform      Show platforms and index contents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a package's dependencies after filtering and renaming
    Deps {
        /// Workspace package name (e.g. base/types)
        package: String,

        /// Follow rock dependencies transitively
        #[arg(short, long)]
        recursive: bool,

        /// Keep gems as gem names instead of release-qualified debian names
        #[arg(long)]
        no_release_prefix: bool,

        /// Resolve gems from a JSON table instead of the gem command
        #[arg(long, value_name = "FILE")]
        gem_deps: Option<PathBuf>,
    },

    /// Resolve one dependency name to the package providing it
    Resolve {
        /// Workspace package or gem name
        name: String,
    },

    /// Drop ancestor-provided entries from a build selection
    Filter {
        /// Build selection JSON file
        selection: PathBuf,

        /// Write the filtered selection here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import package lists into the index
    Import {
        #[command(subcommand)]
        what: ImportTarget,
    },

    /// Download release package lists from the archive
    Fetch {
        /// Releases to fetch (default: the configured release and ancestors)
        releases: Vec<String>,

        /// Skip progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },
}

#[derive(Subcommand)]
enum ImportTarget {
    /// Import the OS distribution's package list
    Os {
        /// Packages file (or dpkg status file with --dpkg-status)
        source: PathBuf,

        /// Treat the source as a dpkg status file
        #[arg(long)]
        dpkg_status: bool,
    },
    /// Import a rock release's package list
    Release {
        /// Release name (e.g. master-24.01)
        release: String,
        /// Packages file (or plain name-per-line list with --plain)
        source: PathBuf,
        /// Treat the source as a plain list, one package name per line
        #[arg(long)]
        plain: bool,
    },
    /// Index a release's locally built .deb artifacts
    Debs {
        /// Release name
        release: String,
        /// Directory containing .deb files
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
    /// Show resolution platforms and index contents
    Platform,
    /// Show workspace manifest contents
    Workspace,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    match cli.command {
        Commands::Deps {
            package,
            recursive,
            no_release_prefix,
            gem_deps,
        } => {
            commands::cmd_deps(
                &config,
                &package,
                recursive,
                no_release_prefix,
                gem_deps.as_deref(),
            )?;
        }

        Commands::Resolve { name } => {
            commands::cmd_resolve(&config, &name)?;
        }

        Commands::Filter { selection, output } => {
            commands::cmd_filter(&config, &selection, output.as_deref())?;
        }

        Commands::Import { what } => {
            let target = match what {
                ImportTarget::Os {
                    source,
                    dpkg_status,
                } => commands::import::ImportTarget::Os {
                    source,
                    dpkg_status,
                },
                ImportTarget::Release {
                    release,
                    source,
                    plain,
                } => commands::import::ImportTarget::Release {
                    release,
                    source,
                    plain,
                },
                ImportTarget::Debs { release, dir } => {
                    commands::import::ImportTarget::Debs { release, dir }
                }
            };
            commands::cmd_import(&config, target)?;
        }

        Commands::Fetch { releases, quiet } => {
            commands::cmd_fetch(&config, releases, quiet)?;
        }

        Commands::Show { what } => {
            let target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
                ShowTarget::Platform => commands::show::ShowTarget::Platform,
                ShowTarget::Workspace => commands::show::ShowTarget::Workspace,
            };
            commands::cmd_show(&config, target)?;
        }
    }

    Ok(())
}

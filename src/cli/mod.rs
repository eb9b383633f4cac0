//! CLI module for chnode
//!
//! Provides command-line interface using clap.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::*;
use crate::core::Config;

/// chnode - install and use different versions of Node.js
#[derive(Parser)]
#[command(name = "chnode")]
#[command(author = "chnode Contributors")]
#[command(version)]
#[command(about = "Install and use different versions of Node.js", long_about = None)]
#[command(disable_help_flag = true, disable_help_subcommand = true)]
pub struct Cli {
    /// Version to install and activate (major.minor.patch)
    #[arg(value_name = "VERSION")]
    pub target: Option<String>,

    /// Show usage and the currently linked binaries
    #[arg(short = 'h', long = "help")]
    pub help: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Global prefix receiving the bin symlinks
    #[arg(long, global = true, value_name = "DIR")]
    pub prefix: Option<PathBuf>,

    /// Directory holding cached versions
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Base URL of the release distribution
    #[arg(long, global = true, value_name = "URL")]
    pub dist_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Activate the version pinned in the project's version file
    Use(use_file::UseArgs),

    /// Show the active version and its links
    Current,

    /// List cached versions
    #[command(visible_alias = "ls")]
    List,

    /// Remove a cached version
    #[command(visible_aliases = ["rm", "uninstall"])]
    Remove(remove::RemoveArgs),

    /// Show usage and the currently linked binaries
    Help,
}

impl Cli {
    /// Apply command-line overrides on top of loaded configuration
    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(ref prefix) = self.prefix {
            config.dirs.prefix = prefix.clone();
        }

        if let Some(ref cache_dir) = self.cache_dir {
            config.dirs.cache_dir = Some(cache_dir.clone());
        }

        if let Some(ref url) = self.dist_url {
            config.dist.url = url.clone();
        }

        if self.quiet || self.json {
            config.network.progress = false;
        }

        config
    }
}

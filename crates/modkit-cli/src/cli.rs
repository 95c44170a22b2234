//! CLI argument definitions for modkit.
//!
//! Uses `clap` derive macros. Each command corresponds to a handler in the
//! [`super::commands`] module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use modkit_core::game_version::GameVersion;
use modkit_resolver::options::Preset;

#[derive(Parser, Debug)]
#[command(
    name = "modkit",
    version,
    about = "Relationship resolver for game mod registries",
    long_about = "modkit works out which modules must be installed to satisfy a request: \
                  dependencies, virtual providers, conflicts, DLC and autodetected DLLs, \
                  read from a local registry snapshot."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Where the registry and install state come from.
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Registry snapshot: a JSON array of module records
    #[arg(long, env = "MODKIT_REGISTRY")]
    pub registry: PathBuf,

    /// Installed state: installed modules, DLLs and DLC
    #[arg(long)]
    pub installed: Option<PathBuf>,

    /// Game version to resolve for (repeatable; defaults to [game] versions in config)
    #[arg(long = "game-version")]
    pub game_versions: Vec<GameVersion>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the modules needed to install the given identifiers
    Resolve {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Modules to install, as identifier or identifier=version
        #[arg(required = true)]
        modules: Vec<String>,
        /// Installed modules to remove (comma-separated or repeated)
        #[arg(long, value_delimiter = ',')]
        remove: Vec<String>,
        /// Resolution policy
        #[arg(long, value_enum, default_value_t = PresetArg::Default)]
        preset: PresetArg,
        /// Report conflicts instead of failing on them
        #[arg(long)]
        proceed: bool,
        /// Print the selection tree instead of a flat list
        #[arg(long, conflicts_with = "json")]
        tree: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the installed state for unmet dependencies and conflicts
    Check {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// List installed modules that removing the given ones would break
    ReverseDeps {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Installed modules to remove
        #[arg(required = true)]
        modules: Vec<String>,
    },

    /// Explain why a module is part of a resolution
    Why {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Module to explain
        target: String,
        /// Modules to install
        #[arg(required = true)]
        modules: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresetArg {
    Default,
    DependsOnly,
    KitchenSink,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Default => Preset::Default,
            PresetArg::DependsOnly => Preset::DependsOnly,
            PresetArg::KitchenSink => Preset::KitchenSink,
        }
    }
}

/// Parse CLI arguments from `std::env::args`.
pub fn parse() -> Cli {
    Cli::parse()
}

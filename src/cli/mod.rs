//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations. Archives are handled as
//! directory mirrors (see [`MemoryArchive::load_dir`]).

mod convert;
mod edit;
mod inspect;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::archive::MemoryArchive;
use crate::compress::Passthrough;
use crate::config::{load_config, merge_cli_overrides, CliOverrides, PuzzleConfig};
use crate::tileset::Tileset;

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Puzzle - inspect, unpack and repack game tilesets
#[derive(Parser)]
#[command(name = "puzzle")]
#[command(about = "Puzzle - inspect, unpack and repack game tilesets")]
#[command(version)]
pub struct Cli {
    /// Path to puzzle.toml (default: discovered from the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a summary of a tileset archive
    Info {
        /// Archive directory
        archive: PathBuf,
    },

    /// List the objects of a tileset
    Objects {
        /// Archive directory
        archive: PathBuf,

        /// Only show this object
        #[arg(long)]
        index: Option<usize>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Describe the behavior of one tile
    Tile {
        /// Archive directory
        archive: PathBuf,

        /// Tile index (0-255)
        index: usize,
    },

    /// Export the tile sheet and manifest from an archive
    Unpack {
        /// Archive directory
        archive: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Force tile alpha to opaque in the sheet
        #[arg(long)]
        opaque: bool,

        /// Also write the bordered 1024x256 atlas to this file name
        #[arg(long)]
        atlas: Option<String>,
    },

    /// Build an archive from a tile sheet and manifest
    Pack {
        /// Directory holding the sheet and manifest
        input: PathBuf,

        /// Archive directory to write into
        #[arg(short, long)]
        output: PathBuf,

        /// Internal tileset name (overrides the manifest)
        #[arg(long)]
        name: Option<String>,

        /// Do not print compression progress
        #[arg(long)]
        quiet: bool,
    },

    /// Modify a tileset archive in place
    Edit {
        /// Archive directory
        archive: PathBuf,

        /// Move the tileset to this slot (0-3)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=3))]
        slot: Option<u8>,

        /// Zero every behavior record
        #[arg(long)]
        clear_behaviors: bool,

        /// Remove every object
        #[arg(long)]
        clear_objects: bool,
    },
}

/// Load config, apply overrides, report errors the CLI way.
pub(crate) fn resolve_config(path: Option<&Path>, overrides: &CliOverrides) -> Result<PuzzleConfig, ExitCode> {
    match load_config(path) {
        Ok(mut config) => {
            merge_cli_overrides(&mut config, overrides);
            Ok(config)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

/// Read a directory archive and decode its tileset.
pub(crate) fn open_tileset(path: &Path) -> Result<(MemoryArchive, Tileset), ExitCode> {
    let archive = match MemoryArchive::load_dir(path) {
        Ok(archive) => archive,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode::from(EXIT_ERROR));
        }
    };
    match Tileset::from_archive(&archive, &Passthrough::new()) {
        Ok(tileset) => Ok((archive, tileset)),
        Err(e) => {
            eprintln!("Error: {}: {}", path.display(), e);
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

/// Initialise logging; `RUST_LOG` wins over the default filter.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Info { archive } => inspect::run_info(&archive),
        Commands::Objects { archive, index, json } => inspect::run_objects(&archive, index, json),
        Commands::Tile { archive, index } => inspect::run_tile(&archive, index),
        Commands::Unpack { archive, output, opaque, atlas } => {
            let overrides = CliOverrides { opaque: opaque.then_some(true), atlas, ..Default::default() };
            match resolve_config(config, &overrides) {
                Ok(config) => convert::run_unpack(&archive, &output, &config),
                Err(code) => code,
            }
        }
        Commands::Pack { input, output, name, quiet } => {
            let overrides = CliOverrides { progress: quiet.then_some(false), ..Default::default() };
            match resolve_config(config, &overrides) {
                Ok(config) => convert::run_pack(&input, &output, name.as_deref(), &config),
                Err(code) => code,
            }
        }
        Commands::Edit { archive, slot, clear_behaviors, clear_objects } => {
            edit::run_edit(&archive, slot, clear_behaviors, clear_objects)
        }
    }
}

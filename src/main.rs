//! Puzzle - Command-line tool for game tileset archives

use std::process::ExitCode;

use puzzle::cli;

fn main() -> ExitCode {
    cli::run()
}

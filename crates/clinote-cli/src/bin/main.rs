//! clinote command-line entry point
//!
//! # Exit Codes
//!
//! - 0: Note matches the expected structure
//! - 1: Structural defects found (or rejected by --strict)
//! - 3: Invalid input or arguments
//! - 4: File not found or inaccessible
//! - 5: Schema configuration error
//! - 10: Internal error

use clap::Parser;
use clinote_cli::{init_tracing, run_cli, ClinoteCli};

fn main() {
    let cli = ClinoteCli::parse();
    init_tracing(cli.verbose, cli.quiet, cli.log_json);

    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}

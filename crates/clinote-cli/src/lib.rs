//! Clinote CLI
//!
//! Command-line front end for the clinote response-processing pipeline.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Format service output read from stdin and print the note
//! clinote process --kind session < raw.txt
//!
//! # Full report as JSON, kind derived from the instructions
//! clinote process --input raw.txt --prompt "Write a clinical assessment" --format json
//!
//! # Validate already formatted text against a custom schema
//! clinote validate --input note.txt --config schema.toml
//!
//! # Print the effective configuration
//! clinote schema --format yaml
//! ```

pub mod commands;
pub mod output;

pub use commands::{ClinoteCli, Commands, ConfigArgs, NoteArgs};
pub use output::{AcronymReport, NoteReport, OutputFormat, SchemaReport};

use clinote_core::{ClinoteError, Result};

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Note matches the expected structure
    Success = 0,
    /// Structural defects were found
    ValidationError = 1,
    /// Invalid input or arguments
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// Schema configuration errors
    SchemaError = 5,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    pub fn from_validation(valid: bool) -> Self {
        if valid {
            ExitCode::Success
        } else {
            ExitCode::ValidationError
        }
    }

    /// Exit code for a failed command
    pub fn from_error(err: &ClinoteError) -> Self {
        match err {
            ClinoteError::InvalidInput(_) => ExitCode::InvalidInput,
            ClinoteError::File(_) => ExitCode::FileError,
            ClinoteError::Schema(_) | ClinoteError::Parse(_) => ExitCode::SchemaError,
            ClinoteError::EmptyResponse(_) | ClinoteError::FormatMismatch { .. } => {
                ExitCode::ValidationError
            }
            _ => ExitCode::InternalError,
        }
    }
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr so stdout carries only command output. `RUST_LOG`
/// directives are honored on top of the verbosity level.
pub fn init_tracing(verbose: u8, quiet: bool, json: bool) {
    let level = if quiet {
        tracing::Level::ERROR
    } else {
        match verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Dispatch a parsed command line
pub fn run(cli: ClinoteCli) -> Result<ExitCode> {
    match cli.command {
        Commands::Process {
            note,
            config,
            format,
            strict,
            metrics,
        } => commands::execute_process(note, config, format, strict, metrics),
        Commands::Validate {
            note,
            config,
            format,
        } => commands::execute_validate(note, config, format),
        Commands::Schema { config, format } => commands::execute_schema(config, format),
        Commands::Acronyms {
            input,
            config,
            format,
        } => commands::execute_acronyms(input, config, format),
    }
}

/// Run the CLI application
///
/// # Example
///
/// ```rust,no_run
/// use clap::Parser;
/// use clinote_cli::{run_cli, ClinoteCli};
///
/// fn main() {
///     let cli = ClinoteCli::parse();
///     let exit_code = run_cli(cli);
///     std::process::exit(exit_code.into());
/// }
/// ```
pub fn run_cli(cli: ClinoteCli) -> ExitCode {
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from_error(&e)
        }
    }
}

//! CLI command definitions for clinote
//!
//! Clap-based commands for formatting and validating generated notes and
//! inspecting the schema configuration.

use clap::{Args, Parser, Subcommand};
use clinote_core::{
    accept_output, ClinoteError, NoteKind, ProcessingMetricsRegistry, Processor, Result,
    SchemaConfig, Validator,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::output::{AcronymReport, NoteReport, OutputFormat, SchemaReport};
use crate::ExitCode;

/// Clinical note response processor
///
/// Formats generated note text into canonical sections and reports
/// structural defects.
#[derive(Parser, Debug)]
#[command(name = "clinote")]
#[command(about = "Format and validate generated clinical notes", long_about = None)]
#[command(version)]
pub struct ClinoteCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Schema configuration options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Schema configuration file (.toml, .yaml, .yml or .json)
    #[arg(short, long, env = "CLINOTE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the maximum number of sentences per section
    #[arg(long)]
    pub max_sentences: Option<usize>,
}

/// Note text source and kind
#[derive(Args, Debug, Clone, Default)]
pub struct NoteArgs {
    /// Input file; `-` or omitted reads stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Note kind
    #[arg(short, long, conflicts_with = "prompt")]
    pub kind: Option<NoteKind>,

    /// Derive the note kind from the instructions sent to the service
    #[arg(long)]
    pub prompt: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Format raw service output and validate the result
    ///
    /// The formatted note is always produced; defects only affect the exit
    /// code unless --strict is given.
    Process {
        #[command(flatten)]
        note: NoteArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: Option<OutputFormat>,

        /// Reject empty or invalid output with the user-facing message
        #[arg(long)]
        strict: bool,

        /// Print Prometheus metrics to stderr after processing
        #[arg(long)]
        metrics: bool,
    },

    /// Validate already formatted note text
    Validate {
        #[command(flatten)]
        note: NoteArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: Option<OutputFormat>,
    },

    /// Print the effective schema configuration
    Schema {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: Option<OutputFormat>,
    },

    /// Check that every configured acronym appears in a note
    Acronyms {
        /// Input file; `-` or omitted reads stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: Option<OutputFormat>,
    },
}

/// Execute the process command
pub fn execute_process(
    note: NoteArgs,
    config: ConfigArgs,
    format: Option<OutputFormat>,
    strict: bool,
    metrics: bool,
) -> Result<ExitCode> {
    let schema_config = Arc::new(load_config(&config)?);
    let text = read_input(note.input.as_deref())?;
    let kind = resolve_kind(&note);

    let registry = if metrics {
        Some(ProcessingMetricsRegistry::new()?)
    } else {
        None
    };
    let mut processor = Processor::new(schema_config);
    if let Some(registry) = &registry {
        processor = processor.with_metrics(registry.processing());
    }

    let processed = if strict {
        accept_output(&processor, &text, kind)?
    } else {
        processor.process_with_report(&text, kind)
    };

    let report = NoteReport::from_note(&processed);
    report.render(format.unwrap_or(OutputFormat::Text))?;

    if let Some(registry) = &registry {
        eprint!("{}", registry.encode_text()?);
    }

    Ok(ExitCode::from_validation(report.valid))
}

/// Execute the validate command
pub fn execute_validate(
    note: NoteArgs,
    config: ConfigArgs,
    format: Option<OutputFormat>,
) -> Result<ExitCode> {
    let schema_config = load_config(&config)?;
    let text = read_input(note.input.as_deref())?;
    let kind = resolve_kind(&note);

    let validation = Validator::new().validate(&text, &schema_config, kind);
    let report = NoteReport::from_validation(kind, &validation);
    report.render(format.unwrap_or(OutputFormat::Table))?;

    Ok(ExitCode::from_validation(report.valid))
}

/// Execute the schema command
pub fn execute_schema(config: ConfigArgs, format: Option<OutputFormat>) -> Result<ExitCode> {
    let schema_config = load_config(&config)?;
    SchemaReport::new(&schema_config).render(format.unwrap_or(OutputFormat::Table))?;
    Ok(ExitCode::Success)
}

/// Execute the acronyms command
pub fn execute_acronyms(
    input: Option<PathBuf>,
    config: ConfigArgs,
    format: Option<OutputFormat>,
) -> Result<ExitCode> {
    let schema_config = load_config(&config)?;
    let text = read_input(input.as_deref())?;

    let report = AcronymReport::new(&schema_config, &text);
    report.render(format.unwrap_or(OutputFormat::Table))?;

    Ok(ExitCode::from_validation(report.all_present))
}

/// Load the schema configuration, applying command-line overrides
pub fn load_config(args: &ConfigArgs) -> Result<SchemaConfig> {
    let config = match &args.config {
        Some(path) => SchemaConfig::from_file(path)?,
        None => SchemaConfig::default(),
    };

    match args.max_sentences {
        Some(max) => {
            let mut file = config.to_file();
            file.max_sentences_per_section = max;
            SchemaConfig::try_from(file)
        }
        None => Ok(config),
    }
}

/// Explicit kind wins, then the prompt, then session
pub fn resolve_kind(args: &NoteArgs) -> NoteKind {
    args.kind.unwrap_or_else(|| {
        args.prompt
            .as_deref()
            .map(NoteKind::from_prompt)
            .unwrap_or(NoteKind::Session)
    })
}

/// Read note text from a file, or stdin for `None` and `-`
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path).map_err(|e| {
            ClinoteError::file(format!(
                "Failed to read input file '{}': {}",
                path.display(),
                e
            ))
        }),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| ClinoteError::file(format!("Failed to read stdin: {}", e)))?;
            Ok(text)
        }
    }
}

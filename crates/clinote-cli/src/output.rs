//! Output formatting for the clinote CLI
//!
//! Reports render as plain text, a colored table, JSON or YAML. Renderers
//! write to any `io::Write` so they can be exercised without a terminal.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use clinote_core::{
    ClinoteError, NoteKind, ProcessedNote, Result, SchemaConfig, SchemaConfigFile,
    ValidationResult,
};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use uuid::Uuid;

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Plain text: the formatted note, or one diagnostic per line
    Text,
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| ClinoteError::Serialization(e.to_string()))
}

fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| ClinoteError::Serialization(e.to_string()))
}

/// Result of processing or validating one note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub note_kind: NoteKind,
    pub valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Formatted text; absent for validate-only runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    pub summary: String,
}

impl NoteReport {
    /// Report for a note that went through the full pipeline
    pub fn from_note(note: &ProcessedNote) -> Self {
        let mut report = Self::from_validation(note.note_kind, &note.validation);
        report.formatted = Some(note.formatted.clone());
        report
    }

    /// Report for text that was only validated
    pub fn from_validation(kind: NoteKind, validation: &ValidationResult) -> Self {
        let error_count = validation.errors.len();
        let warning_count = validation.warnings.len();

        let summary = if validation.is_valid && warning_count == 0 {
            format!("{} note matches the expected structure", kind)
        } else if validation.is_valid {
            format!(
                "{} note matches the expected structure with {} warning(s)",
                kind, warning_count
            )
        } else {
            format!(
                "{} note has {} defect(s) and {} warning(s)",
                kind, error_count, warning_count
            )
        };

        Self {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            note_kind: kind,
            valid: validation.is_valid,
            error_count,
            warning_count,
            errors: validation.errors.clone(),
            warnings: validation.warnings.clone(),
            formatted: None,
            summary,
        }
    }

    /// Render to stdout
    pub fn render(&self, format: OutputFormat) -> Result<()> {
        let mut stdout = io::stdout();
        self.render_to(format, &mut stdout)?;
        stdout.flush().ok();
        Ok(())
    }

    pub fn render_to<W: Write>(&self, format: OutputFormat, out: &mut W) -> Result<()> {
        match format {
            OutputFormat::Json => writeln!(out, "{}", to_json(self)?)?,
            OutputFormat::Yaml => write!(out, "{}", to_yaml(self)?)?,
            OutputFormat::Text => self.render_text(out),
            OutputFormat::Table => self.render_table(out),
        }
        Ok(())
    }

    /// Formatted note when present, otherwise the diagnostics
    fn render_text<W: Write>(&self, out: &mut W) {
        match &self.formatted {
            Some(formatted) => {
                writeln!(out, "{}", formatted).ok();
            }
            None => {
                for error in &self.errors {
                    writeln!(out, "error: {}", error).ok();
                }
                for warning in &self.warnings {
                    writeln!(out, "warning: {}", warning).ok();
                }
            }
        }
    }

    fn render_table<W: Write>(&self, out: &mut W) {
        writeln!(out).ok();
        writeln!(out, "{}", "Note Validation".cyan().bold()).ok();
        writeln!(out, "{}", "=".repeat(60)).ok();
        writeln!(out).ok();

        let status = if self.valid { "+".green() } else { "x".red() };
        writeln!(out, "{} {}", status, self.summary).ok();
        writeln!(
            out,
            "  {} {}",
            "Report:".dimmed(),
            self.report_id.to_string().dimmed()
        )
        .ok();
        writeln!(out).ok();

        if !self.errors.is_empty() {
            writeln!(out, "{}", "Defects:".cyan().bold()).ok();
            for (index, error) in self.errors.iter().enumerate() {
                writeln!(out, "  {} {:>2}. {}", "x".red(), index + 1, error).ok();
            }
            writeln!(out).ok();
        }

        if !self.warnings.is_empty() {
            writeln!(out, "{}", "Warnings:".cyan().bold()).ok();
            for warning in &self.warnings {
                writeln!(out, "  {} {}", "!".yellow(), warning).ok();
            }
            writeln!(out).ok();
        }

        if let Some(formatted) = &self.formatted {
            writeln!(out, "{}", "Formatted Note:".cyan().bold()).ok();
            writeln!(out, "{}", "-".repeat(60)).ok();
            writeln!(out, "{}", formatted).ok();
        }
    }
}

/// Effective configuration, as loaded
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct SchemaReport {
    pub config: SchemaConfigFile,
}

impl SchemaReport {
    pub fn new(config: &SchemaConfig) -> Self {
        Self {
            config: config.to_file(),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<()> {
        let mut stdout = io::stdout();
        self.render_to(format, &mut stdout)?;
        stdout.flush().ok();
        Ok(())
    }

    pub fn render_to<W: Write>(&self, format: OutputFormat, out: &mut W) -> Result<()> {
        match format {
            OutputFormat::Json => writeln!(out, "{}", to_json(self)?)?,
            OutputFormat::Yaml => write!(out, "{}", to_yaml(self)?)?,
            OutputFormat::Text => {
                let text = toml::to_string_pretty(&self.config)
                    .map_err(|e| ClinoteError::Serialization(e.to_string()))?;
                write!(out, "{}", text)?;
            }
            OutputFormat::Table => self.render_table(out),
        }
        Ok(())
    }

    fn render_table<W: Write>(&self, out: &mut W) {
        let config = &self.config;

        writeln!(out, "{}", "Schema Configuration".cyan().bold()).ok();
        writeln!(out, "{}", "=".repeat(60)).ok();

        for (kind, sections) in [
            (NoteKind::Session, &config.session_sections),
            (NoteKind::Assessment, &config.assessment_sections),
        ] {
            writeln!(out).ok();
            writeln!(out, "{}", format!("{} sections:", kind).cyan().bold()).ok();
            for (index, name) in sections.iter().enumerate() {
                writeln!(out, "  {:>2}. {}", index + 1, name).ok();
            }
        }

        writeln!(out).ok();
        writeln!(
            out,
            "{} {}",
            "Max sentences per section:".cyan().bold(),
            config.max_sentences_per_section
        )
        .ok();

        writeln!(out).ok();
        writeln!(out, "{}", "Acronyms:".cyan().bold()).ok();
        for (token, meaning) in &config.acronyms {
            writeln!(out, "  {} {} = {}", "-".blue(), token.bold(), meaning).ok();
        }

        writeln!(out).ok();
        writeln!(out, "{}", "Identifier patterns:".cyan().bold()).ok();
        for spec in &config.identifier_patterns {
            writeln!(out, "  {} {} {}", "-".blue(), spec.name.bold(), spec.pattern.dimmed()).ok();
        }
    }
}

/// Outcome of the acronym-presence check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcronymReport {
    pub all_present: bool,
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

impl AcronymReport {
    pub fn new(config: &SchemaConfig, text: &str) -> Self {
        let missing: Vec<String> = clinote_core::missing_acronyms(text, config.acronyms())
            .into_iter()
            .map(str::to_string)
            .collect();
        let present = config
            .acronyms()
            .keys()
            .filter(|token| !missing.contains(token))
            .cloned()
            .collect();
        Self {
            all_present: missing.is_empty(),
            present,
            missing,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<()> {
        let mut stdout = io::stdout();
        self.render_to(format, &mut stdout)?;
        stdout.flush().ok();
        Ok(())
    }

    pub fn render_to<W: Write>(&self, format: OutputFormat, out: &mut W) -> Result<()> {
        match format {
            OutputFormat::Json => writeln!(out, "{}", to_json(self)?)?,
            OutputFormat::Yaml => write!(out, "{}", to_yaml(self)?)?,
            OutputFormat::Text => {
                for token in &self.missing {
                    writeln!(out, "missing: {}", token)?;
                }
            }
            OutputFormat::Table => {
                for token in &self.present {
                    writeln!(out, "  {} {}", "+".green(), token).ok();
                }
                for token in &self.missing {
                    writeln!(out, "  {} {} {}", "x".red(), token, "(missing)".dimmed()).ok();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinote_core::Processor;
    use std::sync::Arc;

    fn render<F: FnOnce(&mut Vec<u8>)>(f: F) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        f(&mut buffer);
        String::from_utf8(buffer).unwrap()
    }

    fn processed(raw: &str) -> ProcessedNote {
        let config = SchemaConfig::builder()
            .session_sections(["SUBJECTIVE", "PLAN"])
            .build()
            .unwrap();
        Processor::new(Arc::new(config)).process_with_report(raw, NoteKind::Session)
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_note_report_summary() {
        let valid =
            NoteReport::from_note(&processed("SUBJECTIVE: TH and CL met.\n\nPLAN: Weekly."));
        assert!(valid.valid);
        assert_eq!(valid.summary, "session note matches the expected structure");

        let invalid = NoteReport::from_note(&processed("SUBJECTIVE: TH and CL met."));
        assert!(!invalid.valid);
        assert_eq!(invalid.error_count, 2);
        assert_eq!(invalid.summary, "session note has 2 defect(s) and 0 warning(s)");
    }

    #[test]
    fn test_text_output_is_the_formatted_note() {
        let report =
            NoteReport::from_note(&processed("SUBJECTIVE:  TH and CL met.\n\nPLAN: Weekly."));
        let text = render(|out| report.render_to(OutputFormat::Text, out).unwrap());
        assert_eq!(text, "SUBJECTIVE:\nTH and CL met.\n\nPLAN:\nWeekly.\n");
    }

    #[test]
    fn test_text_output_for_validation_only() {
        let mut result = ValidationResult::valid();
        result.add_error(clinote_core::DefectKind::EmptySection, "Empty section: PLAN");
        let report = NoteReport::from_validation(NoteKind::Session, &result);
        let text = render(|out| report.render_to(OutputFormat::Text, out).unwrap());
        assert_eq!(text, "error: Empty section: PLAN\n");
    }

    #[test]
    fn test_json_output() {
        let report = NoteReport::from_note(&processed("SUBJECTIVE: TH and CL met."));
        let text = render(|out| report.render_to(OutputFormat::Json, out).unwrap());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["note_kind"], "session");
        assert_eq!(value["valid"], false);
        assert_eq!(value["errors"][0], "Missing required section: PLAN");
        assert!(value.get("warnings").is_none());
        assert!(value["report_id"].is_string());
    }

    #[test]
    fn test_table_output_lists_defects() {
        let report = NoteReport::from_note(&processed("SUBJECTIVE: TH and CL met."));
        let text = render(|out| report.render_to(OutputFormat::Table, out).unwrap());
        assert!(text.contains("Defects:"));
        assert!(text.contains(" 1. Missing required section: PLAN"));
        assert!(text.contains("Formatted Note:"));
    }

    #[test]
    fn test_schema_report_formats() {
        let report = SchemaReport::new(&SchemaConfig::default());

        let yaml = render(|out| report.render_to(OutputFormat::Yaml, out).unwrap());
        let parsed = SchemaConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.max_sentences_per_section(), 5);

        let toml_text = render(|out| report.render_to(OutputFormat::Text, out).unwrap());
        let parsed = SchemaConfig::from_toml_str(&toml_text).unwrap();
        assert_eq!(parsed.schema(NoteKind::Assessment).len(), 6);

        let table = render(|out| report.render_to(OutputFormat::Table, out).unwrap());
        assert!(table.contains("session sections:"));
        assert!(table.contains("   4. PLAN"));
    }

    #[test]
    fn test_acronym_report() {
        let report = AcronymReport::new(&SchemaConfig::default(), "TH opened the session.");
        assert!(!report.all_present);
        assert_eq!(report.present, vec!["TH"]);
        assert_eq!(report.missing, vec!["CL"]);
        let text = render(|out| report.render_to(OutputFormat::Text, out).unwrap());
        assert_eq!(text, "missing: CL\n");
    }
}

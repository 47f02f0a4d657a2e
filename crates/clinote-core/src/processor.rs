//! Pipeline entry point: format, validate, report
//!
//! Formatting is best-effort and validation is advisory, so
//! [`Processor::process`] always returns the formatted text. Defects are
//! logged as warnings and, when metrics are attached, counted.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::formatter::format_response;
use crate::metrics::ProcessingMetrics;
use crate::schema::{NoteKind, SchemaConfig};
use crate::validator::{ValidationResult, Validator};

/// Formatted text together with its validation report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedNote {
    pub note_kind: NoteKind,
    pub formatted: String,
    pub validation: ValidationResult,
}

impl ProcessedNote {
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid
    }
}

/// Combines the formatter and validator for a shared configuration.
///
/// Cheap to clone; clones share the configuration, rules and metrics.
#[derive(Debug, Clone)]
pub struct Processor {
    config: Arc<SchemaConfig>,
    validator: Arc<Validator>,
    metrics: Option<Arc<ProcessingMetrics>>,
}

impl Processor {
    /// Create a processor with the built-in validation rules
    pub fn new(config: Arc<SchemaConfig>) -> Self {
        Self {
            config,
            validator: Arc::new(Validator::new()),
            metrics: None,
        }
    }

    /// Replace the rule set
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Count processed notes and defects
    pub fn with_metrics(mut self, metrics: Arc<ProcessingMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Format only
    pub fn format(&self, raw: &str, kind: NoteKind) -> String {
        format_response(raw, self.config.schema(kind))
    }

    /// Validate only
    pub fn validate(&self, text: &str, kind: NoteKind) -> ValidationResult {
        self.validator.validate(text, &self.config, kind)
    }

    /// Format `raw`, validate the result and return the formatted text
    /// regardless of the validation outcome.
    pub fn process(&self, raw: &str, kind: NoteKind) -> String {
        self.process_with_report(raw, kind).formatted
    }

    /// Like [`process`](Self::process) but also returns the report
    pub fn process_with_report(&self, raw: &str, kind: NoteKind) -> ProcessedNote {
        let _timer = self.metrics.as_ref().map(|m| m.start_timer(kind));

        let formatted = self.format(raw, kind);
        let validation = self.validate(&formatted, kind);

        if !validation.is_valid {
            tracing::warn!(
                note_kind = %kind,
                error_count = validation.errors.len(),
                errors = ?validation.errors,
                "response validation warnings"
            );
        }
        if !validation.warnings.is_empty() {
            tracing::info!(
                note_kind = %kind,
                warnings = ?validation.warnings,
                "response validation notes"
            );
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_note(kind, validation.is_valid);
            metrics.record_defects(kind, validation.error_kinds());
        }

        ProcessedNote {
            note_kind: kind,
            formatted,
            validation,
        }
    }
}

//! Structural validation of formatted note text
//!
//! Validation is advisory: every defect becomes a human-readable string in
//! [`ValidationResult::errors`] and nothing here returns `Err` or panics on
//! content. Checks are [`NoteRule`] implementations evaluated in a fixed
//! order, so the same input always yields the same report.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::schema::{NoteKind, SchemaConfig, SectionSchema};

/// Shorthand for the therapist, required in session notes.
pub const THERAPIST_MARKER: &str = "TH";
/// Shorthand for the client, required in session notes.
pub const CLIENT_MARKER: &str = "CL";

static SENTENCE_TERMINATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

static DEFAULT_VALIDATOR: LazyLock<Validator> = LazyLock::new(Validator::new);

/// Category of a structural defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    MissingSection,
    EmptySection,
    SectionTooLong,
    SectionOrder,
    MissingParticipantReferences,
    IdentifierLeak,
    StructureMismatch,
    DuplicateSection,
}

impl DefectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefectKind::MissingSection => "missing_section",
            DefectKind::EmptySection => "empty_section",
            DefectKind::SectionTooLong => "section_too_long",
            DefectKind::SectionOrder => "section_order",
            DefectKind::MissingParticipantReferences => "missing_participant_references",
            DefectKind::IdentifierLeak => "identifier_leak",
            DefectKind::StructureMismatch => "structure_mismatch",
            DefectKind::DuplicateSection => "duplicate_section",
        }
    }
}

impl fmt::Display for DefectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one text
///
/// Defect kinds are not part of the serialized form. A deserialized result
/// derives `is_valid` from `errors` and has empty kind lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SerializedResult")]
pub struct ValidationResult {
    /// True iff `errors` is empty
    pub is_valid: bool,
    /// Defects in detection order
    pub errors: Vec<String>,
    /// Advisory notes that do not affect `is_valid`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip)]
    error_kinds: Vec<DefectKind>,
    #[serde(skip)]
    warning_kinds: Vec<DefectKind>,
}

#[derive(Deserialize)]
struct SerializedResult {
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

impl From<SerializedResult> for ValidationResult {
    fn from(raw: SerializedResult) -> Self {
        Self {
            is_valid: raw.errors.is_empty(),
            errors: raw.errors,
            warnings: raw.warnings,
            error_kinds: Vec::new(),
            warning_kinds: Vec::new(),
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

impl ValidationResult {
    /// Create a new valid result
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            error_kinds: Vec::new(),
            warning_kinds: Vec::new(),
        }
    }

    /// Record a defect; the result becomes invalid
    pub fn add_error(&mut self, kind: DefectKind, message: impl Into<String>) {
        self.is_valid = false;
        self.error_kinds.push(kind);
        self.errors.push(message.into());
    }

    /// Record an advisory note
    pub fn add_warning(&mut self, kind: DefectKind, message: impl Into<String>) {
        self.warning_kinds.push(kind);
        self.warnings.push(message.into());
    }

    /// Defect categories, parallel to `errors`
    pub fn error_kinds(&self) -> &[DefectKind] {
        &self.error_kinds
    }

    /// Categories parallel to `warnings`
    pub fn warning_kinds(&self) -> &[DefectKind] {
        &self.warning_kinds
    }

    pub fn has_error(&self, message: &str) -> bool {
        self.errors.iter().any(|e| e == message)
    }
}

/// Context handed to each rule
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub kind: NoteKind,
    pub schema: &'a SectionSchema,
    pub config: &'a SchemaConfig,
}

impl<'a> RuleContext<'a> {
    pub fn new(config: &'a SchemaConfig, kind: NoteKind) -> Self {
        Self {
            kind,
            schema: config.schema(kind),
            config,
        }
    }
}

/// A single structural check.
///
/// Rules are pure: they inspect `text` and append to `result`, never
/// mutating shared state.
pub trait NoteRule: Send + Sync {
    /// Stable identifier
    fn id(&self) -> &'static str;

    /// What the rule checks
    fn description(&self) -> &'static str;

    /// Whether the rule runs for this context
    fn is_applicable(&self, _context: &RuleContext<'_>) -> bool {
        true
    }

    fn check(&self, text: &str, context: &RuleContext<'_>, result: &mut ValidationResult);
}

/// Ordered set of rules
pub struct Validator {
    rules: Vec<Box<dyn NoteRule>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rules.iter().map(|r| r.id()).collect::<Vec<_>>())
            .finish()
    }
}

impl Validator {
    /// Create a validator with the built-in rules
    pub fn new() -> Self {
        let mut validator = Self::empty();
        validator.add_builtin_rules();
        validator
    }

    /// Create a validator without rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Registration order is report order.
    fn add_builtin_rules(&mut self) {
        self.register(Box::new(SectionContentRule));
        self.register(Box::new(SectionOrderRule));
        self.register(Box::new(DuplicateSectionRule));
        self.register(Box::new(ParticipantReferenceRule));
        self.register(Box::new(IdentifierLeakRule));
        self.register(Box::new(BlockStructureRule));
    }

    pub fn register(&mut self, rule: Box<dyn NoteRule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Box<dyn NoteRule>] {
        &self.rules
    }

    /// Validate `text` against the schema for `kind`
    pub fn validate(&self, text: &str, config: &SchemaConfig, kind: NoteKind) -> ValidationResult {
        let context = RuleContext::new(config, kind);
        let mut result = ValidationResult::valid();

        for rule in self.rules.iter().filter(|r| r.is_applicable(&context)) {
            rule.check(text, &context, &mut result);
        }

        tracing::debug!(
            note_kind = %kind,
            rules = self.rules.len(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validated response"
        );
        result
    }
}

/// Validate with the built-in rule set
pub fn validate_response_format(
    text: &str,
    config: &SchemaConfig,
    kind: NoteKind,
) -> ValidationResult {
    DEFAULT_VALIDATOR.validate(text, config, kind)
}

/// Number of non-empty segments between runs of `.`, `!` or `?`
pub fn count_sentences(text: &str) -> usize {
    SENTENCE_TERMINATORS
        .split(text)
        .filter(|sentence| !sentence.trim().is_empty())
        .count()
}

pub fn validate_section_length(section: &str, max_sentences: usize) -> bool {
    count_sentences(section) <= max_sentences
}

/// True when every configured acronym appears in `text`.
///
/// Not part of the default rule set; callers may apply it on their own.
pub fn validate_acronym_usage(text: &str, acronyms: &BTreeMap<String, String>) -> bool {
    acronyms.keys().all(|token| text.contains(token.as_str()))
}

/// Configured acronyms that do not appear in `text`
pub fn missing_acronyms<'a>(text: &str, acronyms: &'a BTreeMap<String, String>) -> Vec<&'a str> {
    acronyms
        .keys()
        .filter(|token| !text.contains(token.as_str()))
        .map(String::as_str)
        .collect()
}

/// Names of the identifier patterns that match `text`
pub fn screen_identifiers<'c>(text: &str, config: &'c SchemaConfig) -> Vec<&'c str> {
    config.identifier_screen().matches(text)
}

/// True when none of the configured identifier patterns match
pub fn validate_hipaa_compliance(text: &str, config: &SchemaConfig) -> bool {
    config.identifier_screen().is_clean(text)
}

/// Presence, non-emptiness and length of every schema section
struct SectionContentRule;

impl NoteRule for SectionContentRule {
    fn id(&self) -> &'static str {
        "section_content"
    }

    fn description(&self) -> &'static str {
        "Every schema section is present, non-empty and within the sentence limit"
    }

    fn check(&self, text: &str, context: &RuleContext<'_>, result: &mut ValidationResult) {
        let max = context.config.max_sentences_per_section();
        for (index, name) in context.schema.names().iter().enumerate() {
            let Some(section) = context.schema.first_match(text, index) else {
                result.add_error(
                    DefectKind::MissingSection,
                    format!("Missing required section: {}", name),
                );
                continue;
            };

            let body = section.body(text).trim();
            if body.is_empty() {
                result.add_error(DefectKind::EmptySection, format!("Empty section: {}", name));
            } else if !validate_section_length(body, max) {
                result.add_error(
                    DefectKind::SectionTooLong,
                    format!("Section \"{}\" length exceeds limits", name),
                );
            }
        }
    }
}

/// First occurrences must follow schema order; absent sections are skipped
struct SectionOrderRule;

impl NoteRule for SectionOrderRule {
    fn id(&self) -> &'static str {
        "section_order"
    }

    fn description(&self) -> &'static str {
        "Sections appear in schema order"
    }

    fn check(&self, text: &str, context: &RuleContext<'_>, result: &mut ValidationResult) {
        let mut last: Option<usize> = None;
        for (index, name) in context.schema.names().iter().enumerate() {
            let Some(position) = context.schema.first_marker(text, index) else {
                continue;
            };
            if last.is_some_and(|previous| position < previous) {
                result.add_error(
                    DefectKind::SectionOrder,
                    format!("Incorrect section order: {}", name),
                );
            }
            last = Some(position);
        }
    }
}

/// A section header that occurs more than once
struct DuplicateSectionRule;

impl NoteRule for DuplicateSectionRule {
    fn id(&self) -> &'static str {
        "duplicate_section"
    }

    fn description(&self) -> &'static str {
        "Each schema section occurs at most once"
    }

    fn check(&self, text: &str, context: &RuleContext<'_>, result: &mut ValidationResult) {
        for (index, name) in context.schema.names().iter().enumerate() {
            if context.schema.marker_count(text, index) > 1 {
                result.add_warning(
                    DefectKind::DuplicateSection,
                    format!("Duplicate section: {}", name),
                );
            }
        }
    }
}

/// Session notes must mention both the therapist and the client
struct ParticipantReferenceRule;

impl NoteRule for ParticipantReferenceRule {
    fn id(&self) -> &'static str {
        "participant_references"
    }

    fn description(&self) -> &'static str {
        "Session notes reference TH and CL"
    }

    fn is_applicable(&self, context: &RuleContext<'_>) -> bool {
        context.kind != NoteKind::Assessment
    }

    fn check(&self, text: &str, _context: &RuleContext<'_>, result: &mut ValidationResult) {
        if !text.contains(THERAPIST_MARKER) || !text.contains(CLIENT_MARKER) {
            result.add_error(
                DefectKind::MissingParticipantReferences,
                "Missing required therapist (TH) or client (CL) references",
            );
        }
    }
}

/// Values that look like SSNs, phone numbers, emails or long-form dates
struct IdentifierLeakRule;

impl NoteRule for IdentifierLeakRule {
    fn id(&self) -> &'static str {
        "identifier_leak"
    }

    fn description(&self) -> &'static str {
        "No personally identifying values"
    }

    fn check(&self, text: &str, context: &RuleContext<'_>, result: &mut ValidationResult) {
        let matched = context.config.identifier_screen().matches(text);
        if !matched.is_empty() {
            tracing::debug!(patterns = ?matched, "identifier patterns matched");
            result.add_error(
                DefectKind::IdentifierLeak,
                "Potential HIPAA compliance issues detected",
            );
        }
    }
}

/// At least as many blank-line-separated blocks as schema sections
struct BlockStructureRule;

impl NoteRule for BlockStructureRule {
    fn id(&self) -> &'static str {
        "block_structure"
    }

    fn description(&self) -> &'static str {
        "Blank-line block count covers every schema section"
    }

    fn check(&self, text: &str, context: &RuleContext<'_>, result: &mut ValidationResult) {
        if text.split("\n\n").count() < context.schema.len() {
            result.add_error(
                DefectKind::StructureMismatch,
                "Response format does not match expected structure",
            );
        }
    }
}

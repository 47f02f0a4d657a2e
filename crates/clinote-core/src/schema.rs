//! Section schemas and process-wide configuration
//!
//! A [`SchemaConfig`] is built once at startup (from defaults, a builder, or a
//! TOML/YAML/JSON file) and shared read-only. Every [`SectionSchema`]
//! precompiles its header matchers on construction, so formatting and
//! validation never build patterns per call.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ops::Range;
use std::path::Path;

use crate::error::{ClinoteError, Result};

/// Prompt fragment that marks a request as an assessment note.
pub const ASSESSMENT_PROMPT_MARKER: &str = "clinical assessment";

/// Default upper bound on sentences within one section body.
pub const DEFAULT_MAX_SENTENCES_PER_SECTION: usize = 5;

/// Default ordered sections for session notes.
pub const DEFAULT_SESSION_SECTIONS: &[&str] = &["SUBJECTIVE", "OBJECTIVE", "ASSESSMENT", "PLAN"];

/// Default ordered sections for assessment notes.
pub const DEFAULT_ASSESSMENT_SECTIONS: &[&str] = &[
    "IDENTIFYING INFORMATION",
    "PRESENTING PROBLEM",
    "HISTORY",
    "MENTAL STATUS",
    "DIAGNOSTIC IMPRESSIONS",
    "RECOMMENDATIONS",
];

/// Kind of clinical note being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// Progress note for a single therapy session
    Session,
    /// Intake or clinical assessment note
    Assessment,
}

impl NoteKind {
    /// All note kinds, in declaration order
    pub const ALL: [NoteKind; 2] = [NoteKind::Session, NoteKind::Assessment];

    /// Derive the note kind from the instructions sent to the generative service
    pub fn from_prompt(prompt: &str) -> Self {
        if prompt.contains(ASSESSMENT_PROMPT_MARKER) {
            NoteKind::Assessment
        } else {
            NoteKind::Session
        }
    }

    /// Stable lowercase label, also used as a metrics label value
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Session => "session",
            NoteKind::Assessment => "assessment",
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NoteKind {
    type Err = ClinoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "session" | "progress" => Ok(NoteKind::Session),
            "assessment" | "intake" => Ok(NoteKind::Assessment),
            other => Err(ClinoteError::invalid_input(format!("Unknown note kind: {}", other))),
        }
    }
}

/// Location of one section occurrence inside a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMatch {
    /// Position of the section in its schema
    pub index: usize,
    /// Byte range of the `HEADER:` marker
    pub marker: Range<usize>,
    /// Byte range of the body, up to the next schema header or end of text
    pub body: Range<usize>,
}

impl SectionMatch {
    /// Borrow the raw body text
    pub fn body<'t>(&self, text: &'t str) -> &'t str {
        &text[self.body.clone()]
    }

    /// Whether the body runs to the end of `text`
    pub fn reaches_end(&self, text: &str) -> bool {
        self.body.end == text.len()
    }
}

/// Ordered, unique list of required section names with precompiled matchers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct SectionSchema {
    names: Vec<String>,
    markers: Vec<Regex>,
    any_marker: Regex,
}

impl SectionSchema {
    /// Build a schema, compiling one marker matcher per section plus a
    /// combined matcher for "any schema header".
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ClinoteError::schema("section schema must name at least one section"));
        }

        let mut seen = HashSet::new();
        let mut fragments = Vec::with_capacity(names.len());
        for name in &names {
            if name.trim().is_empty() {
                return Err(ClinoteError::schema("section names must not be empty"));
            }
            if name.contains(':') {
                return Err(ClinoteError::schema(format!(
                    "section name '{}' must not contain ':'",
                    name
                )));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(ClinoteError::schema(format!("duplicate section name '{}'", name)));
            }
            fragments.push(header_fragment(name));
        }

        let markers = fragments
            .iter()
            .map(|fragment| Regex::new(&format!("(?i){}:", fragment)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let any_marker = Regex::new(&format!("(?i)(?:{}):", fragments.join("|")))?;

        Ok(Self {
            names,
            markers,
            any_marker,
        })
    }

    /// Section names in required document order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name of the section at `index`, if there is one
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Byte offset of the first `HEADER:` marker for section `index`
    pub fn first_marker(&self, text: &str, index: usize) -> Option<usize> {
        self.markers.get(index)?.find(text).map(|m| m.start())
    }

    /// Number of `HEADER:` markers for section `index`
    pub fn marker_count(&self, text: &str, index: usize) -> usize {
        self.markers
            .get(index)
            .map_or(0, |marker| marker.find_iter(text).count())
    }

    /// First occurrence of section `index` with its body span
    pub fn first_match(&self, text: &str, index: usize) -> Option<SectionMatch> {
        let marker = self.markers.get(index)?.find(text)?;
        Some(self.span_from(text, index, marker.range()))
    }

    /// Every non-overlapping occurrence of section `index`, left to right.
    ///
    /// A body extends from the end of its marker to the start of the next
    /// marker of any schema section (or end of text), so consecutive
    /// occurrences never overlap. An out-of-range `index` has no occurrences.
    pub fn matches(&self, text: &str, index: usize) -> Vec<SectionMatch> {
        let Some(marker) = self.markers.get(index) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        let mut pos = 0;
        while let Some(occurrence) = marker.find_at(text, pos) {
            let section = self.span_from(text, index, occurrence.range());
            pos = section.body.end;
            found.push(section);
        }
        found
    }

    fn span_from(&self, text: &str, index: usize, marker: Range<usize>) -> SectionMatch {
        let end = self
            .any_marker
            .find_at(text, marker.end)
            .map(|next| next.start())
            .unwrap_or(text.len());
        SectionMatch {
            index,
            body: marker.end..end,
            marker,
        }
    }
}

impl PartialEq for SectionSchema {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl TryFrom<Vec<String>> for SectionSchema {
    type Error = ClinoteError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        SectionSchema::new(names)
    }
}

impl From<SectionSchema> for Vec<String> {
    fn from(schema: SectionSchema) -> Self {
        schema.names
    }
}

/// Escape a section name for use in a pattern; whitespace runs inside the
/// name match any whitespace run in the text.
fn header_fragment(name: &str) -> String {
    name.split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// A named identifier-leak pattern as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierPatternSpec {
    pub name: String,
    pub pattern: String,
}

impl IdentifierPatternSpec {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// Built-in patterns for values that look like personal identifiers
pub fn default_identifier_patterns() -> Vec<IdentifierPatternSpec> {
    vec![
        IdentifierPatternSpec::new("ssn", r"(?-u:\b)[0-9]{3}-[0-9]{2}-[0-9]{4}(?-u:\b)"),
        IdentifierPatternSpec::new("phone", r"(?-u:\b)[0-9]{10}(?-u:\b)"),
        IdentifierPatternSpec::new(
            "email",
            r"(?-u:\b)[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}(?-u:\b)",
        ),
        IdentifierPatternSpec::new(
            "long_date",
            concat!(
                r"(?-u:\b)(?:January|February|March|April|May|June|July|August|September",
                r"|October|November|December)\s+[0-9]{1,2},\s+[0-9]{4}(?-u:\b)",
            ),
        ),
    ]
}

/// Compiled identifier-leak screen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<IdentifierPatternSpec>",
    into = "Vec<IdentifierPatternSpec>"
)]
pub struct IdentifierScreen {
    patterns: Vec<(IdentifierPatternSpec, Regex)>,
}

impl IdentifierScreen {
    pub fn new(specs: Vec<IdentifierPatternSpec>) -> Result<Self> {
        let mut patterns = Vec::with_capacity(specs.len());
        for spec in specs {
            let regex = Regex::new(&spec.pattern).map_err(|e| {
                ClinoteError::schema(format!("identifier pattern '{}': {}", spec.name, e))
            })?;
            patterns.push((spec, regex));
        }
        Ok(Self { patterns })
    }

    /// Names of every pattern that matches somewhere in `text`
    pub fn matches(&self, text: &str) -> Vec<&str> {
        self.patterns
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(spec, _)| spec.name.as_str())
            .collect()
    }

    /// True when no pattern matches
    pub fn is_clean(&self, text: &str) -> bool {
        !self.patterns.iter().any(|(_, regex)| regex.is_match(text))
    }

    pub fn specs(&self) -> impl Iterator<Item = &IdentifierPatternSpec> {
        self.patterns.iter().map(|(spec, _)| spec)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl TryFrom<Vec<IdentifierPatternSpec>> for IdentifierScreen {
    type Error = ClinoteError;

    fn try_from(specs: Vec<IdentifierPatternSpec>) -> Result<Self> {
        IdentifierScreen::new(specs)
    }
}

impl From<IdentifierScreen> for Vec<IdentifierPatternSpec> {
    fn from(screen: IdentifierScreen) -> Self {
        screen.patterns.into_iter().map(|(spec, _)| spec).collect()
    }
}

/// Built-in shorthand markers expected in session notes
pub fn default_acronyms() -> BTreeMap<String, String> {
    [("TH", "Therapist"), ("CL", "Client")]
        .into_iter()
        .map(|(token, meaning)| (token.to_string(), meaning.to_string()))
        .collect()
}

/// Serialized shape of a [`SchemaConfig`]; every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfigFile {
    pub session_sections: Vec<String>,
    pub assessment_sections: Vec<String>,
    pub max_sentences_per_section: usize,
    pub acronyms: BTreeMap<String, String>,
    pub identifier_patterns: Vec<IdentifierPatternSpec>,
}

impl Default for SchemaConfigFile {
    fn default() -> Self {
        Self {
            session_sections: DEFAULT_SESSION_SECTIONS.iter().map(|s| s.to_string()).collect(),
            assessment_sections: DEFAULT_ASSESSMENT_SECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_sentences_per_section: DEFAULT_MAX_SENTENCES_PER_SECTION,
            acronyms: default_acronyms(),
            identifier_patterns: default_identifier_patterns(),
        }
    }
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "toml" => Ok(ConfigFormat::Toml),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(ClinoteError::invalid_input(format!(
                "Unsupported config file extension for '{}' (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }
}

/// Immutable, process-wide schema configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaConfigFile", into = "SchemaConfigFile")]
pub struct SchemaConfig {
    session: SectionSchema,
    assessment: SectionSchema,
    max_sentences_per_section: usize,
    acronyms: BTreeMap<String, String>,
    identifier_screen: IdentifierScreen,
}

impl SchemaConfig {
    /// Start a builder seeded with the defaults
    pub fn builder() -> SchemaConfigBuilder {
        SchemaConfigBuilder::new()
    }

    /// Load configuration from a file, dispatching on its extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClinoteError::file(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_str_with_format(&content, format)?;
        tracing::debug!(
            path = %path.display(),
            session_sections = config.session.len(),
            assessment_sections = config.assessment.len(),
            "loaded schema configuration"
        );
        Ok(config)
    }

    pub fn from_str_with_format(content: &str, format: ConfigFormat) -> Result<Self> {
        let file: SchemaConfigFile = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Self::try_from(file)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::from_str_with_format(content, ConfigFormat::Toml)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::from_str_with_format(content, ConfigFormat::Yaml)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_str_with_format(content, ConfigFormat::Json)
    }

    /// Schema for the given note kind
    pub fn schema(&self, kind: NoteKind) -> &SectionSchema {
        match kind {
            NoteKind::Session => &self.session,
            NoteKind::Assessment => &self.assessment,
        }
    }

    pub fn max_sentences_per_section(&self) -> usize {
        self.max_sentences_per_section
    }

    pub fn acronyms(&self) -> &BTreeMap<String, String> {
        &self.acronyms
    }

    pub fn identifier_screen(&self) -> &IdentifierScreen {
        &self.identifier_screen
    }

    /// Serializable snapshot of this configuration
    pub fn to_file(&self) -> SchemaConfigFile {
        SchemaConfigFile::from(self.clone())
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self::try_from(SchemaConfigFile::default())
            .expect("built-in schema configuration is valid")
    }
}

impl TryFrom<SchemaConfigFile> for SchemaConfig {
    type Error = ClinoteError;

    fn try_from(file: SchemaConfigFile) -> Result<Self> {
        if file.max_sentences_per_section == 0 {
            return Err(ClinoteError::schema(
                "max_sentences_per_section must be greater than zero",
            ));
        }
        if let Some(token) = file.acronyms.keys().find(|t| t.trim().is_empty()) {
            return Err(ClinoteError::schema(format!("invalid acronym token '{}'", token)));
        }

        Ok(Self {
            session: SectionSchema::new(file.session_sections)
                .map_err(|e| with_context(e, "session_sections"))?,
            assessment: SectionSchema::new(file.assessment_sections)
                .map_err(|e| with_context(e, "assessment_sections"))?,
            max_sentences_per_section: file.max_sentences_per_section,
            acronyms: file.acronyms,
            identifier_screen: IdentifierScreen::new(file.identifier_patterns)?,
        })
    }
}

fn with_context(err: ClinoteError, key: &str) -> ClinoteError {
    match err {
        ClinoteError::Schema(msg) => ClinoteError::schema(format!("{}: {}", key, msg)),
        other => other,
    }
}

impl From<SchemaConfig> for SchemaConfigFile {
    fn from(config: SchemaConfig) -> Self {
        Self {
            session_sections: config.session.into(),
            assessment_sections: config.assessment.into(),
            max_sentences_per_section: config.max_sentences_per_section,
            acronyms: config.acronyms,
            identifier_patterns: config.identifier_screen.into(),
        }
    }
}

/// Builder for [`SchemaConfig`]
#[derive(Debug, Clone, Default)]
pub struct SchemaConfigBuilder {
    file: SchemaConfigFile,
}

impl SchemaConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_sections<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file.session_sections = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn assessment_sections<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file.assessment_sections = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_sentences_per_section(mut self, max: usize) -> Self {
        self.file.max_sentences_per_section = max;
        self
    }

    pub fn acronym(mut self, token: impl Into<String>, meaning: impl Into<String>) -> Self {
        self.file.acronyms.insert(token.into(), meaning.into());
        self
    }

    pub fn identifier_pattern(
        mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        self.file
            .identifier_patterns
            .push(IdentifierPatternSpec::new(name, pattern));
        self
    }

    /// Replace the identifier patterns entirely
    pub fn identifier_patterns(mut self, specs: Vec<IdentifierPatternSpec>) -> Self {
        self.file.identifier_patterns = specs;
        self
    }

    pub fn build(self) -> Result<SchemaConfig> {
        SchemaConfig::try_from(self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_kind_from_prompt() {
        assert_eq!(
            NoteKind::from_prompt("Write a clinical assessment for this intake"),
            NoteKind::Assessment
        );
        assert_eq!(NoteKind::from_prompt("Summarize the session"), NoteKind::Session);
        assert_eq!(NoteKind::from_prompt("Clinical Assessment"), NoteKind::Session);
    }

    #[test]
    fn test_note_kind_parse_and_display() {
        assert_eq!("session".parse::<NoteKind>().unwrap(), NoteKind::Session);
        assert_eq!("Assessment".parse::<NoteKind>().unwrap(), NoteKind::Assessment);
        assert!("discharge".parse::<NoteKind>().is_err());
        assert_eq!(NoteKind::Assessment.to_string(), "assessment");
    }

    #[test]
    fn test_schema_rejects_bad_names() {
        assert!(SectionSchema::new(Vec::<String>::new()).is_err());
        assert!(SectionSchema::new(["PLAN", ""]).is_err());
        assert!(SectionSchema::new(["PLAN:"]).is_err());
        assert!(SectionSchema::new(["PLAN", "plan"]).is_err());
    }

    #[test]
    fn test_marker_matching_is_case_insensitive() {
        let schema = SectionSchema::new(["SUBJECTIVE", "PLAN"]).unwrap();
        assert_eq!(schema.first_marker("notes\nPlan: follow up", 1), Some(6));
        assert_eq!(schema.first_marker("no markers here", 0), None);
    }

    #[test]
    fn test_multi_word_names_match_flexible_whitespace() {
        let schema = SectionSchema::new(["MENTAL STATUS"]).unwrap();
        assert!(schema.first_marker("MENTAL   STATUS: alert", 0).is_some());
        assert!(schema.first_marker("MENTAL\nSTATUS: alert", 0).is_some());
        assert!(schema.first_marker("MENTALSTATUS: alert", 0).is_none());
    }

    #[test]
    fn test_special_characters_are_escaped() {
        let schema = SectionSchema::new(["PLAN (NEXT)", "NOTES"]).unwrap();
        assert_eq!(schema.first_marker("PLAN (NEXT): soon", 0), Some(0));
        assert_eq!(schema.first_marker("PLAN NEXT: soon", 0), None);
    }

    #[test]
    fn test_match_body_stops_at_next_schema_header() {
        let schema = SectionSchema::new(["SUBJECTIVE", "PLAN"]).unwrap();
        let text = "SUBJECTIVE: mood ok\n\nPLAN: weekly";
        let subjective = schema.first_match(text, 0).unwrap();
        assert_eq!(subjective.body(text), " mood ok\n\n");
        assert!(!subjective.reaches_end(text));

        let plan = schema.first_match(text, 1).unwrap();
        assert_eq!(plan.body(text), " weekly");
        assert!(plan.reaches_end(text));
    }

    #[test]
    fn test_matches_finds_every_occurrence() {
        let schema = SectionSchema::new(["SUBJECTIVE", "PLAN"]).unwrap();
        let text = "PLAN: a\nSUBJECTIVE: b\nPLAN: c";
        let plans = schema.matches(text, 1);
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].body(text), " a\n");
        assert_eq!(plans[1].body(text), " c");
        assert_eq!(schema.marker_count(text, 1), 2);
    }

    #[test]
    fn test_out_of_range_index_finds_nothing() {
        let schema = SectionSchema::new(["SUBJECTIVE", "PLAN"]).unwrap();
        let text = "SUBJECTIVE: a\nPLAN: b";
        assert_eq!(schema.name(1), Some("PLAN"));
        assert_eq!(schema.name(2), None);
        assert_eq!(schema.first_marker(text, 2), None);
        assert_eq!(schema.marker_count(text, 2), 0);
        assert!(schema.first_match(text, 2).is_none());
        assert!(schema.matches(text, usize::MAX).is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = SchemaConfig::default();
        assert_eq!(config.schema(NoteKind::Session).names(), DEFAULT_SESSION_SECTIONS);
        assert_eq!(
            config.schema(NoteKind::Assessment).names(),
            DEFAULT_ASSESSMENT_SECTIONS
        );
        assert_eq!(config.max_sentences_per_section(), 5);
        assert!(config.acronyms().contains_key("TH"));
        assert_eq!(config.identifier_screen().len(), 4);
    }

    #[test]
    fn test_identifier_screen_defaults() {
        let config = SchemaConfig::default();
        let screen = config.identifier_screen();
        assert_eq!(screen.matches("SSN 123-45-6789"), vec!["ssn"]);
        assert_eq!(screen.matches("call 5551234567 now"), vec!["phone"]);
        assert_eq!(screen.matches("mail jane.doe@example.org"), vec!["email"]);
        assert_eq!(screen.matches("seen on March 3, 2024"), vec!["long_date"]);
        assert!(screen.is_clean("TH and CL discussed coping skills."));
        assert!(screen.is_clean("call 555123456 now"));
    }

    #[test]
    fn test_identifier_screen_uses_ascii_word_boundaries() {
        let config = SchemaConfig::default();
        let screen = config.identifier_screen();
        assert_eq!(screen.matches("电话5551234567"), vec!["phone"]);
        assert_eq!(screen.matches("号123-45-6789号"), vec!["ssn"]);
        assert_eq!(screen.matches("émail jane@example.orgé"), vec!["email"]);
        assert_eq!(screen.matches("seen éMarch 3, 2024"), vec!["long_date"]);
        assert!(screen.is_clean("call 15551234567 now"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = SchemaConfig::builder()
            .session_sections(["SUBJECTIVE", "PLAN"])
            .max_sentences_per_section(3)
            .identifier_pattern("mrn", r"\bMRN[0-9]{6}\b")
            .build()
            .unwrap();
        assert_eq!(config.schema(NoteKind::Session).len(), 2);
        assert_eq!(config.max_sentences_per_section(), 3);
        assert_eq!(config.identifier_screen().matches("MRN123456"), vec!["mrn"]);
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(SchemaConfig::builder().max_sentences_per_section(0).build().is_err());
        assert!(SchemaConfig::builder()
            .identifier_pattern("broken", "(")
            .build()
            .is_err());
    }

    #[test]
    fn test_from_toml_with_partial_keys() {
        let config = SchemaConfig::from_toml_str(
            r#"
session_sections = ["SUBJECTIVE", "PLAN"]
max_sentences_per_section = 8
"#,
        )
        .unwrap();
        assert_eq!(config.schema(NoteKind::Session).names(), ["SUBJECTIVE", "PLAN"]);
        assert_eq!(config.max_sentences_per_section(), 8);
        assert_eq!(
            config.schema(NoteKind::Assessment).names(),
            DEFAULT_ASSESSMENT_SECTIONS
        );
    }

    #[test]
    fn test_from_yaml_and_json() {
        let yaml = SchemaConfig::from_yaml_str("assessment_sections: [HISTORY, PLAN]\n").unwrap();
        assert_eq!(yaml.schema(NoteKind::Assessment).names(), ["HISTORY", "PLAN"]);

        let json = SchemaConfig::from_json_str(r#"{"max_sentences_per_section": 2}"#).unwrap();
        assert_eq!(json.max_sentences_per_section(), 2);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = SchemaConfig::from_toml_str("max_sentence = 3").unwrap_err();
        assert!(matches!(err, ClinoteError::Parse(_)));
    }

    #[test]
    fn test_from_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.yaml");
        std::fs::write(&path, "session_sections: [A, B]\n").unwrap();
        let config = SchemaConfig::from_file(&path).unwrap();
        assert_eq!(config.schema(NoteKind::Session).names(), ["A", "B"]);

        let bad = dir.path().join("schema.ini");
        std::fs::write(&bad, "").unwrap();
        assert!(matches!(
            SchemaConfig::from_file(&bad),
            Err(ClinoteError::InvalidInput(_))
        ));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            SchemaConfig::from_file(&missing),
            Err(ClinoteError::File(_))
        ));
    }

    #[test]
    fn test_config_serializes_back_to_file_shape() {
        let config = SchemaConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: SchemaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.to_file(), config.to_file());
    }
}

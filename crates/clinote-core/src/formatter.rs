//! Canonical formatting of generated note text
//!
//! The formatter never judges whether required sections exist; it only
//! coerces text into the `HEADER:\n<body>` shape with one blank line between
//! sections. Every function here is total over `&str`.

use regex::Regex;
use std::sync::LazyLock;

use crate::schema::SectionSchema;

/// A line that starts with an all-caps word sequence followed by a colon.
static HEADER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z\s]+:").expect("valid regex"));

static BLANK_LINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Brackets left behind by template placeholders such as `[ client name ]`.
static PLACEHOLDER_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*|\s*\]").expect("valid regex"));

/// A piece of text produced by [`split_into_sections`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    /// Header text before the first colon, `None` for the leading fragment
    pub header: Option<&'a str>,
    /// Full fragment text, header included
    pub text: &'a str,
}

/// Convert `\r\n` and `\r` to `\n` and collapse three or more consecutive
/// line breaks to exactly two.
pub fn normalize_line_endings(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    BLANK_LINE_RUN.replace_all(&unified, "\n\n").into_owned()
}

/// Split `text` before every header line.
///
/// Headers stay attached to the content that follows them. Text before the
/// first header becomes an unlabeled leading fragment.
pub fn split_into_sections(text: &str) -> Vec<Fragment<'_>> {
    let mut starts: Vec<usize> = Vec::new();
    let line_starts = std::iter::once(0).chain(text.match_indices('\n').map(|(i, _)| i + 1));
    for pos in line_starts {
        if pos > 0 && pos < text.len() && HEADER_LINE.is_match(&text[pos..]) {
            starts.push(pos);
        }
    }

    let mut fragments = Vec::with_capacity(starts.len() + 1);
    let mut begin = 0;
    for &next in &starts {
        fragments.push(fragment_at(&text[begin..next]));
        begin = next;
    }
    fragments.push(fragment_at(&text[begin..]));
    fragments
}

fn fragment_at(text: &str) -> Fragment<'_> {
    let header = if HEADER_LINE.is_match(text) {
        text.split_once(':').map(|(header, _)| header.trim())
    } else {
        None
    };
    Fragment { header, text }
}

/// Trim every fragment and join them with exactly one blank line.
///
/// Fragments that are empty once trimmed are dropped.
pub fn reassemble(fragments: &[Fragment<'_>]) -> String {
    fragments
        .iter()
        .map(|fragment| fragment.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Flatten a section body to a single trimmed line without placeholder
/// brackets.
pub fn format_section_body(body: &str) -> String {
    let unbracketed = PLACEHOLDER_BRACKET.replace_all(body.trim(), "");
    WHITESPACE_RUN
        .replace_all(&unbracketed, " ")
        .trim()
        .to_string()
}

/// Format raw service output against `schema`.
///
/// Runs normalization and section spacing, then rewrites every occurrence of
/// every schema section as `HEADER:\n<body>`. Headers outside the schema keep
/// their reassembled form.
pub fn format_response(text: &str, schema: &SectionSchema) -> String {
    let normalized = normalize_line_endings(text);
    let mut formatted = reassemble(&split_into_sections(&normalized));

    for (index, name) in schema.names().iter().enumerate() {
        formatted = reformat_section(&formatted, schema, index, name);
    }

    tracing::debug!(
        input_len = text.len(),
        output_len = formatted.len(),
        sections = schema.len(),
        "formatted response"
    );
    formatted
}

fn reformat_section(text: &str, schema: &SectionSchema, index: usize, name: &str) -> String {
    let occurrences = schema.matches(text, index);
    if occurrences.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for section in &occurrences {
        out.push_str(&text[cursor..section.marker.start]);

        let body = format_section_body(section.body(text));
        out.push_str(name);
        out.push_str(":\n");
        out.push_str(&body);
        if !section.reaches_end(text) {
            // the next header follows directly; keep one blank line before it
            out.push_str(if body.is_empty() { "\n" } else { "\n\n" });
        }
        cursor = section.body.end;
    }
    out.push_str(&text[cursor..]);
    out
}

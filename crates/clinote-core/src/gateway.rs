//! Contract between the pipeline and the layer that calls the generative
//! service.
//!
//! Nothing here performs I/O. These helpers decide what a caller must reject
//! before the service is called and how a service reply becomes either a
//! note or a user-facing error.

use serde::{Deserialize, Serialize};

use crate::error::{ClinoteError, Result};
use crate::processor::{ProcessedNote, Processor};
use crate::schema::NoteKind;

const MISSING_REQUEST_FIELDS: &str = "Note content and processing instructions are required";
const EMPTY_SERVICE_CONTENT: &str = "Server returned empty content";
const DEFAULT_SERVICE_ERROR: &str = "An error occurred while processing your request";

/// Note text plus the instructions it will be processed with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRequest {
    pub content: String,
    pub prompt: String,
}

impl NoteRequest {
    pub fn new(content: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            prompt: prompt.into(),
        }
    }

    /// Reject blank fields and return a trimmed copy ready to send
    pub fn validate(&self) -> Result<NoteRequest> {
        let content = self.content.trim();
        let prompt = self.prompt.trim();
        if content.is_empty() || prompt.is_empty() {
            return Err(ClinoteError::invalid_input(MISSING_REQUEST_FIELDS));
        }
        Ok(NoteRequest::new(content, prompt))
    }

    /// Note kind implied by the instructions
    pub fn note_kind(&self) -> NoteKind {
        NoteKind::from_prompt(&self.prompt)
    }
}

/// Failure reported by the generative service, mapped to a user-facing
/// message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub status: u16,
    pub message: String,
}

impl ServiceStatus {
    /// Map an HTTP-style status and the optional error text from the reply
    pub fn from_status(status: u16, message: Option<&str>) -> Self {
        let reported = message.map(str::trim).filter(|m| !m.is_empty());
        let message = match status {
            400 => reported.unwrap_or("Invalid request format").to_string(),
            401 => "Authentication error".to_string(),
            429 => "Too many requests. Please try again later".to_string(),
            500 => "Server error. Please try again later".to_string(),
            other => format!(
                "{} (Status: {})",
                reported.unwrap_or(DEFAULT_SERVICE_ERROR),
                other
            ),
        };
        Self { status, message }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

impl From<ServiceStatus> for ClinoteError {
    fn from(status: ServiceStatus) -> Self {
        ClinoteError::Service {
            status: status.status,
            message: status.message,
        }
    }
}

/// Turn service output into a note the caller may display.
///
/// Empty output is rejected. Output that fails validation is logged with
/// the raw diagnostics and surfaced as [`ClinoteError::FormatMismatch`],
/// whose message does not expose schema names.
pub fn accept_service_output(
    processor: &Processor,
    content: &str,
    prompt: &str,
) -> Result<ProcessedNote> {
    accept_output(processor, content, NoteKind::from_prompt(prompt))
}

/// Like [`accept_service_output`] for a caller that already knows the kind
pub fn accept_output(
    processor: &Processor,
    content: &str,
    kind: NoteKind,
) -> Result<ProcessedNote> {
    if content.is_empty() {
        return Err(ClinoteError::EmptyResponse(EMPTY_SERVICE_CONTENT.to_string()));
    }

    let note = processor.process_with_report(content, kind);
    if !note.is_valid() {
        tracing::error!(
            note_kind = %kind,
            errors = %note.validation.errors.join(", "),
            "response format validation errors"
        );
        return Err(ClinoteError::FormatMismatch {
            diagnostics: note.validation.errors,
        });
    }
    Ok(note)
}

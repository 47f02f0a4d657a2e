//! Clinote Core
//!
//! Deterministic post-processing for clinical notes returned by a generative
//! text service. Raw output is coerced into a fixed, ordered section schema,
//! checked for structural defects, and screened for leaked identifiers
//! before it is shown to a clinician.
//!
//! ## Features
//!
//! - **Schema Config**: Per-note-kind section schemas, sentence limits,
//!   acronym table and identifier patterns, loaded from TOML/YAML/JSON
//! - **Formatter**: Line-ending normalization, header-based splitting and
//!   canonical `HEADER:\n<body>` rendering
//! - **Validator**: Ordered, pluggable rules reporting every defect as data
//! - **Processor**: Format, validate and log in one call; output is always
//!   returned
//! - **Caller Contract**: Request validation, service status mapping and the
//!   user-facing format-mismatch error
//! - **Metrics**: Prometheus counters and histograms per note kind
//!
//! ## Architecture
//!
//! 1. **Schema** (`schema`): Immutable configuration with precompiled
//!    section matchers, shared as `Arc<SchemaConfig>`.
//!
//! 2. **Formatter** (`formatter`): Pure, total text transforms.
//!
//! 3. **Validator** (`validator`): `NoteRule` implementations run in a fixed
//!    order; defects accumulate in a `ValidationResult`.
//!
//! 4. **Processor** (`processor`): Orchestration plus `tracing` diagnostics.
//!
//! 5. **Gateway** (`gateway`): What the calling network layer must enforce.
//!
//! ## Example
//!
//! ```rust
//! use clinote_core::{NoteKind, Processor, SchemaConfig};
//! use std::sync::Arc;
//!
//! let config = SchemaConfig::builder()
//!     .session_sections(["SUBJECTIVE", "PLAN"])
//!     .build()
//!     .unwrap();
//! let processor = Processor::new(Arc::new(config));
//!
//! let note = processor.process_with_report(
//!     "SUBJECTIVE: TH asked about mood. CL responded well.\n\nPLAN: Continue weekly sessions.",
//!     NoteKind::Session,
//! );
//! assert!(note.validation.is_valid);
//! assert!(note.formatted.starts_with("SUBJECTIVE:\n"));
//! ```

pub mod error;
pub mod formatter;
pub mod gateway;
pub mod metrics;
pub mod processor;
pub mod schema;
pub mod validator;

pub use error::{ClinoteError, Result, FORMAT_MISMATCH_MESSAGE};

pub use schema::{
    ConfigFormat, IdentifierPatternSpec, IdentifierScreen, NoteKind, SchemaConfig,
    SchemaConfigBuilder, SchemaConfigFile, SectionMatch, SectionSchema,
};

pub use formatter::{
    format_response, format_section_body, normalize_line_endings, reassemble,
    split_into_sections, Fragment,
};

pub use validator::{
    count_sentences, missing_acronyms, screen_identifiers, validate_acronym_usage,
    validate_hipaa_compliance, validate_response_format, validate_section_length, DefectKind,
    NoteRule, RuleContext, ValidationResult, Validator,
};

pub use processor::{ProcessedNote, Processor};

pub use gateway::{accept_output, accept_service_output, NoteRequest, ServiceStatus};

pub use metrics::{ProcessingMetrics, ProcessingMetricsRegistry};

/// Library version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

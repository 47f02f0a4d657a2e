//! End-to-end tests for the note processing pipeline
//!
//! Covers:
//! - Formatting and validation of realistic service output
//! - Presence, order, length and identifier checks through the processor
//! - Configuration loading from files
//! - The caller contract around the pipeline

use clinote_core::{
    accept_service_output, format_response, validate_response_format, ClinoteError, NoteKind,
    NoteRequest, ProcessingMetricsRegistry, Processor, SchemaConfig, ServiceStatus,
    FORMAT_MISMATCH_MESSAGE,
};
use std::io::Write;
use std::sync::Arc;

/// Helper to create a processor for a two-section session schema
fn create_test_processor() -> Processor {
    let config = SchemaConfig::builder()
        .session_sections(["SUBJECTIVE", "PLAN"])
        .build()
        .unwrap();
    Processor::new(Arc::new(config))
}

#[test]
fn test_scenario_well_formed_session_note() {
    let processor = create_test_processor();
    let raw =
        "SUBJECTIVE: TH asked about mood. CL responded well.\n\nPLAN: Continue weekly sessions.";

    let note = processor.process_with_report(raw, NoteKind::Session);

    assert!(note.validation.is_valid, "{:?}", note.validation.errors);
    assert!(note.validation.errors.is_empty());
    assert_eq!(
        note.formatted,
        "SUBJECTIVE:\nTH asked about mood. CL responded well.\n\nPLAN:\nContinue weekly sessions."
    );
    for block in note.formatted.split("\n\n") {
        let (header, body) = block.split_once(":\n").unwrap();
        assert!(["SUBJECTIVE", "PLAN"].contains(&header));
        assert!(!body.contains('\n'));
        assert_eq!(body, body.trim());
    }
}

#[test]
fn test_scenario_missing_plan_section() {
    let processor = create_test_processor();
    let raw = "SUBJECTIVE:\n  TH reviewed the thought record.\n  CL completed it twice.\n\n\
               NOTES: brief session";

    let note = processor.process_with_report(raw, NoteKind::Session);

    assert!(!note.validation.is_valid);
    let missing: Vec<_> = note
        .validation
        .errors
        .iter()
        .filter(|e| e.starts_with("Missing required section"))
        .collect();
    assert_eq!(missing, vec!["Missing required section: PLAN"]);
    assert!(note
        .formatted
        .starts_with("SUBJECTIVE:\nTH reviewed the thought record. CL completed it twice."));
}

#[test]
fn test_scenario_over_length_section() {
    let config = SchemaConfig::builder()
        .session_sections(["SUBJECTIVE", "PLAN"])
        .max_sentences_per_section(5)
        .build()
        .unwrap();
    let processor = Processor::new(Arc::new(config));
    let sentences: Vec<String> = (1..=10)
        .map(|i| format!("TH and CL discussed item {}.", i))
        .collect();
    let raw = format!("SUBJECTIVE: {}\n\nPLAN: Review next week.", sentences.join(" "));

    let note = processor.process_with_report(&raw, NoteKind::Session);

    assert_eq!(
        note.validation.errors,
        vec!["Section \"SUBJECTIVE\" length exceeds limits"]
    );
}

#[test]
fn test_presence_check_is_case_insensitive() {
    let config = SchemaConfig::default();
    let text = "subjective:\nTH a.\n\nObjective:\nCL b.\n\nASSESSMENT:\nc.\n\nplan:\nd.";
    let result = validate_response_format(text, &config, NoteKind::Session);
    assert!(result.is_valid, "{:?}", result.errors);
}

#[test]
fn test_order_violation_reported_for_later_header() {
    let config = SchemaConfig::builder()
        .session_sections(["A", "B"])
        .build()
        .unwrap();
    let result = validate_response_format("B:\nTH one.\n\nA:\nCL two.", &config, NoteKind::Session);
    assert!(result.has_error("Incorrect section order: B"));
}

#[test]
fn test_identifier_screen() {
    let config = SchemaConfig::builder()
        .session_sections(["PLAN"])
        .build()
        .unwrap();

    let leaked = validate_response_format(
        "PLAN:\nTH noted CL SSN 123-45-6789.",
        &config,
        NoteKind::Session,
    );
    assert!(leaked.has_error("Potential HIPAA compliance issues detected"));

    let clean = validate_response_format(
        "PLAN:\nTH and CL agreed to continue.",
        &config,
        NoteKind::Session,
    );
    assert!(!clean.has_error("Potential HIPAA compliance issues detected"));
    assert!(clean.is_valid);
}

#[test]
fn test_default_assessment_note() {
    let processor = Processor::new(Arc::new(SchemaConfig::default()));
    let raw = "Here is the assessment:\n\
               IDENTIFYING INFORMATION: Adult client, self-referred.\n\
               PRESENTING PROBLEM: Low mood for three months.\n\
               HISTORY: No prior treatment.\n\
               MENTAL STATUS: Alert and oriented.\n\
               DIAGNOSTIC IMPRESSIONS: Consistent with adjustment difficulties.\n\
               RECOMMENDATIONS: Weekly therapy.";

    let note = processor.process_with_report(raw, NoteKind::Assessment);

    assert!(note.validation.is_valid, "{:?}", note.validation.errors);
    assert!(note.formatted.starts_with("Here is the assessment:\n\nIDENTIFYING INFORMATION:\n"));
    assert!(note.formatted.ends_with("RECOMMENDATIONS:\nWeekly therapy."));
}

#[test]
fn test_headerless_input_is_returned_normalized() {
    let config = SchemaConfig::default();
    let formatted = format_response(
        "I could not produce a note.\r\n\r\n\r\nSorry.",
        config.schema(NoteKind::Session),
    );
    assert_eq!(formatted, "I could not produce a note.\n\nSorry.");

    let result = validate_response_format(&formatted, &config, NoteKind::Session);
    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 6);
}

#[test]
fn test_config_from_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "session_sections = [\"DATA\", \"ASSESSMENT\", \"PLAN\"]\nmax_sentences_per_section = 3"
    )
    .unwrap();

    let config = SchemaConfig::from_file(file.path()).unwrap();
    assert_eq!(config.schema(NoteKind::Session).names(), ["DATA", "ASSESSMENT", "PLAN"]);
    assert_eq!(config.max_sentences_per_section(), 3);
    assert_eq!(config.schema(NoteKind::Assessment).len(), 6);
}

#[test]
fn test_config_from_yaml_file_with_bad_pattern() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "identifier_patterns:\n  - name: broken\n    pattern: \"(\"").unwrap();

    let err = SchemaConfig::from_file(file.path()).unwrap_err();
    assert!(err.is_user_error());
}

#[test]
fn test_caller_contract_flow() {
    let processor = create_test_processor();

    let request = NoteRequest::new("  Session with CL about sleep.  ", " Summarize the session ")
        .validate()
        .unwrap();
    assert_eq!(request.note_kind(), NoteKind::Session);

    let note = accept_service_output(
        &processor,
        "SUBJECTIVE: TH asked about sleep. CL reports 6 hours.\n\nPLAN: Sleep diary.",
        &request.prompt,
    )
    .unwrap();
    assert!(note.is_valid());

    let err =
        accept_service_output(&processor, "SUBJECTIVE: only this", &request.prompt).unwrap_err();
    assert_eq!(err.to_string(), FORMAT_MISMATCH_MESSAGE);

    let err: ClinoteError = ServiceStatus::from_status(500, None).into();
    assert_eq!(err.to_string(), "Server error. Please try again later");
}

#[test]
fn test_metrics_exposition_after_processing() {
    let registry = ProcessingMetricsRegistry::new().unwrap();
    let processor = create_test_processor().with_metrics(registry.processing());

    processor.process("SUBJECTIVE: TH and CL met.\n\nPLAN: Continue.", NoteKind::Session);
    processor.process("no headers", NoteKind::Session);

    let text = registry.encode_text().unwrap();
    assert!(text.contains(
        "clinote_notes_processed_total{note_kind=\"session\",result=\"valid\"} 1"
    ));
    assert!(text.contains(
        "clinote_notes_processed_total{note_kind=\"session\",result=\"invalid\"} 1"
    ));
    assert!(text.contains(
        "clinote_defects_total{defect=\"missing_section\",note_kind=\"session\"} 2"
    ));
}

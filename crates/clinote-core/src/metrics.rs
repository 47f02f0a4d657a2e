//! Prometheus metrics for the processing pipeline
//!
//! - `clinote_notes_processed_total` (counter) - processed notes by kind and result
//! - `clinote_defects_total` (counter) - structural defects by kind and category
//! - `clinote_processing_duration_seconds` (histogram) - format + validate time
//!
//! # Example
//!
//! ```rust
//! use clinote_core::metrics::ProcessingMetricsRegistry;
//! use clinote_core::NoteKind;
//!
//! let registry = ProcessingMetricsRegistry::new().unwrap();
//! registry.processing().record_note(NoteKind::Session, true);
//! assert!(registry.encode_text().unwrap().contains("clinote_notes_processed_total"));
//! ```

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{ClinoteError, Result};
use crate::schema::NoteKind;
use crate::validator::DefectKind;

/// Pipeline metrics registered against a Prometheus registry
pub struct ProcessingMetrics {
    notes_total: CounterVec,
    defects_total: CounterVec,
    duration_seconds: HistogramVec,
}

impl ProcessingMetrics {
    /// Create the metrics and register them with `registry`
    pub fn new(registry: &Registry) -> Result<Self> {
        let notes_total = CounterVec::new(
            Opts::new("notes_processed_total", "Total number of processed notes")
                .namespace("clinote"),
            &["note_kind", "result"],
        )?;

        let defects_total = CounterVec::new(
            Opts::new("defects_total", "Structural defects found in processed notes")
                .namespace("clinote"),
            &["note_kind", "defect"],
        )?;

        let duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "processing_duration_seconds",
                "Time spent formatting and validating a note",
            )
            .namespace("clinote")
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
            &["note_kind"],
        )?;

        registry.register(Box::new(notes_total.clone()))?;
        registry.register(Box::new(defects_total.clone()))?;
        registry.register(Box::new(duration_seconds.clone()))?;

        Ok(Self {
            notes_total,
            defects_total,
            duration_seconds,
        })
    }

    /// Record one processed note
    pub fn record_note(&self, kind: NoteKind, valid: bool) {
        let result = if valid { "valid" } else { "invalid" };
        self.notes_total
            .with_label_values(&[kind.as_str(), result])
            .inc();
    }

    /// Record every defect category reported for one note
    pub fn record_defects(&self, kind: NoteKind, defects: &[DefectKind]) {
        for defect in defects {
            self.defects_total
                .with_label_values(&[kind.as_str(), defect.as_str()])
                .inc();
        }
    }

    pub fn observe_duration(&self, kind: NoteKind, duration_secs: f64) {
        self.duration_seconds
            .with_label_values(&[kind.as_str()])
            .observe(duration_secs);
    }

    /// Start a timer that records its duration on drop
    pub fn start_timer(&self, kind: NoteKind) -> ProcessingTimer<'_> {
        ProcessingTimer {
            start: Instant::now(),
            kind,
            metrics: self,
        }
    }

    /// Current value of the processed-notes counter
    pub fn notes_processed(&self, kind: NoteKind, valid: bool) -> f64 {
        let result = if valid { "valid" } else { "invalid" };
        self.notes_total
            .with_label_values(&[kind.as_str(), result])
            .get()
    }

    /// Current value of the defect counter
    pub fn defects(&self, kind: NoteKind, defect: DefectKind) -> f64 {
        self.defects_total
            .with_label_values(&[kind.as_str(), defect.as_str()])
            .get()
    }
}

impl std::fmt::Debug for ProcessingMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingMetrics").finish_non_exhaustive()
    }
}

/// RAII guard for timing one pipeline run
pub struct ProcessingTimer<'a> {
    start: Instant,
    kind: NoteKind,
    metrics: &'a ProcessingMetrics,
}

impl ProcessingTimer<'_> {
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Drop for ProcessingTimer<'_> {
    fn drop(&mut self) {
        self.metrics
            .observe_duration(self.kind, self.start.elapsed().as_secs_f64());
    }
}

/// Owns a registry together with the pipeline metrics
pub struct ProcessingMetricsRegistry {
    registry: Registry,
    processing: Arc<ProcessingMetrics>,
}

impl ProcessingMetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let processing = Arc::new(ProcessingMetrics::new(&registry)?);
        Ok(Self {
            registry,
            processing,
        })
    }

    /// Shared handle for attaching to a [`Processor`](crate::Processor)
    pub fn processing(&self) -> Arc<ProcessingMetrics> {
        Arc::clone(&self.processing)
    }

    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Encode metrics in the Prometheus text exposition format
    pub fn encode_text(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ClinoteError::Metrics(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_metrics() -> ProcessingMetrics {
        ProcessingMetrics::new(&Registry::new()).unwrap()
    }

    #[test]
    fn test_record_note() {
        let metrics = create_test_metrics();
        metrics.record_note(NoteKind::Session, true);
        metrics.record_note(NoteKind::Session, true);
        metrics.record_note(NoteKind::Assessment, false);

        assert_eq!(metrics.notes_processed(NoteKind::Session, true), 2.0);
        assert_eq!(metrics.notes_processed(NoteKind::Assessment, false), 1.0);
        assert_eq!(metrics.notes_processed(NoteKind::Assessment, true), 0.0);
    }

    #[test]
    fn test_record_defects() {
        let metrics = create_test_metrics();
        metrics.record_defects(
            NoteKind::Session,
            &[DefectKind::MissingSection, DefectKind::MissingSection, DefectKind::IdentifierLeak],
        );
        assert_eq!(metrics.defects(NoteKind::Session, DefectKind::MissingSection), 2.0);
        assert_eq!(metrics.defects(NoteKind::Session, DefectKind::IdentifierLeak), 1.0);
    }

    #[test]
    fn test_timer_observes_on_drop() {
        let registry = ProcessingMetricsRegistry::new().unwrap();
        let metrics = registry.processing();
        {
            let timer = metrics.start_timer(NoteKind::Session);
            assert!(timer.elapsed_secs() >= 0.0);
        }
        let text = registry.encode_text().unwrap();
        assert!(
            text.contains("clinote_processing_duration_seconds_count{note_kind=\"session\"} 1")
        );
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        ProcessingMetrics::new(&registry).unwrap();
        assert!(matches!(
            ProcessingMetrics::new(&registry),
            Err(ClinoteError::Metrics(_))
        ));
    }
}

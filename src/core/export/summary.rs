//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use crate::core::verification::report::VerificationReport;
use crate::domain::{ExportName, NodePath};
use std::time::Duration;

/// An artifact written by a run, kept for verification
#[derive(Debug, Clone)]
pub struct ExportedArtifact {
    /// Node the artifact was rendered from
    pub source_path: NodePath,

    /// File name handed to the store
    pub filename: String,

    /// SHA-256 of the stored bytes, lowercase hex
    pub checksum: String,

    /// Size in bytes
    pub size: usize,

    /// Paths of the items bundled in the artifact
    pub contents: Vec<String>,
}

/// Summary of one export run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Export the run belongs to
    pub export_name: ExportName,

    /// Resources selected by the retriever
    pub total_resources: usize,

    /// Resources formatted and stored
    pub exported: usize,

    /// Resources the formatter had nothing to render for
    pub skipped: usize,

    /// Resources that failed to format or store
    pub failed: usize,

    /// Duration of the run
    pub duration: Duration,

    /// Errors encountered during the run
    pub errors: Vec<ExportError>,

    /// Artifacts written, in processing order
    pub artifacts: Vec<ExportedArtifact>,

    /// Verification report (if verification was run)
    pub verification_report: Option<VerificationReport>,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new(export_name: ExportName) -> Self {
        Self {
            export_name,
            total_resources: 0,
            exported: 0,
            skipped: 0,
            failed: 0,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
            artifacts: Vec::new(),
            verification_report: None,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Record a failed resource
    pub fn record_failure(&mut self, error: ExportError) {
        self.failed += 1;
        self.add_error(error);
    }

    /// Record a stored artifact
    pub fn record_artifact(&mut self, artifact: ExportedArtifact) {
        self.exported += 1;
        self.artifacts.push(artifact);
    }

    /// Set the verification report
    pub fn set_verification_report(&mut self, report: VerificationReport) {
        self.verification_report = Some(report);
    }

    /// Check if the export was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.failed == 0
            && self.errors.is_empty()
            && self
                .verification_report
                .as_ref()
                .map_or(true, VerificationReport::is_success)
    }

    /// Get success rate as a percentage of the resources that were rendered
    pub fn success_rate(&self) -> f64 {
        let attempted = self.exported + self.failed;
        if attempted == 0 {
            return 100.0;
        }
        (self.exported as f64 / attempted as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            export = %self.export_name,
            total_resources = self.total_resources,
            exported = self.exported,
            skipped = self.skipped,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                export = %self.export_name,
                error_count = self.errors.len(),
                "Export completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = error.context.as_deref().unwrap_or(""),
                    "Export error"
                );
            }
        }
    }
}

/// Type of export error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorType {
    /// Invalid export definition or parameters
    Configuration,
    /// Selection query failure
    Retrieval,
    /// Resource could not be resolved or rendered
    Formatting,
    /// Artifact could not be written
    Storage,
    /// Stored artifact could not be read back
    Verification,
    /// Unknown error
    Unknown,
}

/// Export error with context
#[derive(Debug, Clone)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g., resource path)
    pub context: Option<String>,
}

impl ExportError {
    /// Create a new export error
    pub fn new(error_type: ExportErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::verification::VerificationFailure;

    fn summary() -> ExportSummary {
        ExportSummary::new(ExportName::new("nightly").unwrap())
    }

    fn artifact(name: &str) -> ExportedArtifact {
        ExportedArtifact {
            source_path: NodePath::new("/Subjects/s1").unwrap(),
            filename: name.to_string(),
            checksum: "00".to_string(),
            size: 2,
            contents: Vec::new(),
        }
    }

    #[test]
    fn test_export_summary_creation() {
        let summary = summary();

        assert_eq!(summary.export_name.as_str(), "nightly");
        assert_eq!(summary.total_resources, 0);
        assert_eq!(summary.exported, 0);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.duration, Duration::from_secs(0));
        assert!(summary.errors.is_empty());
        assert!(summary.artifacts.is_empty());
        assert!(summary.is_successful());
    }

    #[test]
    fn test_export_summary_with_duration() {
        let summary = summary().with_duration(Duration::from_secs(120));

        assert_eq!(summary.duration, Duration::from_secs(120));
    }

    #[test]
    fn test_record_failure_marks_unsuccessful() {
        let mut summary = summary();
        summary.record_artifact(artifact("a.json"));
        assert!(summary.is_successful());

        summary.record_failure(
            ExportError::new(ExportErrorType::Storage, "Failed to write".to_string())
                .with_context("/Subjects/s2".to_string()),
        );
        assert!(!summary.is_successful());
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors[0].error_type, ExportErrorType::Storage);
        assert_eq!(summary.errors[0].context.as_deref(), Some("/Subjects/s2"));
    }

    #[test]
    fn test_export_summary_success_rate() {
        let mut summary = summary();
        assert_eq!(summary.success_rate(), 100.0);

        for i in 0..3 {
            summary.record_artifact(artifact(&format!("{i}.json")));
        }
        summary.record_failure(ExportError::new(
            ExportErrorType::Formatting,
            "gone".to_string(),
        ));
        summary.skipped = 5;
        assert_eq!(summary.success_rate(), 75.0);
    }

    #[test]
    fn test_failed_verification_marks_unsuccessful() {
        let mut summary = summary();
        let mut report = VerificationReport::new();
        report.record_failure(VerificationFailure {
            filename: "a.json".to_string(),
            source_path: "/Subjects/s1".to_string(),
            expected_checksum: "00".to_string(),
            actual_checksum: "11".to_string(),
            reason: "checksum mismatch".to_string(),
        });
        summary.set_verification_report(report);
        assert!(!summary.is_successful());
    }
}

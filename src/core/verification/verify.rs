//! Reads stored artifacts back and compares checksums

use super::checksum::calculate_checksum;
use super::report::{VerificationFailure, VerificationReport};
use crate::config::ExportConfigDefinition;
use crate::core::export::pipeline::DataStore;
use crate::core::export::ExportSummary;
use crate::domain::Result;
use std::sync::Arc;
use std::time::Instant;

/// Verifies the artifacts of a run against the store they were written to
pub struct Verifier {
    store: Arc<dyn DataStore>,
}

impl Verifier {
    /// Creates a verifier reading back through `store`
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Reads every artifact of `summary` back and compares its checksum
    ///
    /// Missing or unreadable artifacts are failures; artifacts whose store
    /// cannot read back are skipped.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use strata::core::export::store::FilesystemStore;
    /// use strata::core::export::ExportSummary;
    /// use strata::core::verification::Verifier;
    /// use strata::config::ExportConfigDefinition;
    /// use strata::domain::ExportName;
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let name = ExportName::new("nightly").map_err(anyhow::Error::msg)?;
    /// let config = ExportConfigDefinition::new(name.clone(), "changedSubjects", "json", "filesystem")
    ///     .with_parameter("savePath", "/var/exports");
    /// let verifier = Verifier::new(Arc::new(FilesystemStore));
    /// let report = verifier.verify_export(&ExportSummary::new(name), &config).await?;
    /// println!("{}", report.format_summary());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn verify_export(
        &self,
        summary: &ExportSummary,
        config: &ExportConfigDefinition,
    ) -> Result<VerificationReport> {
        let start = Instant::now();
        let mut report = VerificationReport::new();

        tracing::info!(
            export = %summary.export_name,
            artifacts = summary.artifacts.len(),
            "Starting post-export verification"
        );

        for artifact in &summary.artifacts {
            let failure = |actual_checksum: String, reason: String| VerificationFailure {
                filename: artifact.filename.clone(),
                source_path: artifact.source_path.to_string(),
                expected_checksum: artifact.checksum.clone(),
                actual_checksum,
                reason,
            };

            match self.store.read_back(&artifact.filename, config).await {
                Ok(Some(bytes)) => {
                    let actual = calculate_checksum(&bytes);
                    if actual == artifact.checksum {
                        report.record_pass();
                    } else {
                        tracing::warn!(
                            filename = %artifact.filename,
                            expected = %artifact.checksum,
                            actual = %actual,
                            "Checksum mismatch"
                        );
                        report.record_failure(failure(actual, "Checksum mismatch".to_string()));
                    }
                }
                Ok(None) => {
                    tracing::debug!(
                        filename = %artifact.filename,
                        store = %self.store.name(),
                        "Store cannot read back, skipping"
                    );
                    report.record_skip();
                }
                Err(e) => {
                    tracing::warn!(filename = %artifact.filename, error = %e, "Cannot read artifact back");
                    report.record_failure(failure(String::new(), e.to_string()));
                }
            }
        }

        report.set_duration(start.elapsed().as_millis() as u64);
        tracing::info!(
            export = %summary.export_name,
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            "Verification completed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::store::FilesystemStore;
    use crate::core::export::summary::ExportedArtifact;
    use crate::domain::{ExportName, NodePath};
    use tempfile::TempDir;

    fn artifact(filename: &str, content: &[u8]) -> ExportedArtifact {
        ExportedArtifact {
            source_path: NodePath::new("/Subjects/s1").unwrap(),
            filename: filename.to_string(),
            checksum: calculate_checksum(content),
            size: content.len(),
            contents: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_verify_export() {
        let dir = TempDir::new().unwrap();
        let name = ExportName::new("nightly").unwrap();
        let config = ExportConfigDefinition::new(name.clone(), "changedSubjects", "json", "filesystem")
            .with_parameter("savePath", &dir.path().to_string_lossy());

        std::fs::write(dir.path().join("good.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("changed.json"), b"{\"a\":1}").unwrap();

        let mut summary = ExportSummary::new(name);
        summary.record_artifact(artifact("good.json", b"{}"));
        summary.record_artifact(artifact("changed.json", b"{}"));
        summary.record_artifact(artifact("missing.json", b"{}"));

        let report = Verifier::new(Arc::new(FilesystemStore))
            .verify_export(&summary, &config)
            .await
            .unwrap();

        assert_eq!(report.total_verified, 3);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.failures[0].filename, "changed.json");
        assert_eq!(report.failures[0].reason, "Checksum mismatch");
        assert!(report.failures[1].actual_checksum.is_empty());
    }
}

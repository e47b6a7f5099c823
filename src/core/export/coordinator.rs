//! Export coordinator
//!
//! Runs one export definition end to end: resolve the pipeline, validate the
//! store, retrieve, then format and store each resource in order. Resource
//! failures are recorded in the summary and never stop the run.

use super::filename::artifact_filename;
use super::pipeline::{DataPipeline, StageRegistry};
use super::retriever::retrieval_error;
use super::summary::{ExportError, ExportErrorType, ExportSummary, ExportedArtifact};
use crate::adapters::repository::ContentRepository;
use crate::config::ExportConfigDefinition;
use crate::core::verification::checksum::calculate_checksum;
use crate::core::verification::Verifier;
use crate::domain::{
    ExportName, ResourceIdentifier, ResourceRepresentation, Result, RunMode, StrataError,
    TimeWindow,
};
use crate::{log_export_complete, log_export_start, log_resource_failure};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Instant;

/// Runs export definitions against a content repository
pub struct ExportCoordinator {
    repository: Arc<dyn ContentRepository>,
    stages: Arc<StageRegistry>,
    verify: bool,
}

impl ExportCoordinator {
    /// Creates a coordinator without verification
    pub fn new(repository: Arc<dyn ContentRepository>, stages: Arc<StageRegistry>) -> Self {
        Self {
            repository,
            stages,
            verify: false,
        }
    }

    /// Reads every artifact back after the run
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    /// Runs one export for `window`
    ///
    /// `now` feeds the file name placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Configuration`] when a stage is unknown or the
    /// store parameters are invalid, and [`StrataError::Retrieval`] when the
    /// resources cannot be selected. Formatting and storage failures are
    /// reported in the summary instead.
    pub async fn run(
        &self,
        config: &ExportConfigDefinition,
        window: &TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut summary = ExportSummary::new(config.name.clone());

        log_export_start!(config.name, window);

        let pipeline = self.stages.build_pipeline(config)?;
        pipeline.store.validate(config)?;
        tracing::debug!(export = %config.name, pipeline = ?pipeline, "Resolved pipeline");

        let identifiers = {
            let session = self.repository.open_session().map_err(retrieval_error)?;
            pipeline
                .retriever
                .get_resources_to_export(config, window, session.as_ref())
                .map_err(retrieval_error)?
        };
        summary.total_resources = identifiers.len();

        for identifier in &identifiers {
            self.export_resource(&pipeline, config, window, now, identifier, &mut summary)
                .await;
        }

        if self.verify {
            self.verify_artifacts(&pipeline, config, &mut summary).await;
        }

        summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        log_export_complete!(config.name, summary.exported, summary.duration);

        Ok(summary)
    }

    /// Runs several exports concurrently, each with the window `mode` gives
    /// for its own frequency
    ///
    /// Every export is an independent job; one failing run does not affect
    /// the others.
    pub async fn run_many(
        &self,
        configs: &[ExportConfigDefinition],
        mode: RunMode,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Vec<(ExportName, Result<ExportSummary>)> {
        let jobs = configs.iter().map(|config| async move {
            let result = match mode.window(config.frequency_in_days, today) {
                Ok(window) => self.run(config, &window, now).await,
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                tracing::error!(export = %config.name, error = %e, "Export run failed");
            }
            (config.name.clone(), result)
        });
        futures::future::join_all(jobs).await
    }

    async fn export_resource(
        &self,
        pipeline: &DataPipeline,
        config: &ExportConfigDefinition,
        window: &TimeWindow,
        now: DateTime<Utc>,
        identifier: &ResourceIdentifier,
        summary: &mut ExportSummary,
    ) {
        let representation = match self.format(pipeline, config, window, identifier) {
            Ok(Some(representation)) => representation,
            Ok(None) => {
                tracing::debug!(resource = %identifier, "Nothing to export, skipping");
                summary.skipped += 1;
                return;
            }
            Err(e) => {
                log_resource_failure!(identifier.source_path, "format", e);
                summary.record_failure(
                    ExportError::new(ExportErrorType::Formatting, e.to_string())
                        .with_context(identifier.source_path.to_string()),
                );
                return;
            }
        };

        let filename = artifact_filename(&config.file_name_format, &representation, window, now);
        match pipeline
            .store
            .store(
                &representation.content,
                &filename,
                &representation.mime_type,
                config,
            )
            .await
        {
            Ok(()) => {
                tracing::info!(
                    resource = %identifier,
                    filename = %filename,
                    bytes = representation.size(),
                    items = representation.contents_summary.len(),
                    "Exported resource"
                );
                summary.record_artifact(artifact(representation, filename));
            }
            Err(e) => {
                log_resource_failure!(identifier.source_path, "store", e);
                summary.record_failure(
                    ExportError::new(ExportErrorType::Storage, e.to_string())
                        .with_context(format!("{} -> {filename}", identifier.source_path)),
                );
            }
        }
    }

    /// Formats one resource inside its own session
    fn format(
        &self,
        pipeline: &DataPipeline,
        config: &ExportConfigDefinition,
        window: &TimeWindow,
        identifier: &ResourceIdentifier,
    ) -> Result<Option<ResourceRepresentation>> {
        let session = self
            .repository
            .open_session()
            .map_err(|e| StrataError::Formatting(e.to_string()))?;
        pipeline
            .formatter
            .format(identifier, window, config, session.as_ref())
    }

    async fn verify_artifacts(
        &self,
        pipeline: &DataPipeline,
        config: &ExportConfigDefinition,
        summary: &mut ExportSummary,
    ) {
        let verifier = Verifier::new(pipeline.store.clone());
        match verifier.verify_export(summary, config).await {
            Ok(report) => {
                if !report.is_success() {
                    for failure in &report.failures {
                        tracing::warn!(
                            filename = %failure.filename,
                            source_path = %failure.source_path,
                            reason = %failure.reason,
                            "Verification failure"
                        );
                    }
                }
                summary.set_verification_report(report);
            }
            Err(e) => {
                tracing::error!(export = %config.name, error = %e, "Verification failed");
                summary.add_error(ExportError::new(
                    ExportErrorType::Verification,
                    format!("Verification failed: {e}"),
                ));
            }
        }
    }
}

fn artifact(representation: ResourceRepresentation, filename: String) -> ExportedArtifact {
    ExportedArtifact {
        checksum: calculate_checksum(&representation.content),
        size: representation.size(),
        source_path: representation.identifier.source_path,
        filename,
        contents: representation.contents_summary,
    }
}

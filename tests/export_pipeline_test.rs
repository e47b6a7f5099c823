//! End-to-end export runs

mod common;

use chrono::NaiveDate;
use common::{
    at, clinical_repository, coordinator, engine, export, stages, window, FailingStore,
    RecordingStore, StaticRetriever,
};
use serde_json::Value;
use std::sync::Arc;
use strata::config::ExportConfigDefinition;
use strata::core::export::{ExportCoordinator, ExportErrorType, StageRegistry};
use strata::core::verification::Verifier;
use strata::domain::{NodePath, ResourceIdentifier, RunMode, StrataError};
use tempfile::TempDir;

fn filesystem_export(
    name: &str,
    retriever: &str,
    formatter: &str,
    dir: &TempDir,
) -> ExportConfigDefinition {
    export(name, retriever, formatter, "filesystem")
        .with_parameter("savePath", &dir.path().to_string_lossy())
}

#[tokio::test]
async fn test_subjects_to_filesystem() {
    let dir = TempDir::new().unwrap();
    let repository = clinical_repository();
    let coordinator = ExportCoordinator::new(
        repository.clone(),
        Arc::new(StageRegistry::with_builtin(engine()).unwrap()),
    );
    let config = filesystem_export("subjects", "changedSubjects", "json", &dir);

    let summary = coordinator.run(&config, &window(8, 10), at(10, 6)).await.unwrap();

    assert_eq!(summary.total_resources, 2);
    assert_eq!(summary.exported, 2);
    assert_eq!(summary.failed, 0);
    assert!(summary.is_successful());
    assert_eq!(repository.open_sessions(), 0);

    let mut written: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(
        written,
        vec!["P-0001_data_20240510.json", "P-0002_data_20240510.json"]
    );

    let document: Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("P-0002_data_20240510.json")).unwrap())
            .unwrap();
    assert_eq!(document["identifier"], "P-0002");
    assert_eq!(document["Visit"][0]["@path"], "/Forms/f3");
    // f2 is incomplete
    assert!(document.get("Survey").is_none());

    let artifact = &summary.artifacts[0];
    assert_eq!(artifact.source_path.as_str(), "/Subjects/s2");
    assert_eq!(artifact.contents, vec!["/Forms/f3"]);
}

#[tokio::test]
async fn test_stored_bytes_match_formatter_output() {
    let dir = TempDir::new().unwrap();
    let repository = clinical_repository();
    let coordinator = ExportCoordinator::new(
        repository.clone(),
        Arc::new(StageRegistry::with_builtin(engine()).unwrap()),
    )
    .with_verification(true);
    let config = ExportConfigDefinition {
        file_name_format: "{resourceName}".to_string(),
        ..filesystem_export("files", "changedFiles", "raw", &dir)
    };

    let summary = coordinator.run(&config, &window(9, 10), at(10, 6)).await.unwrap();

    assert_eq!(summary.exported, 1);
    // empty.txt has no content node
    assert_eq!(summary.skipped, 1);
    let stored = std::fs::read(dir.path().join("report.pdf")).unwrap();
    assert_eq!(stored, b"%PDF-1.7 report");

    let report = summary.verification_report.as_ref().unwrap();
    assert_eq!(report.passed, 1);
    assert!(summary.is_successful());
}

#[tokio::test]
async fn test_csv_and_tsv_tables() {
    let dir = TempDir::new().unwrap();
    let repository = clinical_repository();
    let coordinator = ExportCoordinator::new(
        repository.clone(),
        Arc::new(StageRegistry::with_builtin(engine()).unwrap()),
    );

    let csv = filesystem_export("subjects-csv", "changedSubjects", "csv", &dir);
    let summary = coordinator.run(&csv, &window(1, 10), at(10, 6)).await.unwrap();
    assert_eq!(summary.exported, 2);
    let table = std::fs::read_to_string(dir.path().join("P-0001_table_20240510.csv")).unwrap();
    let lines: Vec<_> = table.lines().collect();
    // one row per form of s1 in the window
    assert_eq!(lines.len(), 3);
    assert!(lines[0].split(',').any(|c| c == "@path"));
    assert!(lines[1].contains("/Forms/f5"));
    assert!(lines[2].contains("/Forms/f1"));

    let tsv = filesystem_export("forms-tsv", "changedForms", "csv", &dir)
        .with_parameter("delimiter", "tab");
    let summary = coordinator.run(&tsv, &window(9, 10), at(10, 6)).await.unwrap();
    assert_eq!(summary.exported, 1);
    let table = std::fs::read_to_string(dir.path().join("f1_table_20240510.tsv")).unwrap();
    let header: Vec<_> = table.lines().next().unwrap().split('\t').collect();
    assert!(header.contains(&"subject/identifier"));
    assert!(header.contains(&"statusFlags"));
}

#[tokio::test]
async fn test_unresolvable_resource_fails_alone() {
    let repository = clinical_repository();
    let store = Arc::new(RecordingStore::default());
    let mut registry = stages(store.clone());
    registry
        .register_retriever(Arc::new(StaticRetriever(vec![
            ResourceIdentifier::new(
                NodePath::new("/Subjects/ghost").unwrap(),
                "ghost",
                "/Subjects/ghost.data",
            ),
            ResourceIdentifier::new(NodePath::new("/Subjects/s1").unwrap(), "P-0001", "/Subjects/s1"),
        ])))
        .unwrap();
    let coordinator = coordinator(&repository, registry);

    let summary = coordinator
        .run(&export("static", "static", "json", "memory"), &window(9, 10), at(10, 6))
        .await
        .unwrap();

    assert_eq!(summary.total_resources, 2);
    assert_eq!(summary.exported, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors[0].error_type, ExportErrorType::Formatting);
    assert_eq!(summary.errors[0].context.as_deref(), Some("/Subjects/ghost"));
    assert_eq!(summary.success_rate(), 50.0);
    assert!(!summary.is_successful());
    assert_eq!(store.filenames(), vec!["P-0001_data_20240510.json"]);
    assert_eq!(repository.open_sessions(), 0);
}

#[tokio::test]
async fn test_middle_failure_leaves_neighbours_exported() {
    let repository = clinical_repository();
    let store = Arc::new(RecordingStore::default());
    let mut registry = stages(store.clone());
    registry
        .register_retriever(Arc::new(StaticRetriever(vec![
            ResourceIdentifier::new(NodePath::new("/Subjects/s1").unwrap(), "P-0001", "/Subjects/s1"),
            ResourceIdentifier::new(
                NodePath::new("/Subjects/ghost").unwrap(),
                "ghost",
                "/Subjects/ghost",
            ),
            ResourceIdentifier::new(NodePath::new("/Subjects/s3").unwrap(), "P-0003", "/Subjects/s3"),
        ])))
        .unwrap();
    let coordinator = coordinator(&repository, registry);

    let result = coordinator
        .run(&export("static", "static", "json", "memory"), &window(9, 10), at(10, 6))
        .await;

    let summary = result.unwrap();
    assert_eq!(summary.total_resources, 3);
    assert_eq!(summary.exported, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].context.as_deref(), Some("/Subjects/ghost"));
    assert_eq!(
        store.filenames(),
        vec!["P-0001_data_20240510.json", "P-0003_data_20240510.json"]
    );
    assert_eq!(repository.open_sessions(), 0);
}

#[tokio::test]
async fn test_storage_failure_is_recorded() {
    let repository = clinical_repository();
    let store = Arc::new(FailingStore::new("P-0001"));
    let coordinator = coordinator(&repository, stages(store.clone()));

    let summary = coordinator
        .run(
            &export("subjects", "changedSubjects", "json", "failing"),
            &window(8, 10),
            at(10, 6),
        )
        .await
        .unwrap();

    assert_eq!(summary.exported, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors[0].error_type, ExportErrorType::Storage);
    assert_eq!(store.inner.filenames(), vec!["P-0002_data_20240510.json"]);
}

#[tokio::test]
async fn test_missing_save_path_aborts_before_retrieval() {
    let repository = clinical_repository();
    repository.set_queries_fail(true);
    let coordinator = ExportCoordinator::new(
        repository.clone(),
        Arc::new(StageRegistry::with_builtin(engine()).unwrap()),
    );

    let err = coordinator
        .run(
            &export("subjects", "changedSubjects", "json", "filesystem"),
            &window(9, 10),
            at(10, 6),
        )
        .await
        .unwrap_err();

    // the failing queries were never reached
    assert!(matches!(err, StrataError::Configuration(_)));
    assert!(err.to_string().contains("savePath"));
}

#[tokio::test]
async fn test_unknown_stage_aborts() {
    let repository = clinical_repository();
    let coordinator = coordinator(&repository, stages(Arc::new(RecordingStore::default())));

    let err = coordinator
        .run(&export("subjects", "changedSubjects", "xml", "memory"), &window(9, 10), at(10, 6))
        .await
        .unwrap_err();
    assert!(matches!(err, StrataError::Configuration(_)));
}

#[tokio::test]
async fn test_retrieval_failure_aborts_run() {
    let repository = clinical_repository();
    repository.set_queries_fail(true);
    let store = Arc::new(RecordingStore::default());
    let coordinator = coordinator(&repository, stages(store.clone()));

    let err = coordinator
        .run(&export("subjects", "changedSubjects", "json", "memory"), &window(9, 10), at(10, 6))
        .await
        .unwrap_err();

    assert!(matches!(err, StrataError::Retrieval(_)));
    assert!(store.stored().is_empty());
    assert_eq!(repository.open_sessions(), 0);
}

#[tokio::test]
async fn test_verification_detects_corruption() {
    let repository = clinical_repository();
    let store = Arc::new(RecordingStore::default());
    let coordinator = coordinator(&repository, stages(store.clone())).with_verification(true);
    let config = export("subjects", "changedSubjects", "json", "memory");

    let summary = coordinator.run(&config, &window(8, 10), at(10, 6)).await.unwrap();
    let report = summary.verification_report.as_ref().unwrap();
    assert_eq!(report.total_verified, 2);
    assert!(report.is_success());

    store.corrupt("P-0001_data_20240510.json");
    let report = Verifier::new(store.clone())
        .verify_export(&summary, &config)
        .await
        .unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].filename, "P-0001_data_20240510.json");
    assert_eq!(report.failures[0].source_path, "/Subjects/s1");
}

#[tokio::test]
async fn test_stores_without_read_back_are_skipped() {
    let repository = clinical_repository();
    let store = Arc::new(FailingStore::new("never"));
    let coordinator = coordinator(&repository, stages(store)).with_verification(true);

    let summary = coordinator
        .run(
            &export("subjects", "changedSubjects", "json", "failing"),
            &window(8, 10),
            at(10, 6),
        )
        .await
        .unwrap();

    let report = summary.verification_report.as_ref().unwrap();
    assert_eq!(report.skipped, 2);
    assert!(summary.is_successful());
}

#[tokio::test]
async fn test_run_many_isolates_exports() {
    let repository = clinical_repository();
    let store = Arc::new(RecordingStore::default());
    let coordinator = coordinator(&repository, stages(store.clone()));
    let configs = vec![
        export("subjects", "changedSubjects", "json", "memory"),
        export("broken", "changedSubjects", "json", "nowhere"),
        export("forms", "changedForms", "json", "memory"),
    ];
    let mode = RunMode::Manual {
        from: NaiveDate::from_ymd_opt(2024, 5, 9).unwrap(),
        to: Some(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()),
    };

    let results = coordinator
        .run_many(&configs, mode, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(), at(10, 6))
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0.as_str(), "subjects");
    assert_eq!(results[0].1.as_ref().unwrap().exported, 1);
    assert!(matches!(results[1].1, Err(StrataError::Configuration(_))));
    assert_eq!(results[2].1.as_ref().unwrap().exported, 1);

    let mut filenames = store.filenames();
    filenames.sort();
    assert_eq!(
        filenames,
        vec!["P-0001_data_20240510.json", "f1_data_20240510.json"]
    );
}

#[tokio::test]
async fn test_scheduled_mode_uses_frequency() {
    let repository = clinical_repository();
    let store = Arc::new(RecordingStore::default());
    let coordinator = coordinator(&repository, stages(store.clone()));
    let mut weekly = export("weekly", "changedForms", "json", "memory");
    weekly.frequency_in_days = 7;
    let daily = export("daily", "changedForms", "json", "memory");

    let results = coordinator
        .run_many(
            &[weekly, daily],
            RunMode::Scheduled,
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            at(10, 6),
        )
        .await;

    // f1 and f3 changed this week; f2 is incomplete
    assert_eq!(results[0].1.as_ref().unwrap().exported, 2);
    assert_eq!(results[1].1.as_ref().unwrap().exported, 1);
}

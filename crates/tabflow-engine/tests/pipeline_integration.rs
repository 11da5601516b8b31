//! Integration tests for the full pipeline path: parse → assemble →
//! extract → transform → store → housekeeping, over real temp dirs.

use std::path::{Path, PathBuf};

use tabflow_engine::config::{parser, validator};
use tabflow_engine::orchestrator;
use tabflow_types::{EtlError, PipelineConfig};

fn config_for(
    in_dir: &Path,
    out_dir: &Path,
    extract_extra: &str,
    transformer_yaml: &str,
) -> PipelineConfig {
    let yaml = format!(
        "
app_name: it_pipeline
meta:
  logging_level: info

extract:
  type: csv_file
  name: files_in
  storage_backend: fs
  path: {in_dir}
  use_package: arrow
{extract_extra}
transformer:
{transformer_yaml}
storage:
  type: csv_file
  name: files_out
  storage_backend: fs
  path: {out_dir}
  key: out
  use_package: arrow
",
        in_dir = in_dir.display(),
        out_dir = out_dir.display(),
    );
    parser::parse_pipeline_str(&yaml).expect("test config must parse")
}

const NOOP: &str = "  type: noop\n  name: passthrough";

fn write_csv(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

fn output_files(out_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(out_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    files
}

/// Data rows in a written CSV file (total lines minus the header).
fn data_rows(path: &Path) -> usize {
    std::fs::read_to_string(path).unwrap().lines().count() - 1
}

#[tokio::test]
async fn round_trip_preserves_row_count() {
    let in_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    write_csv(in_dir.path(), "users.csv", "id,name\n1,ada\n2,grace\n3,edsger\n");

    let config = config_for(in_dir.path(), out_dir.path(), "", NOOP);
    validator::validate_pipeline(&config).unwrap();
    let report = orchestrator::run_pipeline(&config).await.unwrap();

    assert_eq!(report.files_extracted, 1);
    assert_eq!(report.datasets_forwarded, 1);
    assert_eq!(report.rows_forwarded, 3);

    let outputs = output_files(out_dir.path());
    assert_eq!(outputs.len(), 1);
    assert_eq!(data_rows(&outputs[0]), 3);

    let ledger = std::fs::read_to_string(in_dir.path().join("etl.housekeeping")).unwrap();
    assert_eq!(ledger, "users.csv\n");
}

#[tokio::test]
async fn second_run_processes_nothing() {
    let in_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    write_csv(in_dir.path(), "users.csv", "id\n1\n2\n");

    let config = config_for(in_dir.path(), out_dir.path(), "", NOOP);
    let first = orchestrator::run_pipeline(&config).await.unwrap();
    assert_eq!(first.files_extracted, 1);

    let second = orchestrator::run_pipeline(&config).await.unwrap();
    assert_eq!(second.files_extracted, 0);
    assert_eq!(second.datasets_forwarded, 0);
    assert_eq!(output_files(out_dir.path()).len(), 1);
}

#[tokio::test]
async fn reprocess_ignores_the_ledger() {
    let in_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    write_csv(in_dir.path(), "users.csv", "id\n1\n");

    let config = config_for(in_dir.path(), out_dir.path(), "  reprocess: true\n", NOOP);
    orchestrator::run_pipeline(&config).await.unwrap();
    let second = orchestrator::run_pipeline(&config).await.unwrap();

    assert_eq!(second.files_extracted, 1);
    assert_eq!(output_files(out_dir.path()).len(), 2);
}

#[tokio::test]
async fn fail_no_files_raises_on_an_empty_source() {
    let in_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();

    let config = config_for(
        in_dir.path(),
        out_dir.path(),
        "  fail_no_files: true\n",
        NOOP,
    );
    let err = orchestrator::run_pipeline(&config).await.unwrap_err();
    assert!(matches!(err, EtlError::NoFilesFound { .. }));
}

#[tokio::test]
async fn empty_source_without_fail_no_files_returns_cleanly() {
    let in_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();

    let config = config_for(in_dir.path(), out_dir.path(), "", NOOP);
    let report = orchestrator::run_pipeline(&config).await.unwrap();

    assert_eq!(report.datasets_forwarded, 0);
    // No storage call happened.
    assert!(output_files(out_dir.path()).is_empty());
}

#[tokio::test]
async fn single_mode_forwards_each_file_individually() {
    let in_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    write_csv(in_dir.path(), "a.csv", "id\n1\n");
    write_csv(in_dir.path(), "b.csv", "id\n2\n");
    write_csv(in_dir.path(), "c.csv", "id\n3\n");

    let config = config_for(in_dir.path(), out_dir.path(), "  read_mode: single\n", NOOP);
    let report = orchestrator::run_pipeline(&config).await.unwrap();

    assert_eq!(report.files_extracted, 3);
    assert_eq!(report.datasets_forwarded, 3);
    assert_eq!(report.rows_forwarded, 3);
    assert_eq!(output_files(out_dir.path()).len(), 3);
}

#[tokio::test]
async fn all_mode_forwards_one_combined_dataset() {
    let in_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    write_csv(in_dir.path(), "a.csv", "id\n1\n");
    write_csv(in_dir.path(), "b.csv", "id\n2\n3\n");

    let config = config_for(in_dir.path(), out_dir.path(), "  read_mode: all\n", NOOP);
    let report = orchestrator::run_pipeline(&config).await.unwrap();

    assert_eq!(report.files_extracted, 2);
    assert_eq!(report.datasets_forwarded, 1);
    assert_eq!(report.rows_forwarded, 3);

    let outputs = output_files(out_dir.path());
    assert_eq!(outputs.len(), 1);
    assert_eq!(data_rows(&outputs[0]), 3);
}

#[tokio::test]
async fn query_transform_filters_rows_end_to_end() {
    let in_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    write_csv(in_dir.path(), "users.csv", "id\n1\n2\n3\n4\n5\n");

    let transformer = "  type: query
  name: keep_big_ids
  use_package: datafusion
  query: 'select * from users_tbl where id >= 3'
  table_name: users_tbl";
    let config = config_for(in_dir.path(), out_dir.path(), "", transformer);
    let report = orchestrator::run_pipeline(&config).await.unwrap();

    assert_eq!(report.rows_forwarded, 5);
    let outputs = output_files(out_dir.path());
    assert_eq!(outputs.len(), 1);
    assert_eq!(data_rows(&outputs[0]), 3);
}

#[tokio::test]
async fn chain_applies_stages_in_order_before_storing() {
    let in_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    write_csv(in_dir.path(), "users.csv", "id\n1\n2\n3\n4\n5\n");

    let transformer = "  type: chain
  name: narrow
  transforms:
    - type: query
      name: above_one
      use_package: datafusion
      query: 'select * from t where id > 1'
      table_name: t
    - type: query
      name: above_two
      use_package: datafusion
      query: 'select * from t where id > 2'
      table_name: t";
    let config = config_for(in_dir.path(), out_dir.path(), "", transformer);
    orchestrator::run_pipeline(&config).await.unwrap();

    let outputs = output_files(out_dir.path());
    // Chain children must not trigger storage; only the terminal hand-off
    // writes.
    assert_eq!(outputs.len(), 1);
    assert_eq!(data_rows(&outputs[0]), 3);
}

#[tokio::test]
async fn a_renamed_ledger_is_never_a_candidate() {
    let in_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    // The ledger carries a .csv name here, so only the name check keeps
    // it out of the candidate list.
    write_csv(in_dir.path(), "ledger.csv", "already-done.csv\n");
    write_csv(in_dir.path(), "users.csv", "id\n1\n");

    let config = config_for(
        in_dir.path(),
        out_dir.path(),
        "  housekeeping: ledger.csv\n",
        NOOP,
    );
    let report = orchestrator::run_pipeline(&config).await.unwrap();

    assert_eq!(report.files_extracted, 1);
    let ledger = std::fs::read_to_string(in_dir.path().join("ledger.csv")).unwrap();
    assert_eq!(ledger, "already-done.csv\nusers.csv\n");
}

#[test]
fn check_pipeline_rejects_unknown_component_types() {
    let in_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();

    let mut config = config_for(in_dir.path(), out_dir.path(), "", NOOP);
    config.storage.type_name = "postgres".to_string();
    let err = orchestrator::check_pipeline(&config).unwrap_err();
    assert!(matches!(err, EtlError::UnknownComponentType { .. }));

    let mut config = config_for(in_dir.path(), out_dir.path(), "", NOOP);
    config.extract.type_name = "kafka".to_string();
    let err = orchestrator::check_pipeline(&config).unwrap_err();
    assert!(err.to_string().contains("kafka"));
}

#[test]
fn parse_and_validate_fixture_pipeline() {
    std::env::set_var("TABFLOW_FIXTURE_IN", "/data/in");
    std::env::set_var("TABFLOW_FIXTURE_OUT", "/data/out");

    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/pipelines/users_noop.yaml");
    let config = parser::parse_pipeline(&fixture_path).expect("fixture must parse");

    assert_eq!(config.app_name, "users_noop");
    assert_eq!(config.extract.type_name, "csv_file");
    assert_eq!(
        config.extract.options.get("path").and_then(|v| v.as_str()),
        Some("/data/in")
    );
    validator::validate_pipeline(&config).expect("fixture must validate");

    std::env::remove_var("TABFLOW_FIXTURE_IN");
    std::env::remove_var("TABFLOW_FIXTURE_OUT");
}

#[test]
fn invalid_fixture_fails_at_parse_time() {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/pipelines/invalid_pipeline.yaml");
    let err = parser::parse_pipeline(&fixture_path).unwrap_err();
    assert!(err.to_string().contains("failed to parse pipeline YAML"));
}

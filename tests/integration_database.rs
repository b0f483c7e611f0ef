//! Integration tests against a live PostgreSQL server
//!
//! Ignored by default. Point `ETL_TEST_DATABASE_URL` at a scratch database
//! and run with `cargo test -- --ignored`.

use etl_project::processor::database::Database;
use etl_project::{EtlConfig, EtlJob, Record, Table};
use std::fs;
use tempfile::TempDir;

fn test_config(table_name: &str) -> EtlConfig {
    let dsn = std::env::var("ETL_TEST_DATABASE_URL")
        .expect("ETL_TEST_DATABASE_URL must be set for database tests");

    EtlConfig::default()
        .with_dsn(dsn)
        .with_table_name(table_name)
        .with_insert_batch_size(2)
}

#[tokio::test]
#[ignore = "requires ETL_TEST_DATABASE_URL"]
async fn test_replace_then_query_round_trip() {
    let config = test_config("etl_test_round_trip");
    let mut database = Database::connect(&config).await.unwrap();

    let records = vec![
        Record::new("Alice", 1.65, 63.5),
        Record::new("alex", 1.67, 51.25),
        Record::new("ajay", 1.82, 61.91),
    ];
    let loaded = database
        .replace_table(&Table::from_records(&records).unwrap())
        .await
        .unwrap();
    let queried = database.query_table().await.unwrap();
    database.close().await.unwrap();

    assert_eq!(loaded, 3);
    let mut rows = queried.records().unwrap();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    let mut expected = records;
    expected.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(rows, expected);
}

#[tokio::test]
#[ignore = "requires ETL_TEST_DATABASE_URL"]
async fn test_second_load_replaces_first() {
    let config = test_config("etl_test_replace");
    let mut database = Database::connect(&config).await.unwrap();

    let first = Table::from_records(&[
        Record::new("alex", 1.67, 51.25),
        Record::new("ajay", 1.82, 61.91),
    ])
    .unwrap();
    let second = Table::from_records(&[Record::new("Alice", 1.65, 63.5)]).unwrap();

    database.replace_table(&first).await.unwrap();
    database.replace_table(&second).await.unwrap();
    let queried = database.query_table().await.unwrap();
    database.close().await.unwrap();

    assert_eq!(
        queried.records().unwrap(),
        vec![Record::new("Alice", 1.65, 63.5)]
    );
}

#[tokio::test]
#[ignore = "requires ETL_TEST_DATABASE_URL"]
async fn test_full_run_logs_every_phase() {
    let temp_dir = TempDir::new().unwrap();
    let source_dir = temp_dir.path().join("source");
    fs::create_dir_all(&source_dir).unwrap();
    fs::write(
        source_dir.join("people.csv"),
        "name,height,weight\nAlice,65,140\n",
    )
    .unwrap();
    let log_path = temp_dir.path().join("log_file.txt");

    let config = test_config("etl_test_full_run")
        .with_source_dir(&source_dir)
        .with_output_path(temp_dir.path().join("transformed_data.csv"))
        .with_log_path(&log_path);
    let stats = EtlJob::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.rows_written, 1);
    assert_eq!(stats.rows_loaded, 1);
    assert_eq!(stats.rows_queried, 1);

    let log = fs::read_to_string(&log_path).unwrap();
    let messages: Vec<&str> = log
        .lines()
        .filter_map(|line| line.split_once(',').map(|(_, message)| message))
        .collect();
    assert_eq!(
        messages,
        vec![
            "ETL Job Started",
            "Extract phase Started",
            "Extract phase Ended",
            "Transform phase Started",
            "Transform phase Ended",
            "Load phase Started",
            "Load phase Ended",
            "Database queried",
            "Database Querying Ended",
            "ETL Job Ended",
        ]
    );
}

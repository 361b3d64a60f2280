//! End-to-end tests: discovery, synthesis, compilation and execution

use dq_core::{Dialect, QualifiedName, RuleCatalog, SchemaScope, TableDescriptor};
use dq_db::{DuckDbBackend, Warehouse};
use dq_test::{
    compile, discover_active_tables, run_checks, synthesize, DiscoveryOptions, RunOptions,
    SynthesisOptions, TestKind, TestStatus,
};
use std::time::Duration;

async fn warehouse() -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE ACCOUNTS (ID INTEGER, EMAIL VARCHAR, ISCONFIRMEDEMAIL BOOLEAN, \
           PAYLOAD JSON, createdAt TIMESTAMP, updatedAt TIMESTAMP); \
         INSERT INTO ACCOUNTS VALUES \
           (1, 'a@x.com', true, '{\"k\": 1}', \
            date_trunc('day', CAST(get_current_timestamp() AS TIMESTAMP)) - INTERVAL 20 HOUR, \
            date_trunc('day', CAST(get_current_timestamp() AS TIMESTAMP)) - INTERVAL 18 HOUR), \
           (2, NULL, true, 'null', \
            date_trunc('day', CAST(get_current_timestamp() AS TIMESTAMP)) - INTERVAL 10 HOUR, \
            date_trunc('day', CAST(get_current_timestamp() AS TIMESTAMP)) - INTERVAL 14 HOUR), \
           (3, 'c@x.com', false, NULL, \
            date_trunc('day', CAST(get_current_timestamp() AS TIMESTAMP)) - INTERVAL 40 DAY, \
            date_trunc('day', CAST(get_current_timestamp() AS TIMESTAMP)) - INTERVAL 40 DAY); \
         CREATE TABLE DIM_DATES (DATE_ID INTEGER, DATE DATE, YEAR INTEGER); \
         INSERT INTO DIM_DATES VALUES \
           (20300101, DATE '2030-01-01', 2030), \
           (20240101, DATE '2024-01-02', 2024);",
    )
    .await
    .unwrap();
    db
}

fn discovery_options() -> DiscoveryOptions {
    DiscoveryOptions {
        activity_days: 30,
        probe_timeout: Duration::from_secs(10),
        time_column_priority: vec!["UPDATEDAT".to_string(), "CREATEDAT".to_string()],
        always_include: vec![QualifiedName::new("memory", "main", "DIM_DATES")],
    }
}

#[tokio::test]
async fn test_discover_then_run_yesterday_only() {
    let db = warehouse().await;
    let scope = SchemaScope {
        database: "memory".to_string(),
        schema: "main".to_string(),
    };

    let discovered = discover_active_tables(&db, &[scope], &discovery_options()).await;
    let names: Vec<&str> = discovered
        .active
        .iter()
        .map(|t| t.table.table.as_str())
        .collect();
    assert_eq!(names, vec!["ACCOUNTS", "DIM_DATES"]);
    assert_eq!(
        discovered.active[0].time_column.as_deref(),
        Some("updatedAt")
    );
    assert_eq!(discovered.active[1].time_column.as_deref(), Some("DATE"));

    let options = RunOptions {
        catalog: RuleCatalog::default(),
        synthesis: SynthesisOptions {
            recent_window_only: true,
            trailing_days: None,
            reference_year: 2025,
        },
        query_timeout: Duration::from_secs(10),
    };
    let report = run_checks(&db, &discovered.active, &options).await;

    let account_failures: Vec<(&str, i64)> = report
        .results
        .iter()
        .filter(|r| r.table == "memory.main.ACCOUNTS" && r.status == TestStatus::Fail)
        .map(|r| (r.columns.as_str(), r.violation_count))
        .collect();
    assert_eq!(
        account_failures,
        vec![
            ("EMAIL", 1),
            ("createdAt,updatedAt", 1),
            ("ISCONFIRMEDEMAIL,EMAIL", 1),
        ]
    );

    // DIM_DATES has no rows from yesterday, so every windowed test passes.
    assert!(report
        .results
        .iter()
        .filter(|r| r.table == "memory.main.DIM_DATES")
        .all(|r| r.status == TestStatus::Pass));
    assert_eq!(report.summary.errors, 0);
    assert_eq!(report.summary.timeouts, 0);
    assert!(!report.summary.all_passed());
}

#[tokio::test]
async fn test_whole_table_run_on_projection_table() {
    let db = warehouse().await;
    let table = QualifiedName::new("memory", "main", "DIM_DATES");
    let options = RunOptions {
        catalog: RuleCatalog::default(),
        synthesis: SynthesisOptions {
            recent_window_only: false,
            trailing_days: None,
            reference_year: 2025,
        },
        query_timeout: Duration::from_secs(10),
    };
    let targets = vec![dq_test::ActiveTable {
        table,
        time_column: Some("DATE".to_string()),
    }];

    let report = run_checks(&db, &targets, &options).await;
    let outcomes: Vec<(&str, TestKind, TestStatus, i64)> = report
        .results
        .iter()
        .map(|r| (r.columns.as_str(), r.kind, r.status, r.violation_count))
        .collect();

    assert_eq!(
        outcomes,
        vec![
            ("DATE_ID", TestKind::NotNull, TestStatus::Pass, 0),
            ("DATE_ID", TestKind::Unique, TestStatus::Pass, 0),
            ("DATE", TestKind::NotNull, TestStatus::Pass, 0),
            ("YEAR", TestKind::CustomCondition, TestStatus::Pass, 0),
            ("DATE_ID,DATE", TestKind::CustomCondition, TestStatus::Fail, 1),
        ]
    );
}

#[tokio::test]
async fn test_compiled_sql_is_stable_across_dialects() {
    let db = warehouse().await;
    let table = QualifiedName::new("memory", "main", "ACCOUNTS");
    let columns = db.describe_table(&table).await.unwrap();
    let descriptor = TableDescriptor::new(table, columns, Some("updatedAt".to_string()));
    let options = SynthesisOptions {
        recent_window_only: true,
        trailing_days: None,
        reference_year: 2025,
    };

    let specs = synthesize(&descriptor, &RuleCatalog::default(), &options);
    assert!(!specs.is_empty());
    for spec in &specs {
        let duckdb = compile(spec, Dialect::DuckDb).unwrap();
        let snowflake = compile(spec, Dialect::Snowflake).unwrap();
        assert_eq!(duckdb, compile(spec, Dialect::DuckDb).unwrap());
        assert!(duckdb.starts_with("SELECT COUNT(*) FROM "));
        assert!(duckdb.contains("FROM \"memory\".\"main\".\"ACCOUNTS\""));
        assert!(snowflake.contains("\"updatedAt\" >= (CURRENT_DATE - INTERVAL '1 DAY')"));
    }
}

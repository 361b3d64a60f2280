use super::*;
use crate::cli::DialectArg;
use dq_db::DuckDbBackend;
use dq_test::{TestKind, WindowMode};

async fn setup() -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE ACCOUNTS (ID INTEGER, EMAIL VARCHAR, NOTES VARCHAR, UPDATEDAT TIMESTAMP);",
    )
    .await
    .unwrap();
    db
}

fn args(sql: bool, dialect: Option<DialectArg>) -> RulesArgs {
    RulesArgs {
        table: "memory.main.ACCOUNTS".to_string(),
        sql,
        dialect,
        all_days: false,
        output: RulesOutput::Table,
    }
}

#[tokio::test]
async fn test_list_rules_without_sql() {
    let db = setup().await;
    let listing = list_rules(&Config::default(), &db, &args(false, None))
        .await
        .unwrap();

    assert_eq!(listing.table.primary_time_column.as_deref(), Some("UPDATEDAT"));
    let rules: Vec<&str> = listing.rows.iter().map(|r| r.spec.rule.as_str()).collect();
    assert_eq!(
        rules,
        vec![
            "primary_key_not_null",
            "primary_key_unique",
            "email_not_null",
            "email_format",
            "timestamp_not_null",
            "timestamp_not_future",
        ]
    );
    assert!(listing.rows.iter().all(|r| r.sql.is_none()));
    assert!(listing
        .rows
        .iter()
        .all(|r| r.spec.time_window.mode == WindowMode::PreviousCalendarDay));
}

#[tokio::test]
async fn test_list_rules_with_snowflake_sql() {
    let db = setup().await;
    let listing = list_rules(
        &Config::default(),
        &db,
        &args(true, Some(DialectArg::Snowflake)),
    )
    .await
    .unwrap();

    let email_format = listing
        .rows
        .iter()
        .find(|r| r.spec.rule == "email_format")
        .unwrap();
    assert_eq!(email_format.spec.kind, TestKind::CustomCondition);
    let sql = email_format.sql.as_deref().unwrap();
    assert!(sql.starts_with("SELECT COUNT(*) FROM \"memory\".\"main\".\"ACCOUNTS\""));
    assert!(sql.contains("REGEXP_LIKE"));
}

#[tokio::test]
async fn test_rule_row_json_includes_sql_only_when_compiled() {
    let db = setup().await;
    let listing = list_rules(&Config::default(), &db, &args(false, None))
        .await
        .unwrap();
    let json = serde_json::to_value(&listing.rows[0]).unwrap();
    assert_eq!(json["rule"], "primary_key_not_null");
    assert_eq!(json["kind"], "not_null");
    assert!(json.get("sql").is_none());
}

#[tokio::test]
async fn test_list_rules_missing_table() {
    let db = setup().await;
    let mut missing = args(false, None);
    missing.table = "memory.main.GONE".to_string();
    let err = list_rules(&Config::default(), &db, &missing)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to describe memory.main.GONE"));
}

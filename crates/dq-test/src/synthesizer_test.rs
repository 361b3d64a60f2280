use super::*;
use crate::compiler::compile;
use dq_core::{Dialect, QualifiedName};

fn table(name: &str, columns: &[(&str, &str)], time_column: Option<&str>) -> TableDescriptor {
    TableDescriptor::new(
        QualifiedName::new("DWH", "PUBLIC", name),
        columns
            .iter()
            .map(|(n, t)| ColumnDescriptor::new(*n, *t))
            .collect(),
        time_column.map(String::from),
    )
}

fn options(recent: bool, trailing: Option<u32>) -> SynthesisOptions {
    SynthesisOptions {
        recent_window_only: recent,
        trailing_days: trailing,
        reference_year: 2025,
    }
}

fn rules_of(specs: &[TestSpec]) -> Vec<&str> {
    specs.iter().map(|s| s.rule.as_str()).collect()
}

#[test]
fn test_id_and_email_without_window() {
    let t = table(
        "USERS",
        &[("ID", "NUMBER(38,0)"), ("EMAIL", "VARCHAR")],
        None,
    );
    let specs = synthesize(&t, &RuleCatalog::default(), &options(false, None));

    assert!(specs.len() >= 3);
    assert_eq!(
        rules_of(&specs),
        vec![
            "primary_key_not_null",
            "primary_key_unique",
            "email_not_null",
            "email_format"
        ]
    );
    assert!(specs.iter().all(|s| !s.time_window.is_active()));
    assert_eq!(specs[0].kind, TestKind::NotNull);
    assert_eq!(specs[1].kind, TestKind::Unique);
}

#[test]
fn test_primary_keys_get_exactly_one_not_null_and_unique() {
    let catalog = RuleCatalog::default();
    for pk in ["ID", "user_id", "DATE_ID", "Campaign_Id"] {
        let t = table("T", &[(pk, "NUMBER(38,0)")], None);
        let specs = synthesize(&t, &catalog, &options(false, None));
        let not_null = specs
            .iter()
            .filter(|s| s.kind == TestKind::NotNull && s.target_columns == [pk])
            .count();
        let unique = specs.iter().filter(|s| s.kind == TestKind::Unique).count();
        assert_eq!((not_null, unique), (1, 1), "column {pk}");
    }
}

#[test]
fn test_window_previous_day_when_recent_only() {
    let t = table(
        "USERS",
        &[("ID", "NUMBER(38,0)"), ("UPDATEDAT", "TIMESTAMP_NTZ")],
        Some("UPDATEDAT"),
    );
    let specs = synthesize(&t, &RuleCatalog::default(), &options(true, Some(7)));
    for spec in &specs {
        assert_eq!(spec.time_window.column.as_deref(), Some("UPDATEDAT"));
        assert_eq!(spec.time_window.mode, WindowMode::PreviousCalendarDay);
        assert!(spec
            .description
            .starts_with("Auto-generated (on UPDATEDAT for yesterday only): "));
    }
}

#[test]
fn test_window_trailing_days() {
    let t = table("USERS", &[("ID", "NUMBER(38,0)")], Some("UPDATEDAT"));
    let specs = synthesize(&t, &RuleCatalog::default(), &options(false, Some(14)));
    assert_eq!(specs[0].time_window.mode, WindowMode::TrailingDays(14));
    assert!(specs[0]
        .description
        .starts_with("Auto-generated (on UPDATEDAT for recent data): "));
}

#[test]
fn test_window_none_without_trailing_days() {
    let t = table("USERS", &[("ID", "NUMBER(38,0)")], Some("UPDATEDAT"));
    let specs = synthesize(&t, &RuleCatalog::default(), &options(false, None));
    assert_eq!(specs[0].time_window, TimeWindow::none());
    assert!(specs[0].description.starts_with("Auto-generated: "));
}

#[test]
fn test_description_names_rule() {
    let t = table("USERS", &[("ID", "NUMBER(38,0)")], None);
    let specs = synthesize(&t, &RuleCatalog::default(), &options(false, None));
    assert_eq!(
        specs[0].description,
        "Auto-generated: Primary key 'ID' should not be NULL. [rule: primary_key_not_null]"
    );
}

#[test]
fn test_synthesis_is_idempotent() {
    let t = table(
        "FACT_CAMPAIGNS",
        &[
            ("CAMPAIGN_ID", "NUMBER(38,0)"),
            ("DATE_ID", "NUMBER(38,0)"),
            ("DATE", "DATE"),
            ("IMPRESSIONS", "NUMBER(38,0)"),
            ("CLICKS", "NUMBER(38,0)"),
            ("YEAR", "NUMBER(38,0)"),
            ("PAYLOAD", "VARIANT"),
        ],
        Some("DATE"),
    );
    let catalog = RuleCatalog::default();
    let opts = options(true, None);
    assert_eq!(
        synthesize(&t, &catalog, &opts),
        synthesize(&t, &catalog, &opts)
    );
}

#[test]
fn test_projection_table_has_no_future_check() {
    let columns = [("DATE", "DATE"), ("CREATEDAT", "TIMESTAMP_NTZ")];
    let catalog = RuleCatalog::default();

    let projection = table("DIM_DATES", &columns, None);
    let specs = synthesize(&projection, &catalog, &options(false, None));
    assert!(!rules_of(&specs).contains(&"timestamp_not_future"));
    assert_eq!(
        specs
            .iter()
            .filter(|s| s.rule == "timestamp_not_null")
            .count(),
        2
    );

    let regular = table("EVENTS", &columns, None);
    let specs = synthesize(&regular, &catalog, &options(false, None));
    assert_eq!(
        specs
            .iter()
            .filter(|s| s.rule == "timestamp_not_future")
            .count(),
        2
    );
}

#[test]
fn test_created_updated_ordering_emitted_once() {
    let t = table(
        "ACCOUNTS_RAW",
        &[("createdAt", "TIMESTAMP_NTZ"), ("updatedAt", "TIMESTAMP_NTZ")],
        None,
    );
    let specs = synthesize(&t, &RuleCatalog::default(), &options(false, None));
    let ordering: Vec<&TestSpec> = specs
        .iter()
        .filter(|s| s.rule == "created_before_updated")
        .collect();
    assert_eq!(ordering.len(), 1);
    assert_eq!(ordering[0].target_columns, vec!["createdAt", "updatedAt"]);
    let sql = compile(ordering[0], Dialect::DuckDb).unwrap();
    assert!(sql.contains(r#""createdAt" > "updatedAt""#));
}

#[test]
fn test_condition_references_only_target_columns() {
    let t = table(
        "DIM_USERS_ACCOUNTS",
        &[
            ("ID", "NUMBER(38,0)"),
            ("EMAIL", "VARCHAR"),
            ("ISCONFIRMEDEMAIL", "BOOLEAN"),
            ("COUNTRY", "VARCHAR"),
            ("BALANCE", "NUMBER(10,2)"),
            ("CAMPAIGN_DURATION", "NUMBER(38,0)"),
            ("MONTH_ID", "NUMBER(38,0)"),
            ("UTM_KEY", "VARCHAR"),
            ("SOURCE", "VARCHAR"),
            ("ROLE", "VARCHAR"),
            ("MAIN_GAME", "NUMBER(38,0)"),
            ("NUMBER_OF_ACTIVE_SUBSCRIPTIONS", "NUMBER(38,0)"),
            ("IS_ACTIVE_SUB_IND", "NUMBER(1,0)"),
            ("CURRENCY", "VARCHAR"),
            ("DATE", "DATE"),
            ("FIRST_IMPRESSION_DATE", "DATE"),
            ("LAST_IMPRESSION_DATE", "DATE"),
            ("CLICKS", "NUMBER(38,0)"),
            ("IMPRESSIONS", "NUMBER(38,0)"),
        ],
        Some("DATE"),
    );
    let specs = synthesize(&t, &RuleCatalog::default(), &options(true, None));
    for spec in specs.iter().filter(|s| s.kind == TestKind::CustomCondition) {
        let condition = spec.condition.as_ref().unwrap();
        for column in condition.columns() {
            assert!(
                spec.target_columns.contains(&column),
                "{} references {column} outside {:?}",
                spec.rule,
                spec.target_columns
            );
        }
        assert!(compile(spec, Dialect::Snowflake).is_ok());
    }
    let rules = rules_of(&specs);
    assert!(rules.contains(&"confirmed_email_present"));
    assert!(rules.contains(&"active_subscription_count"));
    assert!(rules.contains(&"date_within_impressions"));
}

#[test]
fn test_order_columns_then_cross_then_table() {
    let t = table(
        "ACCOUNTS",
        &[
            ("ISCONFIRMEDEMAIL", "BOOLEAN"),
            ("CREATEDAT", "TIMESTAMP_NTZ"),
            ("EMAIL", "VARCHAR"),
            ("UPDATEDAT", "TIMESTAMP_NTZ"),
        ],
        None,
    );
    let specs = synthesize(&t, &RuleCatalog::default(), &options(false, None));
    assert_eq!(
        rules_of(&specs),
        vec![
            "boolean_indicator_values",
            "timestamp_not_null",
            "timestamp_not_future",
            "email_not_null",
            "email_format",
            "timestamp_not_null",
            "timestamp_not_future",
            "created_before_updated",
            "confirmed_email_present",
        ]
    );
}

#[test]
fn test_year_bound_uses_reference_year() {
    let t = table("DIM_DATES", &[("YEAR", "NUMBER(4,0)")], None);
    let specs = synthesize(&t, &RuleCatalog::default(), &options(false, None));
    assert_eq!(specs.len(), 1);
    let sql = compile(&specs[0], Dialect::DuckDb).unwrap();
    assert!(sql.contains(r#""YEAR" < 2015 OR "YEAR" > 2035"#));
}

#[test]
fn test_boolean_indicator_values_follow_type() {
    let catalog = RuleCatalog::default();
    let t = table(
        "T",
        &[("ISFROZEN", "BOOLEAN"), ("CURRENT_YEAR_IND", "NUMBER(1,0)")],
        None,
    );
    let specs = synthesize(&t, &catalog, &options(false, None));
    let sql: Vec<String> = specs
        .iter()
        .map(|s| compile(s, Dialect::DuckDb).unwrap())
        .collect();
    assert!(sql[0].contains("NOT IN (TRUE, FALSE)"));
    assert!(sql[1].contains("NOT IN (0, 1)"));
}

#[test]
fn test_unrecognized_columns_yield_nothing() {
    let t = table("T", &[("NOTES", "VARCHAR"), ("SCORE", "FLOAT")], None);
    assert!(synthesize(&t, &RuleCatalog::default(), &options(true, None)).is_empty());

    let empty = table("T", &[], Some("DATE"));
    assert!(synthesize(&empty, &RuleCatalog::default(), &options(true, None)).is_empty());
}

#[test]
fn test_custom_catalog_changes_rules() {
    let mut catalog = RuleCatalog::default();
    catalog.primary_keys = vec!["ACCOUNT_NO".to_string()];
    let t = table("T", &[("ACCOUNT_NO", "VARCHAR"), ("ID", "NUMBER(38,0)")], None);
    let specs = synthesize(&t, &catalog, &options(false, None));
    assert_eq!(specs[0].target_columns, vec!["ACCOUNT_NO"]);
    assert_eq!(specs[1].kind, TestKind::Unique);
    // ID is no longer a primary key; without the _ID suffix it matches nothing.
    assert_eq!(specs.len(), 2);
}

#[test]
fn test_matching_rules() {
    let registry = RuleRegistry::builtin();
    let catalog = RuleCatalog::default();
    assert_eq!(
        registry.matching_rules(&ColumnDescriptor::new("UTM_KEY", "VARCHAR"), &catalog),
        vec!["foreign_key", "key_identifier"]
    );
    assert!(registry
        .matching_rules(&ColumnDescriptor::new("NOTES", "VARCHAR"), &catalog)
        .is_empty());
}

#[test]
fn test_empty_registry_synthesizes_nothing() {
    let registry = RuleRegistry::new(Vec::new(), Vec::new(), Vec::new());
    let t = table("T", &[("ID", "NUMBER(38,0)")], None);
    assert!(registry
        .synthesize(&t, &RuleCatalog::default(), &options(false, None))
        .is_empty());
}

#[test]
fn test_builder_rejects_mismatched_columns() {
    let builtin_cross = rules::cross_column_rules();
    let within = builtin_cross
        .iter()
        .find(|r| r.name == "date_within_impressions")
        .unwrap();
    let builtin_table = rules::table_rules();
    let confirmed = builtin_table
        .iter()
        .find(|r| r.name == "confirmed_email_present")
        .unwrap();

    // Three-column template registered against two columns, two-column
    // template against one.
    let registry = RuleRegistry::new(
        Vec::new(),
        vec![CrossColumnRule {
            name: "short_window",
            columns: &["DATE", "FIRST_IMPRESSION_DATE"],
            build: within.build,
        }],
        vec![TableRule {
            name: "short_confirmed",
            table_marker: "ACCOUNTS",
            columns: &["ISCONFIRMEDEMAIL"],
            build: confirmed.build,
        }],
    );
    let t = table(
        "ACCOUNTS",
        &[
            ("DATE", "DATE"),
            ("FIRST_IMPRESSION_DATE", "DATE"),
            ("ISCONFIRMEDEMAIL", "BOOLEAN"),
        ],
        None,
    );
    let specs = registry.synthesize(&t, &RuleCatalog::default(), &options(false, None));
    assert!(specs.is_empty());

    let full = table(
        "ACCOUNTS",
        &[
            ("DATE", "DATE"),
            ("FIRST_IMPRESSION_DATE", "DATE"),
            ("LAST_IMPRESSION_DATE", "DATE"),
        ],
        None,
    );
    let specs =
        RuleRegistry::builtin().synthesize(&full, &RuleCatalog::default(), &options(false, None));
    assert!(rules_of(&specs).contains(&"date_within_impressions"));
}

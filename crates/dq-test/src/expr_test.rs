use super::*;
use crate::error::CompileError;

#[test]
fn test_render_comparison_quotes_column() {
    let expr = Expr::col("BALANCE").less_than(Expr::int(0));
    assert_eq!(expr.render(Dialect::DuckDb).unwrap(), r#""BALANCE" < 0"#);
}

#[test]
fn test_render_string_literal_escaped() {
    let expr = Expr::col("ROLE").equals(Expr::str("o'brien"));
    assert_eq!(
        expr.render(Dialect::Snowflake).unwrap(),
        r#""ROLE" = 'o''brien'"#
    );
}

#[test]
fn test_render_and_parenthesizes_nested_or() {
    let expr = Expr::and(vec![
        Expr::or(vec![
            Expr::col("COUNTRY").length().less_than(Expr::int(2)),
            Expr::col("COUNTRY").length().greater_than(Expr::int(3)),
        ]),
        Expr::col("COUNTRY").is_not_null(),
    ]);
    assert_eq!(
        expr.render(Dialect::DuckDb).unwrap(),
        r#"(length("COUNTRY") < 2 OR length("COUNTRY") > 3) AND "COUNTRY" IS NOT NULL"#
    );
    assert_eq!(
        expr.render(Dialect::Snowflake).unwrap(),
        r#"(LEN("COUNTRY") < 2 OR LEN("COUNTRY") > 3) AND "COUNTRY" IS NOT NULL"#
    );
}

#[test]
fn test_render_single_item_junction_is_unwrapped() {
    let expr = Expr::and(vec![Expr::col("A").is_null()]);
    assert_eq!(expr.render(Dialect::DuckDb).unwrap(), r#""A" IS NULL"#);
}

#[test]
fn test_render_date_offsets() {
    assert_eq!(
        Expr::current_date().render(Dialect::Snowflake).unwrap(),
        "CURRENT_DATE"
    );
    assert_eq!(
        Expr::current_date().render(Dialect::DuckDb).unwrap(),
        "CAST(CAST(get_current_timestamp() AS TIMESTAMP) AS DATE)"
    );
    assert_eq!(
        Expr::days_ago(7).render(Dialect::Snowflake).unwrap(),
        "CURRENT_DATE - INTERVAL '7 DAY'"
    );
    let future = Expr::col("CREATEDAT").at_least(Expr::days_ahead(1));
    assert_eq!(
        future.render(Dialect::DuckDb).unwrap(),
        r#""CREATEDAT" >= (CAST(CAST(get_current_timestamp() AS TIMESTAMP) AS DATE) + INTERVAL '1 DAY')"#
    );
}

#[test]
fn test_duckdb_date_arithmetic_avoids_current_date() {
    for expr in [Expr::current_date(), Expr::days_ago(1), Expr::days_ahead(1)] {
        let sql = expr.render(Dialect::DuckDb).unwrap();
        assert!(!sql.contains("CURRENT_DATE"), "{sql}");
    }
}

#[test]
fn test_render_dialect_functions() {
    let regex = Expr::col("EMAIL").full_match("[a-z]+@x\\.com");
    assert_eq!(
        regex.render(Dialect::DuckDb).unwrap(),
        r#"regexp_full_match("EMAIL", '[a-z]+@x\.com')"#
    );
    assert_eq!(
        regex.render(Dialect::Snowflake).unwrap(),
        r#"REGEXP_LIKE("EMAIL", '[a-z]+@x\.com')"#
    );

    let key = Expr::col("DATE").date_key();
    assert_eq!(
        key.render(Dialect::DuckDb).unwrap(),
        r#"CAST(strftime("DATE", '%Y%m%d') AS BIGINT)"#
    );
    assert_eq!(
        key.render(Dialect::Snowflake).unwrap(),
        r#"TO_NUMBER(TO_CHAR("DATE", 'YYYYMMDD'))"#
    );

    let json = Expr::col("PAYLOAD").json_parseable().negate();
    assert_eq!(
        json.render(Dialect::DuckDb).unwrap(),
        r#"NOT (json_valid("PAYLOAD"))"#
    );
    assert_eq!(
        json.render(Dialect::Snowflake).unwrap(),
        r#"NOT ((TRY_PARSE_JSON("PAYLOAD") IS NOT NULL))"#
    );
}

#[test]
fn test_render_not_in() {
    let expr = Expr::col("ISFROZEN").not_in(vec![Expr::Bool(true), Expr::Bool(false)]);
    assert_eq!(
        expr.render(Dialect::DuckDb).unwrap(),
        r#""ISFROZEN" NOT IN (TRUE, FALSE)"#
    );
}

#[test]
fn test_render_rejects_bad_identifier() {
    let expr = Expr::col("EMAIL\"; DROP TABLE x; --").is_null();
    let err = expr.render(Dialect::DuckDb).unwrap_err();
    assert!(matches!(err, CompileError::InvalidIdentifier(_)));
    assert!(err.to_string().contains("[C003]"));
}

#[test]
fn test_columns_collects_every_reference() {
    let expr = Expr::and(vec![
        Expr::col("CREATEDAT").greater_than(Expr::col("UPDATEDAT")),
        Expr::col("CREATEDAT").is_not_null(),
        Expr::col("UPDATEDAT").is_not_null(),
    ]);
    let cols: Vec<String> = expr.columns().into_iter().collect();
    assert_eq!(cols, vec!["CREATEDAT", "UPDATEDAT"]);
}

#[test]
fn test_render_is_deterministic() {
    let expr = Expr::and(vec![
        Expr::col("YEAR").less_than(Expr::int(2015)),
        Expr::col("YEAR").is_not_null(),
    ]);
    assert_eq!(
        expr.render(Dialect::DuckDb).unwrap(),
        expr.render(Dialect::DuckDb).unwrap()
    );
}

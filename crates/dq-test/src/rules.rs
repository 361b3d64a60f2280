//! Built-in convention rules
//!
//! Every custom predicate is TRUE for a violating row and ignores NULLs in
//! the column it checks; NULL handling is left to the `not_null` rules.

use crate::expr::Expr;
use crate::spec::TestSpec;
use crate::synthesizer::{ColumnRule, CrossColumnRule, RuleContext, TableRule};
use dq_core::{ColumnDescriptor, ColumnTag};

/// `violation AND col IS NOT NULL`
fn guarded(column: &ColumnDescriptor, violation: Expr) -> Expr {
    Expr::and(vec![violation, Expr::col(&column.name).is_not_null()])
}

/// Empty or whitespace-only value
fn blank(column: &ColumnDescriptor) -> Expr {
    guarded(
        column,
        Expr::col(&column.name).trim().equals(Expr::str("")),
    )
}

/// Value outside `min..=max`
fn out_of_range(column: &ColumnDescriptor, min: i64, max: i64) -> Expr {
    guarded(
        column,
        Expr::or(vec![
            Expr::col(&column.name).less_than(Expr::int(min)),
            Expr::col(&column.name).greater_than(Expr::int(max)),
        ]),
    )
}

/// Flag column is set, spelled for its declared type
fn flag_set(column: &ColumnDescriptor) -> Expr {
    if column.upper_type().contains("BOOLEAN") {
        Expr::col(&column.name).equals(Expr::Bool(true))
    } else {
        Expr::col(&column.name).equals(Expr::int(1))
    }
}

fn primary_key(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    vec![
        ctx.not_null(
            "primary_key_not_null",
            column,
            &format!("Primary key '{}' should not be NULL.", column.name),
        ),
        ctx.unique(
            "primary_key_unique",
            column,
            &format!("Primary key '{}' should be unique.", column.name),
        ),
    ]
}

fn foreign_key(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    vec![ctx.not_null(
        "foreign_key_not_null",
        column,
        &format!("Foreign key '{}' should not be NULL.", column.name),
    )]
}

fn timestamp(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    let mut specs = vec![ctx.not_null(
        "timestamp_not_null",
        column,
        &format!("Timestamp column '{}' should not be NULL.", column.name),
    )];
    // Date projection tables legitimately hold future dates.
    if !ctx
        .table
        .qualified_name
        .contains_marker(&ctx.catalog.projection_table_marker)
    {
        specs.push(ctx.condition(
            "timestamp_not_future",
            &[column],
            guarded(
                column,
                Expr::col(&column.name).at_least(Expr::days_ahead(1)),
            ),
            &format!("Timestamp '{}' should not be in the future.", column.name),
        ));
    }
    specs
}

fn email(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    vec![
        ctx.not_null(
            "email_not_null",
            column,
            &format!("Email column '{}' should not be NULL.", column.name),
        ),
        ctx.condition(
            "email_format",
            &[column],
            guarded(
                column,
                Expr::col(&column.name)
                    .full_match(ctx.catalog.email_pattern.as_str())
                    .negate(),
            ),
            &format!("Email column '{}' should have a valid format.", column.name),
        ),
    ]
}

fn country_code(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    let min = ctx.catalog.country_code_min_length;
    let max = ctx.catalog.country_code_max_length;
    let length = Expr::col(&column.name).length();
    vec![
        ctx.condition(
            "country_code_length",
            &[column],
            Expr::and(vec![
                Expr::or(vec![
                    length.clone().less_than(Expr::int(min.into())),
                    length.greater_than(Expr::int(max.into())),
                ]),
                Expr::col(&column.name).is_not_null(),
                Expr::col(&column.name).not_equals(Expr::str("")),
            ]),
            &format!(
                "Country code '{}' should be {min}-{max} characters.",
                column.name
            ),
        ),
        ctx.condition(
            "country_code_blank",
            &[column],
            blank(column),
            &format!(
                "Country code '{}' should not be empty or whitespace.",
                column.name
            ),
        ),
    ]
}

fn financial_metric(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    vec![ctx.condition(
        "financial_non_negative",
        &[column],
        guarded(column, Expr::col(&column.name).less_than(Expr::int(0))),
        &format!("Financial column '{}' should be non-negative.", column.name),
    )]
}

fn campaign_metric(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    let mut specs = vec![ctx.condition(
        "campaign_non_negative",
        &[column],
        guarded(column, Expr::col(&column.name).less_than(Expr::int(0))),
        &format!("Campaign metric '{}' should be non-negative.", column.name),
    )];
    if column.upper_name() == ctx.catalog.campaign_duration_column {
        let max = ctx.catalog.campaign_duration_max_days;
        specs.push(ctx.condition(
            "campaign_duration_limit",
            &[column],
            guarded(column, Expr::col(&column.name).greater_than(Expr::int(max))),
            &format!(
                "Campaign duration '{}' exceeds reasonable limit ({max} days).",
                column.name
            ),
        ));
    }
    specs
}

fn boolean_indicator(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    let allowed = if column.upper_type().contains("BOOLEAN") {
        vec![Expr::Bool(true), Expr::Bool(false)]
    } else {
        vec![Expr::int(0), Expr::int(1)]
    };
    vec![ctx.condition(
        "boolean_indicator_values",
        &[column],
        guarded(column, Expr::col(&column.name).not_in(allowed)),
        &format!(
            "Boolean indicator '{}' should have valid boolean values.",
            column.name
        ),
    )]
}

fn dimensional_ordinal(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    let name = column.upper_name();
    if let Some(bound) = ctx.catalog.ordinal_bound(&name) {
        return vec![ctx.condition(
            "ordinal_range",
            &[column],
            out_of_range(column, bound.min, bound.max),
            &format!(
                "{} should be between {} and {}.",
                column.name, bound.min, bound.max
            ),
        )];
    }
    if name == ctx.catalog.year_column {
        let floor = ctx.catalog.year_floor;
        let ceiling = i64::from(ctx.options.reference_year) + ctx.catalog.year_ceiling_offset;
        return vec![ctx.condition(
            "year_range",
            &[column],
            out_of_range(column, floor, ceiling),
            &format!(
                "{} should be within business-relevant range ({floor}-{ceiling}).",
                column.name
            ),
        )];
    }
    Vec::new()
}

fn key_identifier(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    let max = ctx.catalog.key_identifier_max_length;
    vec![
        ctx.condition(
            "key_identifier_blank",
            &[column],
            blank(column),
            &format!("{} should not be empty or whitespace.", column.name),
        ),
        ctx.condition(
            "key_identifier_length",
            &[column],
            guarded(
                column,
                Expr::col(&column.name)
                    .length()
                    .greater_than(Expr::int(max.into())),
            ),
            &format!(
                "{} length exceeds reasonable limit ({max} chars).",
                column.name
            ),
        ),
    ]
}

fn marketing_field(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    vec![ctx.condition(
        "marketing_field_blank",
        &[column],
        blank(column),
        &format!(
            "Marketing field '{}' should not be empty or whitespace.",
            column.name
        ),
    )]
}

fn classification_field(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    vec![ctx.condition(
        "classification_field_blank",
        &[column],
        blank(column),
        &format!(
            "Classification field '{}' should not be empty or whitespace.",
            column.name
        ),
    )]
}

fn game_id(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    vec![ctx.condition(
        "game_id_positive",
        &[column],
        guarded(column, Expr::col(&column.name).at_most(Expr::int(0))),
        &format!("Game ID '{}' should be positive.", column.name),
    )]
}

fn subscription_count(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    let max = ctx.catalog.subscription_count_max;
    vec![
        ctx.condition(
            "subscription_count_non_negative",
            &[column],
            guarded(column, Expr::col(&column.name).less_than(Expr::int(0))),
            &format!("{} should not be negative.", column.name),
        ),
        ctx.condition(
            "subscription_count_limit",
            &[column],
            guarded(column, Expr::col(&column.name).greater_than(Expr::int(max))),
            &format!("{} exceeds reasonable limit ({max}).", column.name),
        ),
    ]
}

fn currency_code(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    let length = ctx.catalog.currency_code_length;
    vec![ctx.condition(
        "currency_code_length",
        &[column],
        guarded(
            column,
            Expr::col(&column.name)
                .length()
                .not_equals(Expr::int(length.into())),
        ),
        &format!("Currency code should be {length} characters."),
    )]
}

fn variant(column: &ColumnDescriptor, ctx: &RuleContext<'_>) -> Vec<TestSpec> {
    vec![ctx.condition(
        "variant_valid_json",
        &[column],
        Expr::and(vec![
            Expr::col(&column.name).json_parseable().negate(),
            Expr::col(&column.name).is_not_null(),
            Expr::col(&column.name).not_equals(Expr::str("null")),
        ]),
        &format!(
            "VARIANT field '{}' should contain valid JSON.",
            column.name
        ),
    )]
}

/// Per-column rules in evaluation order
pub fn column_rules() -> Vec<ColumnRule> {
    vec![
        ColumnRule {
            name: "primary_key",
            tag: ColumnTag::PrimaryKey,
            build: primary_key,
        },
        ColumnRule {
            name: "foreign_key",
            tag: ColumnTag::ForeignKey,
            build: foreign_key,
        },
        ColumnRule {
            name: "timestamp",
            tag: ColumnTag::Timestamp,
            build: timestamp,
        },
        ColumnRule {
            name: "email",
            tag: ColumnTag::Email,
            build: email,
        },
        ColumnRule {
            name: "country_code",
            tag: ColumnTag::CountryCode,
            build: country_code,
        },
        ColumnRule {
            name: "financial_metric",
            tag: ColumnTag::FinancialMetric,
            build: financial_metric,
        },
        ColumnRule {
            name: "campaign_metric",
            tag: ColumnTag::CampaignMetric,
            build: campaign_metric,
        },
        ColumnRule {
            name: "boolean_indicator",
            tag: ColumnTag::BooleanIndicator,
            build: boolean_indicator,
        },
        ColumnRule {
            name: "dimensional_ordinal",
            tag: ColumnTag::DimensionalOrdinal,
            build: dimensional_ordinal,
        },
        ColumnRule {
            name: "key_identifier",
            tag: ColumnTag::KeyIdentifier,
            build: key_identifier,
        },
        ColumnRule {
            name: "marketing_field",
            tag: ColumnTag::MarketingField,
            build: marketing_field,
        },
        ColumnRule {
            name: "classification_field",
            tag: ColumnTag::ClassificationField,
            build: classification_field,
        },
        ColumnRule {
            name: "game_id",
            tag: ColumnTag::GameId,
            build: game_id,
        },
        ColumnRule {
            name: "subscription_count",
            tag: ColumnTag::SubscriptionCount,
            build: subscription_count,
        },
        ColumnRule {
            name: "currency_code",
            tag: ColumnTag::CurrencyCode,
            build: currency_code,
        },
        ColumnRule {
            name: "variant",
            tag: ColumnTag::Variant,
            build: variant,
        },
    ]
}

fn both_not_null(a: &ColumnDescriptor, b: &ColumnDescriptor) -> Vec<Expr> {
    vec![
        Expr::col(&a.name).is_not_null(),
        Expr::col(&b.name).is_not_null(),
    ]
}

/// `a > b` with both sides present
fn ordered_pair(a: &ColumnDescriptor, b: &ColumnDescriptor) -> Expr {
    let mut items = vec![Expr::col(&a.name).greater_than(Expr::col(&b.name))];
    items.extend(both_not_null(a, b));
    Expr::and(items)
}

fn date_id_alignment(cols: &[&ColumnDescriptor], ctx: &RuleContext<'_>) -> Option<TestSpec> {
    let [date_id, date] = cols else {
        return None;
    };
    let mut items = vec![Expr::col(&date.name)
        .date_key()
        .not_equals(Expr::col(&date_id.name))];
    items.extend(both_not_null(date, date_id));
    Some(ctx.condition(
        "date_id_alignment",
        cols,
        Expr::and(items),
        &format!(
            "{} must equal YYYYMMDD representation of {}.",
            date_id.name, date.name
        ),
    ))
}

fn created_before_updated(cols: &[&ColumnDescriptor], ctx: &RuleContext<'_>) -> Option<TestSpec> {
    let [lower, upper] = cols else {
        return None;
    };
    Some(ctx.condition(
        "created_before_updated",
        cols,
        ordered_pair(lower, upper),
        &format!("{} must be <= {}.", lower.name, upper.name),
    ))
}

fn impression_date_order(cols: &[&ColumnDescriptor], ctx: &RuleContext<'_>) -> Option<TestSpec> {
    let [lower, upper] = cols else {
        return None;
    };
    Some(ctx.condition(
        "impression_date_order",
        cols,
        ordered_pair(lower, upper),
        &format!("{} must not be after {}.", lower.name, upper.name),
    ))
}

fn date_within_impressions(cols: &[&ColumnDescriptor], ctx: &RuleContext<'_>) -> Option<TestSpec> {
    let [date, first, last] = cols else {
        return None;
    };
    Some(ctx.condition(
        "date_within_impressions",
        cols,
        guarded(
            date,
            Expr::or(vec![
                Expr::col(&date.name).less_than(Expr::col(&first.name)),
                Expr::col(&date.name).greater_than(Expr::col(&last.name)),
            ]),
        ),
        &format!(
            "{} must be between {} and {}.",
            date.name, first.name, last.name
        ),
    ))
}

fn clicks_within_impressions(
    cols: &[&ColumnDescriptor],
    ctx: &RuleContext<'_>,
) -> Option<TestSpec> {
    let [lower, upper] = cols else {
        return None;
    };
    Some(ctx.condition(
        "clicks_within_impressions",
        cols,
        ordered_pair(lower, upper),
        &format!("{} cannot exceed {}.", lower.name, upper.name),
    ))
}

/// Rules gated on a set of columns, in evaluation order
pub fn cross_column_rules() -> Vec<CrossColumnRule> {
    vec![
        CrossColumnRule {
            name: "date_id_alignment",
            columns: &["DATE_ID", "DATE"],
            build: date_id_alignment,
        },
        CrossColumnRule {
            name: "created_before_updated",
            columns: &["CREATEDAT", "UPDATEDAT"],
            build: created_before_updated,
        },
        CrossColumnRule {
            name: "impression_date_order",
            columns: &["FIRST_IMPRESSION_DATE", "LAST_IMPRESSION_DATE"],
            build: impression_date_order,
        },
        CrossColumnRule {
            name: "date_within_impressions",
            columns: &["DATE", "FIRST_IMPRESSION_DATE", "LAST_IMPRESSION_DATE"],
            build: date_within_impressions,
        },
        CrossColumnRule {
            name: "clicks_within_impressions",
            columns: &["CLICKS", "IMPRESSIONS"],
            build: clicks_within_impressions,
        },
    ]
}

fn confirmed_email_present(cols: &[&ColumnDescriptor], ctx: &RuleContext<'_>) -> Option<TestSpec> {
    let [confirmed, email] = cols else {
        return None;
    };
    Some(ctx.condition(
        "confirmed_email_present",
        cols,
        Expr::and(vec![flag_set(confirmed), Expr::col(&email.name).is_null()]),
        "If email is confirmed, email field should not be null.",
    ))
}

fn active_subscription_count(
    cols: &[&ColumnDescriptor],
    ctx: &RuleContext<'_>,
) -> Option<TestSpec> {
    let [indicator, count] = cols else {
        return None;
    };
    Some(ctx.condition(
        "active_subscription_count",
        cols,
        Expr::and(vec![
            flag_set(indicator),
            Expr::or(vec![
                Expr::col(&count.name).is_null(),
                Expr::col(&count.name).equals(Expr::int(0)),
            ]),
        ]),
        "Active subscription indicator should match subscription count.",
    ))
}

/// Rules gated on the table name and a set of columns
pub fn table_rules() -> Vec<TableRule> {
    vec![
        TableRule {
            name: "confirmed_email_present",
            table_marker: "ACCOUNTS",
            columns: &["ISCONFIRMEDEMAIL", "EMAIL"],
            build: confirmed_email_present,
        },
        TableRule {
            name: "active_subscription_count",
            table_marker: "DIM_USERS",
            columns: &["IS_ACTIVE_SUB_IND", "NUMBER_OF_ACTIVE_SUBSCRIPTIONS"],
            build: active_subscription_count,
        },
    ]
}

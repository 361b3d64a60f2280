//! Column classification by naming and type conventions
//!
//! [`classify`] is pure and total: an unrecognized column simply gets an
//! empty tag set. A column may carry several tags at once (e.g. `UTM_KEY` is
//! both a foreign key and a key identifier).

use crate::catalog::{contains_any, in_list, RuleCatalog};
use crate::table::ColumnDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Semantic tag attached to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnTag {
    /// Declared type contains NUMBER or FLOAT
    Numeric,
    /// Declared type is BOOLEAN or exactly NUMBER(1,0)
    BooleanLike,
    /// Declared type is VARIANT (semi-structured JSON)
    Variant,
    PrimaryKey,
    ForeignKey,
    Timestamp,
    Email,
    CountryCode,
    FinancialMetric,
    CampaignMetric,
    BooleanIndicator,
    DimensionalOrdinal,
    KeyIdentifier,
    MarketingField,
    ClassificationField,
    GameId,
    SubscriptionCount,
    CurrencyCode,
}

impl ColumnTag {
    /// Stable snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnTag::Numeric => "numeric",
            ColumnTag::BooleanLike => "boolean_like",
            ColumnTag::Variant => "variant",
            ColumnTag::PrimaryKey => "primary_key",
            ColumnTag::ForeignKey => "foreign_key",
            ColumnTag::Timestamp => "timestamp",
            ColumnTag::Email => "email",
            ColumnTag::CountryCode => "country_code",
            ColumnTag::FinancialMetric => "financial_metric",
            ColumnTag::CampaignMetric => "campaign_metric",
            ColumnTag::BooleanIndicator => "boolean_indicator",
            ColumnTag::DimensionalOrdinal => "dimensional_ordinal",
            ColumnTag::KeyIdentifier => "key_identifier",
            ColumnTag::MarketingField => "marketing_field",
            ColumnTag::ClassificationField => "classification_field",
            ColumnTag::GameId => "game_id",
            ColumnTag::SubscriptionCount => "subscription_count",
            ColumnTag::CurrencyCode => "currency_code",
        }
    }
}

impl fmt::Display for ColumnTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type contains NUMBER or FLOAT (case-insensitive)
pub fn is_numeric_type(declared_type: &str) -> bool {
    let ty = declared_type.to_uppercase();
    ty.contains("NUMBER") || ty.contains("FLOAT")
}

/// Declared type contains BOOLEAN or is exactly NUMBER(1,0)
pub fn is_boolean_like_type(declared_type: &str) -> bool {
    let ty = declared_type.to_uppercase();
    ty.contains("BOOLEAN") || ty == "NUMBER(1,0)"
}

/// Declared type contains VARIANT
pub fn is_variant_type(declared_type: &str) -> bool {
    declared_type.to_uppercase().contains("VARIANT")
}

/// Compute the tag set for a column
pub fn classify(column: &ColumnDescriptor, catalog: &RuleCatalog) -> BTreeSet<ColumnTag> {
    let name = column.upper_name();
    let mut tags = BTreeSet::new();

    let numeric = is_numeric_type(&column.declared_type);
    let boolean_like = is_boolean_like_type(&column.declared_type);
    if numeric {
        tags.insert(ColumnTag::Numeric);
    }
    if boolean_like {
        tags.insert(ColumnTag::BooleanLike);
    }
    if is_variant_type(&column.declared_type) {
        tags.insert(ColumnTag::Variant);
    }

    if in_list(&catalog.primary_keys, &name) {
        tags.insert(ColumnTag::PrimaryKey);
    } else if name.ends_with(catalog.foreign_key_suffix.as_str())
        || in_list(&catalog.foreign_key_extras, &name)
    {
        tags.insert(ColumnTag::ForeignKey);
    }

    if in_list(&catalog.timestamp_columns, &name) {
        tags.insert(ColumnTag::Timestamp);
    }
    if in_list(&catalog.email_columns, &name) {
        tags.insert(ColumnTag::Email);
    }
    if in_list(&catalog.country_code_columns, &name) {
        tags.insert(ColumnTag::CountryCode);
    }
    if numeric
        && contains_any(&catalog.financial_keywords, &name)
        && !contains_any(&catalog.financial_exclusions, &name)
    {
        tags.insert(ColumnTag::FinancialMetric);
    }
    if numeric && contains_any(&catalog.campaign_keywords, &name) {
        tags.insert(ColumnTag::CampaignMetric);
    }
    if in_list(&catalog.boolean_indicators, &name)
        || (boolean_like && contains_any(&catalog.boolean_name_markers, &name))
    {
        tags.insert(ColumnTag::BooleanIndicator);
    }
    if numeric && catalog.is_ordinal(&name) {
        tags.insert(ColumnTag::DimensionalOrdinal);
    }
    if in_list(&catalog.key_identifier_columns, &name) {
        tags.insert(ColumnTag::KeyIdentifier);
    }
    if in_list(&catalog.marketing_fields, &name) {
        tags.insert(ColumnTag::MarketingField);
    }
    if in_list(&catalog.classification_fields, &name) {
        tags.insert(ColumnTag::ClassificationField);
    }
    if numeric && in_list(&catalog.game_id_columns, &name) {
        tags.insert(ColumnTag::GameId);
    }
    if numeric && in_list(&catalog.subscription_count_columns, &name) {
        tags.insert(ColumnTag::SubscriptionCount);
    }
    if in_list(&catalog.currency_columns, &name) {
        tags.insert(ColumnTag::CurrencyCode);
    }

    tags
}

#[cfg(test)]
#[path = "classification_test.rs"]
mod tests;

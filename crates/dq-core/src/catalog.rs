//! Versioned catalog of naming conventions that drive rule inference
//!
//! The catalog is plain data. [`RuleCatalog::default`] is the built-in
//! convention set; a deployment can replace it wholesale from the `catalog:`
//! section of `autodq.yml` without touching code. All name lists are matched
//! against uppercased column names.

use crate::error::CoreResult;
use serde::{Deserialize, Serialize};

/// Current version of the built-in catalog
pub const BUILTIN_CATALOG_VERSION: u32 = 1;

/// Inclusive numeric bounds for a dimensional ordinal column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalBound {
    /// Uppercased column name
    pub column: String,
    /// Smallest valid value
    pub min: i64,
    /// Largest valid value
    pub max: i64,
}

impl OrdinalBound {
    fn new(column: &str, min: i64, max: i64) -> Self {
        Self {
            column: column.to_string(),
            min,
            max,
        }
    }
}

/// Convention lists and thresholds consumed by the classifier and synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleCatalog {
    /// Catalog version, bumped whenever a list or threshold changes
    pub version: u32,

    /// Exact names treated as primary keys
    pub primary_keys: Vec<String>,
    /// Names treated as foreign keys in addition to the `_ID` suffix
    pub foreign_key_extras: Vec<String>,
    /// Suffix that marks a foreign key
    pub foreign_key_suffix: String,

    /// Exact names of known date/time columns
    pub timestamp_columns: Vec<String>,
    /// Table-name marker for date projection tables (no future-date check)
    pub projection_table_marker: String,

    /// Exact names of email columns
    pub email_columns: Vec<String>,
    /// Regex an email value must fully match
    pub email_pattern: String,

    /// Exact names of country code columns
    pub country_code_columns: Vec<String>,
    pub country_code_min_length: u32,
    pub country_code_max_length: u32,

    /// Keywords marking a numeric financial metric
    pub financial_keywords: Vec<String>,
    /// Keywords that exempt a financial column from the non-negative check
    pub financial_exclusions: Vec<String>,

    /// Keywords marking a numeric campaign metric
    pub campaign_keywords: Vec<String>,
    pub campaign_duration_column: String,
    pub campaign_duration_max_days: i64,

    /// Exact names of boolean indicator columns
    pub boolean_indicators: Vec<String>,
    /// Name fragments that mark an indicator when the type is boolean-like
    pub boolean_name_markers: Vec<String>,

    /// Bounded ordinals such as MONTH_ID
    pub ordinal_bounds: Vec<OrdinalBound>,
    /// Name of the calendar year column
    pub year_column: String,
    pub year_floor: i64,
    /// Years past the reference year still considered valid
    pub year_ceiling_offset: i64,

    /// Key identifier columns checked for blank values and length
    pub key_identifier_columns: Vec<String>,
    pub key_identifier_max_length: u32,

    /// Free-text marketing attribution fields
    pub marketing_fields: Vec<String>,
    /// Free-text classification fields
    pub classification_fields: Vec<String>,
    /// Numeric game identifiers that must be positive
    pub game_id_columns: Vec<String>,

    /// Subscription counters
    pub subscription_count_columns: Vec<String>,
    pub subscription_count_max: i64,

    /// Currency code columns
    pub currency_columns: Vec<String>,
    pub currency_code_length: u32,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self {
            version: BUILTIN_CATALOG_VERSION,
            primary_keys: strings(&["ID", "USER_ID", "DATE_ID", "CAMPAIGN_ID"]),
            foreign_key_extras: strings(&["UTM_KEY"]),
            foreign_key_suffix: "_ID".to_string(),
            timestamp_columns: strings(&[
                "CREATEDAT",
                "UPDATEDAT",
                "DATE",
                "INSTALL_DATE",
                "FIRST_ACTIVE",
                "LAST_ACTIVE",
                "SUB_START_DATE",
                "FIRST_IMPRESSION_DATE",
                "LAST_IMPRESSION_DATE",
                "FIRST_BUFF_PLAY_ACTIVITY",
            ]),
            projection_table_marker: "DIM_DATES".to_string(),
            email_columns: strings(&["EMAIL"]),
            email_pattern: r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}".to_string(),
            country_code_columns: strings(&["COUNTRY", "COUNTRY_CODE"]),
            country_code_min_length: 2,
            country_code_max_length: 3,
            financial_keywords: strings(&[
                "BALANCE",
                "BONUSBALANCE",
                "SPEND",
                "REVENUE",
                "LTV",
                "DAILY_SPEND_USD",
                "DAILY_SPEND_ILS",
                "DAILY_SPEND_ARS",
                "POINTS",
            ]),
            financial_exclusions: strings(&["REFUND", "ADJUSTMENT"]),
            campaign_keywords: strings(&["IMPRESSIONS", "CLICKS", "INSTALLS", "CAMPAIGN_DURATION"]),
            campaign_duration_column: "CAMPAIGN_DURATION".to_string(),
            campaign_duration_max_days: 730,
            boolean_indicators: strings(&[
                "IS_SUB_IND",
                "IS_ACTIVE_SUB_IND",
                "ISCONFIRMEDEMAIL",
                "ISFROZEN",
                "ISCLOSED",
                "IS_REWARDED",
                "IS_PREMIUM",
                "CURRENT_YEAR_IND",
                "CURRENT_MONTH_IND",
                "REGISTRATION_APP",
            ]),
            boolean_name_markers: strings(&["IS_", "_IND"]),
            ordinal_bounds: vec![
                OrdinalBound::new("MONTH_ID", 1, 12),
                OrdinalBound::new("QUARTER_ID", 1, 4),
                OrdinalBound::new("WEEK_NUMBER", 1, 53),
            ],
            year_column: "YEAR".to_string(),
            year_floor: 2015,
            year_ceiling_offset: 10,
            key_identifier_columns: strings(&["UTM_KEY"]),
            key_identifier_max_length: 200,
            marketing_fields: strings(&[
                "SOURCE",
                "MEDIUM",
                "CAMPAIGN",
                "MARKETING_SOURCE",
                "DATA_SOURCE",
            ]),
            classification_fields: strings(&["USER_TYPE", "ROLE", "AUTHTYPE", "PREM_TYPE"]),
            game_id_columns: strings(&["FIRST_GAME", "LAST_GAME", "MAIN_GAME"]),
            subscription_count_columns: strings(&["NUMBER_OF_ACTIVE_SUBSCRIPTIONS"]),
            subscription_count_max: 10,
            currency_columns: strings(&["CURRENCY"]),
            currency_code_length: 3,
        }
    }
}

impl RuleCatalog {
    /// Parse a catalog from YAML. Missing fields take built-in values.
    pub fn from_yaml_str(yaml: &str) -> CoreResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Bounds for a dimensional ordinal column, if the name is one
    pub fn ordinal_bound(&self, upper_name: &str) -> Option<&OrdinalBound> {
        self.ordinal_bounds.iter().find(|b| b.column == upper_name)
    }

    /// Whether the name is a dimensional ordinal (including the year column)
    pub fn is_ordinal(&self, upper_name: &str) -> bool {
        upper_name == self.year_column || self.ordinal_bound(upper_name).is_some()
    }
}

/// Exact membership in an uppercased name list
pub(crate) fn in_list(list: &[String], upper_name: &str) -> bool {
    list.iter().any(|s| s == upper_name)
}

/// Keyword containment against an uppercased name
pub(crate) fn contains_any(keywords: &[String], upper_name: &str) -> bool {
    keywords.iter().any(|k| upper_name.contains(k.as_str()))
}

//! Rule synthesis
//!
//! A [`RuleRegistry`] is an ordered table of rules. Column rules fire on a
//! [`ColumnTag`] produced by the classifier, cross-column rules fire when a
//! set of columns is present, and table rules additionally require a marker
//! in the table name. Synthesis walks the registry in a fixed order so the
//! output is a pure function of the table, catalog and options.

use crate::expr::Expr;
use crate::rules;
use crate::spec::{TestKind, TestSpec, TimeWindow, WindowMode};
use chrono::Datelike;
use dq_core::{classify, ColumnDescriptor, ColumnTag, RuleCatalog, TableDescriptor};

/// Flags that shape every specification synthesized for a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// Restrict every test to yesterday's rows
    pub recent_window_only: bool,

    /// Trailing window used when `recent_window_only` is off
    pub trailing_days: Option<u32>,

    /// Year the YEAR upper bound is computed from
    pub reference_year: i32,
}

impl SynthesisOptions {
    /// Options anchored to the current UTC year
    pub fn new(recent_window_only: bool, trailing_days: Option<u32>) -> Self {
        Self {
            recent_window_only,
            trailing_days,
            reference_year: chrono::Utc::now().year(),
        }
    }
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self::new(true, None)
    }
}

/// Everything a rule template can see while building specifications
pub struct RuleContext<'a> {
    pub table: &'a TableDescriptor,
    pub catalog: &'a RuleCatalog,
    pub options: &'a SynthesisOptions,
    window: TimeWindow,
    prefix: String,
}

impl<'a> RuleContext<'a> {
    fn new(
        table: &'a TableDescriptor,
        catalog: &'a RuleCatalog,
        options: &'a SynthesisOptions,
    ) -> Self {
        let window = table_window(table, options);
        let prefix = match (&window.column, window.mode) {
            (Some(column), WindowMode::PreviousCalendarDay) => {
                format!("Auto-generated (on {column} for yesterday only)")
            }
            (Some(column), WindowMode::TrailingDays(_)) => {
                format!("Auto-generated (on {column} for recent data)")
            }
            _ => "Auto-generated".to_string(),
        };
        Self {
            table,
            catalog,
            options,
            window,
            prefix,
        }
    }

    fn build(
        &self,
        rule: &str,
        kind: TestKind,
        columns: &[&ColumnDescriptor],
        condition: Option<Expr>,
        message: &str,
    ) -> TestSpec {
        TestSpec {
            kind,
            table: self.table.qualified_name.clone(),
            target_columns: columns.iter().map(|c| c.name.clone()).collect(),
            condition,
            time_window: self.window.clone(),
            description: format!("{}: {message} [rule: {rule}]", self.prefix),
            rule: rule.to_string(),
        }
    }

    pub fn not_null(&self, rule: &str, column: &ColumnDescriptor, message: &str) -> TestSpec {
        self.build(rule, TestKind::NotNull, &[column], None, message)
    }

    pub fn unique(&self, rule: &str, column: &ColumnDescriptor, message: &str) -> TestSpec {
        self.build(rule, TestKind::Unique, &[column], None, message)
    }

    /// custom_condition over the given columns
    pub fn condition(
        &self,
        rule: &str,
        columns: &[&ColumnDescriptor],
        condition: Expr,
        message: &str,
    ) -> TestSpec {
        self.build(
            rule,
            TestKind::CustomCondition,
            columns,
            Some(condition),
            message,
        )
    }
}

/// Window every specification of a table inherits
fn table_window(table: &TableDescriptor, options: &SynthesisOptions) -> TimeWindow {
    let Some(column) = &table.primary_time_column else {
        return TimeWindow::none();
    };
    let mode = if options.recent_window_only {
        WindowMode::PreviousCalendarDay
    } else {
        match options.trailing_days {
            Some(days) => WindowMode::TrailingDays(days),
            None => return TimeWindow::none(),
        }
    };
    TimeWindow {
        column: Some(column.clone()),
        mode,
    }
}

/// Template for a column carrying a specific tag
pub struct ColumnRule {
    pub name: &'static str,
    pub tag: ColumnTag,
    pub build: fn(&ColumnDescriptor, &RuleContext<'_>) -> Vec<TestSpec>,
}

/// Template gated on the presence of several columns (case-insensitive)
pub struct CrossColumnRule {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    /// Receives the resolved columns in the order of `columns`; returns
    /// `None` when they do not fit the template
    pub build: fn(&[&ColumnDescriptor], &RuleContext<'_>) -> Option<TestSpec>,
}

/// Cross-column template that also requires a marker in the table name
pub struct TableRule {
    pub name: &'static str,
    pub table_marker: &'static str,
    pub columns: &'static [&'static str],
    pub build: fn(&[&ColumnDescriptor], &RuleContext<'_>) -> Option<TestSpec>,
}

/// Ordered set of rules evaluated by [`RuleRegistry::synthesize`]
pub struct RuleRegistry {
    column_rules: Vec<ColumnRule>,
    cross_column_rules: Vec<CrossColumnRule>,
    table_rules: Vec<TableRule>,
}

impl RuleRegistry {
    /// Create a registry from explicit rule lists
    pub fn new(
        column_rules: Vec<ColumnRule>,
        cross_column_rules: Vec<CrossColumnRule>,
        table_rules: Vec<TableRule>,
    ) -> Self {
        Self {
            column_rules,
            cross_column_rules,
            table_rules,
        }
    }

    /// The built-in convention rules
    pub fn builtin() -> Self {
        Self::new(
            rules::column_rules(),
            rules::cross_column_rules(),
            rules::table_rules(),
        )
    }

    /// Names of the column rules that fire for `column`, in registry order
    pub fn matching_rules(
        &self,
        column: &ColumnDescriptor,
        catalog: &RuleCatalog,
    ) -> Vec<&'static str> {
        let tags = classify(column, catalog);
        self.column_rules
            .iter()
            .filter(|rule| tags.contains(&rule.tag))
            .map(|rule| rule.name)
            .collect()
    }

    /// Produce the ordered specification list for a table
    ///
    /// Per-column rules come first (columns in table order, rules in
    /// registry order), then cross-column rules, then table rules.
    pub fn synthesize(
        &self,
        table: &TableDescriptor,
        catalog: &RuleCatalog,
        options: &SynthesisOptions,
    ) -> Vec<TestSpec> {
        let ctx = RuleContext::new(table, catalog, options);
        let mut specs = Vec::new();

        for column in &table.columns {
            let tags = classify(column, catalog);
            for rule in &self.column_rules {
                if tags.contains(&rule.tag) {
                    log::debug!("  -> {} applies to '{}'", rule.name, column.name);
                    specs.extend((rule.build)(column, &ctx));
                }
            }
        }

        for rule in &self.cross_column_rules {
            if let Some(columns) = resolve_columns(table, rule.columns) {
                log::debug!("  -> cross-column rule {} applies", rule.name);
                push_built(&mut specs, rule.name, (rule.build)(&columns, &ctx));
            }
        }

        for rule in &self.table_rules {
            if !table.qualified_name.contains_marker(rule.table_marker) {
                continue;
            }
            if let Some(columns) = resolve_columns(table, rule.columns) {
                log::debug!("  -> table rule {} applies", rule.name);
                push_built(&mut specs, rule.name, (rule.build)(&columns, &ctx));
            }
        }

        log::debug!(
            "Synthesized {} tests for {}",
            specs.len(),
            table.qualified_name
        );
        specs
    }
}

fn push_built(specs: &mut Vec<TestSpec>, rule: &str, spec: Option<TestSpec>) {
    match spec {
        Some(spec) => specs.push(spec),
        None => log::warn!("Rule {rule} rejected its resolved columns; skipped"),
    }
}

fn resolve_columns<'t>(
    table: &'t TableDescriptor,
    names: &[&str],
) -> Option<Vec<&'t ColumnDescriptor>> {
    names.iter().map(|name| table.column(name)).collect()
}

/// Synthesize specifications for a table with the built-in rules
pub fn synthesize(
    table: &TableDescriptor,
    catalog: &RuleCatalog,
    options: &SynthesisOptions,
) -> Vec<TestSpec> {
    RuleRegistry::builtin().synthesize(table, catalog, options)
}

#[cfg(test)]
#[path = "synthesizer_test.rs"]
mod tests;

//! Time-based trends: monthly totals and weekday/weekend comparison

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::compare_keys;
use crate::config::ColumnMapping;
use crate::dataset::{DatasetError, SalesFrame};

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    /// First day of the calendar month
    pub month: NaiveDate,
    pub rows: usize,
    pub total_sales: f64,
    pub qty: f64,
}

#[derive(Debug, Clone, Default)]
pub struct MonthlyTrend {
    pub months: Vec<MonthlyTotals>,
}

impl MonthlyTrend {
    pub fn peak_sales_month(&self) -> Option<&MonthlyTotals> {
        self.months.iter().max_by(|a, b| a.total_sales.total_cmp(&b.total_sales))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotals {
    pub key: String,
    pub rows: usize,
    pub total_sales: f64,
    pub qty: f64,
}

#[derive(Debug, Clone, Default)]
pub struct WeekdayWeekendReport {
    pub by_weekday: Vec<GroupTotals>,
    pub by_weekend: Vec<GroupTotals>,
}

fn parse_date(value: &str, column: &str, format: &str) -> Result<NaiveDate, DatasetError> {
    NaiveDate::parse_from_str(value, format).map_err(|_| DatasetError::BadDate {
        column: column.to_string(),
        value: value.to_string(),
        format: format.to_string(),
    })
}

/// Total sales and quantity per calendar month, oldest first.
///
/// Rows with no date are skipped; a date that does not match
/// `columns.date_format` is an error.
pub fn time_based_analysis(
    frame: &SalesFrame,
    columns: &ColumnMapping,
) -> Result<MonthlyTrend, DatasetError> {
    let dates = frame.keys(&columns.date)?;
    let sales = frame.numeric(&columns.total_sales)?;
    let qty = frame.numeric(&columns.quantity)?;

    let mut by_month: BTreeMap<NaiveDate, MonthlyTotals> = BTreeMap::new();
    for (row, date) in dates.iter().enumerate() {
        let Some(date) = date else { continue };
        let parsed = parse_date(date, &columns.date, &columns.date_format)?;
        let Some(month) = NaiveDate::from_ymd_opt(parsed.year(), parsed.month(), 1) else {
            continue;
        };

        let entry = by_month.entry(month).or_insert_with(|| MonthlyTotals {
            month,
            rows: 0,
            total_sales: 0.0,
            qty: 0.0,
        });
        entry.rows += 1;
        entry.total_sales += sales[row].unwrap_or(0.0);
        entry.qty += qty[row].unwrap_or(0.0);
    }

    Ok(MonthlyTrend {
        months: by_month.into_values().collect(),
    })
}

fn group_totals(
    keys: &[Option<String>],
    sales: &[Option<f64>],
    qty: &[Option<f64>],
) -> Vec<GroupTotals> {
    let mut groups: BTreeMap<&str, GroupTotals> = BTreeMap::new();
    for (row, key) in keys.iter().enumerate() {
        let Some(key) = key else { continue };
        let entry = groups.entry(key.as_str()).or_insert_with(|| GroupTotals {
            key: key.clone(),
            rows: 0,
            total_sales: 0.0,
            qty: 0.0,
        });
        entry.rows += 1;
        entry.total_sales += sales[row].unwrap_or(0.0);
        entry.qty += qty[row].unwrap_or(0.0);
    }
    let mut totals: Vec<GroupTotals> = groups.into_values().collect();
    totals.sort_by(|a, b| compare_keys(&a.key, &b.key));
    totals
}

/// Total sales and quantity grouped by the weekday column and, separately,
/// by the weekend column.
pub fn weekday_weekend_analysis(
    frame: &SalesFrame,
    columns: &ColumnMapping,
) -> Result<WeekdayWeekendReport, DatasetError> {
    let sales = frame.numeric(&columns.total_sales)?;
    let qty = frame.numeric(&columns.quantity)?;

    Ok(WeekdayWeekendReport {
        by_weekday: group_totals(&frame.keys(&columns.weekday)?, sales, qty),
        by_weekend: group_totals(&frame.keys(&columns.weekend)?, sales, qty),
    })
}

impl std::fmt::Display for MonthlyTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Monthly Sales Trend:")?;
        writeln!(f, "  {:<10} {:>6} {:>16} {:>12}", "month", "rows", "total_sales", "qty")?;
        for m in &self.months {
            writeln!(
                f,
                "  {:<10} {:>6} {:>16.2} {:>12.0}",
                m.month.format("%Y-%m"),
                m.rows,
                m.total_sales,
                m.qty
            )?;
        }
        Ok(())
    }
}

impl std::fmt::Display for WeekdayWeekendReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sections = [
            ("Sales by weekday count", &self.by_weekday),
            ("Sales by weekend count", &self.by_weekend),
        ];
        for (title, groups) in sections {
            writeln!(f, "{title}:")?;
            writeln!(f, "  {:<10} {:>6} {:>16} {:>12}", "key", "rows", "total_sales", "qty")?;
            for g in groups {
                writeln!(f, "  {:<10} {:>6} {:>16.2} {:>12.0}", g.key, g.rows, g.total_sales, g.qty)?;
            }
        }
        Ok(())
    }
}

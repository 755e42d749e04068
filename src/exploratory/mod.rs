//! Exploratory Analysis
//!
//! Descriptive reports over a `SalesFrame`. Every function is a pure read of
//! the frame and returns a report struct whose `Display` renders a plain-text
//! table for the terminal.
//!
//! ## Modules
//! - `overview`: column types, missing counts, first rows
//! - `summary`: count / mean / std / quartiles per numeric column
//! - `distribution`: equal-width histograms rendered as text bars
//! - `correlation`: Pearson matrix with p-values for the strongest pairs (statrs)
//! - `category`: per-category aggregates
//! - `trends`: monthly totals and weekday/weekend comparison

mod category;
mod correlation;
mod distribution;
mod overview;
mod summary;
mod trends;

pub use category::{category_summary, Aggregation, CategoryRow, CategorySummary};
pub use correlation::{correlation_matrix, CorrelationMatrix, CorrelationPair};
pub use distribution::{numeric_distribution, Histogram};
pub use overview::{data_overview, ColumnInfo, DataOverview};
pub use summary::{summary_statistics, ColumnSummary, SummaryStatistics};
pub use trends::{
    time_based_analysis, weekday_weekend_analysis, GroupTotals, MonthlyTotals, MonthlyTrend,
    WeekdayWeekendReport,
};

use std::cmp::Ordering;

/// Order group keys the way a sorted group-by would: numerically when both
/// keys are numbers, lexically otherwise.
pub(crate) fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

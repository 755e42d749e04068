//! Per-category aggregates

use std::collections::BTreeMap;

use tracing::warn;

use super::compare_keys;
use crate::dataset::{DatasetError, SalesFrame};

/// Metric columns and how each is aggregated. Columns absent from the frame
/// are skipped.
const CATEGORY_METRICS: &[(&str, &[Aggregation])] = &[
    ("qty", &[Aggregation::Mean, Aggregation::Sum]),
    ("total_price", &[Aggregation::Mean, Aggregation::Sum]),
    ("freight_price", &[Aggregation::Mean, Aggregation::Sum]),
    ("unit_price", &[Aggregation::Mean]),
    ("product_score", &[Aggregation::Mean]),
    ("product_weight_g", &[Aggregation::Mean]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Mean,
    Sum,
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mean => write!(f, "mean"),
            Self::Sum => write!(f, "sum"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub category: String,
    pub rows: usize,
    /// One value per entry of `CategorySummary::metrics`
    pub values: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub category_column: String,
    pub metrics: Vec<(String, Aggregation)>,
    pub rows: Vec<CategoryRow>,
}

impl CategorySummary {
    pub fn get(&self, category: &str, column: &str, agg: Aggregation) -> Option<f64> {
        let idx = self.metrics.iter().position(|(c, a)| c == column && *a == agg)?;
        let row = self.rows.iter().find(|r| r.category == category)?;
        row.values.get(idx).copied()
    }
}

fn aggregate(values: &[f64], agg: Aggregation) -> f64 {
    match agg {
        Aggregation::Sum => values.iter().sum(),
        Aggregation::Mean if values.is_empty() => f64::NAN,
        Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
    }
}

/// Group rows by `category_col` and aggregate the known metric columns.
///
/// Rows with a missing category are left out. Missing metric cells are
/// ignored within their group.
pub fn category_summary(
    frame: &SalesFrame,
    category_col: &str,
) -> Result<CategorySummary, DatasetError> {
    let keys = frame.keys(category_col)?;

    let mut sources = Vec::new();
    for (name, aggs) in CATEGORY_METRICS {
        match frame.numeric(name) {
            Ok(values) => sources.push((*name, *aggs, values)),
            Err(e) => warn!(column = name, error = %e, "Skipping column in category summary"),
        }
    }

    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (row, key) in keys.iter().enumerate() {
        if let Some(k) = key {
            groups.entry(k.as_str()).or_default().push(row);
        }
    }
    let mut ordered: Vec<(&str, Vec<usize>)> = groups.into_iter().collect();
    ordered.sort_by(|a, b| compare_keys(a.0, b.0));

    let metrics: Vec<(String, Aggregation)> = sources
        .iter()
        .flat_map(|(name, aggs, _)| aggs.iter().map(move |a| (name.to_string(), *a)))
        .collect();

    let rows = ordered
        .into_iter()
        .map(|(category, members)| {
            let values = sources
                .iter()
                .flat_map(|(_, aggs, column)| {
                    let present: Vec<f64> = members.iter().filter_map(|&r| column[r]).collect();
                    aggs.iter().map(move |a| aggregate(&present, *a))
                })
                .collect();
            CategoryRow {
                category: category.to_string(),
                rows: members.len(),
                values,
            }
        })
        .collect();

    Ok(CategorySummary {
        category_column: category_col.to_string(),
        metrics,
        rows,
    })
}

impl std::fmt::Display for CategorySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Category Analysis ({}):", self.category_column)?;
        write!(f, "  {:<28} {:>6}", "", "rows")?;
        for (column, agg) in &self.metrics {
            write!(f, " {:>22}", format!("{column} {agg}"))?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "  {:<28.28} {:>6}", row.category, row.rows)?;
            for v in &row.values {
                write!(f, " {:>22.2}", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::read_csv;

    const DATA: &str = "\
product_category_name,qty,total_price,unit_price
garden,2,20,10
bed,1,50,50
garden,4,40,
,9,9,1
";

    #[test]
    fn test_groups_sorted_with_mean_and_sum() {
        let frame = read_csv(DATA.as_bytes()).unwrap();
        let summary = category_summary(&frame, "product_category_name").unwrap();

        let names: Vec<&str> = summary.rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["bed", "garden"]);
        assert_eq!(summary.rows[1].rows, 2);

        assert_eq!(summary.get("garden", "qty", Aggregation::Sum), Some(6.0));
        assert_eq!(summary.get("garden", "qty", Aggregation::Mean), Some(3.0));
        assert_eq!(summary.get("garden", "total_price", Aggregation::Sum), Some(60.0));
        // the missing cell is ignored, not counted as zero
        assert_eq!(summary.get("garden", "unit_price", Aggregation::Mean), Some(10.0));
    }

    #[test]
    fn test_absent_metric_columns_skipped() {
        let frame = read_csv(DATA.as_bytes()).unwrap();
        let summary = category_summary(&frame, "product_category_name").unwrap();
        assert!(summary.metrics.iter().all(|(c, _)| c != "freight_price"));
        assert_eq!(summary.get("bed", "freight_price", Aggregation::Mean), None);
        assert!(summary.to_string().contains("qty sum"));
    }

    #[test]
    fn test_missing_category_column_is_an_error() {
        let frame = read_csv(DATA.as_bytes()).unwrap();
        assert!(matches!(
            category_summary(&frame, "nope"),
            Err(DatasetError::MissingColumn(_))
        ));
    }
}

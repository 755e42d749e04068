//! Summary statistics for numeric columns

use statrs::statistics::Statistics;

use crate::dataset::SalesFrame;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); NaN below two values
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SummaryStatistics {
    pub columns: Vec<ColumnSummary>,
}

impl SummaryStatistics {
    pub fn get(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Quantile by linear interpolation between closest ranks.
///
/// `sorted` must be ascending and non-empty.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Describe every numeric column, skipping missing values.
pub fn summary_statistics(frame: &SalesFrame) -> SummaryStatistics {
    let columns = frame
        .numeric_columns()
        .filter_map(|c| {
            let values: Vec<f64> = frame.numeric(&c.name).ok()?.iter().flatten().copied().collect();
            if values.is_empty() {
                return None;
            }
            let mut sorted = values.clone();
            sorted.sort_by(f64::total_cmp);

            Some(ColumnSummary {
                name: c.name.clone(),
                count: values.len(),
                mean: values.iter().mean(),
                std: values.iter().std_dev(),
                min: sorted[0],
                q25: quantile(&sorted, 0.25),
                median: quantile(&sorted, 0.5),
                q75: quantile(&sorted, 0.75),
                max: sorted[sorted.len() - 1],
            })
        })
        .collect();

    SummaryStatistics { columns }
}

impl std::fmt::Display for SummaryStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Summary Statistics:")?;
        writeln!(
            f,
            "  {:<28} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for c in &self.columns {
            writeln!(
                f,
                "  {:<28} {:>8} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                c.name, c.count, c.mean, c.std, c.min, c.q25, c.median, c.q75, c.max
            )?;
        }
        Ok(())
    }
}

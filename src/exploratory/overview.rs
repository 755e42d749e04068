//! Dataset overview: types, missing values, preview rows

use crate::dataset::{DType, SalesFrame};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: DType,
    pub non_null: usize,
    pub missing: usize,
}

#[derive(Debug, Clone)]
pub struct DataOverview {
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
    /// First rows, rendered cell by cell
    pub head: Vec<Vec<String>>,
}

/// Column types, non-null / missing counts and the first `head_rows` rows.
pub fn data_overview(frame: &SalesFrame, head_rows: usize) -> DataOverview {
    let columns = frame
        .columns()
        .iter()
        .map(|c| {
            let missing = c.missing_count();
            ColumnInfo {
                name: c.name.clone(),
                dtype: c.dtype(),
                non_null: c.len() - missing,
                missing,
            }
        })
        .collect();

    let head = (0..head_rows.min(frame.len()))
        .map(|r| frame.columns().iter().map(|c| c.display(r)).collect())
        .collect();

    DataOverview {
        rows: frame.len(),
        columns,
        head,
    }
}

impl DataOverview {
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }
}

impl std::fmt::Display for DataOverview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Data Overview:")?;
        writeln!(f)?;
        writeln!(f, "Basic Information: {} rows x {} columns", self.rows, self.columns.len())?;
        writeln!(f, "  {:<4} {:<30} {:>10} {:>8}", "#", "Column", "Non-Null", "Dtype")?;
        for (i, c) in self.columns.iter().enumerate() {
            writeln!(f, "  {:<4} {:<30} {:>10} {:>8}", i, c.name, c.non_null, c.dtype)?;
        }
        writeln!(f)?;
        writeln!(f, "Missing Values:")?;
        for c in &self.columns {
            writeln!(f, "  {:<30} {:>8}", c.name, c.missing)?;
        }
        writeln!(f)?;
        writeln!(f, "First few rows:")?;
        let names: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        writeln!(f, "  {}", names.join(" | "))?;
        for row in &self.head {
            writeln!(f, "  {}", row.join(" | "))?;
        }
        Ok(())
    }
}

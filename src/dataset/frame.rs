//! Column-oriented sales table with inferred column types

use super::DatasetError;

/// Cell values treated as missing during type inference.
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

pub(crate) fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

/// Inferred column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Numeric,
    Text,
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    /// Infer a column from raw cells: numeric when every non-missing cell
    /// parses as a finite `f64`, text otherwise.
    pub fn infer(name: impl Into<String>, cells: &[String]) -> Self {
        let parsed: Option<Vec<Option<f64>>> = cells
            .iter()
            .map(|c| {
                if is_missing(c) {
                    Some(None)
                } else {
                    c.trim().parse::<f64>().ok().filter(|v| v.is_finite()).map(Some)
                }
            })
            .collect();

        match parsed {
            Some(values) => Self::numeric(name, values),
            None => Self::text(
                name,
                cells
                    .iter()
                    .map(|c| (!is_missing(c)).then(|| c.trim().to_string()))
                    .collect(),
            ),
        }
    }

    pub fn dtype(&self) -> DType {
        match self.data {
            ColumnData::Numeric(_) => DType::Numeric,
            ColumnData::Text(_) => DType::Text,
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn missing_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Text(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    /// Cell as a grouping key. Whole numbers render without a fraction so
    /// numeric codes (weekday counts, years) group as "4", not "4.0".
    pub fn key(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(v) => v.get(row).copied().flatten().map(format_number),
            ColumnData::Text(v) => v.get(row).cloned().flatten(),
        }
    }

    /// Cell rendered for display; missing cells show as `NaN`.
    pub fn display(&self, row: usize) -> String {
        self.key(row).unwrap_or_else(|| "NaN".to_string())
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// An ordered set of equally long named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesFrame {
    columns: Vec<Column>,
    rows: usize,
}

impl SalesFrame {
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let rows = columns.first().map_or(0, Column::len);
        for c in &columns {
            if c.len() != rows {
                return Err(DatasetError::LengthMismatch {
                    name: c.name.clone(),
                    expected: rows,
                    got: c.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Build a frame from a header row and row-major string records.
    pub fn from_records(headers: &[String], records: &[Vec<String>]) -> Result<Self, DatasetError> {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let cells: Vec<String> = records
                    .iter()
                    .map(|r| r.get(i).cloned().unwrap_or_default())
                    .collect();
                Column::infer(name.clone(), &cells)
            })
            .collect();
        Self::from_columns(columns)
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column, DatasetError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    }

    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>], DatasetError> {
        match &self.column(name)?.data {
            ColumnData::Numeric(v) => Ok(v),
            ColumnData::Text(_) => Err(DatasetError::NotNumeric(name.to_string())),
        }
    }

    pub fn text(&self, name: &str) -> Result<&[Option<String>], DatasetError> {
        match &self.column(name)?.data {
            ColumnData::Text(v) => Ok(v),
            ColumnData::Numeric(_) => Err(DatasetError::NotText(name.to_string())),
        }
    }

    /// First `n` rows as a new frame.
    pub fn head(&self, n: usize) -> Self {
        let n = n.min(self.rows);
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                data: match &c.data {
                    ColumnData::Numeric(v) => ColumnData::Numeric(v[..n].to_vec()),
                    ColumnData::Text(v) => ColumnData::Text(v[..n].to_vec()),
                },
            })
            .collect();
        Self { columns, rows: n }
    }

    /// Grouping keys for every row of a column of either type.
    pub fn keys(&self, name: &str) -> Result<Vec<Option<String>>, DatasetError> {
        let column = self.column(name)?;
        Ok((0..self.rows).map(|r| column.key(r)).collect())
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.dtype() == DType::Numeric)
    }

    /// Add (or replace) a column of the same length.
    pub fn with_column(mut self, column: Column) -> Result<Self, DatasetError> {
        let got = column.len();
        if !self.columns.is_empty() && got != self.rows {
            return Err(DatasetError::LengthMismatch {
                name: column.name,
                expected: self.rows,
                got,
            });
        }
        if self.columns.is_empty() {
            self.rows = column.len();
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(self)
    }
}

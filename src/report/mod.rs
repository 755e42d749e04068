//! Result and coefficient files
//!
//! - Optimized prices: `product_id,optimized_price,estimated_quantity_sold` as
//!   CSV, or a JSON array of the same records.
//! - Coefficient tables: `Coefficient,Value` CSV, readable back by
//!   `optimize --coefficients`.
//!
//! Parent directories are created on write.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::OutputFormat;
use crate::types::{Coefficient, CoefficientTable, OptimizedPrice};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ReportError + '_ {
    move |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    File::create(path).map(BufWriter::new).map_err(io_error(path))
}

// ============================================================================
// Optimized prices
// ============================================================================

pub fn write_results_to<W: Write>(
    writer: W,
    results: &[OptimizedPrice],
    format: OutputFormat,
) -> Result<(), ReportError> {
    match format {
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(writer);
            for row in results {
                wtr.serialize(row)?;
            }
            wtr.flush().map_err(csv::Error::from)?;
        }
        OutputFormat::Json => {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, results)?;
            writer.write_all(b"\n").map_err(serde_json::Error::io)?;
        }
    }
    Ok(())
}

pub fn write_results(
    path: &Path,
    results: &[OptimizedPrice],
    format: OutputFormat,
) -> Result<(), ReportError> {
    let mut writer = create(path)?;
    write_results_to(&mut writer, results, format)?;
    writer.flush().map_err(io_error(path))?;
    info!(path = %path.display(), rows = results.len(), format = ?format, "Optimized prices written");
    Ok(())
}

/// Console table of optimized prices.
pub struct ResultsTable<'a>(pub &'a [OptimizedPrice]);

impl std::fmt::Display for ResultsTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:<36} {:>16} {:>24}",
            "product_id", "optimized_price", "estimated_quantity_sold"
        )?;
        for row in self.0 {
            writeln!(
                f,
                "{:<36} {:>16.4} {:>24.4}",
                row.product_id, row.optimized_price, row.estimated_qty
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// Coefficients
// ============================================================================

pub fn write_coefficients(path: &Path, table: &CoefficientTable) -> Result<(), ReportError> {
    let writer = create(path)?;
    let mut wtr = csv::Writer::from_writer(writer);
    for row in table.iter() {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(io_error(path))?;
    info!(path = %path.display(), coefficients = table.len(), "Coefficients written");
    Ok(())
}

pub fn read_coefficients_from<R: Read>(reader: R) -> Result<CoefficientTable, ReportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let rows = rdr
        .deserialize::<Coefficient>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CoefficientTable { rows })
}

pub fn read_coefficients(path: &Path) -> Result<CoefficientTable, ReportError> {
    let file = File::open(path).map_err(io_error(path))?;
    let table = read_coefficients_from(file)?;
    info!(path = %path.display(), coefficients = table.len(), "Coefficients loaded");
    Ok(table)
}

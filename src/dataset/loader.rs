//! CSV loading

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use super::{DatasetError, SalesFrame};

/// Load a sales CSV from disk.
///
/// The first row is the header. Every record must have as many fields as the
/// header; ragged files are rejected by the CSV reader.
pub fn load_csv(path: &Path) -> Result<SalesFrame, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let frame = read_csv(file)?;
    info!(
        path = %path.display(),
        rows = frame.len(),
        columns = frame.columns().len(),
        "Loaded sales dataset"
    );
    Ok(frame)
}

/// Read a sales CSV from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<SalesFrame, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(DatasetError::Empty);
    }

    let mut records = Vec::new();
    for record in rdr.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    SalesFrame::from_records(&headers, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DType;

    #[test]
    fn test_read_csv_infers_types() {
        let data = "product_id,product_category_name,qty,unit_price\n\
                    bed1,bed_bath_table,1,45.95\n\
                    bed1,bed_bath_table,3,45.95\n\
                    garden5,garden_tools, 2 ,\n";
        let frame = read_csv(data.as_bytes()).unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.column("product_id").unwrap().dtype(), DType::Text);
        assert_eq!(frame.column("qty").unwrap().dtype(), DType::Numeric);
        assert_eq!(frame.numeric("qty").unwrap()[2], Some(2.0));
        assert_eq!(frame.numeric("unit_price").unwrap()[2], None);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let data = "a,b\n1,2\n3\n";
        assert!(matches!(read_csv(data.as_bytes()), Err(DatasetError::Csv(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
        assert!(err.to_string().contains("here.csv"));
    }
}

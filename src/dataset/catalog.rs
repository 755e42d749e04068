//! Product catalog extraction from sales rows

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{DatasetError, SalesFrame};
use crate::config::ColumnMapping;
use crate::types::{CatalogMode, ProductRecord};

/// Build the optimizer's product catalog from a sales frame.
///
/// Rows with a missing id, price or quantity are skipped (and counted in a
/// warning). Value checks such as non-positive prices are left to the
/// optimizer so they surface with the offending product id.
pub fn build_catalog(
    frame: &SalesFrame,
    columns: &ColumnMapping,
    mode: CatalogMode,
) -> Result<Vec<ProductRecord>, DatasetError> {
    let ids = frame.keys(&columns.product_id)?;
    let prices = frame.numeric(&columns.price)?;
    let quantities = frame.numeric(&columns.quantity)?;

    let mut skipped = 0usize;
    let rows: Vec<ProductRecord> = ids
        .into_iter()
        .zip(prices)
        .zip(quantities)
        .filter_map(|((id, price), qty)| match (id, price, qty) {
            (Some(id), Some(price), Some(qty)) => Some(ProductRecord::new(id, *price, *qty)),
            _ => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        warn!(skipped, "Skipped sales rows with missing id, price or quantity");
    }

    let catalog = match mode {
        CatalogMode::Rows => rows,
        CatalogMode::PerProduct => aggregate_per_product(rows),
    };
    debug!(products = catalog.len(), mode = %mode, "Catalog built");
    Ok(catalog)
}

/// Mean price and mean quantity per product id, in first-seen order.
fn aggregate_per_product(rows: Vec<ProductRecord>) -> Vec<ProductRecord> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut sums: Vec<(String, f64, f64, usize)> = Vec::new();

    for row in rows {
        match index.get(&row.product_id) {
            Some(&i) => {
                let entry = &mut sums[i];
                entry.1 += row.unit_price;
                entry.2 += row.qty;
                entry.3 += 1;
            }
            None => {
                index.insert(row.product_id.clone(), sums.len());
                sums.push((row.product_id, row.unit_price, row.qty, 1));
            }
        }
    }

    sums.into_iter()
        .map(|(id, price, qty, n)| ProductRecord::new(id, price / n as f64, qty / n as f64))
        .collect()
}
